use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use super::decode::{number_field, parse_object, text_field, timestamp_field};
use super::FetchResult;

/// Latest quote plus indicator readings for one symbol.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Observation {
    pub symbol: String,
    pub company_name: Option<String>,
    pub last_price: Option<f64>,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub previous_close: Option<f64>,
    pub change: Option<f64>,
    pub change_percent: Option<f64>,
    pub sma20: Option<f64>,
    pub ema20: Option<f64>,
    pub rsi14: Option<f64>,
    pub bollinger_upper: Option<f64>,
    pub bollinger_lower: Option<f64>,
    pub bollinger_middle: Option<f64>,
    pub annualised_volatility: Option<f64>,
    pub last_updated: Option<DateTime<Utc>>,
    pub history: Value,
}

impl Observation {
    /// An observation with only its key set.
    pub fn empty(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            company_name: None,
            last_price: None,
            open: None,
            high: None,
            low: None,
            previous_close: None,
            change: None,
            change_percent: None,
            sma20: None,
            ema20: None,
            rsi14: None,
            bollinger_upper: None,
            bollinger_lower: None,
            bollinger_middle: None,
            annualised_volatility: None,
            last_updated: None,
            history: Value::Null,
        }
    }

    /// Decode an `/api/stocks` response body.
    ///
    /// `requested` is used when the body omits the symbol; the company name
    /// falls back to the symbol the same way the quote backend does.
    pub fn from_stocks_body(requested: &str, body: &str) -> FetchResult<Self> {
        let root = parse_object(body)?;
        Self::from_stocks_value(requested, &root)
    }

    pub fn from_stocks_value(requested: &str, root: &Value) -> FetchResult<Self> {
        let symbol = text_field(root, "symbol")
            .map(|s| s.to_uppercase())
            .unwrap_or_else(|| requested.to_string());

        let indicators = root.get("indicators").cloned().unwrap_or(Value::Null);
        let bollinger = indicators
            .get("bollingerBands")
            .cloned()
            .unwrap_or(Value::Null);

        Ok(Self {
            company_name: text_field(root, "companyName").or_else(|| Some(symbol.clone())),
            last_price: number_field(root, "lastPrice"),
            open: number_field(root, "open"),
            high: number_field(root, "high"),
            low: number_field(root, "low"),
            previous_close: number_field(root, "previousClose"),
            change: number_field(root, "change"),
            change_percent: number_field(root, "changePercent"),
            sma20: number_field(&indicators, "sma20"),
            ema20: number_field(&indicators, "ema20"),
            rsi14: number_field(&indicators, "rsi14"),
            bollinger_upper: number_field(&bollinger, "upper"),
            bollinger_lower: number_field(&bollinger, "lower"),
            bollinger_middle: number_field(&bollinger, "middle"),
            annualised_volatility: number_field(&indicators, "annualisedVolatility"),
            last_updated: timestamp_field(root, "lastUpdated")?,
            history: root.get("history").cloned().unwrap_or(Value::Null),
            symbol,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;

    const SBIN_BODY: &str = r#"{
        "symbol": "SBIN",
        "companyName": "State Bank of India",
        "lastPrice": 602.35,
        "open": 598.0,
        "high": 604.1,
        "low": 596.5,
        "previousClose": 598.0,
        "change": 4.35,
        "changePercent": 0.72,
        "lastUpdated": "2024-05-02T09:15:00+00:00",
        "history": [{"date": "2024-05-01", "close": 598.0}],
        "indicators": {
            "sma20": 601.12,
            "ema20": 600.54,
            "rsi14": 58.23,
            "bollingerBands": {"upper": 615.4, "lower": 585.6, "middle": 600.5},
            "annualisedVolatility": 18.2
        }
    }"#;

    #[test]
    fn maps_stocks_payload() {
        let row = Observation::from_stocks_body("SBIN", SBIN_BODY).unwrap();

        assert_eq!(row.symbol, "SBIN");
        assert_eq!(row.company_name.as_deref(), Some("State Bank of India"));
        assert_eq!(row.last_price, Some(602.35));
        assert_eq!(row.change, Some(4.35));
        assert_eq!(row.change_percent, Some(0.72));
        assert_eq!(row.sma20, Some(601.12));
        assert_eq!(row.ema20, Some(600.54));
        assert_eq!(row.rsi14, Some(58.23));
        assert_eq!(row.bollinger_upper, Some(615.4));
        assert_eq!(row.bollinger_lower, Some(585.6));
        assert_eq!(row.bollinger_middle, Some(600.5));
        assert_eq!(row.annualised_volatility, Some(18.2));
        assert!(row.last_updated.is_some());
        assert_eq!(row.history[0]["close"], 598.0);
    }

    #[test]
    fn tolerates_missing_indicators_and_nulls() {
        let body = r#"{"symbol": "infy", "lastPrice": null, "open": "1420.5"}"#;
        let row = Observation::from_stocks_body("INFY", body).unwrap();

        assert_eq!(row.symbol, "INFY");
        assert_eq!(row.company_name.as_deref(), Some("INFY"));
        assert_eq!(row.last_price, None);
        assert_eq!(row.open, Some(1420.5));
        assert_eq!(row.sma20, None);
        assert_eq!(row.bollinger_middle, None);
        assert_eq!(row.history, Value::Null);
    }

    #[test]
    fn falls_back_to_requested_symbol() {
        let row = Observation::from_stocks_body("TCS", r#"{"lastPrice": 3500}"#).unwrap();
        assert_eq!(row.symbol, "TCS");
        assert_eq!(row.last_price, Some(3500.0));
    }

    #[test]
    fn malformed_body_is_a_request_failure() {
        let err = Observation::from_stocks_body("SBIN", "not json").unwrap_err();
        assert!(matches!(err, FetchError::RequestFailed(_)));
    }
}
