use chrono::Utc;
use futures::future::BoxFuture;
use futures::FutureExt;
use log::debug;
use reqwest::Client;
use serde_json::Value;

use crate::config::FinnhubProviderConfig;
use crate::error::FetchError;

use super::decode::{number_field, parse_object, text_field, timestamp_field};
use super::request::{build_headers, describe_transport_error, endpoint_url, expand_env_vars};
use super::{FetchResult, Observation, QuoteProvider};

const QUOTE_PATH: &str = "quote";
const PROFILE_PATH: &str = "stock/profile2";

/// Legacy adapter merging a token-keyed quote and company profile.
pub struct FinnhubProvider {
    client: Client,
    config: FinnhubProviderConfig,
}

impl FinnhubProvider {
    pub fn new(config: FinnhubProviderConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    async fn get_json(&self, path: &str, symbol: &str, token: &str) -> FetchResult<Value> {
        let url = endpoint_url(&self.config.base_url, path);
        let headers = build_headers(&self.config.headers)?;
        debug!("GET {url}?symbol={symbol}");

        let response = self
            .client
            .get(&url)
            .headers(headers)
            .query(&[("symbol", symbol), ("token", token)])
            .send()
            .await
            .map_err(|err| FetchError::request_failed(describe_transport_error(err)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::request_failed(format!(
                "{path} request failed with status {}",
                status.as_u16()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|err| FetchError::request_failed(describe_transport_error(err)))?;
        parse_object(&body)
    }

    async fn fetch(&self, symbol: &str) -> FetchResult<Observation> {
        let token = expand_env_vars(&self.config.token)?;
        let (quote, profile) = futures::try_join!(
            self.get_json(QUOTE_PATH, symbol, &token),
            self.get_json(PROFILE_PATH, symbol, &token),
        )?;
        merge_quote_and_profile(symbol, &quote, &profile)
    }
}

impl QuoteProvider for FinnhubProvider {
    fn name(&self) -> &str {
        "finnhub"
    }

    fn fetch_quote<'a>(&'a self, symbol: &'a str) -> BoxFuture<'a, FetchResult<Observation>> {
        self.fetch(symbol).boxed()
    }
}

/// Combine `{o,h,l,c,pc}` (plus `d`, `dp`, `t` when present) with the profile name.
fn merge_quote_and_profile(
    symbol: &str,
    quote: &Value,
    profile: &Value,
) -> FetchResult<Observation> {
    let last_price = number_field(quote, "c");
    let previous_close = number_field(quote, "pc");

    // An unknown symbol comes back as all zeros rather than an error status.
    if last_price.unwrap_or(0.0) == 0.0 && previous_close.unwrap_or(0.0) == 0.0 {
        return Err(FetchError::request_failed(format!(
            "no quote data returned for {symbol}"
        )));
    }

    let change = number_field(quote, "d").or_else(|| match (last_price, previous_close) {
        (Some(c), Some(pc)) => Some(c - pc),
        _ => None,
    });
    let change_percent = number_field(quote, "dp").or_else(|| match (change, previous_close) {
        (Some(d), Some(pc)) if pc.abs() > f64::EPSILON => Some(d / pc * 100.0),
        _ => None,
    });

    let mut row = Observation::empty(symbol);
    row.company_name = text_field(profile, "name").or_else(|| Some(symbol.to_string()));
    row.last_price = last_price;
    row.open = number_field(quote, "o");
    row.high = number_field(quote, "h");
    row.low = number_field(quote, "l");
    row.previous_close = previous_close;
    row.change = change;
    row.change_percent = change_percent;
    // Finnhub reports `t: 0` for symbols it has no trade time for.
    let traded_at = timestamp_field(quote, "t")?.filter(|ts| ts.timestamp() > 0);
    row.last_updated = Some(traded_at.unwrap_or_else(Utc::now));
    row.history = Value::Array(Vec::new());
    Ok(row)
}
