use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

use crate::error::FetchError;

use super::FetchResult;

/// Read a numeric field that may arrive as a JSON number or a numeric string.
/// Null, blank, non-numeric and NaN values are treated as absent.
pub fn number_field(object: &Value, key: &str) -> Option<f64> {
    value_to_f64(object.get(key)?)
}

pub fn value_to_f64(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(num) => num.as_f64(),
        Value::String(raw) => raw.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    parsed.is_finite().then_some(parsed)
}

pub fn text_field(object: &Value, key: &str) -> Option<String> {
    match object.get(key)? {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Parse a provider timestamp: RFC 3339 text or unix seconds.
pub fn timestamp_field(object: &Value, key: &str) -> FetchResult<Option<DateTime<Utc>>> {
    match object.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(raw)) if raw.trim().is_empty() => Ok(None),
        Some(Value::String(raw)) => DateTime::parse_from_rfc3339(raw.trim())
            .map(|ts| Some(ts.with_timezone(&Utc)))
            .map_err(|err| {
                FetchError::request_failed(format!("invalid `{key}` timestamp `{raw}`: {err}"))
            }),
        Some(Value::Number(num)) => {
            let seconds = num.as_i64().ok_or_else(|| {
                FetchError::request_failed(format!("invalid `{key}` timestamp {num}"))
            })?;
            Ok(Utc.timestamp_opt(seconds, 0).single())
        }
        Some(other) => Err(FetchError::request_failed(format!(
            "unexpected `{key}` timestamp value {other}"
        ))),
    }
}

/// Parse a response body, requiring a top-level JSON object.
pub fn parse_object(body: &str) -> FetchResult<Value> {
    let value: Value = serde_json::from_str(body)
        .map_err(|err| FetchError::request_failed(format!("malformed JSON body: {err}")))?;
    if value.is_object() {
        Ok(value)
    } else {
        Err(FetchError::request_failed(
            "malformed body: expected a JSON object",
        ))
    }
}
