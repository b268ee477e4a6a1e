use std::collections::HashMap;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use crate::error::FetchError;

use super::FetchResult;

/// Join a configured base URL with an endpoint path, tolerating stray slashes.
pub fn endpoint_url(base_url: &str, path: &str) -> String {
    let base = base_url.trim().trim_end_matches('/');
    let path = path.trim().trim_start_matches('/');
    if base.is_empty() {
        format!("/{path}")
    } else {
        format!("{base}/{path}")
    }
}

/// Expand `${NAME}` placeholders from the process environment.
pub fn expand_env_vars(value: &str) -> FetchResult<String> {
    expand_with(value, |name| std::env::var(name).ok())
}

fn expand_with<F>(value: &str, lookup: F) -> FetchResult<String>
where
    F: Fn(&str) -> Option<String>,
{
    let mut result = String::with_capacity(value.len());
    let mut chars = value.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut name = String::new();
            let mut closed = false;
            for next in chars.by_ref() {
                if next == '}' {
                    closed = true;
                    break;
                }
                name.push(next);
            }

            if !closed {
                return Err(FetchError::request_failed(
                    "unterminated environment placeholder",
                ));
            }

            if name.is_empty() {
                return Err(FetchError::request_failed(
                    "encountered empty environment placeholder",
                ));
            }

            let value = lookup(&name).ok_or_else(|| {
                FetchError::request_failed(format!("environment variable {name} is not set"))
            })?;
            result.push_str(&value);
        } else {
            result.push(ch);
        }
    }

    Ok(result)
}

pub fn build_headers(headers: &HashMap<String, String>) -> FetchResult<HeaderMap> {
    let mut map = HeaderMap::new();
    for (key, value) in headers {
        let name = HeaderName::from_bytes(key.as_bytes())
            .map_err(|err| FetchError::request_failed(format!("invalid header name {key}: {err}")))?;
        let expanded = expand_env_vars(value)?;
        let header_value = HeaderValue::from_str(&expanded).map_err(|err| {
            FetchError::request_failed(format!("invalid header value for {key}: {err}"))
        })?;
        map.insert(name, header_value);
    }
    Ok(map)
}

/// Describe a transport failure without leaking query strings such as API tokens.
pub fn describe_transport_error(err: reqwest::Error) -> String {
    let err = err.without_url();
    if err.is_timeout() {
        format!("request timeout: {err}")
    } else if err.is_connect() {
        format!("connection failed: {err}")
    } else if err.is_decode() {
        format!("failed to read response body: {err}")
    } else {
        format!("request failed: {err}")
    }
}
