use futures::future::BoxFuture;
use futures::FutureExt;
use log::debug;
use reqwest::Client;

use crate::config::BackendProviderConfig;
use crate::error::FetchError;

use super::request::{build_headers, describe_transport_error, endpoint_url};
use super::{FetchResult, Observation, QuoteProvider};

const STOCKS_PATH: &str = "api/stocks";

/// Adapter for the quote backend's `GET /api/stocks?symbol=` endpoint.
pub struct BackendProvider {
    client: Client,
    config: BackendProviderConfig,
}

impl BackendProvider {
    pub fn new(config: BackendProviderConfig) -> Self {
        Self::with_client(Client::new(), config)
    }

    pub fn with_client(client: Client, config: BackendProviderConfig) -> Self {
        Self { client, config }
    }

    pub fn stocks_url(&self) -> String {
        endpoint_url(&self.config.base_url, STOCKS_PATH)
    }

    async fn fetch(&self, symbol: &str) -> FetchResult<Observation> {
        let url = self.stocks_url();
        let headers = build_headers(&self.config.headers)?;
        debug!("GET {url}?symbol={symbol}");

        let response = self
            .client
            .get(&url)
            .headers(headers)
            .query(&[("symbol", symbol)])
            .send()
            .await
            .map_err(|err| FetchError::request_failed(describe_transport_error(err)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::request_failed(format!(
                "API request failed with status {}",
                status.as_u16()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|err| FetchError::request_failed(describe_transport_error(err)))?;

        Observation::from_stocks_body(symbol, &body)
    }
}

impl QuoteProvider for BackendProvider {
    fn name(&self) -> &str {
        "backend"
    }

    fn fetch_quote<'a>(&'a self, symbol: &'a str) -> BoxFuture<'a, FetchResult<Observation>> {
        self.fetch(symbol).boxed()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::fetch::test_support::{serve_http, CannedResponse};

    fn provider(base_url: String) -> BackendProvider {
        BackendProvider::new(BackendProviderConfig {
            base_url,
            headers: HashMap::from([("Accept".to_string(), "application/json".to_string())]),
        })
    }

    #[tokio::test]
    async fn fetches_and_maps_stock_payload() {
        let body = r#"{
            "symbol": "SBIN",
            "companyName": "State Bank of India",
            "lastPrice": 602.35,
            "change": 4.35,
            "changePercent": 0.72,
            "indicators": {
                "sma20": 601.12, "ema20": 600.54, "rsi14": 58.23,
                "bollingerBands": {"upper": 615.4, "lower": 585.6, "middle": 600.5},
                "annualisedVolatility": 18.2
            }
        }"#;
        let server = serve_http(vec![CannedResponse::json(200, body)]).await;

        let row = provider(server.base_url.clone())
            .fetch_quote("SBIN")
            .await
            .expect("quote parsed");

        assert_eq!(row.company_name.as_deref(), Some("State Bank of India"));
        assert_eq!(row.last_price, Some(602.35));
        assert_eq!(row.change_percent, Some(0.72));

        let requests = server.requests().await;
        assert_eq!(requests.len(), 1);
        assert!(
            requests[0].starts_with("GET /api/stocks?symbol=SBIN "),
            "unexpected request line: {}",
            requests[0]
        );
    }

    #[tokio::test]
    async fn non_success_status_is_request_failure() {
        let server =
            serve_http(vec![CannedResponse::json(502, r#"{"detail":"upstream"}"#)]).await;

        let err = provider(server.base_url.clone())
            .fetch_quote("SBIN")
            .await
            .unwrap_err();

        assert_eq!(
            err,
            FetchError::RequestFailed("API request failed with status 502".to_string())
        );
    }

    #[tokio::test]
    async fn malformed_body_is_request_failure() {
        let server = serve_http(vec![CannedResponse::json(200, "<html>oops</html>")]).await;

        let err = provider(server.base_url.clone())
            .fetch_quote("SBIN")
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::RequestFailed(_)));
    }

    #[tokio::test]
    async fn unreachable_backend_is_request_failure() {
        let err = provider("http://127.0.0.1:9".to_string())
            .fetch_quote("SBIN")
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::RequestFailed(_)));
    }
}
