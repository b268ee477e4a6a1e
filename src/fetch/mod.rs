use std::sync::Arc;

use futures::future::BoxFuture;

use crate::config::ProviderConfig;
use crate::error::FetchError;

pub mod backend;
pub mod coordinator;
pub mod decode;
pub mod finnhub;
pub mod observation;
pub mod request;

#[cfg(test)]
pub(crate) mod test_support;

pub use backend::BackendProvider;
pub use coordinator::{FetchCompletion, FetchCoordinator, RequestId, RequestOrigin, RequestTag};
pub use finnhub::FinnhubProvider;
pub use observation::Observation;

pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// A source of quote observations keyed by symbol.
pub trait QuoteProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Issue one request for an already normalised symbol.
    fn fetch_quote<'a>(&'a self, symbol: &'a str) -> BoxFuture<'a, FetchResult<Observation>>;
}

/// Build the adapter described by the provider configuration.
pub fn build_provider(config: &ProviderConfig) -> Arc<dyn QuoteProvider> {
    match config {
        ProviderConfig::Backend(cfg) => Arc::new(BackendProvider::new(cfg.clone())),
        ProviderConfig::Finnhub(cfg) => Arc::new(FinnhubProvider::new(cfg.clone())),
    }
}
