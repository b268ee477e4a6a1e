use std::fmt;
use std::sync::Arc;

use log::{debug, warn};
use tokio::task::JoinHandle;

use crate::error::FetchError;
use crate::utils::normalize_symbol;

use super::{FetchResult, Observation, QuoteProvider};

pub type RequestId = u64;

/// Active symbol captured when a tracked request was issued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestTag(String);

impl RequestTag {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self(symbol.into())
    }

    pub fn matches(&self, active_symbol: &str) -> bool {
        self.0 == active_symbol
    }
}

impl fmt::Display for RequestTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Why a request was issued, which decides whether staleness applies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestOrigin {
    /// Issued by start tracking or a timer tick.
    Tracked(RequestTag),
    /// Fetch-once action; never checked against the active symbol.
    Manual,
}

impl RequestOrigin {
    pub fn applies_to(&self, active_symbol: &str) -> bool {
        match self {
            RequestOrigin::Tracked(tag) => tag.matches(active_symbol),
            RequestOrigin::Manual => true,
        }
    }
}

#[derive(Debug)]
pub struct FetchCompletion {
    pub id: RequestId,
    pub symbol: String,
    pub origin: RequestOrigin,
    pub result: FetchResult<Observation>,
}

impl FetchCompletion {
    /// Whether this request still reflects the user's intent.
    pub fn is_applicable(&self, active_symbol: &str) -> bool {
        self.origin.applies_to(active_symbol)
    }

    /// Resolve the completion against the current active symbol.
    pub fn into_fresh_result(self, active_symbol: &str) -> FetchResult<Observation> {
        if self.is_applicable(active_symbol) {
            self.result
        } else {
            Err(FetchError::Stale {
                requested: self.symbol,
                active: active_symbol.to_string(),
            })
        }
    }
}

/// Performs single quote requests and hands completions back to the session.
pub struct FetchCoordinator {
    provider: Arc<dyn QuoteProvider>,
    next_id: RequestId,
}

impl FetchCoordinator {
    pub fn new(provider: Arc<dyn QuoteProvider>) -> Self {
        Self {
            provider,
            next_id: 1,
        }
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Fetch one observation. Blank symbols fail without touching the network.
    pub async fn fetch(&self, symbol: &str) -> FetchResult<Observation> {
        let symbol = normalize_symbol(symbol).ok_or(FetchError::InvalidSymbol)?;
        fetch_with(self.provider.as_ref(), &symbol).await
    }

    /// Spawn a request and deliver its completion through `on_complete`.
    ///
    /// The request is not aborted when the session moves on; the receiver
    /// decides whether the completion still applies.
    pub fn dispatch<F>(
        &mut self,
        symbol: String,
        origin: RequestOrigin,
        on_complete: F,
    ) -> (RequestId, JoinHandle<()>)
    where
        F: FnOnce(FetchCompletion) + Send + 'static,
    {
        let id = self.next_id;
        self.next_id += 1;

        let provider = Arc::clone(&self.provider);
        debug!("request #{id} for {symbol} ({origin:?}) via {}", provider.name());
        let handle = tokio::spawn(async move {
            let result = match normalize_symbol(&symbol) {
                Some(normalized) => fetch_with(provider.as_ref(), &normalized).await,
                None => Err(FetchError::InvalidSymbol),
            };
            on_complete(FetchCompletion {
                id,
                symbol,
                origin,
                result,
            });
        });
        (id, handle)
    }
}

async fn fetch_with(provider: &dyn QuoteProvider, symbol: &str) -> FetchResult<Observation> {
    let result = provider.fetch_quote(symbol).await;
    if let Err(err) = &result {
        warn!("{} fetch for {symbol} failed: {err}", provider.name());
    }
    result
}
