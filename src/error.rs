use thiserror::Error;

pub use anyhow::Context;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),
    #[error(transparent)]
    Join(#[from] tokio::task::JoinError),
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("{0}")]
    Message(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AppError {
    pub fn message<T: Into<String>>(msg: T) -> Self {
        AppError::Message(msg.into())
    }
}

pub const START_SYMBOL_REQUIRED: &str = "Symbol is required to start tracking.";
pub const FETCH_SYMBOL_REQUIRED: &str = "Please enter a valid NSE symbol before fetching data.";
pub const RETRIEVAL_FAILED: &str =
    "Unable to retrieve data from NSE. Please verify the symbol and try again.";

/// Failure modes of a single quote request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("symbol must not be blank")]
    InvalidSymbol,
    #[error("quote request failed: {0}")]
    RequestFailed(String),
    /// The response arrived after the tracked symbol changed.
    #[error("response for {requested} superseded by {active:?}")]
    Stale { requested: String, active: String },
}

impl FetchError {
    pub fn request_failed<T: Into<String>>(detail: T) -> Self {
        FetchError::RequestFailed(detail.into())
    }

    /// Text shown to the user; the underlying cause is only logged.
    pub fn user_message(&self) -> &'static str {
        match self {
            FetchError::InvalidSymbol => FETCH_SYMBOL_REQUIRED,
            FetchError::RequestFailed(_) | FetchError::Stale { .. } => RETRIEVAL_FAILED,
        }
    }
}
