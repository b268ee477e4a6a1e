use std::collections::HashMap;

pub mod loader;
pub mod validator;

pub use loader::{load_tracker_config, load_tracker_config_file, resolve_tracker_config};
pub use validator::validate_tracker_config;

/// Environment variable overriding the quote backend location.
pub const API_BASE_URL_ENV: &str = "NSE_TRACKER_API_BASE_URL";
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080";
pub const FINNHUB_BASE_URL: &str = "https://finnhub.io/api/v1";

#[derive(Debug, Clone)]
pub struct TrackerConfig {
    pub name: String,
    pub provider: ProviderConfig,
    pub refresh: RefreshDefaults,
}

/// Quote sources that can sit behind the fetch coordinator.
#[derive(Debug, Clone)]
pub enum ProviderConfig {
    Backend(BackendProviderConfig),
    Finnhub(FinnhubProviderConfig),
}

impl ProviderConfig {
    pub fn kind(&self) -> &'static str {
        match self {
            ProviderConfig::Backend(_) => "backend",
            ProviderConfig::Finnhub(_) => "finnhub",
        }
    }

    pub fn base_url(&self) -> &str {
        match self {
            ProviderConfig::Backend(cfg) => &cfg.base_url,
            ProviderConfig::Finnhub(cfg) => &cfg.base_url,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BackendProviderConfig {
    pub base_url: String,
    pub headers: HashMap<String, String>,
}

#[derive(Debug, Clone)]
pub struct FinnhubProviderConfig {
    pub base_url: String,
    /// API token; may hold a `${VAR}` placeholder expanded per request.
    pub token: String,
    pub headers: HashMap<String, String>,
}

/// Interval used when the user does not supply one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefreshDefaults {
    pub minutes: u64,
    pub seconds: u64,
}

impl TrackerConfig {
    pub fn builtin() -> Self {
        let base_url = std::env::var(API_BASE_URL_ENV)
            .ok()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());

        Self {
            name: "builtin".to_string(),
            provider: ProviderConfig::Backend(BackendProviderConfig {
                base_url,
                headers: HashMap::from([(
                    "Accept".to_string(),
                    "application/json".to_string(),
                )]),
            }),
            refresh: RefreshDefaults::default(),
        }
    }
}
