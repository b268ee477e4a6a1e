use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;

use crate::error::{AppError, Context, Result};

use super::{
    validator, BackendProviderConfig, FinnhubProviderConfig, ProviderConfig, RefreshDefaults,
    TrackerConfig, API_BASE_URL_ENV, DEFAULT_API_BASE_URL, FINNHUB_BASE_URL,
};

/// Load `assets/configs/<name>.json` under `root`.
pub fn load_tracker_config(root: &Path, name: &str) -> Result<TrackerConfig> {
    let path = configs_dir(root).join(format!("{name}.json"));
    load_tracker_config_file(&path)
}

pub fn load_tracker_config_file(path: &Path) -> Result<TrackerConfig> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("failed to read tracker config JSON at {}", path.display()))?;

    let raw: RawTrackerConfig = serde_json::from_str(&json)
        .with_context(|| format!("failed to parse tracker config JSON at {}", path.display()))?;

    let fallback_name = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("custom")
        .to_string();

    let config = raw.into_tracker_config(fallback_name)?;
    validator::validate_tracker_config(&config)?;
    Ok(config)
}

/// Pick the configuration named on the command line.
///
/// No selector means the builtin backend config. A selector that points at an
/// existing file (or ends in `.json`) is read as a path; anything else is a
/// descriptor name under `assets/configs`.
pub fn resolve_tracker_config(root: &Path, selector: Option<&str>) -> Result<TrackerConfig> {
    let Some(selector) = selector.map(str::trim).filter(|s| !s.is_empty()) else {
        let config = TrackerConfig::builtin();
        validator::validate_tracker_config(&config)?;
        return Ok(config);
    };

    let as_path = PathBuf::from(selector);
    if as_path.is_file() || selector.ends_with(".json") {
        load_tracker_config_file(&as_path)
    } else {
        load_tracker_config(root, selector)
    }
}

fn configs_dir(root: &Path) -> PathBuf {
    root.join("assets").join("configs")
}

#[derive(Debug, Deserialize)]
struct RawTrackerConfig {
    #[serde(default)]
    name: Option<String>,
    provider: RawProviderConfig,
    #[serde(default)]
    refresh: RawRefresh,
}

impl RawTrackerConfig {
    fn into_tracker_config(self, fallback_name: String) -> Result<TrackerConfig> {
        Ok(TrackerConfig {
            name: self
                .name
                .filter(|name| !name.trim().is_empty())
                .unwrap_or(fallback_name),
            provider: self.provider.into_provider_config()?,
            refresh: RefreshDefaults {
                minutes: self.refresh.minutes,
                seconds: self.refresh.seconds,
            },
        })
    }
}

#[derive(Debug, Deserialize, Default)]
struct RawRefresh {
    #[serde(default)]
    minutes: u64,
    #[serde(default)]
    seconds: u64,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum RawProviderConfig {
    Backend {
        #[serde(default)]
        base_url: Option<String>,
        #[serde(default)]
        headers: HashMap<String, String>,
    },
    Finnhub {
        #[serde(default)]
        base_url: Option<String>,
        token: String,
        #[serde(default)]
        headers: HashMap<String, String>,
    },
}

impl RawProviderConfig {
    fn into_provider_config(self) -> Result<ProviderConfig> {
        match self {
            RawProviderConfig::Backend { base_url, headers } => {
                let base_url = base_url
                    .or_else(|| std::env::var(API_BASE_URL_ENV).ok())
                    .filter(|url| !url.trim().is_empty())
                    .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());
                Ok(ProviderConfig::Backend(BackendProviderConfig {
                    base_url,
                    headers,
                }))
            }
            RawProviderConfig::Finnhub {
                base_url,
                token,
                headers,
            } => {
                if token.trim().is_empty() {
                    return Err(AppError::message(
                        "provider.token must be provided for the finnhub provider",
                    ));
                }
                Ok(ProviderConfig::Finnhub(FinnhubProviderConfig {
                    base_url: base_url.unwrap_or_else(|| FINNHUB_BASE_URL.to_string()),
                    token,
                    headers,
                }))
            }
        }
    }
}
