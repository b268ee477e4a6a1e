use std::collections::HashMap;

use crate::error::{AppError, Result};

use super::{ProviderConfig, TrackerConfig};

/// Validate a tracker configuration and surface every issue at once.
///
/// Refresh defaults need no checks: seconds simply add to minutes.
pub fn validate_tracker_config(config: &TrackerConfig) -> Result<()> {
    let mut issues = Vec::new();

    validate_provider(&config.provider, &mut issues);

    if issues.is_empty() {
        Ok(())
    } else {
        Err(AppError::message(format!(
            "tracker config `{}` invalid:\n  - {}",
            config.name,
            issues.join("\n  - ")
        )))
    }
}

fn validate_provider(provider: &ProviderConfig, issues: &mut Vec<String>) {
    validate_base_url(provider.base_url(), issues);

    match provider {
        ProviderConfig::Backend(cfg) => validate_headers(&cfg.headers, issues),
        ProviderConfig::Finnhub(cfg) => {
            if cfg.token.trim().is_empty() {
                issues.push("provider.token must not be empty".to_string());
            }
            validate_headers(&cfg.headers, issues);
        }
    }
}

fn validate_base_url(base_url: &str, issues: &mut Vec<String>) {
    let trimmed = base_url.trim();
    if trimmed.is_empty() {
        issues.push("provider.base_url must not be empty".to_string());
    } else if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        issues.push(format!(
            "provider.base_url `{trimmed}` must start with http:// or https://"
        ));
    }
}

fn validate_headers(headers: &HashMap<String, String>, issues: &mut Vec<String>) {
    for name in headers.keys() {
        if name.trim().is_empty() {
            issues.push("provider.headers contains an empty header name".to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{load_tracker_config, FinnhubProviderConfig, FINNHUB_BASE_URL};
    use std::path::Path;

    #[test]
    fn validates_shipped_descriptors() {
        let root = Path::new(env!("CARGO_MANIFEST_DIR"));
        for name in ["backend", "finnhub"] {
            let config = load_tracker_config(root, name).expect("descriptor loads");
            validate_tracker_config(&config).expect("descriptor should be valid");
        }
    }

    #[test]
    fn rejects_non_http_base_url() {
        let mut config = TrackerConfig::builtin();
        if let ProviderConfig::Backend(cfg) = &mut config.provider {
            cfg.base_url = "ftp://quotes".to_string();
        }

        let err = validate_tracker_config(&config).expect_err("validation should fail");
        assert!(
            err.to_string().contains("must start with http"),
            "unexpected error message: {err}"
        );
    }

    #[test]
    fn aggregates_multiple_issues() {
        let mut config = TrackerConfig::builtin();
        config.provider = ProviderConfig::Finnhub(FinnhubProviderConfig {
            base_url: String::new(),
            token: " ".to_string(),
            headers: HashMap::from([(String::new(), "x".to_string())]),
        });

        let message = validate_tracker_config(&config)
            .expect_err("validation should fail")
            .to_string();
        assert!(message.contains("base_url must not be empty"), "{message}");
        assert!(message.contains("token must not be empty"), "{message}");
        assert!(message.contains("empty header name"), "{message}");
    }

    #[test]
    fn seconds_may_exceed_a_minute() {
        let mut config = TrackerConfig::builtin();
        config.refresh.minutes = 1;
        config.refresh.seconds = 90;
        validate_tracker_config(&config).expect("1m 90s is a valid refresh");
    }

    #[test]
    fn accepts_finnhub_defaults() {
        let mut config = TrackerConfig::builtin();
        config.provider = ProviderConfig::Finnhub(FinnhubProviderConfig {
            base_url: FINNHUB_BASE_URL.to_string(),
            token: "${FINNHUB_TOKEN}".to_string(),
            headers: HashMap::new(),
        });
        validate_tracker_config(&config).expect("finnhub defaults are valid");
    }
}
