//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All optional:
//! - `LECAS_API_BASE_URL` - Backend base URL (default: `http://localhost:8000`)
//! - `LECAS_STATE_PATH` - JSON state file for cart, wishlist and session
//!   (default: `.lecas/state.json`)
//! - `LECAS_REFRESH_INTERVAL_SECS` - Seconds between token checks (default: 60)
//! - `LECAS_REFRESH_THRESHOLD_SECS` - Remaining token lifetime that triggers a
//!   refresh (default: 120)
//! - `LECAS_HTTP_TIMEOUT_SECS` - Per-request timeout (default: 15)

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";
const DEFAULT_STATE_PATH: &str = ".lecas/state.json";
const DEFAULT_REFRESH_INTERVAL_SECS: &str = "60";
const DEFAULT_REFRESH_THRESHOLD_SECS: &str = "120";
const DEFAULT_HTTP_TIMEOUT_SECS: &str = "15";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend base URL
    pub api_base_url: Url,
    /// Location of the persisted state file
    pub state_path: PathBuf,
    /// Time between token refresh checks
    pub refresh_interval: Duration,
    /// Remaining token lifetime that triggers a refresh
    pub refresh_threshold: Duration,
    /// Per-request HTTP timeout
    pub http_timeout: Duration,
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        Ok(Self {
            api_base_url: parse_base_url(
                "LECAS_API_BASE_URL",
                &get("LECAS_API_BASE_URL", DEFAULT_API_BASE_URL),
            )?,
            state_path: PathBuf::from(get("LECAS_STATE_PATH", DEFAULT_STATE_PATH)),
            refresh_interval: parse_positive_secs(
                "LECAS_REFRESH_INTERVAL_SECS",
                &get("LECAS_REFRESH_INTERVAL_SECS", DEFAULT_REFRESH_INTERVAL_SECS),
            )?,
            refresh_threshold: parse_secs(
                "LECAS_REFRESH_THRESHOLD_SECS",
                &get("LECAS_REFRESH_THRESHOLD_SECS", DEFAULT_REFRESH_THRESHOLD_SECS),
            )?,
            http_timeout: parse_positive_secs(
                "LECAS_HTTP_TIMEOUT_SECS",
                &get("LECAS_HTTP_TIMEOUT_SECS", DEFAULT_HTTP_TIMEOUT_SECS),
            )?,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse an `http`/`https` base URL.
fn parse_base_url(key: &str, value: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value.trim())
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme {}", url.scheme()),
        ));
    }
    Ok(url)
}

/// Parse a whole number of seconds.
fn parse_secs(key: &str, value: &str) -> Result<Duration, ConfigError> {
    value
        .trim()
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Parse a whole number of seconds that must be non-zero.
fn parse_positive_secs(key: &str, value: &str) -> Result<Duration, ConfigError> {
    let secs = parse_secs(key, value)?;
    if secs.is_zero() {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "must be greater than 0".to_string(),
        ));
    }
    Ok(secs)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn test_parse_base_url() {
        let url = parse_base_url("K", "https://api.lecas.vn").unwrap();
        assert_eq!(url.host_str(), Some("api.lecas.vn"));

        assert!(parse_base_url("K", "not a url").is_err());
        assert!(parse_base_url("K", "ftp://files.lecas.vn").is_err());
    }

    #[test]
    fn test_parse_secs() {
        assert_eq!(parse_secs("K", " 90 ").unwrap(), Duration::from_secs(90));
        assert_eq!(parse_secs("K", "0").unwrap(), Duration::ZERO);
        assert!(parse_secs("K", "-5").is_err());
        assert!(parse_secs("K", "1.5").is_err());
    }

    #[test]
    fn test_parse_positive_secs_rejects_zero() {
        let err = parse_positive_secs("LECAS_REFRESH_INTERVAL_SECS", "0").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid environment variable LECAS_REFRESH_INTERVAL_SECS: must be greater than 0"
        );
    }

    #[test]
    fn test_defaults_match_refresh_contract() {
        let config = ClientConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config.refresh_interval, Duration::from_secs(60));
        assert_eq!(config.refresh_threshold, Duration::from_secs(120));
        assert_eq!(config.http_timeout, Duration::from_secs(15));
        assert_eq!(config.api_base_url.as_str(), "http://localhost:8000/");
        assert_eq!(config.state_path, PathBuf::from(".lecas/state.json"));
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("LECAS_API_BASE_URL", "https://api.lecas.vn"),
            ("LECAS_STATE_PATH", "/tmp/lecas.json"),
            ("LECAS_REFRESH_INTERVAL_SECS", "30"),
        ]);
        let config = ClientConfig::from_lookup(|key| vars.get(key).map(ToString::to_string)).unwrap();

        assert_eq!(config.api_base_url.host_str(), Some("api.lecas.vn"));
        assert_eq!(config.state_path, PathBuf::from("/tmp/lecas.json"));
        assert_eq!(config.refresh_interval, Duration::from_secs(30));
        assert_eq!(config.refresh_threshold, Duration::from_secs(120));
    }

    #[test]
    fn test_invalid_override_names_variable() {
        let err = ClientConfig::from_lookup(|key| {
            (key == "LECAS_HTTP_TIMEOUT_SECS").then(|| "soon".to_string())
        })
        .unwrap_err();
        assert!(err.to_string().contains("LECAS_HTTP_TIMEOUT_SECS"));
    }
}
