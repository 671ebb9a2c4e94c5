//! Client configuration module.
//!
//! Handles loading configuration from environment variables. Missing required
//! values are reported as a typed error before any network call is made.

use reqwest::Url;
use std::time::Duration;
use thiserror::Error;

/// Environment variable holding the API token.
pub const API_TOKEN_VAR: &str = "API_TOKEN";
/// Environment variable holding the API base URL.
pub const API_URL_VAR: &str = "API_URL";
/// Environment variable disabling TLS certificate verification.
pub const API_INSECURE_VAR: &str = "API_INSECURE";
/// Environment variable holding the request timeout in seconds.
pub const API_TIMEOUT_VAR: &str = "API_TIMEOUT_SECS";

/// Request timeout used when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required variable is unset or empty.
    #[error("{0} environment variable must be set")]
    Missing(&'static str),

    /// A variable is set but its value is unusable.
    #[error("Invalid value for {var}: {reason}")]
    Invalid {
        /// The offending variable.
        var: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
}

/// Monitoring API client configuration.
///
/// Configuration values are read from environment variables:
/// - `API_TOKEN`: API token (required)
/// - `API_URL`: base URL of the API (required)
/// - `API_INSECURE`: skip TLS certificate verification (default: false)
/// - `API_TIMEOUT_SECS`: request timeout in seconds (default: 30)
#[derive(Clone)]
pub struct Config {
    /// The API token.
    pub api_token: String,
    /// The API base URL.
    pub api_url: Url,
    /// Whether TLS certificate verification is skipped.
    pub insecure: bool,
    /// Timeout for the outbound request.
    pub timeout: Duration,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_token", &"<redacted>")
            .field("api_url", &self.api_url.as_str())
            .field("insecure", &self.insecure)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Config {
    /// Creates a new configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `API_TOKEN` or `API_URL` is unset or empty
    /// - `API_URL` is not an absolute http(s) URL
    /// - `API_INSECURE` or `API_TIMEOUT_SECS` is set but cannot be parsed
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Creates a new configuration using `lookup` to resolve variable names.
    ///
    /// # Errors
    ///
    /// Same as [`Config::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_token = required(&lookup, API_TOKEN_VAR)?;
        let api_url = parse_url(&required(&lookup, API_URL_VAR)?)?;

        let insecure = lookup(API_INSECURE_VAR)
            .map(|v| parse_bool(API_INSECURE_VAR, &v))
            .transpose()?
            .unwrap_or(false);

        let timeout = lookup(API_TIMEOUT_VAR)
            .map(|v| parse_timeout(&v))
            .transpose()?
            .unwrap_or(DEFAULT_TIMEOUT);

        Ok(Self {
            api_token,
            api_url,
            insecure,
            timeout,
        })
    }

    /// Sets whether TLS certificate verification is skipped.
    #[must_use]
    pub fn with_insecure(mut self, insecure: bool) -> Self {
        self.insecure = insecure;
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

fn required<F>(lookup: &F, var: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(var)
        .filter(|v| !v.trim().is_empty())
        .ok_or(ConfigError::Missing(var))
}

fn parse_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim()).map_err(|e| ConfigError::Invalid {
        var: API_URL_VAR,
        reason: e.to_string(),
    })?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::Invalid {
            var: API_URL_VAR,
            reason: format!("unsupported scheme '{other}'"),
        }),
    }
}

fn parse_bool(var: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "" | "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::Invalid {
            var,
            reason: format!("expected a boolean, got '{other}'"),
        }),
    }
}

fn parse_timeout(raw: &str) -> Result<Duration, ConfigError> {
    let secs = raw.trim().parse::<u64>().map_err(|e| ConfigError::Invalid {
        var: API_TIMEOUT_VAR,
        reason: e.to_string(),
    })?;
    if secs == 0 {
        return Err(ConfigError::Invalid {
            var: API_TIMEOUT_VAR,
            reason: "timeout must be greater than zero".to_string(),
        });
    }
    Ok(Duration::from_secs(secs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn test_config_required_only() {
        let config = Config::from_lookup(lookup(&[
            ("API_TOKEN", "token"),
            ("API_URL", "https://example.instana.io"),
        ]))
        .unwrap();

        assert_eq!(config.api_token, "token");
        assert_eq!(config.api_url.host_str(), Some("example.instana.io"));
        assert!(!config.insecure);
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
    }

    #[test]
    fn test_config_missing_token() {
        let result = Config::from_lookup(lookup(&[("API_URL", "https://example.com")]));
        assert!(matches!(result, Err(ConfigError::Missing(API_TOKEN_VAR))));
    }

    #[test]
    fn test_config_missing_url() {
        let result = Config::from_lookup(lookup(&[("API_TOKEN", "token")]));
        assert!(matches!(result, Err(ConfigError::Missing(API_URL_VAR))));
    }

    #[test]
    fn test_config_empty_counts_as_missing() {
        let result = Config::from_lookup(lookup(&[("API_TOKEN", "  "), ("API_URL", "https://x")]));
        assert!(matches!(result, Err(ConfigError::Missing(API_TOKEN_VAR))));
    }

    #[test]
    fn test_config_invalid_url() {
        let result = Config::from_lookup(lookup(&[("API_TOKEN", "t"), ("API_URL", "not a url")]));
        assert!(matches!(
            result,
            Err(ConfigError::Invalid { var: API_URL_VAR, .. })
        ));

        let result =
            Config::from_lookup(lookup(&[("API_TOKEN", "t"), ("API_URL", "ftp://example.com")]));
        assert!(matches!(
            result,
            Err(ConfigError::Invalid { var: API_URL_VAR, .. })
        ));
    }

    #[test]
    fn test_config_optional_values() {
        let config = Config::from_lookup(lookup(&[
            ("API_TOKEN", "t"),
            ("API_URL", "https://example.com"),
            ("API_INSECURE", "TRUE"),
            ("API_TIMEOUT_SECS", "5"),
        ]))
        .unwrap();

        assert!(config.insecure);
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_config_invalid_optional_values() {
        let result = Config::from_lookup(lookup(&[
            ("API_TOKEN", "t"),
            ("API_URL", "https://example.com"),
            ("API_INSECURE", "maybe"),
        ]));
        assert!(matches!(
            result,
            Err(ConfigError::Invalid { var: API_INSECURE_VAR, .. })
        ));

        let result = Config::from_lookup(lookup(&[
            ("API_TOKEN", "t"),
            ("API_URL", "https://example.com"),
            ("API_TIMEOUT_SECS", "0"),
        ]));
        assert!(matches!(
            result,
            Err(ConfigError::Invalid { var: API_TIMEOUT_VAR, .. })
        ));
    }

    #[test]
    fn test_config_overrides() {
        let config = Config::from_lookup(lookup(&[("API_TOKEN", "t"), ("API_URL", "https://x.io")]))
            .unwrap()
            .with_insecure(true)
            .with_timeout(Duration::from_secs(2));

        assert!(config.insecure);
        assert_eq!(config.timeout, Duration::from_secs(2));
    }

    #[test]
    fn test_config_debug_redacts_token() {
        let config = Config::from_lookup(lookup(&[
            ("API_TOKEN", "super-secret"),
            ("API_URL", "https://x.io"),
        ]))
        .unwrap();
        assert!(!format!("{config:?}").contains("super-secret"));
    }
}
