//! Plugin configuration.
//!
//! The configuration is read once by the host when the plugin is enabled and
//! stays immutable for the lifetime of the process. Changing the token or the
//! API URL requires a restart.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default dashboard API base URL
pub const DEFAULT_API_URL: &str = "https://api.serverdashboard.me";

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_request_timeout() -> u64 {
    5
}

/// 100 host ticks at 20 ticks per second
fn default_sample_interval() -> u64 {
    5
}

fn default_worker_count() -> usize {
    num_cpus::get().clamp(1, 4)
}

fn default_queue_capacity() -> usize {
    256
}

fn default_shutdown_grace() -> u64 {
    3
}

/// Server Dashboard configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Access token issued by the dashboard for this server
    #[serde(default)]
    pub token: String,
    /// Base URL of the dashboard API
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Timeout applied to every outbound request, in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    /// Period of the main statistics sampler, in seconds
    #[serde(default = "default_sample_interval")]
    pub sample_interval_secs: u64,
    /// Number of background dispatch workers
    #[serde(default = "default_worker_count")]
    pub worker_count: usize,
    /// Maximum number of requests waiting for a worker
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
    /// How long shutdown waits for queued requests to drain, in seconds
    #[serde(default = "default_shutdown_grace")]
    pub shutdown_grace_secs: u64,
    /// Secret used to anonymize usernames. Derived from the token when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anonymization_secret: Option<String>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            api_url: default_api_url(),
            request_timeout_secs: default_request_timeout(),
            sample_interval_secs: default_sample_interval(),
            worker_count: default_worker_count(),
            queue_capacity: default_queue_capacity(),
            shutdown_grace_secs: default_shutdown_grace(),
            anonymization_secret: None,
        }
    }
}

impl DashboardConfig {
    /// Creates a configuration with the given token and API URL and default
    /// values for everything else.
    pub fn new(token: impl Into<String>, api_url: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            api_url: api_url.into(),
            ..Self::default()
        }
    }

    /// Checks the configuration for values the plugin cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.token.trim().is_empty() {
            return Err(ConfigError::MissingToken);
        }

        let url = self.api_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::InvalidApiUrl(self.api_url.clone()));
        }

        if self.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "request_timeout_secs",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.sample_interval_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "sample_interval_secs",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.worker_count == 0 {
            return Err(ConfigError::InvalidValue {
                field: "worker_count",
                reason: "at least one worker is required".to_string(),
            });
        }
        if self.queue_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                field: "queue_capacity",
                reason: "must be greater than zero".to_string(),
            });
        }

        Ok(())
    }

    /// The trimmed token.
    pub fn token(&self) -> &str {
        self.token.trim()
    }

    /// API base URL without surrounding whitespace or trailing slash.
    pub fn base_url(&self) -> &str {
        self.api_url.trim().trim_end_matches('/')
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn sample_interval(&self) -> Duration {
        Duration::from_secs(self.sample_interval_secs)
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DashboardConfig::default();

        assert!(config.token.is_empty());
        assert_eq!(config.api_url, "https://api.serverdashboard.me");
        assert_eq!(config.request_timeout_secs, 5);
        assert_eq!(config.sample_interval_secs, 5);
        assert!(config.worker_count >= 1 && config.worker_count <= 4);
        assert_eq!(config.queue_capacity, 256);
        assert!(config.anonymization_secret.is_none());
    }

    #[test]
    fn test_missing_token_rejected() {
        let config = DashboardConfig::new("   ", DEFAULT_API_URL);
        assert!(matches!(config.validate(), Err(ConfigError::MissingToken)));

        let config = DashboardConfig::default();
        assert!(matches!(config.validate(), Err(ConfigError::MissingToken)));
    }

    #[test]
    fn test_invalid_api_url_rejected() {
        let config = DashboardConfig::new("abc", "api.serverdashboard.me");
        assert!(matches!(config.validate(), Err(ConfigError::InvalidApiUrl(_))));
    }

    #[test]
    fn test_zero_values_rejected() {
        let mut config = DashboardConfig::new("abc", DEFAULT_API_URL);
        config.worker_count = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { field: "worker_count", .. })
        ));

        let mut config = DashboardConfig::new("abc", DEFAULT_API_URL);
        config.request_timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_base_url_normalized() {
        let config = DashboardConfig::new(" abc ", " http://localhost:8000/ ");
        assert!(config.validate().is_ok());
        assert_eq!(config.base_url(), "http://localhost:8000");
        assert_eq!(config.token(), "abc");
    }

    #[test]
    fn test_deserialize_partial() {
        let json = r#"{ "token": "secret" }"#;
        let config: DashboardConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.token, "secret");
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.sample_interval(), Duration::from_secs(5));
        assert!(config.validate().is_ok());
    }
}
