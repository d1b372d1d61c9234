//! Configuration for the dashboard host.
//!
//! Loaded from a TOML file with three tables: `[dashboard]` for the plugin,
//! `[host]` for the simulated server and `[logging]`.

use serde::{Deserialize, Serialize};
use server_dashboard::DashboardConfig;
use std::path::Path;
use tracing::info;

/// Default tick interval for serde deserialization
fn default_tick_interval() -> u64 {
    50 // 20 ticks per second
}

fn default_worlds() -> Vec<WorldSettings> {
    vec![WorldSettings {
        name: "world".to_string(),
        loaded_chunks: 0,
    }]
}

/// Application configuration loaded from TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Server Dashboard plugin settings
    #[serde(default)]
    pub dashboard: DashboardConfig,
    /// Simulated host server settings
    #[serde(default)]
    pub host: HostSettings,
    /// Logging configuration settings
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Simulated game server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostSettings {
    /// Server tick interval in milliseconds
    #[serde(default = "default_tick_interval")]
    pub tick_interval_ms: u64,
    /// Worlds loaded at startup
    #[serde(default = "default_worlds")]
    pub worlds: Vec<WorldSettings>,
}

/// One loaded world and its chunk count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldSettings {
    pub name: String,
    #[serde(default)]
    pub loaded_chunks: usize,
}

/// Logging system configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Log level filter (trace, debug, info, warn, error)
    pub level: String,
    /// Whether to output logs in JSON format
    pub json_format: bool,
}

impl Default for HostSettings {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval(),
            worlds: default_worlds(),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            dashboard: DashboardConfig::default(),
            host: HostSettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from a TOML file.
    ///
    /// If the file doesn't exist, writes the default configuration to `path`
    /// and returns it.
    pub async fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let content = tokio::fs::read_to_string(path).await?;
            let config: AppConfig = toml::from_str(&content)?;
            Ok(config)
        } else {
            let default_config = AppConfig::default();
            let toml_content = toml::to_string_pretty(&default_config)?;
            tokio::fs::write(path, toml_content).await?;
            info!("Created default configuration file: {}", path.display());
            Ok(default_config)
        }
    }

    /// Validates host-side settings.
    ///
    /// Dashboard settings are checked by the plugin itself at startup, where
    /// a bad token only disables the plugin instead of stopping the host.
    pub fn validate(&self) -> Result<(), String> {
        if self.host.tick_interval_ms == 0 {
            return Err("Host tick interval must be greater than zero".to_string());
        }

        for world in &self.host.worlds {
            if world.name.trim().is_empty() {
                return Err("World names cannot be empty".to_string());
            }
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(format!(
                "Invalid log level: {}. Must be one of: {valid_levels:?}",
                &self.logging.level
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::{tempdir, NamedTempFile};
    use tokio::fs;

    #[test]
    fn test_app_config_default() {
        let config = AppConfig::default();

        assert!(config.dashboard.token.is_empty());
        assert_eq!(config.dashboard.api_url, server_dashboard::DEFAULT_API_URL);
        assert_eq!(config.host.tick_interval_ms, 50);
        assert_eq!(config.host.worlds, default_worlds());
        assert_eq!(config.logging.level, "info");
        assert!(!config.logging.json_format);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation() {
        let mut config = AppConfig::default();
        config.logging.level = "verbose".to_string();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.host.tick_interval_ms = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.host.worlds.push(WorldSettings {
            name: " ".to_string(),
            loaded_chunks: 3,
        });
        assert!(config.validate().is_err());
    }

    #[tokio::test]
    async fn test_load_from_nonexistent_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("dashboard.toml");

        let config = AppConfig::load_from_file(&path).await.unwrap();
        assert_eq!(config.host.tick_interval_ms, 50);
        assert!(path.exists());

        // The written file loads back to the same values
        let reloaded = AppConfig::load_from_file(&path).await.unwrap();
        assert_eq!(reloaded.dashboard.api_url, config.dashboard.api_url);
        assert_eq!(reloaded.host.worlds, config.host.worlds);
    }

    #[tokio::test]
    async fn test_load_from_existing_file() {
        let toml_content = r#"
[dashboard]
token = "abc123"
api_url = "http://localhost:8000"
sample_interval_secs = 10
worker_count = 3

[host]
tick_interval_ms = 25

[[host.worlds]]
name = "world"
loaded_chunks = 120

[[host.worlds]]
name = "nether"
loaded_chunks = 8

[logging]
level = "debug"
json_format = true
"#;

        let temp_file = NamedTempFile::new().unwrap();
        fs::write(temp_file.path(), toml_content).await.unwrap();

        let config = AppConfig::load_from_file(temp_file.path()).await.unwrap();

        assert_eq!(config.dashboard.token, "abc123");
        assert_eq!(config.dashboard.api_url, "http://localhost:8000");
        assert_eq!(config.dashboard.sample_interval_secs, 10);
        assert_eq!(config.dashboard.worker_count, 3);
        assert_eq!(config.dashboard.request_timeout_secs, 5);
        assert!(config.dashboard.validate().is_ok());

        assert_eq!(config.host.tick_interval_ms, 25);
        assert_eq!(config.host.worlds.len(), 2);
        assert_eq!(config.host.worlds[1].name, "nether");
        assert_eq!(config.host.worlds[1].loaded_chunks, 8);

        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.json_format);
    }

    #[tokio::test]
    async fn test_load_invalid_toml() {
        let temp_file = NamedTempFile::new().unwrap();
        fs::write(temp_file.path(), "[dashboard\ntoken = ").await.unwrap();

        assert!(AppConfig::load_from_file(temp_file.path()).await.is_err());
    }
}
