use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Top-level application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub tui: TuiConfig,
    pub upload: UploadConfig,
}

/// Remote service connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Base URL of the document-management service.
    pub base_url: String,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
}

/// TUI-specific configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TuiConfig {
    /// Tick interval in milliseconds for the event loop.
    pub tick_rate_ms: u64,
}

/// Upload status polling settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    /// Seconds between status probes for a processing upload.
    pub poll_interval_secs: u64,
    /// Wall-clock ceiling in seconds before a stuck upload is marked
    /// timed out and polling stops.
    pub poll_horizon_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            tui: TuiConfig::default(),
            upload: UploadConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            request_timeout_secs: 30,
        }
    }
}

impl Default for TuiConfig {
    fn default() -> Self {
        Self { tick_rate_ms: 50 }
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: 2,
            poll_horizon_secs: 120,
        }
    }
}

impl AppConfig {
    /// Load configuration from `~/.config/docdeck/config.toml`.
    /// Returns `Default` if the file is missing or unparseable.
    pub fn load() -> Self {
        let config_path = Self::config_path();
        match std::fs::read_to_string(&config_path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => {
                    log::info!("Loaded config from {}", config_path.display());
                    config
                }
                Err(e) => {
                    log::warn!(
                        "Failed to parse config at {}: {e} — using defaults",
                        config_path.display()
                    );
                    Self::default()
                }
            },
            Err(_) => {
                log::debug!(
                    "No config file at {} — using defaults",
                    config_path.display()
                );
                Self::default()
            }
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.server.request_timeout_secs)
    }

    pub fn tick_rate(&self) -> Duration {
        Duration::from_millis(self.tui.tick_rate_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.upload.poll_interval_secs)
    }

    pub fn poll_horizon(&self) -> Duration {
        Duration::from_secs(self.upload.poll_horizon_secs)
    }

    fn config_path() -> PathBuf {
        dirs::config_dir()
            .map(|d| d.join("docdeck").join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.base_url, "http://127.0.0.1:8000");
        assert_eq!(config.tui.tick_rate_ms, 50);
        assert_eq!(config.upload.poll_interval_secs, 2);
        assert_eq!(config.upload.poll_horizon_secs, 120);
    }

    #[test]
    fn test_duration_accessors() {
        let config = AppConfig::default();
        assert_eq!(config.poll_interval(), Duration::from_secs(2));
        assert_eq!(config.poll_horizon(), Duration::from_secs(120));
        assert_eq!(config.tick_rate(), Duration::from_millis(50));
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = AppConfig::default();
        let serialized = toml::to_string(&config).unwrap();
        let deserialized: AppConfig = toml::from_str(&serialized).unwrap();
        assert_eq!(deserialized.server.base_url, config.server.base_url);
        assert_eq!(
            deserialized.upload.poll_horizon_secs,
            config.upload.poll_horizon_secs
        );
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: AppConfig =
            toml::from_str("[server]\nbase_url = \"https://docs.example.com\"\n").unwrap();
        assert_eq!(config.server.base_url, "https://docs.example.com");
        assert_eq!(config.tui.tick_rate_ms, 50);
    }
}
