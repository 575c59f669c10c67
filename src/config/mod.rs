//! # Configuration Management
//!
//! Process configuration for the Gateplane control plane, loaded from
//! environment variables (a `.env` file is honored by the binary before
//! anything reads the environment). Everything has a sensible default so a
//! bare `gateplane serve` works on a development box.

use std::path::PathBuf;
use std::time::Duration;

use crate::errors::{Error, Result};

fn env_parsed<T: std::str::FromStr>(key: &str, default: T) -> Result<T> {
    match std::env::var(key) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| Error::config(format!("invalid value for {}: '{}'", key, raw))),
        Err(_) => Ok(default),
    }
}

/// Main application configuration
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub engine: EngineConfig,
    pub observability: ObservabilityConfig,
}

impl AppConfig {
    /// Load the full configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let config = Self {
            server: ServerConfig::from_env()?,
            storage: StorageConfig::from_env()?,
            engine: EngineConfig::from_env()?,
            observability: ObservabilityConfig::from_env(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Cross-field validation beyond per-value parsing.
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(Error::config("API port must be non-zero"));
        }
        if self.storage.history_retention == 0 {
            return Err(Error::config("history retention must be at least 1"));
        }
        url::Url::parse(&self.engine.admin_endpoint).map_err(|e| {
            Error::config(format!(
                "invalid enforcement engine endpoint '{}': {}",
                self.engine.admin_endpoint, e
            ))
        })?;
        if self.engine.activation_timeout_secs == 0 || self.engine.activation_timeout_secs > 300 {
            return Err(Error::config("activation timeout must be between 1 and 300 seconds"));
        }
        Ok(())
    }
}

/// HTTP API server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind_address: "127.0.0.1".to_string(), port: 8080 }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            bind_address: std::env::var("GATEPLANE_API_BIND")
                .unwrap_or(defaults.bind_address),
            port: env_parsed("GATEPLANE_API_PORT", defaults.port)?,
        })
    }

    /// Socket address string for binding.
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}

/// Durable state configuration
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Directory holding the working configuration, the active snapshot,
    /// and the revision history
    pub data_dir: PathBuf,

    /// How many revisions history retains before evicting oldest-first
    pub history_retention: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { data_dir: PathBuf::from("data"), history_retention: 5 }
    }
}

impl StorageConfig {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            data_dir: std::env::var("GATEPLANE_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            history_retention: env_parsed(
                "GATEPLANE_HISTORY_RETENTION",
                defaults.history_retention,
            )?,
        })
    }
}

/// Enforcement-engine admin API configuration
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Base URL of the engine's admin API
    pub admin_endpoint: String,

    /// Upper bound on the blocking activation call
    pub activation_timeout_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            admin_endpoint: "http://127.0.0.1:2019".to_string(),
            activation_timeout_secs: 10,
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            admin_endpoint: std::env::var("GATEPLANE_ENGINE_ENDPOINT")
                .unwrap_or(defaults.admin_endpoint),
            activation_timeout_secs: env_parsed(
                "GATEPLANE_ENGINE_TIMEOUT_SECS",
                defaults.activation_timeout_secs,
            )?,
        })
    }

    pub fn activation_timeout(&self) -> Duration {
        Duration::from_secs(self.activation_timeout_secs)
    }
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    /// Default tracing filter when RUST_LOG is unset
    pub log_level: String,

    /// Emit JSON log lines instead of the human-readable format
    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self { log_level: "info".to_string(), json_logs: false }
    }
}

impl ObservabilityConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            log_level: std::env::var("GATEPLANE_LOG_LEVEL").unwrap_or(defaults.log_level),
            json_logs: std::env::var("GATEPLANE_LOG_FORMAT")
                .map(|v| v.eq_ignore_ascii_case("json"))
                .unwrap_or(defaults.json_logs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.server.socket_addr(), "127.0.0.1:8080");
        assert_eq!(config.storage.history_retention, 5);
        assert_eq!(config.engine.admin_endpoint, "http://127.0.0.1:2019");
        assert_eq!(config.engine.activation_timeout(), Duration::from_secs(10));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = AppConfig::default();
        config.storage.history_retention = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.engine.admin_endpoint = "not a url".to_string();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.engine.activation_timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    // Environment mutation is process-wide, so everything touching env
    // vars lives in one test.
    #[test]
    fn test_from_env_overrides_and_parse_failures() {
        std::env::set_var("GATEPLANE_API_PORT", "9090");
        std::env::set_var("GATEPLANE_HISTORY_RETENTION", "8");

        let config = AppConfig::from_env().unwrap();
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.storage.history_retention, 8);

        std::env::set_var("GATEPLANE_ENGINE_TIMEOUT_SECS", "soon");
        assert!(EngineConfig::from_env().is_err());

        std::env::remove_var("GATEPLANE_API_PORT");
        std::env::remove_var("GATEPLANE_HISTORY_RETENTION");
        std::env::remove_var("GATEPLANE_ENGINE_TIMEOUT_SECS");
    }
}
