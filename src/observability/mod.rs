//! # Observability Infrastructure
//!
//! Structured logging for the control plane via the tracing ecosystem.
//! `RUST_LOG` takes precedence over the configured default filter, and the
//! JSON format is meant for shipping to the gateway's log server.

use tracing_subscriber::EnvFilter;

use crate::config::ObservabilityConfig;
use crate::errors::{Error, Result};

/// Initialize the global tracing subscriber. Safe to call once per process;
/// a second call reports a configuration error rather than panicking.
pub fn init_tracing(config: &ObservabilityConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .map_err(|e| Error::config(format!("invalid log filter: {}", e)))?;

    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);

    let result = if config.json_logs {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    result.map_err(|e| Error::config(format!("failed to install tracing subscriber: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_tracing_is_idempotent_enough() {
        let config = ObservabilityConfig::default();
        // First call may win or lose against other tests installing a
        // subscriber; either way the second call must not panic.
        let _ = init_tracing(&config);
        assert!(init_tracing(&config).is_err());
    }
}
