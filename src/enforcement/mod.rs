//! # Enforcement Engine Client
//!
//! The signal that turns a committed revision into live routing: a single
//! blocking `activate` call against the proxy engine's admin API, bounded
//! by the configured timeout. Any non-success (engine unreachable, engine
//! rejects, timeout) is a transport error; the deployment coordinator
//! reports it as `ActivationFailed` and never retries here.

use async_trait::async_trait;
use tracing::debug;

use crate::config::EngineConfig;
use crate::domain::Configuration;
use crate::errors::{Error, Result};

/// Abstraction over the external process that proxies traffic according to
/// the active configuration.
#[async_trait]
pub trait EnforcementClient: Send + Sync {
    /// Push a configuration snapshot to the engine and wait for it to be
    /// acknowledged.
    async fn activate(&self, config: &Configuration) -> Result<()>;
}

/// HTTP client for the engine's admin API (`POST <endpoint>/load`).
pub struct HttpEnforcementClient {
    endpoint: String,
    client: reqwest::Client,
}

impl HttpEnforcementClient {
    pub fn new(config: &EngineConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.activation_timeout())
            .build()
            .map_err(|e| Error::config(format!("building enforcement client: {}", e)))?;

        Ok(Self {
            endpoint: config.admin_endpoint.trim_end_matches('/').to_string(),
            client,
        })
    }
}

#[async_trait]
impl EnforcementClient for HttpEnforcementClient {
    async fn activate(&self, config: &Configuration) -> Result<()> {
        let url = format!("{}/load", self.endpoint);
        debug!(url = %url, "signaling enforcement engine");

        let response = self
            .client
            .post(&url)
            .json(config)
            .send()
            .await
            .map_err(|e| Error::transport(format!("engine unreachable: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::transport(format!(
                "engine rejected configuration with status {}: {}",
                status,
                body.trim()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_trailing_slash_is_trimmed() {
        let config = EngineConfig {
            admin_endpoint: "http://127.0.0.1:2019/".to_string(),
            activation_timeout_secs: 5,
        };
        let client = HttpEnforcementClient::new(&config).unwrap();
        assert_eq!(client.endpoint, "http://127.0.0.1:2019");
    }

    #[tokio::test]
    async fn test_unreachable_engine_is_transport_error() {
        // Reserved TEST-NET-1 address, nothing listens there
        let config = EngineConfig {
            admin_endpoint: "http://192.0.2.1:2019".to_string(),
            activation_timeout_secs: 1,
        };
        let client = HttpEnforcementClient::new(&config).unwrap();
        let err = client.activate(&Configuration::default()).await.unwrap_err();
        assert!(matches!(err, Error::Transport(_)));
    }
}
