//! Shared test support: a recording enforcement engine and control-plane
//! construction over a temporary data directory.

#![allow(dead_code)]

use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use gateplane::config::AppConfig;
use gateplane::domain::{Configuration, Route, ANY};
use gateplane::enforcement::EnforcementClient;
use gateplane::errors::Error;
use gateplane::ControlPlane;

/// Enforcement engine double: counts activations, optionally fails or
/// stalls to exercise the coordinator's failure and locking paths.
pub struct RecordingEngine {
    pub fail: AtomicBool,
    pub activations: AtomicUsize,
    pub delay: Option<Duration>,
}

impl RecordingEngine {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            fail: AtomicBool::new(false),
            activations: AtomicUsize::new(0),
            delay: None,
        })
    }

    pub fn stalling(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            fail: AtomicBool::new(false),
            activations: AtomicUsize::new(0),
            delay: Some(delay),
        })
    }

    pub fn activation_count(&self) -> usize {
        self.activations.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EnforcementClient for RecordingEngine {
    async fn activate(&self, _config: &Configuration) -> gateplane::Result<()> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail.load(Ordering::SeqCst) {
            return Err(Error::transport("engine down"));
        }
        self.activations.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

pub fn test_config(data_dir: &Path) -> AppConfig {
    let mut config = AppConfig::default();
    config.storage.data_dir = data_dir.to_path_buf();
    config
}

pub fn open_control(data_dir: &Path, engine: Arc<RecordingEngine>) -> ControlPlane {
    ControlPlane::open_with_engine(&test_config(data_dir), engine).unwrap()
}

pub fn sample_route() -> Route {
    Route {
        device_ip: "10.0.0.5".into(),
        ports: vec![8080],
        site_name: "app".into(),
        allowed_ips: vec![ANY.into()],
    }
}
