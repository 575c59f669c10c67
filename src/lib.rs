//! # Gateplane
//!
//! Gateplane is the configuration control plane for a reverse-proxy
//! gateway. It owns the authoritative routing table (domains, per-path
//! device routes, access-control subnets, global options), enforces that
//! only validated configurations become active, and provides atomic
//! deployment and rollback across a bounded revision history.
//!
//! ## Architecture
//!
//! ```text
//! REST API Layer → Entity Store → Validator → Deployment Coordinator
//!       ↓               ↓                            ↓
//!  Operator identity  Persistence (atomic files)  Enforcement engine
//! ```
//!
//! ## Core Components
//!
//! - **Entity Store**: the mutable working configuration with per-entity
//!   invariants (`store`)
//! - **Validator**: whole-configuration checks, itemized verdicts
//!   (`validation`)
//! - **Version History**: append-only, bounded revision ledger (`history`)
//! - **Deployment Coordinator**: validate → commit → activate under one
//!   gateway-wide lock (`deployment`)
//! - **Rollback Engine**: re-deploy a prior revision as a new one
//!   (`deployment::rollback`)
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use gateplane::{api, AppConfig, ControlPlane, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = AppConfig::from_env()?;
//!     let control = Arc::new(ControlPlane::open(&config)?);
//!     api::start_api_server(&config.server, control).await
//! }
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod deployment;
pub mod domain;
pub mod enforcement;
pub mod errors;
pub mod history;
pub mod observability;
pub mod storage;
pub mod store;
pub mod validation;

use std::sync::Arc;

// Re-export commonly used types and traits
pub use config::AppConfig;
pub use errors::{Error, Result};
pub use observability::init_tracing;

/// Application version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name from Cargo.toml
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");

/// The assembled control plane: entity store, history, and the deployment
/// machinery wired over one data directory. Handles are explicit — state
/// lives here and is passed to operations, never held in ambient globals.
pub struct ControlPlane {
    pub store: Arc<store::ConfigStore>,
    pub history: Arc<history::RevisionHistory>,
    pub coordinator: Arc<deployment::DeploymentCoordinator>,
    pub rollback: Arc<deployment::RollbackEngine>,
}

impl ControlPlane {
    /// Open the control plane against the configured data directory,
    /// signaling the enforcement engine over its HTTP admin API.
    pub fn open(config: &AppConfig) -> Result<Self> {
        let engine = Arc::new(enforcement::HttpEnforcementClient::new(&config.engine)?);
        Self::open_with_engine(config, engine)
    }

    /// Open with a caller-supplied enforcement client; tests use this to
    /// substitute a recording or failing engine.
    pub fn open_with_engine(
        config: &AppConfig,
        engine: Arc<dyn enforcement::EnforcementClient>,
    ) -> Result<Self> {
        let data_dir = &config.storage.data_dir;
        storage::ensure_dir(data_dir)?;

        let store = Arc::new(store::ConfigStore::open(data_dir)?);
        let history = Arc::new(history::RevisionHistory::open(
            data_dir,
            config.storage.history_retention,
        )?);
        let coordinator = Arc::new(deployment::DeploymentCoordinator::new(
            store.clone(),
            history.clone(),
            engine,
            data_dir,
        ));
        let rollback = Arc::new(deployment::RollbackEngine::new(
            store.clone(),
            history.clone(),
            coordinator.clone(),
        ));

        Ok(Self { store, history, coordinator, rollback })
    }
}
