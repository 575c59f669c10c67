//! Deployment coordinator: the only component allowed to turn a working
//! configuration into an active revision.
//!
//! The cycle is `Idle → Validating → Committing → Idle`; validation
//! failure short-circuits back to `Idle` with nothing recorded, and an
//! activation failure after commit leaves the revision in history (it was
//! validated and recorded) while reporting `ActivationFailed` so the
//! operator knows the engine may still be serving the previous table.
//! History is the durable ledger of validated intent; activation is a
//! best-effort side channel, and the two are deliberately not coupled
//! transactionally — the entry is never rolled back on activation failure.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::domain::RevisionMetadata;
use crate::enforcement::EnforcementClient;
use crate::errors::{Error, Result};
use crate::history::RevisionHistory;
use crate::storage;
use crate::store::ConfigStore;
use crate::validation;

const ACTIVE_CONFIG_FILE: &str = "active.json";

/// Proof that the gateway-wide deployment lock is held. Obtained from
/// [`DeploymentCoordinator::begin`]; the rollback engine uses it to keep
/// its seed-then-deploy sequence under one lock acquisition.
#[derive(Debug)]
pub struct DeployGuard<'a> {
    _inner: MutexGuard<'a, ()>,
}

pub struct DeploymentCoordinator {
    store: Arc<ConfigStore>,
    history: Arc<RevisionHistory>,
    engine: Arc<dyn EnforcementClient>,
    active_config_path: PathBuf,
    lock: Mutex<()>,
}

impl DeploymentCoordinator {
    pub fn new(
        store: Arc<ConfigStore>,
        history: Arc<RevisionHistory>,
        engine: Arc<dyn EnforcementClient>,
        data_dir: &Path,
    ) -> Self {
        Self {
            store,
            history,
            engine,
            active_config_path: data_dir.join(ACTIVE_CONFIG_FILE),
            lock: Mutex::new(()),
        }
    }

    /// Acquire the exclusive deployment lock, failing fast with `Busy`
    /// when a deploy or rollback is already in flight. Callers never queue.
    pub fn begin(&self) -> Result<DeployGuard<'_>> {
        match self.lock.try_lock() {
            Ok(guard) => Ok(DeployGuard { _inner: guard }),
            Err(_) => Err(Error::Busy),
        }
    }

    /// Validate the working configuration and, on success, commit it as a
    /// new revision and signal the enforcement engine.
    pub async fn deploy(&self, author: &str, description: &str) -> Result<RevisionMetadata> {
        let guard = self.begin()?;
        self.deploy_locked(&guard, author, description).await
    }

    /// The validate → commit → activate cycle, run while `_guard` proves
    /// the deployment lock is held.
    pub async fn deploy_locked(
        &self,
        _guard: &DeployGuard<'_>,
        author: &str,
        description: &str,
    ) -> Result<RevisionMetadata> {
        let deploy_id = Uuid::new_v4();
        let snapshot = self.store.snapshot().await;

        let report = validation::validate(&snapshot);
        if !report.valid {
            warn!(
                %deploy_id,
                operator = author,
                error_count = report.errors.len(),
                "deployment rejected by validator"
            );
            return Err(Error::ValidationFailed { errors: report.errors });
        }

        let metadata = self.history.append(&snapshot, author, description).await?;

        // The file the enforcement engine reads; replaced atomically so it
        // never observes a half-written table.
        storage::atomic_write_json(&self.active_config_path, &snapshot)?;

        if let Err(err) = self.engine.activate(&snapshot).await {
            error!(
                %deploy_id,
                revision = metadata.revision,
                operator = author,
                error = %err,
                "revision committed but engine activation failed"
            );
            return Err(Error::ActivationFailed {
                revision: metadata.revision,
                reason: err.to_string(),
            });
        }

        info!(
            %deploy_id,
            revision = metadata.revision,
            operator = author,
            description,
            "configuration deployed and activated"
        );
        Ok(metadata)
    }
}
