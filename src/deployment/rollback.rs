//! Rollback engine: restore a prior revision's content and deploy it as a
//! new revision. History only ever moves forward — rolling back to
//! revision N mints revision `max + 1` with N's content, so the audit
//! trail stays linear and strictly increasing.

use std::sync::Arc;

use tracing::info;

use crate::domain::RevisionMetadata;
use crate::errors::Result;
use crate::history::RevisionHistory;
use crate::store::ConfigStore;

use super::coordinator::DeploymentCoordinator;

pub struct RollbackEngine {
    store: Arc<ConfigStore>,
    history: Arc<RevisionHistory>,
    coordinator: Arc<DeploymentCoordinator>,
}

impl RollbackEngine {
    pub fn new(
        store: Arc<ConfigStore>,
        history: Arc<RevisionHistory>,
        coordinator: Arc<DeploymentCoordinator>,
    ) -> Self {
        Self { store, history, coordinator }
    }

    /// Copy revision `revision`'s snapshot into the working set and deploy
    /// it. The whole sequence runs under the single deployment lock so no
    /// other deploy can interleave between the seed and the commit.
    pub async fn rollback(&self, revision: u64, author: &str) -> Result<RevisionMetadata> {
        let guard = self.coordinator.begin()?;

        let target = self.history.get(revision).await?;
        self.store.replace(target.config).await?;

        let description = format!("rollback to revision {}", revision);
        let metadata = self.coordinator.deploy_locked(&guard, author, &description).await?;

        info!(
            source_revision = revision,
            new_revision = metadata.revision,
            operator = author,
            "rollback deployed"
        );
        Ok(metadata)
    }
}
