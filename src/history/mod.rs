//! # Version History
//!
//! Append-only, bounded ledger of deployed configurations. Every revision
//! lives in its own immutable `history/revision_<n>.json` file; eviction
//! beyond the retention count removes the oldest files and never reorders
//! or rewrites anything. Revision numbers are `max(existing) + 1`, which
//! stays gap-free because eviction only ever drops the oldest entries.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::domain::{Configuration, Revision, RevisionMetadata};
use crate::errors::{Error, Result};
use crate::storage;

const HISTORY_DIR: &str = "history";
const ACTIVE_POINTER_FILE: &str = "active_revision.json";
const REVISION_PREFIX: &str = "revision_";

#[derive(Debug, Serialize, Deserialize)]
struct ActivePointer {
    revision: u64,
}

struct HistoryIndex {
    /// Metadata for every retained revision, keyed by revision number
    revisions: BTreeMap<u64, RevisionMetadata>,
    /// The revision the enforcement engine was last pointed at
    active: Option<u64>,
}

/// File-backed revision history with FIFO eviction beyond `retain`.
pub struct RevisionHistory {
    dir: PathBuf,
    active_path: PathBuf,
    retain: usize,
    index: RwLock<HistoryIndex>,
}

impl RevisionHistory {
    /// Open the history, rescanning the history directory so retained
    /// revisions survive process restart.
    pub fn open(data_dir: &Path, retain: usize) -> Result<Self> {
        let dir = data_dir.join(HISTORY_DIR);
        storage::ensure_dir(&dir)?;

        let mut revisions = BTreeMap::new();
        for entry in
            fs::read_dir(&dir).map_err(|e| Error::io(e, format!("scanning {}", dir.display())))?
        {
            let entry = entry.map_err(|e| Error::io(e, "reading history directory entry"))?;
            let Some(number) = parse_revision_file_name(&entry.file_name().to_string_lossy())
            else {
                continue;
            };
            match storage::read_json::<Revision>(&entry.path()) {
                Ok(revision) => {
                    revisions.insert(number, revision.metadata);
                }
                Err(err) => {
                    warn!(
                        file = %entry.path().display(),
                        error = %err,
                        "skipping unreadable revision file"
                    );
                }
            }
        }

        let active_path = data_dir.join(ACTIVE_POINTER_FILE);
        let active = if active_path.exists() {
            let pointer: ActivePointer = storage::read_json(&active_path)?;
            if revisions.contains_key(&pointer.revision) {
                Some(pointer.revision)
            } else {
                warn!(revision = pointer.revision, "active pointer references an evicted revision");
                None
            }
        } else {
            None
        };

        Ok(Self {
            dir,
            active_path,
            retain,
            index: RwLock::new(HistoryIndex { revisions, active }),
        })
    }

    /// Freeze a snapshot into the next revision, mark it active, and prune
    /// beyond the retention count. Pruning runs synchronously here.
    pub async fn append(
        &self,
        config: &Configuration,
        author: &str,
        description: &str,
    ) -> Result<RevisionMetadata> {
        let mut index = self.index.write().await;

        let next = index.revisions.keys().next_back().map_or(1, |max| max + 1);
        let metadata = RevisionMetadata {
            revision: next,
            updated_at: Utc::now(),
            updated_by: author.to_string(),
            description: description.to_string(),
        };
        let revision = Revision { metadata: metadata.clone(), config: config.clone() };

        storage::atomic_write_json(&self.revision_path(next), &revision)?;
        index.revisions.insert(next, metadata.clone());

        storage::atomic_write_json(&self.active_path, &ActivePointer { revision: next })?;
        index.active = Some(next);

        while index.revisions.len() > self.retain {
            if let Some((oldest, _)) = index.revisions.pop_first() {
                let path = self.revision_path(oldest);
                if let Err(err) = fs::remove_file(&path) {
                    warn!(revision = oldest, error = %err, "failed to evict revision file");
                }
                info!(revision = oldest, "evicted oldest revision beyond retention");
            }
        }

        Ok(metadata)
    }

    /// Fetch a retained revision's full snapshot.
    pub async fn get(&self, revision: u64) -> Result<Revision> {
        let index = self.index.read().await;
        if !index.revisions.contains_key(&revision) {
            return Err(Error::not_found("revision", revision.to_string()));
        }
        storage::read_json(&self.revision_path(revision))
    }

    /// Metadata for all retained revisions, newest first.
    pub async fn list(&self) -> Vec<RevisionMetadata> {
        let index = self.index.read().await;
        index.revisions.values().rev().cloned().collect()
    }

    /// Metadata of the currently active revision, or `None` before the
    /// first deployment.
    pub async fn latest(&self) -> Option<RevisionMetadata> {
        let index = self.index.read().await;
        index.active.and_then(|n| index.revisions.get(&n).cloned())
    }

    /// Number of retained revisions.
    pub async fn len(&self) -> usize {
        self.index.read().await.revisions.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn revision_path(&self, revision: u64) -> PathBuf {
        self.dir.join(format!("{}{:06}.json", REVISION_PREFIX, revision))
    }
}

fn parse_revision_file_name(name: &str) -> Option<u64> {
    name.strip_prefix(REVISION_PREFIX)?.strip_suffix(".json")?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_tagged(tag: &str) -> Configuration {
        let mut config = Configuration::default();
        config.domains.insert(format!("{}.example", tag), "10.0.0.0/8".into());
        config
    }

    #[tokio::test]
    async fn test_revision_numbers_start_at_one_and_increase() {
        let dir = tempfile::tempdir().unwrap();
        let history = RevisionHistory::open(dir.path(), 5).unwrap();
        assert!(history.is_empty().await);
        assert!(history.latest().await.is_none());

        let first = history.append(&config_tagged("a"), "alice", "initial").await.unwrap();
        let second = history.append(&config_tagged("b"), "bob", "second").await.unwrap();
        assert_eq!(first.revision, 1);
        assert_eq!(second.revision, 2);
        assert_eq!(history.latest().await.unwrap().revision, 2);
    }

    #[tokio::test]
    async fn test_get_returns_the_frozen_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let history = RevisionHistory::open(dir.path(), 5).unwrap();

        let config = config_tagged("a");
        history.append(&config, "alice", "initial").await.unwrap();

        let revision = history.get(1).await.unwrap();
        assert_eq!(revision.config, config);
        assert_eq!(revision.metadata.updated_by, "alice");

        let err = history.get(42).await.unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_fifo_eviction_beyond_retention() {
        let dir = tempfile::tempdir().unwrap();
        let history = RevisionHistory::open(dir.path(), 3).unwrap();

        for i in 0..5 {
            history.append(&config_tagged(&format!("c{}", i)), "op", "loop").await.unwrap();
        }

        assert_eq!(history.len().await, 3);
        let retained: Vec<u64> =
            history.list().await.iter().map(|m| m.revision).collect();
        assert_eq!(retained, vec![5, 4, 3]);
        assert!(matches!(history.get(1).await.unwrap_err(), Error::NotFound { .. }));

        // Numbering keeps counting past evicted entries
        let next = history.append(&config_tagged("c5"), "op", "loop").await.unwrap();
        assert_eq!(next.revision, 6);
    }

    #[tokio::test]
    async fn test_list_is_newest_first() {
        let dir = tempfile::tempdir().unwrap();
        let history = RevisionHistory::open(dir.path(), 5).unwrap();
        for i in 0..3 {
            history.append(&config_tagged(&format!("c{}", i)), "op", "loop").await.unwrap();
        }
        let listed: Vec<u64> = history.list().await.iter().map(|m| m.revision).collect();
        assert_eq!(listed, vec![3, 2, 1]);
    }

    #[tokio::test]
    async fn test_history_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let history = RevisionHistory::open(dir.path(), 5).unwrap();
            history.append(&config_tagged("a"), "alice", "one").await.unwrap();
            history.append(&config_tagged("b"), "alice", "two").await.unwrap();
        }

        let reopened = RevisionHistory::open(dir.path(), 5).unwrap();
        assert_eq!(reopened.len().await, 2);
        assert_eq!(reopened.latest().await.unwrap().revision, 2);
        assert_eq!(reopened.get(1).await.unwrap().config, config_tagged("a"));

        // Numbering continues from the recovered maximum
        let next = reopened.append(&config_tagged("c"), "alice", "three").await.unwrap();
        assert_eq!(next.revision, 3);
    }
}
