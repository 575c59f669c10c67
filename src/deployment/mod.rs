//! # Deployment
//!
//! Atomic transitions between configuration versions: the coordinator
//! drives validate → commit → activate under a gateway-wide exclusive
//! lock, and the rollback engine re-seeds the working set from history
//! before running the same cycle.

pub mod coordinator;
pub mod rollback;

pub use coordinator::DeploymentCoordinator;
pub use rollback::RollbackEngine;
