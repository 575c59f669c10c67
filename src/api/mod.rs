//! # REST API Layer
//!
//! Axum-based HTTP surface over the control plane: configuration
//! lifecycle (get/put/validate/deploy/rollback/history), domain and route
//! CRUD, settings, and health. Thin clients render these results; all
//! policy lives below this layer.

pub mod error;
pub mod handlers;
pub mod operator;
pub mod routes;
pub mod server;

pub use routes::{build_router, ApiState};
pub use server::start_api_server;
