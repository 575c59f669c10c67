//! Configuration lifecycle handlers: the two-phase edit-then-deploy model.
//! Saving (`PUT`) replaces the working set without validating it; only
//! `deploy` runs the validator and can mint a revision.

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use crate::domain::{Configuration, RevisionMetadata};
use crate::validation::{self, ValidationReport};

use super::super::error::ApiError;
use super::super::operator::Operator;
use super::super::routes::ApiState;

/// Working configuration plus deployment context
#[derive(Debug, Serialize)]
pub struct ConfigurationEnvelope {
    pub config: Configuration,
    /// Metadata of the active revision, absent before the first deploy
    pub active: Option<RevisionMetadata>,
    /// True when the working set differs from the active snapshot
    pub dirty: bool,
}

#[derive(Debug, Deserialize, Default)]
pub struct DeployBody {
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RollbackBody {
    pub revision: u64,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub history: Vec<RevisionMetadata>,
    pub total: usize,
}

async fn envelope(state: &ApiState) -> Result<ConfigurationEnvelope, ApiError> {
    let config = state.control.store.snapshot().await;
    let active = state.control.history.latest().await;

    let dirty = match &active {
        Some(metadata) => {
            let snapshot = state.control.history.get(metadata.revision).await?;
            snapshot.config != config
        }
        None => true,
    };

    Ok(ConfigurationEnvelope { config, active, dirty })
}

pub async fn get_configuration_handler(
    State(state): State<ApiState>,
) -> Result<Json<ConfigurationEnvelope>, ApiError> {
    Ok(Json(envelope(&state).await?))
}

pub async fn put_configuration_handler(
    State(state): State<ApiState>,
    Json(config): Json<Configuration>,
) -> Result<Json<ConfigurationEnvelope>, ApiError> {
    state.control.store.replace(config).await?;
    Ok(Json(envelope(&state).await?))
}

/// Validate a candidate configuration without mutating anything. With no
/// body (or a non-JSON body) the current working set is validated instead.
pub async fn validate_configuration_handler(
    State(state): State<ApiState>,
    candidate: Option<Json<Configuration>>,
) -> Json<ValidationReport> {
    let config = match candidate {
        Some(Json(config)) => config,
        None => state.control.store.snapshot().await,
    };
    Json(validation::validate(&config))
}

pub async fn deploy_configuration_handler(
    State(state): State<ApiState>,
    operator: Operator,
    body: Option<Json<DeployBody>>,
) -> Result<(StatusCode, Json<RevisionMetadata>), ApiError> {
    let description = body
        .and_then(|Json(body)| body.description)
        .unwrap_or_else(|| "deployed via API".to_string());

    let metadata = state.control.coordinator.deploy(&operator.0, &description).await?;
    Ok((StatusCode::CREATED, Json(metadata)))
}

pub async fn rollback_configuration_handler(
    State(state): State<ApiState>,
    operator: Operator,
    Json(body): Json<RollbackBody>,
) -> Result<(StatusCode, Json<RevisionMetadata>), ApiError> {
    let metadata = state.control.rollback.rollback(body.revision, &operator.0).await?;
    Ok((StatusCode::CREATED, Json(metadata)))
}

pub async fn configuration_history_handler(
    State(state): State<ApiState>,
) -> Json<HistoryResponse> {
    let history = state.control.history.list().await;
    let total = history.len();
    Json(HistoryResponse { history, total })
}
