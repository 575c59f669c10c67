//! Domain CRUD handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::errors::Error;
use crate::store::DomainEntry;

use super::super::error::ApiError;
use super::super::routes::ApiState;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateDomainBody {
    #[validate(length(min = 1, message = "domain is required"))]
    pub domain: String,

    #[validate(length(min = 1, message = "subnet is required"))]
    pub subnet: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateDomainBody {
    #[validate(length(min = 1, message = "subnet is required"))]
    pub subnet: String,
}

#[derive(Debug, Serialize)]
pub struct DomainListResponse {
    pub domains: Vec<DomainEntry>,
    pub total: usize,
}

pub async fn list_domains_handler(State(state): State<ApiState>) -> Json<DomainListResponse> {
    let domains = state.control.store.list_domains().await;
    let total = domains.len();
    Json(DomainListResponse { domains, total })
}

pub async fn get_domain_handler(
    State(state): State<ApiState>,
    Path(name): Path<String>,
) -> Result<Json<DomainEntry>, ApiError> {
    let entry = state.control.store.get_domain(&name).await?;
    Ok(Json(entry))
}

pub async fn create_domain_handler(
    State(state): State<ApiState>,
    Json(payload): Json<CreateDomainBody>,
) -> Result<(StatusCode, Json<DomainEntry>), ApiError> {
    payload.validate().map_err(|err| ApiError::from(Error::from(err)))?;

    let entry = state.control.store.add_domain(&payload.domain, &payload.subnet).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

pub async fn update_domain_handler(
    State(state): State<ApiState>,
    Path(name): Path<String>,
    Json(payload): Json<UpdateDomainBody>,
) -> Result<Json<DomainEntry>, ApiError> {
    payload.validate().map_err(|err| ApiError::from(Error::from(err)))?;

    let entry = state.control.store.update_domain(&name, &payload.subnet).await?;
    Ok(Json(entry))
}

pub async fn delete_domain_handler(
    State(state): State<ApiState>,
    Path(name): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.control.store.remove_domain(&name).await?;
    Ok(StatusCode::NO_CONTENT)
}
