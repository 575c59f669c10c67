//! Route CRUD handlers, nested under their owning domain. The path
//! segment of the identity key arrives URL-encoded; a bare segment like
//! `app` addresses the stored route `/app`.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::{Route, RouteEntry, RoutePatch};
use crate::errors::Error;

use super::super::error::ApiError;
use super::super::routes::ApiState;

fn default_path() -> String {
    "/".to_string()
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateRouteBody {
    #[serde(default = "default_path")]
    pub path: String,

    #[serde(rename = "deviceip", default)]
    pub device_ip: String,

    #[serde(rename = "port", default)]
    pub ports: Vec<u16>,

    #[validate(length(min = 1, message = "sitename is required"))]
    #[serde(rename = "sitename")]
    pub site_name: String,

    #[serde(rename = "ips", default)]
    pub allowed_ips: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct RouteListResponse {
    pub routes: Vec<RouteEntry>,
    pub total: usize,
}

pub async fn list_routes_handler(
    State(state): State<ApiState>,
    Path(domain): Path<String>,
) -> Json<RouteListResponse> {
    let routes = state.control.store.list_routes(Some(&domain)).await;
    let total = routes.len();
    Json(RouteListResponse { routes, total })
}

pub async fn get_route_handler(
    State(state): State<ApiState>,
    Path((domain, path)): Path<(String, String)>,
) -> Result<Json<RouteEntry>, ApiError> {
    let entry = state.control.store.get_route(&domain, &path).await?;
    Ok(Json(entry))
}

pub async fn create_route_handler(
    State(state): State<ApiState>,
    Path(domain): Path<String>,
    Json(payload): Json<CreateRouteBody>,
) -> Result<(StatusCode, Json<RouteEntry>), ApiError> {
    payload.validate().map_err(|err| ApiError::from(Error::from(err)))?;

    let route = Route {
        device_ip: payload.device_ip,
        ports: payload.ports,
        site_name: payload.site_name,
        allowed_ips: payload.allowed_ips,
    };
    let entry = state.control.store.add_route(&domain, &payload.path, route).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

pub async fn update_route_handler(
    State(state): State<ApiState>,
    Path((domain, path)): Path<(String, String)>,
    Json(patch): Json<RoutePatch>,
) -> Result<Json<RouteEntry>, ApiError> {
    let entry = state.control.store.update_route(&domain, &path, patch).await?;
    Ok(Json(entry))
}

pub async fn delete_route_handler(
    State(state): State<ApiState>,
    Path((domain, path)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    state.control.store.remove_route(&domain, &path).await?;
    Ok(StatusCode::NO_CONTENT)
}
