//! Global settings handlers. Like entity edits, saving settings does not
//! validate them; bounds are enforced by the validator at deploy time.

use axum::{extract::State, Json};

use crate::domain::Settings;

use super::super::error::ApiError;
use super::super::routes::ApiState;

pub async fn get_settings_handler(State(state): State<ApiState>) -> Json<Settings> {
    Json(state.control.store.settings().await)
}

pub async fn update_settings_handler(
    State(state): State<ApiState>,
    Json(settings): Json<Settings>,
) -> Result<Json<Settings>, ApiError> {
    let stored = state.control.store.update_settings(settings).await?;
    Ok(Json(stored))
}
