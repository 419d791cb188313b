//! Runtime settings endpoints.
//!
//! GET returns the current dynamic configuration as a key-value map (the
//! client secret is masked). PUT applies a partial update and hot-swaps
//! the config without a restart.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::ServiceResult;

use super::AppState;

#[derive(Serialize)]
pub struct SettingsResponse {
    pub settings: HashMap<String, serde_json::Value>,
}

#[derive(Deserialize)]
pub struct UpdateSettingsRequest {
    pub settings: HashMap<String, serde_json::Value>,
}

/// Get current settings
pub async fn get_settings_handler(
    State(state): State<Arc<AppState>>,
) -> ServiceResult<Json<SettingsResponse>> {
    let settings = state.service.config.dynamic().to_key_value_map();
    Ok(Json(SettingsResponse { settings }))
}

/// Apply a partial settings update
pub async fn update_settings_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<UpdateSettingsRequest>,
) -> ServiceResult<Json<SettingsResponse>> {
    let updated = state.service.apply_settings(&request.settings).await?;
    Ok(Json(SettingsResponse {
        settings: updated.to_key_value_map(),
    }))
}
