//! Character listing and lookup endpoints.

use axum::{
    Json,
    extract::{Query, State},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::{ServiceError, ServiceResult};
use crate::igdb::LookupEndpoint;

use super::AppState;
use super::games::ReportResponse;

#[derive(Deserialize)]
pub struct ListCharactersParams {
    pub limit: Option<u32>,
}

/// List characters (unfiltered)
pub async fn list_characters_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListCharactersParams>,
) -> ServiceResult<Json<ReportResponse>> {
    let text = state.service.character_list_report(params.limit).await?;
    Ok(Json(ReportResponse { text }))
}

#[derive(Deserialize)]
pub struct LookupParams {
    pub endpoint: String,
    pub id: u64,
}

#[derive(Serialize)]
pub struct LookupResponse {
    pub name: String,
}

/// Resolve a lookup ID (gender, species) to its display name
pub async fn lookup_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LookupParams>,
) -> ServiceResult<Json<LookupResponse>> {
    let endpoint: LookupEndpoint =
        params
            .endpoint
            .parse()
            .map_err(|message| ServiceError::InvalidRequest { message })?;

    let name = state.service.resolve_lookup(endpoint, params.id).await?;
    Ok(Json(LookupResponse { name }))
}
