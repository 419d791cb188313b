//! Game query endpoints.

use axum::{
    Json,
    extract::{Query, State},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::{ServiceError, ServiceResult};

use super::AppState;

/// Formatted-report response shared by the query endpoints
#[derive(Serialize)]
pub struct ReportResponse {
    pub text: String,
}

#[derive(Deserialize)]
pub struct SearchGamesParams {
    pub name: String,
    pub limit: Option<u32>,
}

/// Search games by name
pub async fn search_games_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchGamesParams>,
) -> ServiceResult<Json<ReportResponse>> {
    if params.name.trim().is_empty() {
        return Err(ServiceError::InvalidRequest {
            message: "name must not be empty".to_string(),
        });
    }

    let text = state
        .service
        .game_search_report(&params.name, params.limit.unwrap_or(5))
        .await?;

    Ok(Json(ReportResponse { text }))
}

#[derive(Deserialize)]
pub struct GameCharactersRequest {
    pub game_name: String,
}

/// Fetch a game by name and report all of its characters
pub async fn game_characters_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<GameCharactersRequest>,
) -> ServiceResult<Json<ReportResponse>> {
    if request.game_name.trim().is_empty() {
        return Err(ServiceError::InvalidRequest {
            message: "game_name must not be empty".to_string(),
        });
    }

    let text = state
        .service
        .game_characters_report(&request.game_name)
        .await?;

    Ok(Json(ReportResponse { text }))
}
