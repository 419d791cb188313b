//! Token exchange endpoint.

use axum::{Json, extract::State};
use serde::Deserialize;
use std::sync::Arc;

use crate::error::{ServiceError, ServiceResult};
use crate::twitch::AccessToken;

use super::AppState;

/// Token exchange request. Credentials default to the configured ones.
#[derive(Deserialize)]
pub struct TokenRequest {
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub client_secret: Option<String>,
}

/// Exchange Twitch client credentials for an IGDB access token
pub async fn token_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<TokenRequest>,
) -> ServiceResult<Json<AccessToken>> {
    let (default_id, default_secret) = {
        let config = state.service.config.dynamic();
        (
            config.twitch.client_id.clone(),
            config.twitch.client_secret.clone(),
        )
    };

    let client_id = request
        .client_id
        .filter(|s| !s.is_empty())
        .unwrap_or(default_id);
    let client_secret = request
        .client_secret
        .filter(|s| !s.is_empty())
        .unwrap_or(default_secret);

    if client_id.is_empty() || client_secret.is_empty() {
        return Err(ServiceError::InvalidRequest {
            message: "client_id and client_secret are required (in the request or settings)"
                .to_string(),
        });
    }

    let token = state
        .service
        .exchange_token(&client_id, &client_secret)
        .await?;

    Ok(Json(token))
}
