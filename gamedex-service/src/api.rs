//! HTTP API for the gamedex service.
//!
//! This module provides the REST API endpoints for:
//! - Health and metrics monitoring
//! - Token exchange
//! - Game and character queries
//! - Image-to-character identification
//! - Runtime settings
//!
//! The control panel itself is a single embedded HTML page served at `/`
//! that drives these endpoints.

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse},
    routing::{get, post, put},
};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::service::GamedexService;

pub mod auth;
pub mod characters;
pub mod games;
pub mod identify;
pub mod settings;

use auth::token_handler;
use characters::{list_characters_handler, lookup_handler};
use games::{game_characters_handler, search_games_handler};
use identify::identify_handler;
use settings::{get_settings_handler, update_settings_handler};

/// Application state
pub struct AppState {
    pub service: Arc<GamedexService>,
    pub start_time: Instant,
}

/// Upper bound on the multipart envelope for identification uploads.
/// The configured `limits.max_image_size_bytes` is enforced per request
/// in the identify handler, so raising it via the settings API takes
/// effect without a restart.
const MAX_UPLOAD_ENVELOPE_BYTES: usize = 64 * 1024 * 1024;

/// Build the API router
pub fn router(service: Arc<GamedexService>) -> Router {
    let state = Arc::new(AppState {
        service,
        start_time: Instant::now(),
    });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/token", post(token_handler))
        .route("/games/search", get(search_games_handler))
        .route("/games/characters", post(game_characters_handler))
        .route("/characters", get(list_characters_handler))
        .route("/lookup", get(lookup_handler))
        .route(
            "/identify",
            post(identify_handler).layer(DefaultBodyLimit::max(MAX_UPLOAD_ENVELOPE_BYTES)),
        )
        .route("/settings", get(get_settings_handler))
        .route("/settings", put(update_settings_handler));

    Router::new()
        .route("/", get(panel_handler))
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .nest("/api", api_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// === Control panel ===

async fn panel_handler() -> Html<&'static str> {
    Html(include_str!("../assets/panel.html"))
}

// === Health & Metrics ===

async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let clip_healthy = state.service.clip_healthy().await;
    let credentials_configured = state.service.config.dynamic().twitch.is_configured();

    let status = if clip_healthy {
        "healthy".to_string()
    } else {
        "degraded (classifier unavailable)".to_string()
    };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        clip_available: clip_healthy,
        credentials_configured,
    })
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
    uptime_seconds: u64,
    clip_available: bool,
    credentials_configured: bool,
}

async fn metrics_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    // Prometheus text format, kept minimal
    let metrics = format!(
        r#"# HELP gamedex_uptime_seconds Seconds since service start
# TYPE gamedex_uptime_seconds gauge
gamedex_uptime_seconds {}
"#,
        state.start_time.elapsed().as_secs()
    );

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        metrics,
    )
}
