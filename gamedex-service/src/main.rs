use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;

mod api;
mod clip;
mod config;
mod error;
mod igdb;
mod mcp;
mod render;
mod service;
mod twitch;

use crate::config::RuntimeConfig;
use crate::service::GamedexService;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    init_logging();

    info!("Starting gamedex service v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration (file `config.*` plus GAMEDEX__-prefixed env vars)
    let runtime_config = Arc::new(RuntimeConfig::load()?);

    info!(
        host = %runtime_config.static_config.server.host,
        port = runtime_config.static_config.server.port,
        "Configuration loaded"
    );

    if !runtime_config.dynamic().twitch.is_configured() {
        info!("Twitch credentials not configured; set them via the panel or settings API");
    }

    // Initialize the service
    let service = Arc::new(GamedexService::new(runtime_config.clone()));

    // Build the router
    let mut app = api::router(service.clone());

    // Add MCP endpoint if enabled
    let mcp_config = runtime_config.dynamic();
    if mcp_config.mcp.enabled {
        let mcp_path = mcp_config.mcp.path.clone();
        info!(path = %mcp_path, "MCP server enabled");
        app = app.nest(&mcp_path, mcp::mcp_router(service.clone()));
    }

    // Start the server
    let addr = format!(
        "{}:{}",
        runtime_config.static_config.server.host, runtime_config.static_config.server.port
    );
    let listener = TcpListener::bind(&addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

fn init_logging() {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let format = fmt::format()
        .with_target(true)
        .with_thread_ids(true)
        .compact();

    // Use RUST_LOG if set, otherwise default to info level for our crate
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("gamedex_service=info"));

    tracing_subscriber::registry()
        .with(fmt::layer().event_format(format))
        .with(filter)
        .init();
}
