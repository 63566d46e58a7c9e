use std::net::SocketAddr;
use std::path::PathBuf;

use axum::{Router, routing::get};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::info;

use super::{
    services::{generate_file, generate_link, get_config, health, index},
    state::AppState,
};
use crate::backend;
use crate::config::Config;

type AnyError = Box<dyn std::error::Error + Send + Sync + 'static>;

pub async fn run(
    address: Option<SocketAddr>,
    config_path: Option<PathBuf>,
) -> Result<(), AnyError> {
    info!("Loading configuration");
    let config = match config_path {
        Some(path) => Config::load_from_path(path),
        None => Config::load(),
    }
    .map_err(|e| format!("Failed to load config: {}", e))?;

    let mode = config.upstream.mode;
    info!(%mode, "Selecting upstream backend");
    let backend = backend::from_config(&config)
        .map_err(|e| format!("Failed to build backend: {}", e))?;

    let address = address.unwrap_or(config.server.bind_addr);
    let state = AppState::new(config, backend);
    let app = build_router(state);

    let listener = TcpListener::bind(address).await?;
    info!(%address, %mode, "teralink API listening");

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Build the application router; shared with the integration tests
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/get_config", get(get_config))
        .route("/generate_file", get(generate_file))
        .route("/generate_link", get(generate_link))
        .route("/health", get(health))
        .with_state(state)
        // Browser frontends call this API cross-origin
        .layer(CorsLayer::permissive())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        let mut sigterm = signal(SignalKind::terminate())
            .expect("failed to install signal handler");
        sigterm.recv().await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
