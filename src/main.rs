mod api;
mod config;
mod error;
mod frontend;
mod models;
mod services;

use crate::api::AppState;
use crate::config::Config;
use crate::services::{
    Broadcaster, ConnectionRegistry, FsCatalog, PlaybackSelector, SessionCoordinator, TrackCatalog,
};
use axum::{
    http::{header, Method},
    routing::get,
    Router,
};
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,crowdplay=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!("Configuration loaded");

    // Core session components
    let registry = Arc::new(ConnectionRegistry::new(config.outbound_queue_capacity));
    let coordinator = Arc::new(SessionCoordinator::new(
        PlaybackSelector::new(),
        Broadcaster::new(registry.clone()),
    ));

    // Seed the vote store from the track catalog before listeners can ask
    // for playback
    let catalog = FsCatalog::new(&config.music_dir);
    match catalog.list_tracks().await {
        Ok(tracks) => {
            if tracks.is_empty() {
                tracing::warn!(
                    "No playable tracks in {}; playback requests will be no-ops",
                    config.music_dir.display()
                );
            }
            coordinator.seed(tracks).await;
        }
        Err(e) => {
            tracing::warn!(
                "Failed to scan {}: {}; starting with an empty catalog",
                config.music_dir.display(),
                e
            );
        }
    }

    let app_state = Arc::new(AppState {
        coordinator,
        registry: registry.clone(),
    });

    // Build router
    let app = Router::new()
        .route("/ws", get(api::ws_handler))
        .nest("/api/v1", api::session_routes())
        .with_state(app_state)
        // Byte-range audio serving straight from the music directory
        .nest_service("/audio", ServeDir::new(&config.music_dir))
        // Listener page - catch-all route (must be last)
        .fallback(get(frontend::serve_frontend))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::POST])
                .allow_headers([header::CONTENT_TYPE]),
        );

    // Start server
    let addr = format!("{}:{}", config.server_host, config.server_port);
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Drop every outbound queue so writer tasks end and sockets close
    registry.clear().await;
    tracing::info!("Shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
