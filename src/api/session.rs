use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::error::{AppError, Result};
use crate::models::{NowPlaying, Song};
use crate::services::{ConnectionRegistry, SessionCoordinator};

pub struct AppState {
    pub coordinator: Arc<SessionCoordinator>,
    pub registry: Arc<ConnectionRegistry>,
}

pub fn session_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/session", get(session_state))
        .route("/session/nowplaying", get(now_playing))
        .route("/session/listeners", get(listener_count))
}

#[derive(Debug, Serialize)]
struct SessionStateResponse {
    tracks: Vec<Song>,
    now_playing: Option<NowPlaying>,
}

async fn session_state(State(state): State<Arc<AppState>>) -> Result<Json<SessionStateResponse>> {
    let (tracks, now_playing) = state.coordinator.snapshot().await;
    Ok(Json(SessionStateResponse {
        tracks,
        now_playing,
    }))
}

async fn now_playing(State(state): State<Arc<AppState>>) -> Result<Json<NowPlaying>> {
    let playing = state
        .coordinator
        .now_playing()
        .await
        .ok_or_else(|| AppError::NotFound("Nothing playing".to_string()))?;
    Ok(Json(playing))
}

#[derive(Debug, Serialize)]
struct ListenerCountResponse {
    listeners: usize,
}

async fn listener_count(State(state): State<Arc<AppState>>) -> Result<Json<ListenerCountResponse>> {
    Ok(Json(ListenerCountResponse {
        listeners: state.registry.len().await,
    }))
}
