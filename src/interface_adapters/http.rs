// Health route — §7 Transport: `GET /` returns `{message, players, lobbies}`.

use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use crate::interface_adapters::state::AppState;

#[derive(Debug, Serialize)]
struct HealthResponse {
    message: &'static str,
    players: usize,
    lobbies: usize,
}

pub async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let stats = state.sessions.server_stats(&state.lobbies).await;
    Json(HealthResponse {
        message: "snake arena server running",
        players: stats.total_players,
        lobbies: stats.total_lobbies,
    })
}
