//! Health check handler.

use axum::{extract::State, Json};

use crate::state::AppState;
use crate::types::HealthResponse;

/// GET /api/health - Health check endpoint.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let sessions = state.supervisor.session_count().await;
    let connected = state.supervisor.connected_count().await;

    Json(HealthResponse {
        status: if connected == sessions { "ok" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.config.uptime_seconds(),
        sessions,
        connected,
    })
}
