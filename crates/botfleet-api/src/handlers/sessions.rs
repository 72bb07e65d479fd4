//! Session introspection handlers.

use axum::{
    extract::{Path, State},
    Json,
};
use botfleet_models::{BotId, SessionSnapshot};

use crate::error::{ApiError, Result};
use crate::state::AppState;
use crate::types::SessionListResponse;

/// GET /api/sessions - List all tracked sessions.
pub async fn list_sessions(State(state): State<AppState>) -> Json<SessionListResponse> {
    Json(state.supervisor.list_sessions().await.into())
}

/// GET /api/sessions/:id - Get one session.
pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionSnapshot>> {
    state
        .supervisor
        .get_session(&BotId::new(id.as_str()))
        .await
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("session {}", id)))
}
