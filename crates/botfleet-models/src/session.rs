//! Read-only views of live sessions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::BotId;

/// Connection state of a tracked session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// Handshake in progress.
    Starting,
    /// Handshake succeeded and the poll loop is running.
    Connected,
    /// Connection lost or handshake failed; retried on the next tick.
    Disconnected,
}

/// Snapshot of one session, safe to hand to health checks and the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// Bot the session belongs to.
    pub bot_id: BotId,
    /// Current state.
    pub state: SessionState,
    /// True only after a successful handshake and while the connection is alive.
    pub is_connected: bool,
    /// True once setup has completed at least once.
    pub is_initialized: bool,
    /// Platform account name reported by the handshake.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// When the session entry was created.
    pub created_at: DateTime<Utc>,
    /// When the last successful handshake completed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connected_at: Option<DateTime<Utc>>,
    /// Failed start attempts since the last success.
    pub consecutive_failures: u32,
    /// Message of the most recent failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}
