//! Response types for the API.

use botfleet_models::SessionSnapshot;
use serde::{Deserialize, Serialize};

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `ok` when every tracked session is connected, `degraded` otherwise.
    pub status: String,
    /// Service version.
    pub version: String,
    /// Uptime in seconds.
    pub uptime_seconds: u64,
    /// Tracked sessions.
    pub sessions: usize,
    /// Sessions currently connected.
    pub connected: usize,
}

/// Session listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionListResponse {
    /// Snapshots ordered by bot id.
    pub sessions: Vec<SessionSnapshot>,
    /// Number of sessions.
    pub total: usize,
    /// Number of connected sessions.
    pub connected: usize,
}

impl From<Vec<SessionSnapshot>> for SessionListResponse {
    fn from(sessions: Vec<SessionSnapshot>) -> Self {
        let connected = sessions.iter().filter(|s| s.is_connected).count();
        Self {
            total: sessions.len(),
            connected,
            sessions,
        }
    }
}
