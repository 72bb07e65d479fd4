//! Application state shared across handlers.

use std::sync::Arc;

use botfleet_runtime::SessionSupervisor;

use crate::config::ApiConfig;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// API configuration.
    pub config: Arc<ApiConfig>,
    /// Supervisor whose sessions are exposed.
    pub supervisor: Arc<SessionSupervisor>,
}

impl AppState {
    /// Creates a new AppState.
    pub fn new(config: ApiConfig, supervisor: Arc<SessionSupervisor>) -> Self {
        Self {
            config: Arc::new(config),
            supervisor,
        }
    }
}
