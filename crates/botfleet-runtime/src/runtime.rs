//! Main runtime manager.

use std::sync::Arc;

use botfleet_cipher::TokenCipher;
use botfleet_registry::BotRegistry;
use tracing::{debug, info, warn};

use crate::config::RuntimeConfig;
use crate::connector::PlatformConnector;
use crate::error::{Result, RuntimeError};
use crate::refresh::{RefreshHandle, RefreshLoop};
use crate::supervisor::SessionSupervisor;

/// Main runtime manager combining the supervisor and the refresh loop.
pub struct FleetRuntime {
    supervisor: Arc<SessionSupervisor>,
    registry: Arc<dyn BotRegistry>,
    refresh: Option<RefreshHandle>,
}

impl FleetRuntime {
    /// Create a new runtime.
    pub fn new(
        config: RuntimeConfig,
        cipher: Arc<TokenCipher>,
        connector: Arc<dyn PlatformConnector>,
        registry: Arc<dyn BotRegistry>,
    ) -> Self {
        let supervisor = SessionSupervisor::new(config, cipher, connector);
        Self::with_supervisor(Arc::new(supervisor), registry)
    }

    /// Create a runtime around an existing supervisor.
    pub fn with_supervisor(supervisor: Arc<SessionSupervisor>, registry: Arc<dyn BotRegistry>) -> Self {
        Self {
            supervisor,
            registry,
            refresh: None,
        }
    }

    /// Run the first reconciliation pass and start the refresh loop.
    pub async fn start(&mut self) -> Result<()> {
        if self.refresh.is_some() {
            return Err(RuntimeError::AlreadyStarted);
        }

        info!("starting fleet runtime");

        let refresh = RefreshLoop::new(
            Arc::clone(&self.supervisor),
            Arc::clone(&self.registry),
            self.supervisor.config().refresh_interval,
        );
        self.refresh = Some(refresh.start().await);

        info!(
            sessions = self.supervisor.session_count().await,
            connected = self.supervisor.connected_count().await,
            "fleet runtime started"
        );

        Ok(())
    }

    /// Ask the refresh loop for an immediate pass.
    pub fn refresh_now(&self) -> Result<()> {
        let refresh = self.refresh.as_ref().ok_or(RuntimeError::NotStarted)?;
        refresh.trigger();
        Ok(())
    }

    /// Stop the refresh loop, then every session.
    ///
    /// Always stops every session, even when the loop did not stop cleanly.
    /// Returns the number of sessions stopped.
    pub async fn shutdown(&mut self) -> Result<usize> {
        let refresh = self.refresh.take().ok_or(RuntimeError::NotStarted)?;

        info!("shutting down fleet runtime");

        if let Err(e) = refresh.stop().await {
            warn!(error = %e, "refresh loop did not stop cleanly");
        }

        debug!("stopping all sessions");
        let stopped = self.supervisor.stop_all().await;

        info!(stopped, "fleet runtime stopped");

        Ok(stopped)
    }

    /// Get the supervisor.
    pub fn supervisor(&self) -> Arc<SessionSupervisor> {
        Arc::clone(&self.supervisor)
    }

    /// Check if the runtime has been started.
    pub fn is_started(&self) -> bool {
        self.refresh.is_some()
    }
}

impl std::fmt::Debug for FleetRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FleetRuntime")
            .field("supervisor", &self.supervisor)
            .field("started", &self.is_started())
            .finish()
    }
}
