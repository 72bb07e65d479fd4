//! Periodic registry refresh.

use std::sync::Arc;
use std::time::Duration;

use botfleet_registry::BotRegistry;
use tokio::sync::{watch, Notify};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, error, warn};

use crate::error::{Result, RuntimeError};
use crate::supervisor::{ReconcileReport, SessionSupervisor};

/// Re-reads the registry and reconciles on a fixed interval.
pub struct RefreshLoop {
    supervisor: Arc<SessionSupervisor>,
    registry: Arc<dyn BotRegistry>,
    interval: Duration,
}

impl RefreshLoop {
    /// Creates a refresh loop.
    pub fn new(
        supervisor: Arc<SessionSupervisor>,
        registry: Arc<dyn BotRegistry>,
        interval: Duration,
    ) -> Self {
        Self {
            supervisor,
            registry,
            interval,
        }
    }

    /// Run one pass: list active bots, then reconcile.
    ///
    /// A registry failure leaves every session as it is and returns `None`;
    /// an empty listing is not a failure and stops everything.
    pub async fn tick(&self) -> Option<ReconcileReport> {
        match self.registry.list_active_bots().await {
            Ok(bots) => Some(self.supervisor.reconcile(&bots).await),
            Err(e) => {
                warn!(error = %e, "failed to list active bots, keeping current sessions");
                None
            }
        }
    }

    /// Run one pass now, then keep running on the interval in the background.
    pub async fn start(self) -> RefreshHandle {
        self.tick().await;

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let trigger = Arc::new(Notify::new());
        let task = tokio::spawn(Arc::new(self).run(shutdown_rx, Arc::clone(&trigger)));

        RefreshHandle {
            shutdown_tx,
            trigger,
            task,
        }
    }

    async fn run(self: Arc<Self>, mut shutdown: watch::Receiver<bool>, trigger: Arc<Notify>) {
        let mut ticker = interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        debug!(interval_secs = self.interval.as_secs(), "starting refresh loop");

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    Arc::clone(&self).guarded_tick().await;
                }
                _ = trigger.notified() => {
                    debug!("refresh triggered");
                    Arc::clone(&self).guarded_tick().await;
                    ticker.reset();
                }
                changed = shutdown.changed() => {
                    // A dropped handle counts as a stop request.
                    if changed.is_err() || *shutdown.borrow() {
                        debug!("refresh loop received shutdown signal");
                        break;
                    }
                }
            }
        }

        debug!("refresh loop stopped");
    }

    /// Run a pass on its own task so a panic in it cannot end the loop.
    async fn guarded_tick(self: Arc<Self>) {
        if let Err(e) = tokio::spawn(async move { self.tick().await }).await {
            error!(error = %e, "reconcile pass aborted");
        }
    }
}

/// Controls a running [`RefreshLoop`].
#[derive(Debug)]
pub struct RefreshHandle {
    shutdown_tx: watch::Sender<bool>,
    trigger: Arc<Notify>,
    task: JoinHandle<()>,
}

impl RefreshHandle {
    /// Ask for a pass now instead of waiting for the next tick.
    pub fn trigger(&self) {
        self.trigger.notify_one();
    }

    /// Returns true while the background task is alive.
    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    /// Stop the loop. An in-flight pass is allowed to finish first.
    pub async fn stop(self) -> Result<()> {
        // The task may already be gone; the join below reports how it ended.
        let _ = self.shutdown_tx.send(true);
        self.task
            .await
            .map_err(|e| RuntimeError::Shutdown(format!("refresh task panicked: {}", e)))
    }
}
