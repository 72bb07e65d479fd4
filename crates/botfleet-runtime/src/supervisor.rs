//! Session supervisor: the authoritative table of live bot sessions.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use botfleet_cipher::TokenCipher;
use botfleet_models::{BotConfig, BotId, SessionSnapshot};
use futures::future::{join, join_all};
use sha2::{Digest, Sha256};
use tokio::sync::{broadcast, OwnedMutexGuard, RwLock};
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

use crate::config::RuntimeConfig;
use crate::connector::{Connection, PlatformConnector};
use crate::event::SupervisorEvent;
use crate::session::Session;

/// Summary of one reconciliation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Sessions that were started (or restarted) and connected.
    pub started: usize,
    /// Desired bots that already had a healthy, up-to-date session.
    pub skipped: usize,
    /// Start attempts that failed; retried on the next pass.
    pub failed: usize,
    /// Sessions closed because their bot is no longer desired.
    pub stopped: usize,
}

impl ReconcileReport {
    /// Returns true if the pass changed nothing.
    pub fn is_noop(&self) -> bool {
        self.started == 0 && self.failed == 0 && self.stopped == 0
    }
}

enum StartOutcome {
    Started,
    Skipped,
    Failed,
}

/// Fingerprint of everything a running session was built from.
///
/// A session whose fingerprint no longer matches its configuration is torn
/// down and recreated.
pub fn config_fingerprint(config: &BotConfig) -> String {
    let mut hasher = Sha256::new();
    hasher.update(config.credential.as_bytes());
    hasher.update([0u8]);
    hasher.update(config.settings.canonical().as_bytes());
    hex::encode(hasher.finalize())
}

/// Owns every live session and converges them onto a desired set.
///
/// Operations on the same bot are serialized by a per-bot lock; operations
/// on different bots run concurrently.
pub struct SessionSupervisor {
    config: RuntimeConfig,
    cipher: Arc<TokenCipher>,
    connector: Arc<dyn PlatformConnector>,
    sessions: RwLock<HashMap<BotId, Session>>,
    locks: Mutex<HashMap<BotId, Arc<tokio::sync::Mutex<()>>>>,
    event_tx: broadcast::Sender<SupervisorEvent>,
}

impl std::fmt::Debug for SessionSupervisor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionSupervisor")
            .field("config", &self.config)
            .field("platform", &self.connector.platform())
            .finish_non_exhaustive()
    }
}

impl SessionSupervisor {
    /// Create a supervisor with no sessions.
    pub fn new(
        config: RuntimeConfig,
        cipher: Arc<TokenCipher>,
        connector: Arc<dyn PlatformConnector>,
    ) -> Self {
        let (event_tx, _) = broadcast::channel(256);

        Self {
            config,
            cipher,
            connector,
            sessions: RwLock::new(HashMap::new()),
            locks: Mutex::new(HashMap::new()),
            event_tx,
        }
    }

    /// Get the configuration.
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Subscribe to supervisor events.
    pub fn subscribe(&self) -> broadcast::Receiver<SupervisorEvent> {
        self.event_tx.subscribe()
    }

    fn emit_event(&self, event: SupervisorEvent) {
        // Ignore send errors (no subscribers)
        let _ = self.event_tx.send(event);
    }

    async fn lock_bot(&self, bot_id: &BotId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(locks.entry(bot_id.clone()).or_default())
        };
        lock.lock_owned().await
    }

    /// Forget the lock of an untracked bot once nobody holds or waits on it.
    fn release_lock(&self, bot_id: &BotId) {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        if locks.get(bot_id).is_some_and(|lock| Arc::strong_count(lock) == 1) {
            locks.remove(bot_id);
        }
    }

    /// Converge live sessions onto `desired`.
    ///
    /// Inactive entries are ignored. If an id appears twice the later entry
    /// wins. Individual failures are logged and counted, never propagated.
    pub async fn reconcile(&self, desired: &[BotConfig]) -> ReconcileReport {
        let mut wanted: HashMap<&BotId, &BotConfig> = HashMap::new();
        for config in desired.iter().filter(|c| c.is_active()) {
            wanted.insert(&config.id, config);
        }

        let removals: Vec<BotId> = {
            let sessions = self.sessions.read().await;
            sessions
                .keys()
                .filter(|id| !wanted.contains_key(id))
                .cloned()
                .collect()
        };

        let starts = join_all(wanted.values().map(|config| self.ensure_session(config)));
        let stops = join_all(removals.iter().map(|id| self.stop_session(id)));
        let (outcomes, stopped) = join(starts, stops).await;

        let mut report = ReconcileReport {
            stopped: stopped.into_iter().filter(|removed| *removed).count(),
            ..ReconcileReport::default()
        };
        for outcome in outcomes {
            match outcome {
                StartOutcome::Started => report.started += 1,
                StartOutcome::Skipped => report.skipped += 1,
                StartOutcome::Failed => report.failed += 1,
            }
        }

        if report.is_noop() {
            debug!(skipped = report.skipped, "reconcile pass: nothing to do");
        } else {
            info!(
                started = report.started,
                skipped = report.skipped,
                failed = report.failed,
                stopped = report.stopped,
                "reconcile pass complete"
            );
        }

        self.emit_event(SupervisorEvent::ReconcileCompleted { report });

        report
    }

    async fn ensure_session(&self, config: &BotConfig) -> StartOutcome {
        let _guard = self.lock_bot(&config.id).await;
        let fingerprint = config_fingerprint(config);

        let current = {
            let sessions = self.sessions.read().await;
            sessions
                .get(&config.id)
                .map(|s| (s.is_connected(), s.fingerprint() == fingerprint))
        };

        match current {
            Some((true, true)) => StartOutcome::Skipped,
            Some((true, false)) => {
                info!(bot_id = %config.id, "bot configuration changed, recreating session");
                self.stop_locked(&config.id).await;
                self.start_locked(config, fingerprint).await
            }
            Some((false, _)) => {
                debug!(bot_id = %config.id, "session not connected, retrying");
                self.start_locked(config, fingerprint).await
            }
            None => self.start_locked(config, fingerprint).await,
        }
    }

    /// Start (or restart) the session for one bot.
    ///
    /// Any existing connection for the bot is closed first. Returns true if
    /// the new session connected.
    pub async fn start_session(&self, config: &BotConfig) -> bool {
        let _guard = self.lock_bot(&config.id).await;
        let fingerprint = config_fingerprint(config);
        matches!(
            self.start_locked(config, fingerprint).await,
            StartOutcome::Started
        )
    }

    async fn start_locked(&self, config: &BotConfig, fingerprint: String) -> StartOutcome {
        let bot_id = &config.id;

        let stale = {
            let mut sessions = self.sessions.write().await;
            match sessions.get_mut(bot_id) {
                Some(session) => session.begin_start(fingerprint),
                None => {
                    sessions.insert(bot_id.clone(), Session::new(bot_id.clone(), fingerprint));
                    None
                }
            }
        };

        if let Some(connection) = stale {
            self.close_connection(bot_id, connection).await;
        }

        debug!(bot_id = %bot_id, platform = self.connector.platform(), "starting session");

        let credential = self.cipher.decrypt(&config.credential);
        let opened = timeout(
            self.config.start_timeout,
            self.connector.open(bot_id, &credential, &config.settings),
        )
        .await;

        let result = match opened {
            Ok(Ok(connection)) => Ok(connection),
            Ok(Err(e)) => Err(e.to_string()),
            Err(_) => Err(format!(
                "handshake timed out after {:?}",
                self.config.start_timeout
            )),
        };

        let mut sessions = self.sessions.write().await;
        let session = sessions
            .entry(bot_id.clone())
            .or_insert_with(|| Session::new(bot_id.clone(), config_fingerprint(config)));

        match result {
            Ok(connection) => {
                session.mark_connected(connection);
                let username = session.snapshot().username;
                drop(sessions);

                info!(
                    bot_id = %bot_id,
                    username = username.as_deref().unwrap_or("-"),
                    "session connected"
                );
                self.emit_event(SupervisorEvent::SessionStarted {
                    bot_id: bot_id.clone(),
                    username,
                });
                StartOutcome::Started
            }
            Err(error) => {
                let failures = session.mark_failed(error.clone());
                drop(sessions);

                warn!(
                    bot_id = %bot_id,
                    error = %error,
                    consecutive_failures = failures,
                    "session failed to start"
                );
                self.emit_event(SupervisorEvent::SessionFailed {
                    bot_id: bot_id.clone(),
                    error,
                    consecutive_failures: failures,
                });

                if failures == self.config.failure_alert_threshold {
                    error!(
                        bot_id = %bot_id,
                        consecutive_failures = failures,
                        "bot keeps failing to start, still retrying every pass"
                    );
                    self.emit_event(SupervisorEvent::SessionFailing {
                        bot_id: bot_id.clone(),
                        consecutive_failures: failures,
                    });
                }
                StartOutcome::Failed
            }
        }
    }

    /// Close and forget the session for one bot.
    ///
    /// Unknown ids are a no-op. Returns true if a session was tracked.
    pub async fn stop_session(&self, bot_id: &BotId) -> bool {
        let guard = self.lock_bot(bot_id).await;
        let removed = self.stop_locked(bot_id).await;
        drop(guard);
        self.release_lock(bot_id);
        removed
    }

    async fn stop_locked(&self, bot_id: &BotId) -> bool {
        let Some(mut session) = self.sessions.write().await.remove(bot_id) else {
            return false;
        };

        if let Some(connection) = session.take_connection() {
            self.close_connection(bot_id, connection).await;
        }

        info!(bot_id = %bot_id, "session stopped");
        self.emit_event(SupervisorEvent::SessionStopped {
            bot_id: bot_id.clone(),
        });

        true
    }

    /// Close a connection within the shutdown timeout. The connection is
    /// dropped either way, which releases whatever `close` did not.
    async fn close_connection(&self, bot_id: &BotId, mut connection: Box<dyn Connection>) {
        match timeout(self.config.shutdown_timeout, connection.close()).await {
            Ok(Ok(())) => debug!(bot_id = %bot_id, "connection closed"),
            Ok(Err(e)) => warn!(bot_id = %bot_id, error = %e, "error closing connection"),
            Err(_) => warn!(
                bot_id = %bot_id,
                timeout = ?self.config.shutdown_timeout,
                "connection did not close in time, forcing release"
            ),
        }
    }

    /// Stop every tracked session concurrently. Returns how many were stopped.
    pub async fn stop_all(&self) -> usize {
        let ids = self.tracked_ids().await;
        join_all(ids.iter().map(|id| self.stop_session(id)))
            .await
            .into_iter()
            .filter(|removed| *removed)
            .count()
    }

    /// Ids of every tracked session.
    pub async fn tracked_ids(&self) -> Vec<BotId> {
        self.sessions.read().await.keys().cloned().collect()
    }

    /// Snapshots of every tracked session, ordered by bot id.
    pub async fn list_sessions(&self) -> Vec<SessionSnapshot> {
        let sessions = self.sessions.read().await;
        let mut snapshots: Vec<SessionSnapshot> = sessions.values().map(Session::snapshot).collect();
        snapshots.sort_by(|a, b| a.bot_id.as_str().cmp(b.bot_id.as_str()));
        snapshots
    }

    /// Snapshot of one session.
    pub async fn get_session(&self, bot_id: &BotId) -> Option<SessionSnapshot> {
        self.sessions.read().await.get(bot_id).map(Session::snapshot)
    }

    /// Number of tracked sessions.
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Number of tracked sessions that are live.
    pub async fn connected_count(&self) -> usize {
        self.sessions
            .read()
            .await
            .values()
            .filter(|s| s.is_connected())
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConnectorError;
    use async_trait::async_trait;
    use botfleet_cipher::{TokenShape, KEY_LEN};
    use botfleet_models::{BehaviorSettings, BotStatus};

    struct RefusingConnector;

    #[async_trait]
    impl PlatformConnector for RefusingConnector {
        fn platform(&self) -> &'static str {
            "test"
        }

        async fn open(
            &self,
            _bot_id: &BotId,
            _credential: &str,
            _settings: &BehaviorSettings,
        ) -> Result<Box<dyn Connection>, ConnectorError> {
            Err(ConnectorError::Handshake("401 Unauthorized".into()))
        }
    }

    fn supervisor(config: RuntimeConfig) -> SessionSupervisor {
        SessionSupervisor::new(
            config,
            Arc::new(TokenCipher::with_key([1u8; KEY_LEN], TokenShape::telegram())),
            Arc::new(RefusingConnector),
        )
    }

    #[test]
    fn test_fingerprint_tracks_credential_and_settings() {
        let base = BotConfig::new("a", "111:aaa");
        let same = BotConfig::new("a", "111:aaa").with_status(BotStatus::Active);
        let new_token = BotConfig::new("a", "111:bbb");
        let new_settings = BotConfig::new("a", "111:aaa")
            .with_settings(BehaviorSettings::new().with("tone", "formal"));

        assert_eq!(config_fingerprint(&base), config_fingerprint(&same));
        assert_ne!(config_fingerprint(&base), config_fingerprint(&new_token));
        assert_ne!(config_fingerprint(&base), config_fingerprint(&new_settings));
    }

    #[test]
    fn test_report_noop() {
        assert!(ReconcileReport::default().is_noop());
        assert!(ReconcileReport { skipped: 3, ..Default::default() }.is_noop());
        assert!(!ReconcileReport { failed: 1, ..Default::default() }.is_noop());
    }

    #[tokio::test]
    async fn test_empty_supervisor() {
        let supervisor = supervisor(RuntimeConfig::default());
        assert_eq!(supervisor.session_count().await, 0);
        assert!(supervisor.list_sessions().await.is_empty());
        assert!(supervisor.get_session(&BotId::from("nope")).await.is_none());
    }

    #[tokio::test]
    async fn test_stop_unknown_is_noop() {
        let supervisor = supervisor(RuntimeConfig::default());
        let mut events = supervisor.subscribe();

        assert!(!supervisor.stop_session(&BotId::from("ghost")).await);
        assert!(events.try_recv().is_err());
        assert!(supervisor.locks.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failure_alert_fires_once_at_threshold() {
        let supervisor = supervisor(RuntimeConfig::new().with_failure_alert_threshold(2));
        let mut events = supervisor.subscribe();
        let desired = vec![BotConfig::new("a", "123:abc")];

        for _ in 0..3 {
            let report = supervisor.reconcile(&desired).await;
            assert_eq!(report.failed, 1);
        }

        let mut failing = 0;
        while let Ok(event) = events.try_recv() {
            if let SupervisorEvent::SessionFailing { consecutive_failures, .. } = event {
                assert_eq!(consecutive_failures, 2);
                failing += 1;
            }
        }
        assert_eq!(failing, 1);

        let snapshot = supervisor.get_session(&BotId::from("a")).await.unwrap();
        assert_eq!(snapshot.consecutive_failures, 3);
        assert!(!snapshot.is_connected);
    }
}
