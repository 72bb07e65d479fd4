//! Tracked session bookkeeping.

use std::fmt;

use botfleet_models::{BotId, SessionSnapshot, SessionState};
use chrono::{DateTime, Utc};

use crate::connector::Connection;

/// One tracked bot session.
///
/// Owns the live connection, if any. Only the supervisor mutates it, and
/// only while holding the per-bot lock.
pub(crate) struct Session {
    bot_id: BotId,
    state: SessionState,
    connection: Option<Box<dyn Connection>>,
    is_initialized: bool,
    fingerprint: String,
    username: Option<String>,
    created_at: DateTime<Utc>,
    connected_at: Option<DateTime<Utc>>,
    consecutive_failures: u32,
    last_error: Option<String>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("bot_id", &self.bot_id)
            .field("state", &self.state)
            .field("has_connection", &self.connection.is_some())
            .field("is_initialized", &self.is_initialized)
            .field("consecutive_failures", &self.consecutive_failures)
            .finish_non_exhaustive()
    }
}

impl Session {
    pub(crate) fn new(bot_id: BotId, fingerprint: String) -> Self {
        Self {
            bot_id,
            state: SessionState::Starting,
            connection: None,
            is_initialized: false,
            fingerprint,
            username: None,
            created_at: Utc::now(),
            connected_at: None,
            consecutive_failures: 0,
            last_error: None,
        }
    }

    /// Live means connected and the inbound loop is still running.
    pub(crate) fn is_connected(&self) -> bool {
        self.state == SessionState::Connected
            && self.connection.as_ref().is_some_and(|c| c.is_connected())
    }

    pub(crate) fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// Enter `Starting` for a fresh attempt, handing back any stale connection.
    pub(crate) fn begin_start(&mut self, fingerprint: String) -> Option<Box<dyn Connection>> {
        self.state = SessionState::Starting;
        self.fingerprint = fingerprint;
        self.connection.take()
    }

    pub(crate) fn mark_connected(&mut self, connection: Box<dyn Connection>) {
        self.username = connection.username().map(str::to_string);
        self.connection = Some(connection);
        self.state = SessionState::Connected;
        self.is_initialized = true;
        self.connected_at = Some(Utc::now());
        self.consecutive_failures = 0;
        self.last_error = None;
    }

    /// Record a failed start. Returns the failure streak.
    pub(crate) fn mark_failed(&mut self, error: String) -> u32 {
        self.state = SessionState::Disconnected;
        self.connection = None;
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        self.last_error = Some(error);
        self.consecutive_failures
    }

    pub(crate) fn take_connection(&mut self) -> Option<Box<dyn Connection>> {
        self.state = SessionState::Disconnected;
        self.connection.take()
    }

    pub(crate) fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            bot_id: self.bot_id.clone(),
            state: if self.state == SessionState::Connected && !self.is_connected() {
                SessionState::Disconnected
            } else {
                self.state
            },
            is_connected: self.is_connected(),
            is_initialized: self.is_initialized,
            username: self.username.clone(),
            created_at: self.created_at,
            connected_at: self.connected_at,
            consecutive_failures: self.consecutive_failures,
            last_error: self.last_error.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConnectorError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    struct StubConnection(Arc<AtomicBool>);

    #[async_trait]
    impl Connection for StubConnection {
        fn is_connected(&self) -> bool {
            self.0.load(Ordering::SeqCst)
        }

        fn username(&self) -> Option<&str> {
            Some("stub_bot")
        }

        async fn close(&mut self) -> Result<(), ConnectorError> {
            self.0.store(false, Ordering::SeqCst);
            Ok(())
        }
    }

    #[test]
    fn test_new_session_is_starting() {
        let session = Session::new(BotId::from("a"), "fp".to_string());
        let snapshot = session.snapshot();

        assert_eq!(snapshot.state, SessionState::Starting);
        assert!(!snapshot.is_connected);
        assert!(!snapshot.is_initialized);
    }

    #[test]
    fn test_connected_then_dropped_loop() {
        let alive = Arc::new(AtomicBool::new(true));
        let mut session = Session::new(BotId::from("a"), "fp".to_string());
        session.mark_failed("first".to_string());
        session.mark_connected(Box::new(StubConnection(Arc::clone(&alive))));

        let snapshot = session.snapshot();
        assert!(snapshot.is_connected);
        assert!(snapshot.is_initialized);
        assert_eq!(snapshot.username.as_deref(), Some("stub_bot"));
        assert_eq!(snapshot.consecutive_failures, 0);
        assert!(snapshot.last_error.is_none());

        alive.store(false, Ordering::SeqCst);
        let snapshot = session.snapshot();
        assert!(!snapshot.is_connected);
        assert_eq!(snapshot.state, SessionState::Disconnected);
    }

    #[test]
    fn test_failure_streak() {
        let mut session = Session::new(BotId::from("a"), "fp".to_string());
        assert_eq!(session.mark_failed("one".to_string()), 1);
        assert_eq!(session.mark_failed("two".to_string()), 2);

        let snapshot = session.snapshot();
        assert_eq!(snapshot.state, SessionState::Disconnected);
        assert_eq!(snapshot.last_error.as_deref(), Some("two"));
    }

    #[test]
    fn test_begin_start_hands_back_connection() {
        let alive = Arc::new(AtomicBool::new(true));
        let mut session = Session::new(BotId::from("a"), "old".to_string());
        session.mark_connected(Box::new(StubConnection(alive)));

        let stale = session.begin_start("new".to_string());
        assert!(stale.is_some());
        assert_eq!(session.fingerprint(), "new");
        assert!(!session.is_connected());
    }

    #[test]
    fn test_initialized_survives_later_failures() {
        let alive = Arc::new(AtomicBool::new(true));
        let mut session = Session::new(BotId::from("a"), "fp".to_string());
        session.mark_connected(Box::new(StubConnection(alive)));

        let _ = session.begin_start("fp".to_string());
        assert!(session.snapshot().is_initialized);

        session.mark_failed("401".to_string());
        let snapshot = session.snapshot();
        assert!(snapshot.is_initialized);
        assert!(!snapshot.is_connected);
    }
}
