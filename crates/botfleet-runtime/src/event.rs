//! Supervisor events.

use botfleet_models::BotId;

use crate::supervisor::ReconcileReport;

/// Events emitted by the session supervisor.
#[derive(Debug, Clone)]
pub enum SupervisorEvent {
    /// A session finished its handshake and is serving messages.
    SessionStarted {
        /// Bot ID.
        bot_id: BotId,
        /// Account name reported by the platform.
        username: Option<String>,
    },
    /// A session failed to start.
    SessionFailed {
        /// Bot ID.
        bot_id: BotId,
        /// Error message.
        error: String,
        /// Failed starts in a row, including this one.
        consecutive_failures: u32,
    },
    /// A bot crossed the failure alert threshold.
    SessionFailing {
        /// Bot ID.
        bot_id: BotId,
        /// Failed starts in a row.
        consecutive_failures: u32,
    },
    /// A session was closed and is no longer tracked.
    SessionStopped {
        /// Bot ID.
        bot_id: BotId,
    },
    /// A reconciliation pass finished.
    ReconcileCompleted {
        /// What the pass did.
        report: ReconcileReport,
    },
}

impl SupervisorEvent {
    /// Returns the bot ID associated with this event, if any.
    pub fn bot_id(&self) -> Option<&BotId> {
        match self {
            SupervisorEvent::SessionStarted { bot_id, .. } => Some(bot_id),
            SupervisorEvent::SessionFailed { bot_id, .. } => Some(bot_id),
            SupervisorEvent::SessionFailing { bot_id, .. } => Some(bot_id),
            SupervisorEvent::SessionStopped { bot_id } => Some(bot_id),
            SupervisorEvent::ReconcileCompleted { .. } => None,
        }
    }

    /// Returns true if this is an error event.
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            SupervisorEvent::SessionFailed { .. } | SupervisorEvent::SessionFailing { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_bot_id() {
        let bot_id = BotId::from("bot-1");

        let event = SupervisorEvent::SessionStarted {
            bot_id: bot_id.clone(),
            username: Some("fleet_bot".to_string()),
        };
        assert_eq!(event.bot_id(), Some(&bot_id));

        let event = SupervisorEvent::SessionStopped {
            bot_id: bot_id.clone(),
        };
        assert_eq!(event.bot_id(), Some(&bot_id));

        let event = SupervisorEvent::ReconcileCompleted {
            report: ReconcileReport::default(),
        };
        assert_eq!(event.bot_id(), None);
    }

    #[test]
    fn test_event_is_error() {
        let bot_id = BotId::from("bot-1");

        let failed = SupervisorEvent::SessionFailed {
            bot_id: bot_id.clone(),
            error: "handshake failed".to_string(),
            consecutive_failures: 1,
        };
        assert!(failed.is_error());

        let failing = SupervisorEvent::SessionFailing {
            bot_id: bot_id.clone(),
            consecutive_failures: 5,
        };
        assert!(failing.is_error());

        let stopped = SupervisorEvent::SessionStopped { bot_id };
        assert!(!stopped.is_error());
    }
}
