//! Error types for the Telegram connector.

use botfleet_runtime::ConnectorError;
use teloxide::RequestError;
use thiserror::Error;

/// Errors produced while generating replies.
#[derive(Debug, Error)]
pub enum TelegramError {
    /// No language model API key configured.
    #[error("language model API key not set")]
    NoApiKey,

    /// API request failed.
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Failed to parse API response.
    #[error("failed to parse response: {0}")]
    ParseError(String),
}

/// Result type for Telegram operations.
pub type Result<T> = std::result::Result<T, TelegramError>;

/// Where in session setup a Bot API call failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Phase {
    Handshake,
    Setup,
}

/// Map a Bot API error onto the connector taxonomy.
pub(crate) fn connector_error(err: RequestError, phase: Phase) -> ConnectorError {
    match err {
        RequestError::RetryAfter(secs) => ConnectorError::RateLimited(secs.duration()),
        RequestError::Network(e) => ConnectorError::Transport(e.to_string()),
        RequestError::Io(e) => ConnectorError::Transport(e.to_string()),
        other => match phase {
            Phase::Handshake => ConnectorError::Handshake(other.to_string()),
            Phase::Setup => ConnectorError::Setup(other.to_string()),
        },
    }
}
