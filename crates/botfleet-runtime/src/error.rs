//! Error types for the runtime crate.

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur in the runtime.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// Runtime not started.
    #[error("runtime not started")]
    NotStarted,

    /// Runtime already started.
    #[error("runtime already started")]
    AlreadyStarted,

    /// Shutdown error.
    #[error("shutdown error: {0}")]
    Shutdown(String),
}

/// Result type for runtime operations.
pub type Result<T> = std::result::Result<T, RuntimeError>;

/// Errors reported by a chat platform connector.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConnectorError {
    /// The provider rejected the credential or the handshake failed.
    #[error("handshake failed: {0}")]
    Handshake(String),

    /// The provider asked us to slow down.
    #[error("rate limited by provider, retry after {0:?}")]
    RateLimited(Duration),

    /// Command or webhook registration failed.
    #[error("setup failed: {0}")]
    Setup(String),

    /// Network-level failure.
    #[error("transport error: {0}")]
    Transport(String),

    /// Closing the connection failed.
    #[error("close failed: {0}")]
    Close(String),
}

impl ConnectorError {
    /// Returns true for errors that are expected to clear up on their own.
    pub fn is_transient(&self) -> bool {
        matches!(self, ConnectorError::RateLimited(_) | ConnectorError::Transport(_))
    }
}
