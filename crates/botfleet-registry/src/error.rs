//! Error types for the registry crate.

use thiserror::Error;

/// Errors that can occur while listing bots.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The row store URL could not be parsed.
    #[error("invalid row store url: {0}")]
    InvalidUrl(String),

    /// The row store could not be reached.
    #[error("row store unreachable: {0}")]
    Transport(String),

    /// The row store answered with a non-success status.
    #[error("row store returned {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body (truncated).
        body: String,
    },

    /// The response body was not a list of rows.
    #[error("failed to decode rows: {0}")]
    Decode(String),

    /// The registry is deliberately unavailable (in-memory registry only).
    #[error("registry unavailable")]
    Unavailable,
}

/// Result type for registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;

impl From<reqwest::Error> for RegistryError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            RegistryError::Decode(e.to_string())
        } else {
            RegistryError::Transport(e.to_string())
        }
    }
}
