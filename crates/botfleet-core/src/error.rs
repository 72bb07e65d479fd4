//! Configuration errors.

use thiserror::Error;

/// Errors raised while loading settings.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A required environment variable is not set (or is empty).
    #[error("required environment variable {0} is not set")]
    MissingVar(&'static str),

    /// An environment variable is set but cannot be parsed.
    #[error("environment variable {name} has invalid value {value:?}: {reason}")]
    InvalidVar {
        /// Variable name.
        name: &'static str,
        /// Raw value.
        value: String,
        /// Why it was rejected.
        reason: String,
    },
}

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;
