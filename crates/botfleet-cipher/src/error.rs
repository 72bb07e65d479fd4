//! Error types for the cipher crate.

use thiserror::Error;

/// Errors that can occur while encrypting credentials.
///
/// Decryption never returns these to callers; it falls back to the stored
/// value instead.
#[derive(Debug, Error)]
pub enum CipherError {
    /// No master secret configured in a production deployment.
    #[error("encryption secret is required in production (set BOT_TOKEN_ENCRYPTION_KEY)")]
    MissingSecret,

    /// Encryption failed.
    #[error("encryption failed: {0}")]
    Encrypt(String),

    /// Payload could not be decrypted.
    #[error("decryption failed: {0}")]
    Decrypt(String),
}

/// Result type for cipher operations.
pub type Result<T> = std::result::Result<T, CipherError>;
