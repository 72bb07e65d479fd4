//! Credential encryption for the bot fleet.
//!
//! Platform tokens are stored encrypted with AES-256-GCM, but the decrypt
//! path must keep working for tokens written before encryption existed. The
//! crate is split accordingly:
//!
//! - [`TokenShape`] / [`looks_like_platform_token`] - the pure heuristic that
//!   decides whether a string already is a usable platform token
//! - [`derive_key`] - master secret to 256-bit key, per credential domain
//! - [`TokenCipher`] - encrypt, and the tolerant decrypt
//!
//! # Wire Format
//!
//! ```text
//! hex( salt[64] || iv[16] || auth_tag[16] || ciphertext[..] )
//! ```
//!
//! The offsets are fixed; previously stored values depend on them.

pub mod cipher;
pub mod error;
pub mod key;
pub mod shape;

pub use cipher::{looks_like_ciphertext, TokenCipher, IV_LEN, SALT_LEN, TAG_LEN};
pub use error::{CipherError, Result};
pub use key::{derive_key, DEV_FALLBACK_SECRET, KEY_LEN, PBKDF2_ROUNDS};
pub use shape::{looks_like_platform_token, TokenShape};
