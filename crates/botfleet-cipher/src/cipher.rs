//! AES-256-GCM token cipher with tolerant decryption.

use std::fmt;

use aes_gcm::aead::consts::U16;
use aes_gcm::aead::{AeadInPlace, KeyInit};
use aes_gcm::aes::Aes256;
use aes_gcm::{AesGcm, Nonce, Tag};
use botfleet_core::Environment;
use rand::RngCore;
use tracing::{debug, warn};
use zeroize::Zeroizing;

use crate::error::{CipherError, Result};
use crate::key::{derive_key, DEV_FALLBACK_SECRET, KEY_LEN};
use crate::shape::TokenShape;

/// Random salt length (bytes).
pub const SALT_LEN: usize = 64;
/// IV length (bytes). GCM with a 128-bit nonce.
pub const IV_LEN: usize = 16;
/// Authentication tag length (bytes).
pub const TAG_LEN: usize = 16;

const HEADER_LEN: usize = SALT_LEN + IV_LEN + TAG_LEN;

/// Shortest hex string that can hold a header plus one byte of ciphertext.
const MIN_HEX_LEN: usize = (HEADER_LEN + 1) * 2;

type TokenAead = AesGcm<Aes256, U16>;

/// Returns true if `input` could be a stored ciphertext payload.
///
/// This only checks the encoding (even-length hex, long enough to hold the
/// header); it says nothing about whether the payload decrypts.
pub fn looks_like_ciphertext(input: &str) -> bool {
    input.len() >= MIN_HEX_LEN
        && input.len() % 2 == 0
        && input.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Encrypts and decrypts platform credentials for one credential domain.
pub struct TokenCipher {
    key: Zeroizing<[u8; KEY_LEN]>,
    shape: TokenShape,
}

impl fmt::Debug for TokenCipher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCipher")
            .field("key", &"<redacted>")
            .field("shape", &self.shape)
            .finish()
    }
}

impl TokenCipher {
    /// Create a cipher from the configured master secret.
    ///
    /// Without a secret, production deployments fail with
    /// [`CipherError::MissingSecret`]; other environments fall back to
    /// [`DEV_FALLBACK_SECRET`] and log a warning.
    pub fn new(secret: Option<&str>, environment: Environment, shape: TokenShape) -> Result<Self> {
        let secret = match secret.map(str::trim).filter(|s| !s.is_empty()) {
            Some(secret) => secret,
            None if environment.is_production() => return Err(CipherError::MissingSecret),
            None => {
                warn!(
                    platform = shape.platform,
                    "no encryption secret configured; using the INSECURE development key"
                );
                DEV_FALLBACK_SECRET
            }
        };

        Ok(Self {
            key: derive_key(secret, shape.domain_salt),
            shape,
        })
    }

    /// Create a Telegram credential cipher.
    pub fn telegram(secret: Option<&str>, environment: Environment) -> Result<Self> {
        Self::new(secret, environment, TokenShape::telegram())
    }

    /// Create a cipher from raw key bytes.
    pub fn with_key(key: [u8; KEY_LEN], shape: TokenShape) -> Self {
        Self {
            key: Zeroizing::new(key),
            shape,
        }
    }

    /// The token shape this cipher validates against.
    pub fn shape(&self) -> &TokenShape {
        &self.shape
    }

    fn aead(&self) -> Result<TokenAead> {
        TokenAead::new_from_slice(&self.key[..]).map_err(|e| CipherError::Encrypt(e.to_string()))
    }

    /// Encrypt a plaintext credential into the hex wire format.
    pub fn encrypt(&self, plaintext: &str) -> Result<String> {
        let aead = self.aead()?;

        let mut salt = [0u8; SALT_LEN];
        let mut iv = [0u8; IV_LEN];
        let mut rng = rand::rng();
        rng.fill_bytes(&mut salt);
        rng.fill_bytes(&mut iv);

        let mut buffer = plaintext.as_bytes().to_vec();
        let tag = aead
            .encrypt_in_place_detached(Nonce::<U16>::from_slice(&iv), &[], &mut buffer)
            .map_err(|e| CipherError::Encrypt(e.to_string()))?;

        let mut payload = Vec::with_capacity(HEADER_LEN + buffer.len());
        payload.extend_from_slice(&salt);
        payload.extend_from_slice(&iv);
        payload.extend_from_slice(&tag);
        payload.extend_from_slice(&buffer);

        Ok(hex::encode(payload))
    }

    /// Recover a usable credential from a stored value.
    ///
    /// Never fails. Returns `input` unchanged when it already looks like a
    /// plaintext token, cannot be ciphertext, fails authentication, or
    /// decrypts to something that is not token-shaped.
    pub fn decrypt(&self, input: &str) -> String {
        if self.shape.matches(input) {
            return input.to_string();
        }

        if !looks_like_ciphertext(input) {
            debug!(platform = self.shape.platform, "credential is not ciphertext; using stored value");
            return input.to_string();
        }

        match self.open(input) {
            Ok(plaintext) if self.shape.matches(&plaintext) => plaintext.to_string(),
            Ok(_) => {
                warn!(
                    platform = self.shape.platform,
                    "decrypted credential is not token-shaped; using stored value"
                );
                input.to_string()
            }
            Err(e) => {
                warn!(platform = self.shape.platform, error = %e, "credential could not be decrypted; using stored value");
                input.to_string()
            }
        }
    }

    fn open(&self, input: &str) -> Result<Zeroizing<String>> {
        let payload = hex::decode(input).map_err(|e| CipherError::Decrypt(e.to_string()))?;
        if payload.len() <= HEADER_LEN {
            return Err(CipherError::Decrypt("payload too short".to_string()));
        }

        let (iv, rest) = payload[SALT_LEN..].split_at(IV_LEN);
        let (tag, ciphertext) = rest.split_at(TAG_LEN);

        let mut buffer = Zeroizing::new(ciphertext.to_vec());
        self.aead()?
            .decrypt_in_place_detached(
                Nonce::<U16>::from_slice(iv),
                &[],
                &mut buffer[..],
                Tag::<U16>::from_slice(tag),
            )
            .map_err(|e| CipherError::Decrypt(e.to_string()))?;

        let text = std::str::from_utf8(&buffer[..])
            .map_err(|e| CipherError::Decrypt(e.to_string()))?
            .to_string();
        Ok(Zeroizing::new(text))
    }
}
