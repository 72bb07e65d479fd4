//! Key derivation from the master secret.

use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;
use zeroize::Zeroizing;

/// Key length for AES-256.
pub const KEY_LEN: usize = 32;

/// PBKDF2-HMAC-SHA256 iteration count.
pub const PBKDF2_ROUNDS: u32 = 100_000;

/// Insecure secret used outside production when none is configured.
pub const DEV_FALLBACK_SECRET: &str = "botfleet-insecure-development-secret-do-not-use";

/// Derive the 256-bit key for a credential domain.
///
/// A secret that is exactly 64 hex characters is used directly as the key
/// bytes. Anything else goes through PBKDF2 with `domain_salt`, so one
/// master secret yields a different key per domain.
pub fn derive_key(secret: &str, domain_salt: &str) -> Zeroizing<[u8; KEY_LEN]> {
    let mut key = Zeroizing::new([0u8; KEY_LEN]);

    if secret.len() == KEY_LEN * 2 && hex::decode_to_slice(secret, &mut key[..]).is_ok() {
        return key;
    }

    pbkdf2_hmac::<Sha256>(
        secret.as_bytes(),
        domain_salt.as_bytes(),
        PBKDF2_ROUNDS,
        &mut key[..],
    );
    key
}
