//! PBKDF2-HMAC-SHA256 Key Derivation
//!
//! Stretches a password into a 256-bit AES key. The iteration count makes
//! each guess cost ~100k HMAC invocations; the per-envelope salt defeats
//! precomputed tables.

use hmac::Hmac;
use pbkdf2::pbkdf2;
use sha2::Sha256;
use tracing::debug;

use super::{SecureBytes, KEY_LEN, SALT_LEN};
use crate::error::{PasscryptError, Result};

/// Default PBKDF2 iteration count
pub const DEFAULT_ITERATIONS: u32 = 100_000;

/// Lower bound accepted by [`KdfParams::new`]
pub const MIN_ITERATIONS: u32 = 1;

/// Upper bound accepted by [`KdfParams::new`]
pub const MAX_ITERATIONS: u32 = 5_000_000;

/// Key-derivation parameters.
///
/// The iteration count is not written into envelopes, so sealing and opening
/// must agree on it out of band.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KdfParams {
    iterations: u32,
}

impl KdfParams {
    pub fn new(iterations: u32) -> Result<Self> {
        if !(MIN_ITERATIONS..=MAX_ITERATIONS).contains(&iterations) {
            return Err(PasscryptError::InvalidConfig(format!(
                "PBKDF2 iterations must be between {} and {}, got {}",
                MIN_ITERATIONS, MAX_ITERATIONS, iterations
            )));
        }
        Ok(Self { iterations })
    }

    pub fn iterations(&self) -> u32 {
        self.iterations
    }
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
        }
    }
}

/// Key material for a single seal or open call
pub struct DerivedKey {
    key: SecureBytes,
}

impl DerivedKey {
    pub fn as_bytes(&self) -> &[u8] {
        &self.key
    }
}

impl std::fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("DerivedKey([REDACTED])")
    }
}

/// Derive an AES-256 key from `password` and `salt`.
///
/// Deterministic: the same password, salt and parameters always produce the
/// same key. An empty password is accepted here; rejecting it is up to the
/// caller.
pub fn derive_key(
    password: &[u8],
    salt: &[u8; SALT_LEN],
    params: &KdfParams,
) -> Result<DerivedKey> {
    debug!(iterations = params.iterations, "deriving key");

    let mut key = SecureBytes::zeroed(KEY_LEN);
    pbkdf2::<Hmac<Sha256>>(password, salt, params.iterations, &mut key)
        .map_err(|e| PasscryptError::EncryptionFailed(format!("key derivation failed: {}", e)))?;

    Ok(DerivedKey { key })
}
