//! Random key strings for users who want a generated password

use crate::crypto::{OsRandom, SecureRandom};
use crate::error::{PasscryptError, Result};

/// Number of random bytes behind a default key string
pub const DEFAULT_KEY_BYTES: usize = 32;

/// `length` random bytes as `2 * length` lowercase hex digits
pub fn generate_random_hex(length: usize) -> Result<String> {
    generate_random_hex_with(length, OsRandom)
}

pub fn generate_random_hex_with<R: SecureRandom>(length: usize, mut rng: R) -> Result<String> {
    if length == 0 {
        return Err(PasscryptError::InvalidInput("key length must be at least 1 byte".into()));
    }

    let mut bytes = zeroize::Zeroizing::new(vec![0u8; length]);
    rng.fill(&mut bytes)?;
    Ok(hex::encode(&*bytes))
}
