//! Source of salts, nonces and random key strings
//!
//! Every seal draws its randomness through [`SecureRandom`] so callers (and
//! tests) can substitute the generator. Production code uses [`OsRandom`].

use rand::rngs::OsRng;
use rand::RngCore;

use crate::error::{PasscryptError, Result};

/// A cryptographically secure byte source
pub trait SecureRandom {
    /// Fill `dest` entirely or fail; a partially filled buffer is never used
    fn fill(&mut self, dest: &mut [u8]) -> Result<()>;

    /// Convenience for fixed-size values such as salts and nonces
    fn array<const N: usize>(&mut self) -> Result<[u8; N]>
    where
        Self: Sized,
    {
        let mut out = [0u8; N];
        self.fill(&mut out)?;
        Ok(out)
    }
}

/// The operating system CSPRNG
#[derive(Debug, Clone, Copy, Default)]
pub struct OsRandom;

impl SecureRandom for OsRandom {
    fn fill(&mut self, dest: &mut [u8]) -> Result<()> {
        OsRng.try_fill_bytes(dest).map_err(|e| {
            PasscryptError::EncryptionFailed(format!("random source unavailable: {}", e))
        })
    }
}

impl<T: SecureRandom + ?Sized> SecureRandom for &mut T {
    fn fill(&mut self, dest: &mut [u8]) -> Result<()> {
        (**self).fill(dest)
    }
}
