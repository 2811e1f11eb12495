//! Byte container for key material and decrypted payloads
//!
//! Contents are wiped on drop and, on Unix, pinned in RAM for their lifetime
//! so derived keys never reach swap.

use std::ops::{Deref, DerefMut};
use zeroize::Zeroize;

/// Heap bytes that are zeroed and unlocked when dropped
pub struct SecureBytes(Vec<u8>);

impl SecureBytes {
    /// Take ownership of `data` and lock its pages where the platform allows
    pub fn new(data: Vec<u8>) -> Self {
        let secure = Self(data);
        secure.lock_memory();
        secure
    }

    /// A zero-filled buffer of `len` bytes, e.g. as a KDF output target
    pub fn zeroed(len: usize) -> Self {
        Self::new(vec![0u8; len])
    }

    #[cfg(unix)]
    fn lock_memory(&self) {
        if self.0.is_empty() {
            return;
        }
        // Best effort: fails silently without CAP_IPC_LOCK or over RLIMIT_MEMLOCK.
        unsafe {
            libc::mlock(self.0.as_ptr() as *const libc::c_void, self.0.len());
        }
    }

    #[cfg(not(unix))]
    fn lock_memory(&self) {}

    #[cfg(unix)]
    fn unlock_memory(&self) {
        if self.0.is_empty() {
            return;
        }
        unsafe {
            libc::munlock(self.0.as_ptr() as *const libc::c_void, self.0.len());
        }
    }

    #[cfg(not(unix))]
    fn unlock_memory(&self) {}

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Copy the contents out into an unprotected `Vec`.
    ///
    /// Used only at the edge where plaintext is handed back to a caller that
    /// owns its own buffer (file writes, `String` conversion).
    pub fn to_vec(&self) -> Vec<u8> {
        self.0.clone()
    }
}

impl Zeroize for SecureBytes {
    fn zeroize(&mut self) {
        self.0.zeroize();
    }
}

impl Drop for SecureBytes {
    fn drop(&mut self) {
        // Wipe before unlocking so the pages never become swappable with data in them.
        self.0.as_mut_slice().zeroize();
        self.unlock_memory();
        self.0.zeroize();
    }
}

impl Deref for SecureBytes {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for SecureBytes {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl From<Vec<u8>> for SecureBytes {
    fn from(data: Vec<u8>) -> Self {
        Self::new(data)
    }
}

impl PartialEq<[u8]> for SecureBytes {
    fn eq(&self, other: &[u8]) -> bool {
        self.0.as_slice() == other
    }
}

impl std::fmt::Debug for SecureBytes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecureBytes")
            .field("len", &self.0.len())
            .field("data", &"[REDACTED]")
            .finish()
    }
}
