//! Cryptographic primitives for passcrypt
//!
//! This module provides:
//! - PBKDF2-HMAC-SHA256 for password-based key derivation
//! - AES-256-GCM for authenticated encryption
//! - An injectable secure random source
//! - Secure memory handling with automatic zeroing

pub mod aead;
mod kdf;
mod rng;
mod secure_bytes;

pub use kdf::{
    derive_key, DerivedKey, KdfParams, DEFAULT_ITERATIONS, MAX_ITERATIONS, MIN_ITERATIONS,
};
pub use rng::{OsRandom, SecureRandom};
pub use secure_bytes::SecureBytes;

#[cfg(test)]
pub(crate) use rng::testing::ScriptedRandom;

/// Salt length in bytes (128 bits)
pub const SALT_LEN: usize = 16;

/// Nonce length for AES-GCM (96 bits)
pub const NONCE_LEN: usize = 12;

/// Authentication tag length (128 bits)
pub const TAG_LEN: usize = 16;

/// Derived key length (256 bits for AES-256)
pub const KEY_LEN: usize = 32;
