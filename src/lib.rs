//! passcrypt - password-based envelope encryption for text and files
//!
//! This crate provides:
//! - PBKDF2-HMAC-SHA256 key derivation with a fresh salt per envelope
//! - AES-256-GCM sealing into a compact, self-contained binary envelope
//! - Text (base64) and file (with stored filename) variants
//! - Blocking-pool offload and concurrent batch processing on Tokio

pub mod batch;
pub mod cipher;
pub mod cli;
pub mod config;
pub mod crypto;
pub mod envelope;
pub mod error;
pub mod keygen;

pub use cipher::{open_file, open_text, seal_file, seal_text, OpenedFile};
pub use envelope::{Envelope, Layout};
pub use error::{PasscryptError, Result};
pub use keygen::generate_random_hex;
