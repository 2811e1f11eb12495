//! Password-based seal/open over the envelope format
//!
//! Every call is self-contained: a fresh salt and nonce are drawn, a key is
//! derived for that call alone and wiped when it returns. There is no state
//! shared between calls, so any number of them may run concurrently.

pub mod offload;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use tracing::debug;

use crate::crypto::{self, KdfParams, OsRandom, SecureBytes, SecureRandom, NONCE_LEN, SALT_LEN};
use crate::envelope::{self, Envelope, Layout};
use crate::error::{PasscryptError, Result};

/// Result of [`open`]
#[derive(Debug)]
pub struct Opened {
    pub plaintext: SecureBytes,
    /// Present only when opened with [`Layout::File`]
    pub filename: Option<String>,
}

/// Result of [`open_file`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenedFile {
    pub data: Vec<u8>,
    pub filename: String,
}

/// Encrypt `plaintext` into a binary envelope.
///
/// With `filename` set the file layout is produced, otherwise the text
/// layout. Salt and nonce are drawn from `rng` in that order.
pub fn seal<R: SecureRandom>(
    plaintext: &[u8],
    password: &[u8],
    filename: Option<&str>,
    params: &KdfParams,
    mut rng: R,
) -> Result<Vec<u8>> {
    if let Some(name) = filename {
        envelope::check_filename_len(name)?;
    }

    let salt: [u8; SALT_LEN] = rng.array()?;
    let nonce: [u8; NONCE_LEN] = rng.array()?;

    let key = crypto::derive_key(password, &salt, params)?;
    let ciphertext = crypto::aead::encrypt(&key, &nonce, plaintext)?;
    drop(key);

    let envelope = Envelope {
        salt,
        nonce,
        filename: filename.map(str::to_owned),
        ciphertext,
    };
    debug!(
        plaintext_len = plaintext.len(),
        layout = ?envelope.layout(),
        "sealed payload"
    );

    envelope.encode()
}

/// Decrypt a binary envelope of the given layout.
///
/// # Errors
/// - `MalformedEnvelope` if the bytes cannot be an envelope of `layout`
/// - `AuthenticationFailed` for a wrong password or any altered byte
pub fn open(data: &[u8], password: &[u8], layout: Layout, params: &KdfParams) -> Result<Opened> {
    let envelope = Envelope::decode(data, layout)?;

    let key = crypto::derive_key(password, &envelope.salt, params)?;
    let plaintext = crypto::aead::decrypt(&key, &envelope.nonce, &envelope.ciphertext)?;

    debug!(plaintext_len = plaintext.len(), layout = ?layout, "opened payload");

    Ok(Opened {
        plaintext,
        filename: envelope.filename,
    })
}

/// Seal UTF-8 text and base64-encode the envelope.
pub fn seal_text(plaintext: &str, password: &str) -> Result<String> {
    seal_text_with(plaintext, password, &KdfParams::default(), OsRandom)
}

pub fn seal_text_with<R: SecureRandom>(
    plaintext: &str,
    password: &str,
    params: &KdfParams,
    rng: R,
) -> Result<String> {
    let envelope = seal(plaintext.as_bytes(), password.as_bytes(), None, params, rng)?;
    Ok(STANDARD.encode(envelope))
}

/// Reverse of [`seal_text`]. Surrounding whitespace in `encoded` is ignored.
pub fn open_text(encoded: &str, password: &str) -> Result<String> {
    open_text_with(encoded, password, &KdfParams::default())
}

pub fn open_text_with(encoded: &str, password: &str, params: &KdfParams) -> Result<String> {
    let data = STANDARD
        .decode(encoded.trim())
        .map_err(|e| PasscryptError::MalformedEnvelope(format!("invalid base64: {}", e)))?;

    let opened = open(&data, password.as_bytes(), Layout::Text, params)?;
    String::from_utf8(opened.plaintext.to_vec()).map_err(|_| PasscryptError::InvalidUtf8)
}

/// Seal raw file bytes together with their filename.
pub fn seal_file(data: &[u8], password: &str, filename: &str) -> Result<Vec<u8>> {
    seal_file_with(data, password, filename, &KdfParams::default(), OsRandom)
}

pub fn seal_file_with<R: SecureRandom>(
    data: &[u8],
    password: &str,
    filename: &str,
    params: &KdfParams,
    rng: R,
) -> Result<Vec<u8>> {
    seal(data, password.as_bytes(), Some(filename), params, rng)
}

/// Reverse of [`seal_file`], restoring the stored filename.
pub fn open_file(data: &[u8], password: &str) -> Result<OpenedFile> {
    open_file_with(data, password, &KdfParams::default())
}

pub fn open_file_with(data: &[u8], password: &str, params: &KdfParams) -> Result<OpenedFile> {
    let opened = open(data, password.as_bytes(), Layout::File, params)?;
    Ok(OpenedFile {
        data: opened.plaintext.to_vec(),
        filename: opened.filename.unwrap_or_default(),
    })
}
