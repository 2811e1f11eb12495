//! Async wrappers that run seal/open on Tokio's blocking pool
//!
//! Key derivation takes tens of milliseconds, so these keep it off the async
//! executor threads. Dropping a returned future abandons the result; the
//! worker may still finish but nothing it produced is observable.

use secrecy::{ExposeSecret, SecretString};

use super::OpenedFile;
use crate::crypto::{KdfParams, OsRandom};
use crate::error::{PasscryptError, Result};

async fn run_blocking<T, F>(job: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(job)
        .await
        .map_err(|e| PasscryptError::Worker(e.to_string()))?
}

pub async fn seal_text(
    plaintext: String,
    password: SecretString,
    params: KdfParams,
) -> Result<String> {
    run_blocking(move || {
        super::seal_text_with(&plaintext, password.expose_secret(), &params, OsRandom)
    })
    .await
}

pub async fn open_text(
    encoded: String,
    password: SecretString,
    params: KdfParams,
) -> Result<String> {
    run_blocking(move || super::open_text_with(&encoded, password.expose_secret(), &params)).await
}

pub async fn seal_file(
    data: Vec<u8>,
    password: SecretString,
    filename: String,
    params: KdfParams,
) -> Result<Vec<u8>> {
    run_blocking(move || {
        super::seal_file_with(&data, password.expose_secret(), &filename, &params, OsRandom)
    })
    .await
}

pub async fn open_file(
    data: Vec<u8>,
    password: SecretString,
    params: KdfParams,
) -> Result<OpenedFile> {
    run_blocking(move || super::open_file_with(&data, password.expose_secret(), &params)).await
}
