//! AES-256-GCM Authenticated Encryption
//!
//! The GCM tag covers the whole ciphertext. No associated data is bound,
//! which keeps envelopes compatible with the WebCrypto format.

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};

use super::{DerivedKey, SecureBytes, KEY_LEN, NONCE_LEN};
use crate::error::{PasscryptError, Result};

fn cipher_for(key: &DerivedKey) -> Result<Aes256Gcm> {
    let bytes = key.as_bytes();
    if bytes.len() != KEY_LEN {
        return Err(PasscryptError::EncryptionFailed(format!(
            "Invalid key length: expected {}, got {}",
            KEY_LEN,
            bytes.len()
        )));
    }
    Aes256Gcm::new_from_slice(bytes).map_err(|e| PasscryptError::EncryptionFailed(e.to_string()))
}

/// Encrypt `plaintext` under `key` and `nonce`.
///
/// Returns the ciphertext with the 16-byte tag appended. The caller is
/// responsible for never reusing a nonce with the same key.
pub fn encrypt(key: &DerivedKey, nonce: &[u8; NONCE_LEN], plaintext: &[u8]) -> Result<Vec<u8>> {
    let cipher = cipher_for(key)?;

    cipher
        .encrypt(Nonce::from_slice(nonce), plaintext)
        .map_err(|e| PasscryptError::EncryptionFailed(e.to_string()))
}

/// Decrypt and verify `ciphertext` (tag included).
///
/// # Errors
/// `AuthenticationFailed` whenever the tag does not verify, whatever the
/// cause.
pub fn decrypt(
    key: &DerivedKey,
    nonce: &[u8; NONCE_LEN],
    ciphertext: &[u8],
) -> Result<SecureBytes> {
    let cipher = cipher_for(key)?;

    let plaintext = cipher
        .decrypt(Nonce::from_slice(nonce), ciphertext)
        .map_err(|_| PasscryptError::AuthenticationFailed)?;

    Ok(SecureBytes::new(plaintext))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{derive_key, KdfParams, SALT_LEN, TAG_LEN};

    fn key(password: &[u8]) -> DerivedKey {
        derive_key(password, &[0x42u8; SALT_LEN], &KdfParams::new(1).unwrap()).unwrap()
    }

    #[test]
    fn test_encrypt_decrypt_roundtrip() {
        let key = key(b"pw");
        let nonce = [0x11u8; NONCE_LEN];
        let plaintext = b"Hello, World! This is secret data.";

        let ciphertext = encrypt(&key, &nonce, plaintext).unwrap();
        assert_eq!(ciphertext.len(), plaintext.len() + TAG_LEN);

        let decrypted = decrypt(&key, &nonce, &ciphertext).unwrap();
        assert!(decrypted == plaintext[..]);
    }

    #[test]
    fn test_wrong_key_fails() {
        let nonce = [0x11u8; NONCE_LEN];
        let ciphertext = encrypt(&key(b"one"), &nonce, b"Secret message").unwrap();

        let result = decrypt(&key(b"two"), &nonce, &ciphertext);
        assert!(matches!(result, Err(PasscryptError::AuthenticationFailed)));
    }

    #[test]
    fn test_wrong_nonce_fails() {
        let key = key(b"pw");
        let ciphertext = encrypt(&key, &[0x01; NONCE_LEN], b"Secret message").unwrap();

        let result = decrypt(&key, &[0x02; NONCE_LEN], &ciphertext);
        assert!(matches!(result, Err(PasscryptError::AuthenticationFailed)));
    }

    #[test]
    fn test_tampered_tag_fails() {
        let key = key(b"pw");
        let nonce = [0x11u8; NONCE_LEN];
        let mut ciphertext = encrypt(&key, &nonce, b"Secret message").unwrap();

        let last = ciphertext.len() - 1;
        ciphertext[last] ^= 0x01;

        let result = decrypt(&key, &nonce, &ciphertext);
        assert!(matches!(result, Err(PasscryptError::AuthenticationFailed)));
    }

    #[test]
    fn test_truncated_ciphertext_fails() {
        let key = key(b"pw");
        let nonce = [0x11u8; NONCE_LEN];

        let result = decrypt(&key, &nonce, &[0u8; TAG_LEN - 1]);
        assert!(matches!(result, Err(PasscryptError::AuthenticationFailed)));
    }

    #[test]
    fn test_empty_plaintext() {
        let key = key(b"pw");
        let nonce = [0x11u8; NONCE_LEN];

        let ciphertext = encrypt(&key, &nonce, b"").unwrap();
        assert_eq!(ciphertext.len(), TAG_LEN);
        assert!(decrypt(&key, &nonce, &ciphertext).unwrap().is_empty());
    }
}
