use thiserror::Error;

pub type Result<T> = std::result::Result<T, PasscryptError>;

#[derive(Debug, Error)]
pub enum PasscryptError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Malformed envelope: {0}")]
    MalformedEnvelope(String),

    /// Wrong password and tampered data produce the same error.
    #[error("Decryption failed: wrong key or corrupted data")]
    AuthenticationFailed,

    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Decrypted text is not valid UTF-8")]
    InvalidUtf8,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("{failed} of {total} file(s) failed")]
    BatchFailed { failed: usize, total: usize },

    #[error("Background task failed: {0}")]
    Worker(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PasscryptError {
    /// True for failures caused by a wrong password or altered bytes
    pub fn is_authentication(&self) -> bool {
        matches!(self, Self::AuthenticationFailed)
    }

    /// True for inputs that are structurally not an envelope
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::MalformedEnvelope(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authentication_message_is_generic() {
        let err = PasscryptError::AuthenticationFailed;
        assert_eq!(
            err.to_string(),
            "Decryption failed: wrong key or corrupted data"
        );
        assert!(err.is_authentication());
        assert!(!err.is_malformed());
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: PasscryptError = io.into();
        assert!(matches!(err, PasscryptError::Io(_)));
    }
}
