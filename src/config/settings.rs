//! User settings

use serde::{Deserialize, Serialize};

use crate::crypto::{KdfParams, DEFAULT_ITERATIONS};
use crate::error::{PasscryptError, Result};
use crate::keygen::DEFAULT_KEY_BYTES;

/// Persistent settings, read from `config.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// PBKDF2 iteration count; must match between encrypting and decrypting
    pub kdf_iterations: u32,
    /// Appended to file names when encrypting (e.g. "report.pdf.encrypted")
    pub encrypted_suffix: String,
    /// Random bytes in a generated key string
    pub key_length: usize,
    /// Files processed concurrently in batch mode
    pub batch_jobs: usize,
    /// Default tracing filter when none is given on the command line
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            kdf_iterations: DEFAULT_ITERATIONS,
            encrypted_suffix: ".encrypted".to_string(),
            key_length: DEFAULT_KEY_BYTES,
            batch_jobs: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4),
            log_level: "warn".to_string(),
        }
    }
}

impl Settings {
    /// Check invariants that serde cannot express
    pub fn validate(&self) -> Result<()> {
        self.kdf_params()?;

        if self.encrypted_suffix.is_empty() {
            return Err(PasscryptError::InvalidConfig("encrypted_suffix must not be empty".into()));
        }
        if self.encrypted_suffix.contains(|c: char| c == '/' || c == '\\') {
            return Err(PasscryptError::InvalidConfig(
                "encrypted_suffix must not contain path separators".into(),
            ));
        }
        if self.key_length == 0 {
            return Err(PasscryptError::InvalidConfig("key_length must be at least 1".into()));
        }
        if self.batch_jobs == 0 {
            return Err(PasscryptError::InvalidConfig("batch_jobs must be at least 1".into()));
        }

        Ok(())
    }

    pub fn kdf_params(&self) -> Result<KdfParams> {
        KdfParams::new(self.kdf_iterations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let settings = Settings::default();
        settings.validate().unwrap();
        assert_eq!(settings.kdf_iterations, 100_000);
        assert_eq!(settings.encrypted_suffix, ".encrypted");
        assert!(settings.batch_jobs >= 1);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"kdf_iterations": 250000}"#).unwrap();
        assert_eq!(settings.kdf_iterations, 250_000);
        assert_eq!(settings.encrypted_suffix, ".encrypted");
        assert_eq!(settings.key_length, 32);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let bad = [
            Settings {
                kdf_iterations: 0,
                ..Default::default()
            },
            Settings {
                encrypted_suffix: String::new(),
                ..Default::default()
            },
            Settings {
                encrypted_suffix: "/x".into(),
                ..Default::default()
            },
            Settings {
                key_length: 0,
                ..Default::default()
            },
            Settings {
                batch_jobs: 0,
                ..Default::default()
            },
        ];
        for settings in bad {
            assert!(
                matches!(settings.validate(), Err(PasscryptError::InvalidConfig(_))),
                "{:?}",
                settings
            );
        }
    }
}
