//! Command implementations

pub mod batch;
pub mod file;
pub mod keygen;
pub mod text;

use std::io::{self, IsTerminal, Read};

use colored::Colorize;
use secrecy::{ExposeSecret, SecretString};

use crate::config::Settings;
use crate::crypto::KdfParams;
use crate::error::{PasscryptError, Result};

/// Environment variable consulted before prompting for a password
pub const PASSWORD_ENV: &str = "PASSCRYPT_PASSWORD";

/// Settings shared by every command
pub struct Context {
    pub settings: Settings,
}

impl Context {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    pub fn kdf(&self) -> Result<KdfParams> {
        self.settings.kdf_params()
    }
}

fn non_empty(password: String) -> Result<SecretString> {
    if password.is_empty() {
        return Err(PasscryptError::InvalidInput("password must not be empty".into()));
    }
    Ok(SecretString::new(password))
}

/// Password for an encrypting command, confirmed twice when prompted
pub fn prompt_new_password() -> Result<SecretString> {
    if let Ok(password) = std::env::var(PASSWORD_ENV) {
        return non_empty(password);
    }

    let password = non_empty(rpassword::prompt_password("Enter password: ")?)?;
    let confirm = SecretString::new(rpassword::prompt_password("Confirm password: ")?);

    if password.expose_secret() != confirm.expose_secret() {
        return Err(PasscryptError::InvalidInput("passwords do not match".into()));
    }
    Ok(password)
}

/// Password for a decrypting command
pub fn prompt_password() -> Result<SecretString> {
    if let Ok(password) = std::env::var(PASSWORD_ENV) {
        return non_empty(password);
    }
    non_empty(rpassword::prompt_password("Enter password: ")?)
}

/// Use `arg` when given, otherwise read all of stdin.
///
/// A single trailing newline from stdin is dropped; empty input is rejected.
pub fn read_text(arg: Option<String>, what: &str) -> Result<String> {
    let text = match arg {
        Some(text) => text,
        None => {
            if io::stdin().is_terminal() {
                eprintln!("{}", format!("Enter {} (end with Ctrl-D):", what).dimmed());
            }
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            if buf.ends_with('\n') {
                buf.pop();
                if buf.ends_with('\r') {
                    buf.pop();
                }
            }
            buf
        }
    };

    if text.is_empty() {
        return Err(PasscryptError::InvalidInput(format!("no {} given", what)));
    }
    Ok(text)
}

/// Status line on stderr so stdout stays clean for piping
pub fn status(message: &str) {
    eprintln!("{}", message.cyan());
}

pub(crate) fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Runtime::new()
        .map_err(|e| PasscryptError::Worker(format!("could not start async runtime: {}", e)))
}
