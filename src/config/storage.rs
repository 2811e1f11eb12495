//! Settings file location and private file output
//!
//! Settings live in `<config dir>/passcrypt/config.json`. Output files are
//! written through a temporary sibling and renamed into place, so a reader
//! never sees a half-written envelope or plaintext.

use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{PasscryptError, Result};
use crate::keygen;

use super::Settings;

const APP_DIR: &str = "passcrypt";
const SETTINGS_FILE: &str = "config.json";

/// Platform configuration directory for passcrypt
pub fn get_config_dir() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|d| d.join(APP_DIR))
        .ok_or_else(|| {
            PasscryptError::InvalidConfig("could not determine the configuration directory".into())
        })
}

/// Default settings file path
pub fn get_settings_path() -> Result<PathBuf> {
    Ok(get_config_dir()?.join(SETTINGS_FILE))
}

/// Load settings.
///
/// An explicit `path` must exist. Without one, the default location is used
/// and a missing file yields [`Settings::default`].
pub fn load_settings(path: Option<&Path>) -> Result<Settings> {
    let (path, required) = match path {
        Some(p) => (p.to_path_buf(), true),
        None => match get_settings_path() {
            Ok(p) => (p, false),
            Err(_) => return Ok(Settings::default()),
        },
    };

    if !path.exists() {
        if required {
            return Err(PasscryptError::InvalidConfig(format!(
                "settings file {} does not exist",
                path.display()
            )));
        }
        debug!(path = %path.display(), "no settings file, using defaults");
        return Ok(Settings::default());
    }

    let content = fs::read_to_string(&path)?;
    let settings: Settings = serde_json::from_str(&content)?;
    settings.validate()?;

    debug!(path = %path.display(), "loaded settings");
    Ok(settings)
}

/// Validate and write settings as pretty JSON
pub fn save_settings(settings: &Settings, path: &Path) -> Result<()> {
    settings.validate()?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }

    let json = serde_json::to_vec_pretty(settings)?;
    write_private_file(path, &json)
}

/// Atomically write `data` to `path` with owner-only permissions on Unix.
///
/// The bytes go to a temporary file in the same directory which is synced
/// and then renamed over `path`. On failure the temporary file is removed
/// and `path` is left untouched.
pub fn write_private_file(path: &Path, data: &[u8]) -> Result<()> {
    write_via_temp(path, data, Publish::Replace)
}

/// Like [`write_private_file`] but never replaces an existing `path`.
///
/// The temporary file is hard-linked into place, so the existence check and
/// the publish are one step. An existing target yields `InvalidInput`.
pub fn create_private_file(path: &Path, data: &[u8]) -> Result<()> {
    write_via_temp(path, data, Publish::CreateNew).map_err(|e| match e {
        PasscryptError::Io(io) if io.kind() == ErrorKind::AlreadyExists => {
            PasscryptError::InvalidInput(format!("{} already exists", path.display()))
        }
        other => other,
    })
}

#[derive(Clone, Copy)]
enum Publish {
    Replace,
    CreateNew,
}

fn write_via_temp(path: &Path, data: &[u8], publish: Publish) -> Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let name = path.file_name().ok_or_else(|| {
        PasscryptError::InvalidInput(format!("{} is not a file path", path.display()))
    })?;

    let tmp_path = dir.join(format!(
        ".{}.{}.tmp",
        name.to_string_lossy(),
        keygen::generate_random_hex(4)?
    ));

    let result = write_and_publish(&tmp_path, path, data, publish);
    if result.is_err() {
        let _ = fs::remove_file(&tmp_path);
    }
    result
}

fn write_and_publish(tmp_path: &Path, path: &Path, data: &[u8], publish: Publish) -> Result<()> {
    let mut file = File::create(tmp_path)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(tmp_path, fs::Permissions::from_mode(0o600))?;
    }

    file.write_all(data)?;
    file.sync_all()?;
    drop(file);

    match publish {
        Publish::Replace => fs::rename(tmp_path, path)?,
        Publish::CreateNew => {
            fs::hard_link(tmp_path, path)?;
            if let Err(e) = fs::remove_file(tmp_path) {
                warn!(path = %tmp_path.display(), error = %e, "could not remove temporary file");
            }
        }
    }
    Ok(())
}
