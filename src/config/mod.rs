//! Configuration management for passcrypt
//!
//! Handles:
//! - User settings (KDF cost, output naming, batch concurrency)
//! - Atomic, owner-only output files

mod settings;
mod storage;

pub use settings::Settings;
pub use storage::{
    create_private_file, get_config_dir, get_settings_path, load_settings, save_settings,
    write_private_file,
};
