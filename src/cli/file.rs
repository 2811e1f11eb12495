//! Single-file encryption and decryption

use std::path::{Path, PathBuf};

use colored::Colorize;

use crate::batch::{self, BatchMode, BatchOptions};
use crate::error::Result;

use super::{prompt_new_password, prompt_password, runtime, status, Context};

/// Output directory: the explicit one, else the input's own directory
fn output_dir_for(input: &Path, output_dir: Option<PathBuf>) -> PathBuf {
    output_dir.unwrap_or_else(|| match input.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    })
}

fn run(
    ctx: &Context,
    mode: BatchMode,
    input: PathBuf,
    output_dir: Option<PathBuf>,
    force: bool,
) -> Result<()> {
    let password = match mode {
        BatchMode::Encrypt => prompt_new_password()?,
        BatchMode::Decrypt => prompt_password()?,
    };

    let output_dir = output_dir_for(&input, output_dir);
    let mut options = BatchOptions::from_settings(&ctx.settings, output_dir)?;
    options.overwrite = force;

    status(&format!("{} {}...", verb(mode), input.display()));
    let written = runtime()?.block_on(batch::process_file(&input, mode, password, &options))?;

    eprintln!("{} {}", "Written:".green().bold(), written.display());
    Ok(())
}

fn verb(mode: BatchMode) -> &'static str {
    match mode {
        BatchMode::Encrypt => "Encrypting",
        BatchMode::Decrypt => "Decrypting",
    }
}

pub fn encrypt(
    ctx: &Context,
    input: PathBuf,
    output_dir: Option<PathBuf>,
    force: bool,
) -> Result<()> {
    run(ctx, BatchMode::Encrypt, input, output_dir, force)
}

pub fn decrypt(
    ctx: &Context,
    input: PathBuf,
    output_dir: Option<PathBuf>,
    force: bool,
) -> Result<()> {
    run(ctx, BatchMode::Decrypt, input, output_dir, force)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_dir_defaults_to_input_dir() {
        assert_eq!(
            output_dir_for(Path::new("/tmp/a/b.txt"), None),
            PathBuf::from("/tmp/a")
        );
        assert_eq!(output_dir_for(Path::new("b.txt"), None), PathBuf::from("."));
        assert_eq!(
            output_dir_for(Path::new("b.txt"), Some(PathBuf::from("out"))),
            PathBuf::from("out")
        );
    }
}
