//! Batch processing of several files

use std::path::PathBuf;

use colored::Colorize;

use crate::batch::{self, BatchMode, BatchOptions};
use crate::error::{PasscryptError, Result};

use super::{prompt_new_password, prompt_password, runtime, Context};

pub struct BatchArgs {
    pub mode: BatchMode,
    pub inputs: Vec<PathBuf>,
    pub output_dir: PathBuf,
    pub jobs: Option<usize>,
    pub force: bool,
}

pub fn run(ctx: &Context, args: BatchArgs) -> Result<()> {
    if args.inputs.is_empty() {
        return Err(PasscryptError::InvalidInput("no files given".into()));
    }
    if !args.output_dir.is_dir() {
        return Err(PasscryptError::InvalidInput(format!(
            "output directory {} does not exist",
            args.output_dir.display()
        )));
    }

    let password = match args.mode {
        BatchMode::Encrypt => prompt_new_password()?,
        BatchMode::Decrypt => prompt_password()?,
    };

    let mut options = BatchOptions::from_settings(&ctx.settings, args.output_dir)?;
    options.overwrite = args.force;
    if let Some(jobs) = args.jobs {
        options.jobs = jobs.max(1);
    }

    eprintln!(
        "{}",
        format!("=== Batch {}: {} file(s) ===", args.mode, args.inputs.len()).cyan().bold()
    );

    let report = runtime()?.block_on(batch::run(args.inputs, args.mode, password, &options, |p| {
        let mark = if p.succeeded { "ok".green() } else { "failed".red() };
        eprintln!(
            "[{:>3}%] {}/{} {} {}",
            p.percent(),
            p.completed,
            p.total,
            p.input.display(),
            mark
        );
    }));

    eprintln!();
    for item in &report.items {
        match &item.outcome {
            Ok(out) => eprintln!(
                "  {} {} -> {}",
                "✓".green(),
                item.input.display(),
                out.display()
            ),
            Err(e) => eprintln!("  {} {}: {}", "✗".red(), item.input.display(), e),
        }
    }
    eprintln!();
    eprintln!(
        "Batch complete: {}/{} succeeded",
        report.succeeded(),
        report.items.len()
    );

    if report.is_success() {
        Ok(())
    } else {
        Err(PasscryptError::BatchFailed {
            failed: report.failed(),
            total: report.items.len(),
        })
    }
}
