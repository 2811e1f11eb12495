use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::{fmt, EnvFilter};

use passcrypt::batch::BatchMode;
use passcrypt::cli::{self, batch::BatchArgs, Context};
use passcrypt::config;
use passcrypt::error::Result;

#[derive(Parser)]
#[command(name = "passcrypt")]
#[command(author = "Oleg")]
#[command(version)]
#[command(
    about = "Password-based encryption for text and files (AES-256-GCM, PBKDF2-SHA256)",
    long_about = None
)]
struct Cli {
    /// Settings file (default: <config dir>/passcrypt/config.json)
    #[arg(long, global = true, env = "PASSCRYPT_CONFIG")]
    config: Option<PathBuf>,

    /// Log filter, e.g. "debug" or "passcrypt=trace" (overrides settings)
    #[arg(long, global = true, env = "PASSCRYPT_LOG")]
    log_level: Option<String>,

    /// Log output format
    #[arg(long, global = true, default_value = "plain", value_parser = ["plain", "json"])]
    log_format: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encrypt text and print it as base64
    EncryptText {
        /// Text to encrypt (read from stdin if omitted)
        text: Option<String>,
    },

    /// Decrypt base64 text produced by encrypt-text
    DecryptText {
        /// Encrypted text (read from stdin if omitted)
        text: Option<String>,
    },

    /// Encrypt a file, storing its name inside the envelope
    EncryptFile(FileArgs),

    /// Decrypt a file and restore its original name
    DecryptFile(FileArgs),

    /// Encrypt or decrypt several files
    Batch {
        #[command(subcommand)]
        action: BatchCommands,
    },

    /// Generate a random hex key
    Keygen {
        /// Number of random bytes (the key has twice as many hex digits)
        #[arg(short, long)]
        length: Option<usize>,
    },
}

#[derive(Args)]
struct FileArgs {
    /// Input file
    path: PathBuf,

    /// Output directory (default: next to the input)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Overwrite an existing output file
    #[arg(short, long)]
    force: bool,
}

#[derive(Args)]
struct BatchTarget {
    /// Input files
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Output directory
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Files processed at once (default from settings)
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Overwrite existing output files
    #[arg(short, long)]
    force: bool,
}

#[derive(Subcommand)]
enum BatchCommands {
    /// Encrypt every file
    Encrypt(BatchTarget),
    /// Decrypt every file
    Decrypt(BatchTarget),
}

fn setup_logging(filter: &str, format: &str) -> anyhow::Result<()> {
    let filter = EnvFilter::try_new(filter).context("Invalid log filter")?;

    match format {
        "json" => {
            let subscriber = fmt::Subscriber::builder()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .json()
                .flatten_event(true)
                .with_current_span(false)
                .finish();
            tracing::subscriber::set_global_default(subscriber)
                .context("Failed to set subscriber")?;
        }
        _ => {
            let subscriber = fmt::Subscriber::builder()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_file(false)
                .with_line_number(false)
                .finish();
            tracing::subscriber::set_global_default(subscriber)
                .context("Failed to set subscriber")?;
        }
    }

    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let settings = match config::load_settings(cli.config.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);
            return ExitCode::FAILURE;
        }
    };

    let filter = cli.log_level.clone().unwrap_or_else(|| settings.log_level.clone());
    if let Err(e) = setup_logging(&filter, &cli.log_format) {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        return ExitCode::FAILURE;
    }

    match run(cli.command, Context::new(settings)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

fn batch_args(mode: BatchMode, target: BatchTarget) -> BatchArgs {
    BatchArgs {
        mode,
        inputs: target.paths,
        output_dir: target.output_dir,
        jobs: target.jobs,
        force: target.force,
    }
}

fn run(command: Commands, ctx: Context) -> Result<()> {
    match command {
        Commands::EncryptText { text } => cli::text::encrypt(&ctx, text),
        Commands::DecryptText { text } => cli::text::decrypt(&ctx, text),
        Commands::EncryptFile(args) => {
            cli::file::encrypt(&ctx, args.path, args.output_dir, args.force)
        }
        Commands::DecryptFile(args) => {
            cli::file::decrypt(&ctx, args.path, args.output_dir, args.force)
        }
        Commands::Batch { action } => match action {
            BatchCommands::Encrypt(target) => {
                cli::batch::run(&ctx, batch_args(BatchMode::Encrypt, target))
            }
            BatchCommands::Decrypt(target) => {
                cli::batch::run(&ctx, batch_args(BatchMode::Decrypt, target))
            }
        },
        Commands::Keygen { length } => cli::keygen::run(&ctx, length),
    }
}
