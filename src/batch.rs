//! Encrypt or decrypt many files at once
//!
//! Each file gets its own salt, nonce and key, so items are fully independent
//! and run concurrently up to `jobs` at a time. One failing item never stops
//! the others; the report carries a result per input, in input order.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use secrecy::{ExposeSecret, SecretString};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};
use zeroize::Zeroizing;

use crate::cipher::offload;
use crate::config::{self, Settings};
use crate::crypto::KdfParams;
use crate::error::{PasscryptError, Result};

/// Suffix used when an encrypted input name does not carry the configured one
const DECRYPTED_FALLBACK_SUFFIX: &str = ".decrypted";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchMode {
    Encrypt,
    Decrypt,
}

impl std::fmt::Display for BatchMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BatchMode::Encrypt => f.write_str("encrypt"),
            BatchMode::Decrypt => f.write_str("decrypt"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Where output files are written
    pub output_dir: PathBuf,
    /// Maximum items in flight
    pub jobs: usize,
    pub encrypted_suffix: String,
    pub kdf: KdfParams,
    /// Replace existing output files instead of failing the item
    pub overwrite: bool,
}

impl BatchOptions {
    pub fn from_settings(settings: &Settings, output_dir: impl Into<PathBuf>) -> Result<Self> {
        Ok(Self {
            output_dir: output_dir.into(),
            jobs: settings.batch_jobs,
            encrypted_suffix: settings.encrypted_suffix.clone(),
            kdf: settings.kdf_params()?,
            overwrite: false,
        })
    }
}

/// Outcome for one input file
#[derive(Debug)]
pub struct BatchItemResult {
    pub input: PathBuf,
    /// Path of the written output on success
    pub outcome: Result<PathBuf>,
}

impl BatchItemResult {
    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Reported after every finished item
#[derive(Debug, Clone)]
pub struct BatchProgress {
    pub completed: usize,
    pub total: usize,
    pub input: PathBuf,
    pub succeeded: bool,
}

impl BatchProgress {
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 100;
        }
        ((self.completed * 100) / self.total) as u8
    }
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub items: Vec<BatchItemResult>,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.items.iter().filter(|i| i.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.items.len() - self.succeeded()
    }

    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }
}

/// Output name for an encrypted file: the input name plus `suffix`
pub fn encrypted_name(input_name: &str, suffix: &str) -> String {
    format!("{}{}", input_name, suffix)
}

/// Output name for a decrypted file.
///
/// Uses the name stored in the envelope, reduced to its last path component
/// since the envelope is attacker-controllable. Falls back to the input name
/// without `suffix`, or with `.decrypted` appended.
pub fn restored_name(stored: &str, input_name: &str, suffix: &str) -> String {
    let candidate = stored
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or("")
        .trim();

    let usable = !candidate.is_empty()
        && candidate != "."
        && candidate != ".."
        && !candidate.chars().any(char::is_control);
    if usable {
        return candidate.to_string();
    }

    match input_name.strip_suffix(suffix) {
        Some(stem) if !stem.is_empty() => stem.to_string(),
        _ => format!("{}{}", input_name, DECRYPTED_FALLBACK_SUFFIX),
    }
}

fn file_name_of(input: &Path) -> Result<String> {
    input
        .file_name()
        .and_then(|n| n.to_str())
        .map(str::to_owned)
        .ok_or_else(|| {
            PasscryptError::InvalidInput(format!("{} has no usable file name", input.display()))
        })
}

/// Output paths already taken by items of the running batch
#[derive(Debug, Default)]
struct OutputClaims(Mutex<HashSet<PathBuf>>);

impl OutputClaims {
    fn claim(&self, path: &Path) -> Result<()> {
        let mut claimed = self
            .0
            .lock()
            .map_err(|_| PasscryptError::Worker("output registry poisoned".into()))?;
        if !claimed.insert(path.to_path_buf()) {
            return Err(PasscryptError::InvalidInput(format!(
                "{} is also produced by another file in this batch",
                path.display()
            )));
        }
        Ok(())
    }
}

async fn write_output(path: PathBuf, data: Zeroizing<Vec<u8>>, overwrite: bool) -> Result<PathBuf> {
    tokio::task::spawn_blocking(move || {
        if overwrite {
            config::write_private_file(&path, &data)?;
        } else {
            config::create_private_file(&path, &data)?;
        }
        Ok(path)
    })
    .await
    .map_err(|e| PasscryptError::Worker(e.to_string()))?
}

/// Encrypt or decrypt a single file into `options.output_dir`.
///
/// Returns the path written. Nothing is written unless the whole operation
/// succeeded.
pub async fn process_file(
    input: &Path,
    mode: BatchMode,
    password: SecretString,
    options: &BatchOptions,
) -> Result<PathBuf> {
    process_item(input, mode, password, options, None).await
}

async fn process_item(
    input: &Path,
    mode: BatchMode,
    password: SecretString,
    options: &BatchOptions,
    claims: Option<&OutputClaims>,
) -> Result<PathBuf> {
    let name = file_name_of(input)?;

    if mode == BatchMode::Encrypt {
        let out = options
            .output_dir
            .join(encrypted_name(&name, &options.encrypted_suffix));
        if let Some(claims) = claims {
            claims.claim(&out)?;
        }

        let data = tokio::fs::read(input).await?;
        debug!(input = %input.display(), %mode, len = data.len(), "processing file");
        let sealed = offload::seal_file(data, password, name, options.kdf).await?;
        return write_output(out, Zeroizing::new(sealed), options.overwrite).await;
    }

    let data = tokio::fs::read(input).await?;
    debug!(input = %input.display(), %mode, len = data.len(), "processing file");
    let opened = offload::open_file(data, password, options.kdf).await?;
    let out = options.output_dir.join(restored_name(
        &opened.filename,
        &name,
        &options.encrypted_suffix,
    ));
    if let Some(claims) = claims {
        claims.claim(&out)?;
    }
    write_output(out, Zeroizing::new(opened.data), options.overwrite).await
}

/// Process every input, reporting progress after each item finishes.
///
/// Two items that map to the same output path never both succeed: the later
/// one fails with `InvalidInput`, even with `overwrite` set.
pub async fn run<F>(
    inputs: Vec<PathBuf>,
    mode: BatchMode,
    password: SecretString,
    options: &BatchOptions,
    mut on_progress: F,
) -> BatchReport
where
    F: FnMut(&BatchProgress),
{
    let total = inputs.len();
    info!(%mode, total, jobs = options.jobs, "starting batch");

    let semaphore = Arc::new(Semaphore::new(options.jobs.max(1)));
    let options = Arc::new(options.clone());
    let claims = Arc::new(OutputClaims::default());
    let mut set = JoinSet::new();

    for (index, input) in inputs.iter().cloned().enumerate() {
        let semaphore = Arc::clone(&semaphore);
        let options = Arc::clone(&options);
        let claims = Arc::clone(&claims);
        let password = SecretString::new(password.expose_secret().clone());

        set.spawn(async move {
            let outcome = match semaphore.acquire_owned().await {
                Ok(_permit) => {
                    process_item(&input, mode, password, &options, Some(claims.as_ref())).await
                }
                Err(e) => Err(PasscryptError::Worker(e.to_string())),
            };
            (index, outcome)
        });
    }
    drop(password);

    let mut outcomes: Vec<Option<Result<PathBuf>>> = (0..total).map(|_| None).collect();
    let mut completed = 0;

    while let Some(joined) = set.join_next().await {
        let (index, outcome) = match joined {
            Ok(pair) => pair,
            Err(e) => {
                // Counted once the missing slot is found below
                warn!(error = %e, "batch task aborted");
                continue;
            }
        };

        completed += 1;
        match &outcome {
            Ok(out) => {
                debug!(input = %inputs[index].display(), output = %out.display(), "item done")
            }
            Err(e) => warn!(input = %inputs[index].display(), error = %e, "item failed"),
        }

        on_progress(&BatchProgress {
            completed,
            total,
            input: inputs[index].clone(),
            succeeded: outcome.is_ok(),
        });
        outcomes[index] = Some(outcome);
    }

    let items = collect_items(inputs, outcomes, completed, &mut on_progress);
    let report = BatchReport { items };
    info!(succeeded = report.succeeded(), failed = report.failed(), "batch finished");
    report
}

/// Pair outcomes with inputs. Slots whose task never reported back become
/// `Worker` failures and still get a progress event, so progress ends at 100%.
fn collect_items<F>(
    inputs: Vec<PathBuf>,
    outcomes: Vec<Option<Result<PathBuf>>>,
    mut completed: usize,
    on_progress: &mut F,
) -> Vec<BatchItemResult>
where
    F: FnMut(&BatchProgress),
{
    let total = inputs.len();

    inputs
        .into_iter()
        .zip(outcomes)
        .map(|(input, outcome)| {
            let outcome = outcome.unwrap_or_else(|| {
                completed += 1;
                on_progress(&BatchProgress {
                    completed,
                    total,
                    input: input.clone(),
                    succeeded: false,
                });
                Err(PasscryptError::Worker("task did not complete".into()))
            });
            BatchItemResult { input, outcome }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn options(output_dir: &Path) -> BatchOptions {
        BatchOptions {
            output_dir: output_dir.to_path_buf(),
            jobs: 3,
            encrypted_suffix: ".encrypted".into(),
            kdf: KdfParams::new(1_000).unwrap(),
            overwrite: false,
        }
    }

    fn secret(s: &str) -> SecretString {
        SecretString::new(s.to_string())
    }

    fn no_temp_files(dir: &Path) -> bool {
        fs::read_dir(dir)
            .unwrap()
            .all(|e| !e.unwrap().file_name().to_string_lossy().ends_with(".tmp"))
    }

    fn seal_to(path: &Path, body: &[u8], stored_name: &str) {
        let sealed = crate::cipher::seal_file_with(
            body,
            "pw",
            stored_name,
            &KdfParams::new(1_000).unwrap(),
            crate::crypto::OsRandom,
        )
        .unwrap();
        fs::write(path, sealed).unwrap();
    }

    #[test]
    fn test_restored_name() {
        let suffix = ".encrypted";
        assert_eq!(restored_name("report.pdf", "x.encrypted", suffix), "report.pdf");
        assert_eq!(restored_name("../../etc/passwd", "x.encrypted", suffix), "passwd");
        assert_eq!(restored_name("C:\\Users\\a\\b.txt", "x.encrypted", suffix), "b.txt");
        assert_eq!(restored_name("", "notes.txt.encrypted", suffix), "notes.txt");
        assert_eq!(restored_name("..", "blob", suffix), "blob.decrypted");
        assert_eq!(restored_name("dir/", ".encrypted", suffix), ".encrypted.decrypted");
        assert_eq!(restored_name("a\nb", "x.enc", ".enc"), "x");
    }

    #[test]
    fn test_encrypted_name() {
        assert_eq!(encrypted_name("a.txt", ".encrypted"), "a.txt.encrypted");
    }

    #[test]
    fn test_progress_percent() {
        let p = BatchProgress {
            completed: 1,
            total: 3,
            input: PathBuf::from("a"),
            succeeded: true,
        };
        assert_eq!(p.percent(), 33);
    }

    #[test]
    fn test_unreported_items_still_reach_full_progress() {
        let inputs = vec![PathBuf::from("a"), PathBuf::from("b")];
        let outcomes = vec![Some(Ok(PathBuf::from("a.out"))), None];

        let mut events = Vec::new();
        let items = collect_items(inputs, outcomes, 1, &mut |p: &BatchProgress| {
            events.push((p.completed, p.percent(), p.input.clone(), p.succeeded))
        });

        assert_eq!(events, vec![(2, 100, PathBuf::from("b"), false)]);
        assert!(items[0].is_ok());
        assert!(matches!(items[1].outcome, Err(PasscryptError::Worker(_))));
    }

    #[test]
    fn test_output_claims_are_exclusive() {
        let claims = OutputClaims::default();
        claims.claim(Path::new("out/x.txt")).unwrap();
        claims.claim(Path::new("out/y.txt")).unwrap();

        let err = claims.claim(Path::new("out/x.txt")).unwrap_err();
        assert!(matches!(err, PasscryptError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_encrypt_then_decrypt_batch() {
        let src = tempfile::tempdir().unwrap();
        let enc = tempfile::tempdir().unwrap();
        let dec = tempfile::tempdir().unwrap();

        let files: [(&str, &[u8]); 3] = [
            ("a.txt", b"alpha"),
            ("b.bin", &[0u8, 1, 2, 255]),
            ("empty", b""),
        ];
        let mut inputs = Vec::new();
        for (name, body) in files {
            let path = src.path().join(name);
            fs::write(&path, body).unwrap();
            inputs.push(path);
        }

        let mut events = Vec::new();
        let report = run(
            inputs.clone(),
            BatchMode::Encrypt,
            secret("pw"),
            &options(enc.path()),
            |p| events.push(p.completed),
        )
        .await;
        assert!(report.is_success());
        assert_eq!(events, vec![1, 2, 3]);
        assert!(enc.path().join("a.txt.encrypted").exists());

        let encrypted: Vec<PathBuf> = report
            .items
            .into_iter()
            .map(|i| i.outcome.unwrap())
            .collect();
        let opts = options(dec.path());
        let report = run(encrypted, BatchMode::Decrypt, secret("pw"), &opts, |_| {}).await;
        assert!(report.is_success());

        assert_eq!(fs::read(dec.path().join("a.txt")).unwrap(), b"alpha");
        assert_eq!(fs::read(dec.path().join("b.bin")).unwrap(), vec![0u8, 1, 2, 255]);
        assert_eq!(fs::read(dec.path().join("empty")).unwrap(), Vec::<u8>::new());
        assert!(no_temp_files(enc.path()));
        assert!(no_temp_files(dec.path()));
    }

    #[tokio::test]
    async fn test_failures_are_reported_per_item() {
        let src = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();

        let good = src.path().join("good.encrypted");
        seal_to(&good, b"fine", "good.txt");

        let garbage = src.path().join("garbage.encrypted");
        fs::write(&garbage, b"too short").unwrap();

        let missing = src.path().join("missing.encrypted");

        let inputs = vec![garbage.clone(), good.clone(), missing.clone()];
        let opts = options(out.path());
        let report = run(inputs, BatchMode::Decrypt, secret("pw"), &opts, |_| {}).await;

        assert_eq!(report.succeeded(), 1);
        assert_eq!(report.failed(), 2);
        assert_eq!(report.items[0].input, garbage);
        assert!(report.items[0].outcome.as_ref().unwrap_err().is_malformed());
        assert!(report.items[1].is_ok());
        assert!(matches!(report.items[2].outcome, Err(PasscryptError::Io(_))));
        assert_eq!(fs::read(out.path().join("good.txt")).unwrap(), b"fine");
    }

    #[tokio::test]
    async fn test_same_basename_inputs_never_both_succeed() {
        for overwrite in [false, true] {
            for _ in 0..10 {
                let src = tempfile::tempdir().unwrap();
                let out = tempfile::tempdir().unwrap();

                let mut inputs = Vec::new();
                for (dir, body) in [("a", b"from a"), ("b", b"from b")] {
                    fs::create_dir(src.path().join(dir)).unwrap();
                    let path = src.path().join(dir).join("x.txt");
                    fs::write(&path, body).unwrap();
                    inputs.push(path);
                }

                let mut opts = options(out.path());
                opts.jobs = 2;
                opts.overwrite = overwrite;
                let report = run(inputs, BatchMode::Encrypt, secret("pw"), &opts, |_| {}).await;

                assert_eq!(report.succeeded(), 1);
                assert_eq!(report.failed(), 1);
                let failed = report.items.iter().find(|i| !i.is_ok()).unwrap();
                assert!(matches!(failed.outcome, Err(PasscryptError::InvalidInput(_))));
                assert_eq!(fs::read_dir(out.path()).unwrap().count(), 1);
            }
        }
    }

    #[tokio::test]
    async fn test_same_stored_name_on_decrypt_never_both_succeed() {
        let src = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();

        let first = src.path().join("one.encrypted");
        let second = src.path().join("two.encrypted");
        seal_to(&first, b"first", "same.txt");
        seal_to(&second, b"second", "same.txt");

        let mut opts = options(out.path());
        opts.jobs = 2;
        let inputs = vec![first, second];
        let report = run(inputs, BatchMode::Decrypt, secret("pw"), &opts, |_| {}).await;

        assert_eq!(report.succeeded(), 1);
        let failed = report.items.iter().find(|i| !i.is_ok()).unwrap();
        assert!(matches!(failed.outcome, Err(PasscryptError::InvalidInput(_))));

        let winner = report.items.iter().position(|i| i.is_ok()).unwrap();
        let expected: &[u8] = if winner == 0 { b"first" } else { b"second" };
        assert_eq!(fs::read(out.path().join("same.txt")).unwrap(), expected);
        assert!(no_temp_files(out.path()));
    }

    #[tokio::test]
    async fn test_wrong_password_writes_nothing() {
        let src = tempfile::tempdir().unwrap();
        let enc = tempfile::tempdir().unwrap();
        let dec = tempfile::tempdir().unwrap();

        let input = src.path().join("doc.txt");
        fs::write(&input, b"classified").unwrap();

        let enc_opts = options(enc.path());
        let encrypted = process_file(&input, BatchMode::Encrypt, secret("right"), &enc_opts)
            .await
            .unwrap();

        let dec_opts = options(dec.path());
        let err = process_file(&encrypted, BatchMode::Decrypt, secret("wrong"), &dec_opts)
            .await
            .unwrap_err();
        assert!(err.is_authentication());
        assert_eq!(fs::read_dir(dec.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_existing_output_is_not_overwritten() {
        let src = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();

        let input = src.path().join("a.txt");
        fs::write(&input, b"new").unwrap();
        let target = out.path().join("a.txt.encrypted");
        fs::write(&target, b"old").unwrap();

        let err = process_file(&input, BatchMode::Encrypt, secret("pw"), &options(out.path()))
            .await
            .unwrap_err();
        assert!(matches!(err, PasscryptError::InvalidInput(_)));
        assert_eq!(fs::read(&target).unwrap(), b"old");
        assert!(no_temp_files(out.path()));

        let mut opts = options(out.path());
        opts.overwrite = true;
        process_file(&input, BatchMode::Encrypt, secret("pw"), &opts)
            .await
            .unwrap();
        assert_ne!(fs::read(&target).unwrap(), b"old");
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let out = tempfile::tempdir().unwrap();
        let opts = options(out.path());
        let report = run(Vec::new(), BatchMode::Encrypt, secret("pw"), &opts, |_| {
            panic!("no progress expected")
        })
        .await;
        assert!(report.items.is_empty());
        assert!(report.is_success());
    }
}
