//! Claude CLI spawning.

use std::env;
use std::path::Path;
use std::time::Duration;

use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::error::BackendError;
use crate::process::{CaptureError, OUTPUT_LIMIT, run_capped};

use super::extract::extract_commit_message;

/// Shell used to run the configured CLI command.
const SHELL: &str = "/bin/bash";

/// Command line that reads a prompt on stdin and prints the answer.
pub const DEFAULT_CLI_COMMAND: &str = "claude -p";

/// Environment variable enabling a timeout for the CLI (seconds).
const TIMEOUT_ENV_VAR: &str = "CLAUDE_COMMIT_CLI_TIMEOUT";

/// Get the configured timeout, if any.
///
/// Unset or empty means the CLI may run indefinitely. An invalid value is
/// logged and ignored.
fn get_timeout() -> Option<Duration> {
    match env::var(TIMEOUT_ENV_VAR) {
        Ok(v) if !v.is_empty() => match v.parse::<u64>() {
            Ok(secs) => Some(Duration::from_secs(secs)),
            Err(_) => {
                warn!("Invalid {} value '{}', running without a timeout", TIMEOUT_ENV_VAR, v);
                None
            }
        },
        _ => None,
    }
}

/// The executable a CLI command line starts with.
fn cli_program(command: &str) -> Option<&str> {
    command.split_whitespace().next()
}

/// Check whether the CLI executable is on `PATH` (or exists, for a path).
///
/// Uses the `which` crate for cross-platform executable detection. A missing
/// CLI is not an error, only a signal for backend selection.
pub fn has_cli(command: &str) -> bool {
    let available = cli_program(command).is_some_and(|program| which::which(program).is_ok());
    debug!("CLI '{}' available: {}", command, available);
    available
}

/// Run the CLI with `prompt` on stdin and extract one commit message line.
///
/// `current_dir` is where the CLI starts; a managed agent inspects the
/// repository it is started in.
pub async fn run_cli(
    command: &str,
    prompt: &str,
    current_dir: Option<&Path>,
) -> Result<String, BackendError> {
    let stdout = run_cli_raw(command, prompt, current_dir).await?;
    Ok(extract_commit_message(&stdout))
}

/// Run the CLI with `prompt` on stdin and return its raw stdout.
///
/// The command runs under a fixed shell with stdout capped at 10 MiB.
/// Setting `CLAUDE_COMMIT_CLI_TIMEOUT` bounds the run time; otherwise a hung
/// CLI blocks until it exits.
pub async fn run_cli_raw(
    command: &str,
    prompt: &str,
    current_dir: Option<&Path>,
) -> Result<String, BackendError> {
    let mut shell = Command::new(SHELL);
    shell.arg("-c").arg(command);
    if let Some(dir) = current_dir {
        shell.current_dir(dir);
    }

    debug!("Running CLI '{}' with {} byte prompt", command, prompt.len());

    let run = run_capped(shell, Some(prompt.as_bytes()), OUTPUT_LIMIT);
    let result = match get_timeout() {
        Some(limit) => timeout(limit, run)
            .await
            .map_err(|_| BackendError::Timeout(limit.as_secs()))?,
        None => run.await,
    };

    let output = result.map_err(|e| match e {
        CaptureError::Spawn(e) | CaptureError::Io(e) => BackendError::SpawnFailed(e),
        CaptureError::TooLarge { limit } => BackendError::OutputTooLarge { limit },
    })?;

    if !output.status.success() {
        return Err(BackendError::NonZeroExit {
            code: output.code(),
            stderr: output.stderr_lossy(),
        });
    }

    Ok(output.stdout_lossy())
}
