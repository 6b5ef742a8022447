//! Error types for claude-commit modules using thiserror.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::llm::router::Method;

/// Errors from diff retrieval.
#[derive(Error, Debug)]
pub enum DiffError {
    #[error("Failed to get git diff: could not run git: {0}")]
    SpawnFailed(#[source] std::io::Error),

    #[error("Failed to get git diff: `{command}` exited with code {code}: {stderr}")]
    GitFailed {
        command: String,
        code: i32,
        stderr: String,
    },

    #[error("Failed to get git diff: `{command}` produced more than {limit} bytes")]
    OutputTooLarge { command: String, limit: usize },

    #[error("Failed to get git diff: could not inspect repository history: {0}")]
    History(#[source] git2::Error),
}

/// Coarse classification of backend failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendErrorKind {
    NotAvailable,
    ProcessError,
    AuthMissing,
    SdkMissing,
    UpstreamError,
}

impl BackendErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendErrorKind::NotAvailable => "not-available",
            BackendErrorKind::ProcessError => "process-error",
            BackendErrorKind::AuthMissing => "auth-missing",
            BackendErrorKind::SdkMissing => "sdk-missing",
            BackendErrorKind::UpstreamError => "upstream-error",
        }
    }
}

impl fmt::Display for BackendErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors from the local CLI and remote API backends.
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Claude Code CLI not found. Install with: npm install -g @anthropic-ai/claude-code")]
    NotAvailable,

    #[error("Failed to spawn Claude process: {0}")]
    SpawnFailed(#[source] std::io::Error),

    #[error("Claude CLI exited with code {code}: {stderr}")]
    NonZeroExit { code: i32, stderr: String },

    #[error("Claude CLI output exceeded {limit} bytes")]
    OutputTooLarge { limit: usize },

    #[error("Claude process timed out after {0} seconds")]
    Timeout(u64),

    #[error(
        "ANTHROPIC_API_KEY not found. Set api_key in the config file or the ANTHROPIC_API_KEY environment variable"
    )]
    AuthMissing,

    #[error("Could not initialize the Anthropic API client: {0}")]
    SdkMissing(String),

    #[error("Anthropic API returned HTTP {status}: {body}")]
    UpstreamStatus { status: u16, body: String },

    #[error("Anthropic API request failed: {0}")]
    Upstream(String),
}

impl BackendError {
    pub fn kind(&self) -> BackendErrorKind {
        match self {
            BackendError::NotAvailable => BackendErrorKind::NotAvailable,
            BackendError::SpawnFailed(_)
            | BackendError::NonZeroExit { .. }
            | BackendError::OutputTooLarge { .. }
            | BackendError::Timeout(_) => BackendErrorKind::ProcessError,
            BackendError::AuthMissing => BackendErrorKind::AuthMissing,
            BackendError::SdkMissing(_) => BackendErrorKind::SdkMissing,
            BackendError::UpstreamStatus { .. } | BackendError::Upstream(_) => {
                BackendErrorKind::UpstreamError
            }
        }
    }
}

/// One failed attempt inside an `auto` plan.
#[derive(Debug)]
pub struct MethodFailure {
    pub method: Method,
    pub error: BackendError,
}

impl fmt::Display for MethodFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} error: {}", self.method, self.error)
    }
}

/// Errors from backend selection and fallback.
#[derive(Error, Debug)]
pub enum OrchestrationError {
    /// The user pinned a single method and it failed.
    #[error("{method} error: {source}")]
    Pinned {
        method: Method,
        #[source]
        source: BackendError,
    },

    /// Every method in the `auto` plan failed. The last entry is the final failure.
    #[error("{}", describe_failures(.failures))]
    Exhausted { failures: Vec<MethodFailure> },
}

impl OrchestrationError {
    /// The error that ended the run.
    pub fn final_error(&self) -> Option<&BackendError> {
        match self {
            OrchestrationError::Pinned { source, .. } => Some(source),
            OrchestrationError::Exhausted { failures } => failures.last().map(|f| &f.error),
        }
    }
}

fn describe_failures(failures: &[MethodFailure]) -> String {
    match failures {
        [] => "no generation method available".to_string(),
        [only] => only.error.to_string(),
        [earlier @ .., last] => {
            let earlier = earlier
                .iter()
                .map(|f| f.to_string())
                .collect::<Vec<_>>()
                .join("; ");
            format!("{} (after {})", last.error, earlier)
        }
    }
}

/// Rejected user input. Recovered locally by asking again.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please provide some feedback")]
    EmptyFeedback,

    #[error("Please provide a custom prompt")]
    EmptyCustomPrompt,
}

/// Errors from configuration loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("commit_style = \"custom\" requires a non-empty custom_template")]
    MissingCustomTemplate,
}

/// Errors surfaced by the host entry points.
#[derive(Error, Debug)]
pub enum CommitError {
    #[error(transparent)]
    Diff(#[from] DiffError),

    #[error("No changes to commit. Stage files first.")]
    NoChanges,

    #[error(transparent)]
    Generation(#[from] OrchestrationError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(
        "Custom prompt is only available in Claude Code managed mode. Enable 'claude_code_managed' and set 'preferred_method' to 'cli'."
    )]
    ManagedModeRequired,

    #[error("Cannot {action} while the session is {state}")]
    InvalidTransition {
        state: &'static str,
        action: &'static str,
    },

    #[error("Interactive prompt failed: {0}")]
    Interaction(#[source] std::io::Error),
}
