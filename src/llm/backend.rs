//! Backend trait seam over the local CLI and the remote API.

use std::path::PathBuf;

use async_trait::async_trait;

use crate::claude::{self, ApiSettings};
use crate::config::Config;
use crate::error::BackendError;

/// Runs a rendered prompt against either generation backend.
///
/// Both methods return a single message: the CLI half applies output
/// extraction, the API half returns the trimmed response text.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Backend: Send + Sync {
    /// Lightweight presence probe for the local tool.
    fn has_cli(&self) -> bool;

    async fn run_cli(&self, prompt: &str) -> Result<String, BackendError>;

    async fn run_api(&self, prompt: &str) -> Result<String, BackendError>;
}

/// Production backend: `claude -p` (or the configured command) and the
/// Anthropic Messages API.
#[derive(Debug, Clone)]
pub struct ClaudeBackend {
    cli_command: String,
    working_dir: Option<PathBuf>,
    api: ApiSettings,
}

impl ClaudeBackend {
    pub fn new(cli_command: impl Into<String>, api: ApiSettings) -> Self {
        Self {
            cli_command: cli_command.into(),
            working_dir: None,
            api,
        }
    }

    /// Start the CLI in `dir` instead of the current directory.
    pub fn in_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.cli_command.clone(), config.api_settings())
    }
}

#[async_trait]
impl Backend for ClaudeBackend {
    fn has_cli(&self) -> bool {
        claude::has_cli(&self.cli_command)
    }

    async fn run_cli(&self, prompt: &str) -> Result<String, BackendError> {
        claude::run_cli(&self.cli_command, prompt, self.working_dir.as_deref()).await
    }

    async fn run_api(&self, prompt: &str) -> Result<String, BackendError> {
        claude::run_api(&self.api, prompt).await
    }
}
