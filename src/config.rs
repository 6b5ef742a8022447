//! Configuration assembled once by the host and passed into every entry point.
//!
//! Precedence, lowest first:
//!   1. Built-in defaults
//!   2. TOML file: `--config <path>`, else `<repo>/.claude-commit.toml`,
//!      else `~/.config/claude-commit.toml`
//!   3. Command-line flags ([`Overrides`])

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::claude::ApiSettings;
use crate::claude::api::{DEFAULT_API_BASE_URL, DEFAULT_MODEL};
use crate::claude::subprocess::DEFAULT_CLI_COMMAND;
use crate::commit::diff::DiffSourceMode;
use crate::commit::prompt::{CommitStyle, Language, ManagedOptions};
use crate::error::ConfigError;
use crate::llm::router::MethodPreference;

/// Per-repository config file name.
pub const REPO_CONFIG_FILE: &str = ".claude-commit.toml";

/// Per-user config file name under `~/.config`.
pub const USER_CONFIG_FILE: &str = "claude-commit.toml";

#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub language: Language,
    pub preferred_method: MethodPreference,
    pub api_key: Option<String>,
    /// Let the local Claude agent inspect the changes itself.
    pub claude_code_managed: bool,
    pub diff_source: DiffSourceMode,
    pub commit_style: CommitStyle,
    pub custom_template: Option<String>,
    pub multi_line: bool,
    pub keep_co_authored_by: bool,
    pub model: String,
    pub api_base_url: String,
    pub cli_command: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            language: Language::default(),
            preferred_method: MethodPreference::default(),
            api_key: None,
            claude_code_managed: false,
            diff_source: DiffSourceMode::default(),
            commit_style: CommitStyle::default(),
            custom_template: None,
            multi_line: false,
            keep_co_authored_by: false,
            model: DEFAULT_MODEL.to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            cli_command: DEFAULT_CLI_COMMAND.to_string(),
        }
    }
}

// Hand-written so the API key never ends up in logs.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("language", &self.language)
            .field("preferred_method", &self.preferred_method)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("claude_code_managed", &self.claude_code_managed)
            .field("diff_source", &self.diff_source)
            .field("commit_style", &self.commit_style)
            .field("custom_template", &self.custom_template)
            .field("multi_line", &self.multi_line)
            .field("keep_co_authored_by", &self.keep_co_authored_by)
            .field("model", &self.model)
            .field("api_base_url", &self.api_base_url)
            .field("cli_command", &self.cli_command)
            .finish()
    }
}

/// Values given on the command line. `None` keeps the file/default value.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub language: Option<Language>,
    pub preferred_method: Option<MethodPreference>,
    pub diff_source: Option<DiffSourceMode>,
    pub commit_style: Option<CommitStyle>,
    pub multi_line: Option<bool>,
    pub managed: Option<bool>,
    pub model: Option<String>,
    pub cli_command: Option<String>,
}

impl Config {
    /// Load the first config file found for `repo_path`, or the defaults.
    ///
    /// An explicit path must exist. The implicit locations are optional.
    pub fn load(explicit: Option<&Path>, repo_path: &Path) -> Result<Self, ConfigError> {
        let path = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => implicit_config_path(repo_path),
        };

        match path {
            Some(path) => Self::from_file(&path),
            None => {
                debug!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        debug!("Loading config from {}", path.display());

        let data = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&data).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn with_overrides(mut self, overrides: Overrides) -> Self {
        if let Some(language) = overrides.language {
            self.language = language;
        }
        if let Some(method) = overrides.preferred_method {
            self.preferred_method = method;
        }
        if let Some(source) = overrides.diff_source {
            self.diff_source = source;
        }
        if let Some(style) = overrides.commit_style {
            self.commit_style = style;
        }
        if let Some(multi_line) = overrides.multi_line {
            self.multi_line = multi_line;
        }
        if let Some(managed) = overrides.managed {
            self.claude_code_managed = managed;
        }
        if let Some(model) = overrides.model {
            self.model = model;
        }
        if let Some(command) = overrides.cli_command {
            self.cli_command = command;
        }
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.commit_style == CommitStyle::Custom && self.custom_template().is_none() {
            return Err(ConfigError::MissingCustomTemplate);
        }
        Ok(())
    }

    /// Managed mode needs both the flag and a pinned CLI.
    pub fn is_managed(&self) -> bool {
        self.claude_code_managed && self.preferred_method == MethodPreference::Cli
    }

    /// The custom template, if set to something non-blank.
    pub fn custom_template(&self) -> Option<&str> {
        self.custom_template
            .as_deref()
            .filter(|template| !template.trim().is_empty())
    }

    pub fn api_settings(&self) -> ApiSettings {
        ApiSettings {
            api_key: self.api_key.clone(),
            model: self.model.clone(),
            base_url: self.api_base_url.clone(),
        }
    }

    pub fn managed_options<'a>(&self, custom_instruction: &'a str) -> ManagedOptions<'a> {
        ManagedOptions {
            keep_co_authored_by: self.keep_co_authored_by,
            multi_line: self.multi_line,
            diff_source: self.diff_source,
            custom_instruction,
        }
    }
}

fn implicit_config_path(repo_path: &Path) -> Option<PathBuf> {
    let repo_config = repo_path.join(REPO_CONFIG_FILE);
    if repo_config.is_file() {
        return Some(repo_config);
    }

    user_config_path().filter(|path| path.is_file())
}

/// Return `~/.config/claude-commit.toml`
fn user_config_path() -> Option<PathBuf> {
    let home = dirs::home_dir()?;
    Some(home.join(".config").join(USER_CONFIG_FILE))
}
