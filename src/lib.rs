//! claude-commit - conventional commit messages from pending git changes.
//!
//! # Overview
//!
//! claude-commit reads the staged (or all pending) changes of a repository,
//! renders a prompt in the configured language, and asks Claude for a commit
//! message through the local Claude Code CLI, the Anthropic API, or both in
//! order. The message can then be refined over several rounds of feedback.

pub mod claude;
pub mod commit;
pub mod config;
pub mod error;
pub mod llm;
pub mod process;

// Re-export commonly used types
pub use commit::{DiffBundle, DiffSourceMode, Language, RefinementSession};
pub use config::Config;
pub use error::{BackendError, BackendErrorKind, CommitError, ConfigError, DiffError, OrchestrationError, ValidationError};
pub use llm::{Backend, ClaudeBackend, MethodPreference, Progress};
