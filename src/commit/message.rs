//! Host entry points: one generation round each.
//!
//! Every entry point takes the [`Config`] assembled by the host and the
//! [`Backend`] to run against, and returns the plain message text.

use std::path::Path;

use tracing::{debug, info};

use crate::commit::diff::{DiffBundle, get_diff};
use crate::commit::prompt::{build_edit_prompt, build_generation_prompt, build_managed_prompt};
use crate::config::Config;
use crate::error::{CommitError, ValidationError};
use crate::llm::backend::Backend;
use crate::llm::router::{Orchestrator, Progress};

/// Prompt for a first round plus the bundle it was built from.
///
/// `bundle` is `None` in managed mode, where no diff is retrieved.
#[derive(Debug, Clone)]
pub struct InitialPrompt {
    pub prompt: String,
    pub bundle: Option<DiffBundle>,
}

/// Build the prompt for a fresh message.
///
/// Outside managed mode this retrieves the diff and fails with
/// [`CommitError::NoChanges`] when there is nothing to describe.
pub async fn build_initial_prompt(
    repo_path: &Path,
    config: &Config,
    progress: Progress<'_>,
) -> Result<InitialPrompt, CommitError> {
    if config.is_managed() {
        debug!("Managed mode: the CLI inspects the changes itself");
        return Ok(InitialPrompt {
            prompt: build_managed_prompt(config.language, &config.managed_options("")),
            bundle: None,
        });
    }

    progress.report("Retrieving diff...");
    let bundle = get_diff(repo_path, config.diff_source).await?;

    if bundle.is_blank() {
        return Err(CommitError::NoChanges);
    }

    let prompt = build_generation_prompt(
        &bundle,
        config.language,
        config.commit_style,
        config.multi_line,
        config.custom_template(),
    );

    Ok(InitialPrompt {
        prompt,
        bundle: Some(bundle),
    })
}

/// Run a rendered prompt through the configured method preference.
pub async fn run_prompt(
    config: &Config,
    backend: &dyn Backend,
    prompt: &str,
    progress: Progress<'_>,
) -> Result<String, CommitError> {
    let completion = Orchestrator::new(backend, config.preferred_method)
        .generate(prompt, progress)
        .await?;

    if !completion.earlier_failures.is_empty() {
        info!(
            "Used {} after {} failed attempt(s)",
            completion.method,
            completion.earlier_failures.len()
        );
    }

    Ok(completion.message)
}

/// Generate a commit message for the pending changes in `repo_path`.
pub async fn generate(
    repo_path: &Path,
    config: &Config,
    backend: &dyn Backend,
    progress: Progress<'_>,
) -> Result<String, CommitError> {
    let initial = build_initial_prompt(repo_path, config, progress).await?;
    run_prompt(config, backend, &initial.prompt, progress).await
}

/// Generate a commit message guided by a free-text instruction.
///
/// Only available in managed mode; the instruction is appended to the
/// managed prompt and the CLI inspects the changes itself.
pub async fn generate_with_custom_prompt(
    config: &Config,
    backend: &dyn Backend,
    instruction: &str,
    progress: Progress<'_>,
) -> Result<String, CommitError> {
    if !config.is_managed() {
        return Err(CommitError::ManagedModeRequired);
    }
    if instruction.trim().is_empty() {
        return Err(ValidationError::EmptyCustomPrompt.into());
    }

    let prompt = build_managed_prompt(config.language, &config.managed_options(instruction));
    run_prompt(config, backend, &prompt, progress).await
}

/// Revise `current_message` according to `feedback`, against a freshly
/// retrieved diff.
pub async fn edit_commit_message(
    repo_path: &Path,
    config: &Config,
    backend: &dyn Backend,
    current_message: &str,
    feedback: &str,
    progress: Progress<'_>,
) -> Result<String, CommitError> {
    if feedback.trim().is_empty() {
        return Err(ValidationError::EmptyFeedback.into());
    }

    progress.report("Retrieving diff...");
    let bundle = get_diff(repo_path, config.diff_source).await?;

    edit_with_bundle(config, backend, current_message, feedback, &bundle, progress).await
}

/// Revise `current_message` against an already retrieved bundle.
pub(crate) async fn edit_with_bundle(
    config: &Config,
    backend: &dyn Backend,
    current_message: &str,
    feedback: &str,
    bundle: &DiffBundle,
    progress: Progress<'_>,
) -> Result<String, CommitError> {
    let prompt = build_edit_prompt(current_message, feedback, bundle, config.language);
    run_prompt(config, backend, &prompt, progress).await
}
