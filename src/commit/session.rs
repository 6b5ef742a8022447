//! Refinement session: generate once, then revise until the user accepts.
//!
//! ```text
//! Idle -> Generated -> (EditPrompting -> Generated)* -> Idle
//!                   -> (CustomPrompting -> Generated)* -> Idle   (managed mode)
//! ```
//!
//! Edits are built from the bundle retrieved for the first round, so every
//! round describes the same changes. Only the latest message is kept.

use std::fmt;
use std::io;
use std::path::Path;

use tracing::debug;

use crate::commit::diff::DiffBundle;
use crate::commit::message::{build_initial_prompt, edit_with_bundle, run_prompt};
use crate::commit::prompt::build_managed_prompt;
use crate::config::Config;
use crate::error::{CommitError, ValidationError};
use crate::llm::backend::Backend;
use crate::llm::router::Progress;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Generated,
    EditPrompting,
    CustomPrompting,
}

impl SessionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::Generated => "generated",
            SessionState::EditPrompting => "collecting feedback",
            SessionState::CustomPrompting => "collecting a custom prompt",
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The refinement branch available from `Generated`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Refinement {
    EditWithFeedback,
    CustomPrompt,
}

/// What the user picked after seeing a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    Accept,
    Refine,
}

/// Conversational state over one set of changes.
pub struct RefinementSession<'a> {
    config: &'a Config,
    backend: &'a dyn Backend,
    state: SessionState,
    bundle: Option<DiffBundle>,
    message: Option<String>,
}

impl<'a> RefinementSession<'a> {
    pub fn new(config: &'a Config, backend: &'a dyn Backend) -> Self {
        Self {
            config,
            backend,
            state: SessionState::Idle,
            bundle: None,
            message: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn current_message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// The bundle every edit round is built from. `None` in managed mode.
    pub fn original_bundle(&self) -> Option<&DiffBundle> {
        self.bundle.as_ref()
    }

    /// Managed mode offers custom prompts; otherwise edits.
    pub fn refinement(&self) -> Refinement {
        if self.config.is_managed() {
            Refinement::CustomPrompt
        } else {
            Refinement::EditWithFeedback
        }
    }

    /// `Idle -> Generated`: retrieve the changes and generate the first message.
    pub async fn start(
        &mut self,
        repo_path: &Path,
        progress: Progress<'_>,
    ) -> Result<&str, CommitError> {
        self.expect_state(SessionState::Idle, "start generating")?;

        let initial = build_initial_prompt(repo_path, self.config, progress).await?;
        let message = run_prompt(self.config, self.backend, &initial.prompt, progress).await?;

        self.bundle = initial.bundle;
        Ok(self.enter_generated(message))
    }

    /// `Generated -> EditPrompting` or `Generated -> CustomPrompting`.
    pub fn begin_refinement(&mut self) -> Result<Refinement, CommitError> {
        self.expect_state(SessionState::Generated, "refine the message")?;

        let refinement = self.refinement();
        self.transition(match refinement {
            Refinement::EditWithFeedback => SessionState::EditPrompting,
            Refinement::CustomPrompt => SessionState::CustomPrompting,
        });
        Ok(refinement)
    }

    /// Back to `Generated` without a round, e.g. when the user dismisses the input.
    pub fn cancel_refinement(&mut self) -> Result<(), CommitError> {
        match self.state {
            SessionState::EditPrompting | SessionState::CustomPrompting => {
                self.transition(SessionState::Generated);
                Ok(())
            }
            state => Err(CommitError::InvalidTransition {
                state: state.as_str(),
                action: "cancel a refinement",
            }),
        }
    }

    /// `EditPrompting -> Generated` with a message revised by `feedback`.
    ///
    /// Blank feedback returns to `Generated` with no call made. A generation
    /// failure ends the session.
    pub async fn submit_feedback(
        &mut self,
        feedback: &str,
        progress: Progress<'_>,
    ) -> Result<&str, CommitError> {
        self.expect_state(SessionState::EditPrompting, "submit feedback")?;

        if feedback.trim().is_empty() {
            self.transition(SessionState::Generated);
            return Err(ValidationError::EmptyFeedback.into());
        }

        let bundle = self.bundle.clone().unwrap_or_default();
        let current = self.message.clone().unwrap_or_default();

        let result =
            edit_with_bundle(self.config, self.backend, &current, feedback, &bundle, progress)
                .await;
        self.finish_round(result)
    }

    /// `CustomPrompting -> Generated` with a fresh managed-mode message.
    ///
    /// Blank instructions return to `Generated` with no call made. A
    /// generation failure ends the session.
    pub async fn submit_custom_prompt(
        &mut self,
        instruction: &str,
        progress: Progress<'_>,
    ) -> Result<&str, CommitError> {
        self.expect_state(SessionState::CustomPrompting, "submit a custom prompt")?;

        if instruction.trim().is_empty() {
            self.transition(SessionState::Generated);
            return Err(ValidationError::EmptyCustomPrompt.into());
        }

        let prompt = build_managed_prompt(
            self.config.language,
            &self.config.managed_options(instruction),
        );
        let result = run_prompt(self.config, self.backend, &prompt, progress).await;
        self.finish_round(result)
    }

    /// `Generated -> Idle`, handing back the accepted message.
    pub fn accept(&mut self) -> Result<String, CommitError> {
        self.expect_state(SessionState::Generated, "accept the message")?;
        self.transition(SessionState::Idle);
        self.bundle = None;
        self.message.take().ok_or(CommitError::InvalidTransition {
            state: SessionState::Idle.as_str(),
            action: "accept the message",
        })
    }

    fn finish_round(&mut self, result: Result<String, CommitError>) -> Result<&str, CommitError> {
        match result {
            Ok(message) => Ok(self.enter_generated(message)),
            Err(e) => {
                self.reset();
                Err(e)
            }
        }
    }

    fn enter_generated(&mut self, message: String) -> &str {
        self.transition(SessionState::Generated);
        self.message.insert(message).as_str()
    }

    fn reset(&mut self) {
        self.transition(SessionState::Idle);
        self.bundle = None;
        self.message = None;
    }

    fn transition(&mut self, next: SessionState) {
        debug!("Session: {} -> {}", self.state, next);
        self.state = next;
    }

    fn expect_state(&self, expected: SessionState, action: &'static str) -> Result<(), CommitError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(CommitError::InvalidTransition {
                state: self.state.as_str(),
                action,
            })
        }
    }
}

/// User-facing side of a session: showing messages and collecting input.
///
/// `None` from an `ask_*` method means the user dismissed the input.
pub trait Interaction {
    fn show_message(&mut self, message: &str);

    fn choose(&mut self, refinement: Refinement) -> io::Result<Choice>;

    fn ask_feedback(&mut self) -> io::Result<Option<String>>;

    fn ask_custom_prompt(&mut self) -> io::Result<Option<String>>;

    fn show_validation(&mut self, error: &ValidationError);
}

/// Drive a session from `Idle` back to `Idle` and return the accepted message.
pub async fn run_session(
    session: &mut RefinementSession<'_>,
    repo_path: &Path,
    ui: &mut dyn Interaction,
    progress: Progress<'_>,
) -> Result<String, CommitError> {
    let message = session.start(repo_path, progress).await?;
    ui.show_message(message);

    loop {
        let refinement = session.refinement();
        if ui.choose(refinement).map_err(CommitError::Interaction)? == Choice::Accept {
            return session.accept();
        }

        session.begin_refinement()?;

        let input = match refinement {
            Refinement::EditWithFeedback => ui.ask_feedback(),
            Refinement::CustomPrompt => ui.ask_custom_prompt(),
        }
        .map_err(CommitError::Interaction)?;

        let Some(input) = input else {
            session.cancel_refinement()?;
            continue;
        };

        let round = match refinement {
            Refinement::EditWithFeedback => session.submit_feedback(&input, progress).await,
            Refinement::CustomPrompt => session.submit_custom_prompt(&input, progress).await,
        };

        match round {
            Ok(message) => ui.show_message(message),
            Err(CommitError::Validation(error)) => ui.show_validation(&error),
            Err(e) => return Err(e),
        }
    }
}
