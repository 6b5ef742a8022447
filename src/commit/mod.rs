//! Commit message generation: diff retrieval, prompts, entry points and the
//! refinement session.

pub mod diff;
pub mod message;
pub mod prompt;
pub mod session;

pub use diff::{DiffBundle, DiffSourceMode, get_diff};
pub use message::{edit_commit_message, generate, generate_with_custom_prompt};
pub use prompt::{
    CommitStyle, Language, ManagedOptions, build_edit_prompt, build_generation_prompt,
    build_managed_prompt,
};
pub use session::{Choice, Interaction, Refinement, RefinementSession, SessionState, run_session};
