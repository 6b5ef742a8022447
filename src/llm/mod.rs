//! Backend selection and fallback.

pub mod backend;
pub mod router;

pub use backend::{Backend, ClaudeBackend};
pub use router::{Completion, Method, MethodPreference, Orchestrator, Progress};
