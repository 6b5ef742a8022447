//! Claude backends: the local CLI and the remote Messages API.

pub mod api;
pub mod extract;
pub mod subprocess;

pub use api::{ApiSettings, resolve_api_key, run_api};
pub use extract::extract_commit_message;
pub use subprocess::{has_cli, run_cli};
