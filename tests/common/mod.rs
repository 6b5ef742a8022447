//! Shared test utilities for integration tests.
//!
//! Not all functions are used by every test file, but they're shared across tests.
#![allow(dead_code)]

use std::fs::{self, File};
use std::io::Write;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use git2::{Oid, Repository, Signature};
use tempfile::TempDir;

use claude_commit::error::BackendError;
use claude_commit::llm::Backend;

/// A test git repository builder for integration tests.
pub struct TestRepo {
    pub dir: TempDir,
    pub repo: Repository,
}

impl TestRepo {
    /// Create a new empty git repository in a temp directory.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp directory");
        let repo = Repository::init(dir.path()).expect("Failed to init git repo");
        Self { dir, repo }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Get the test signature for commits.
    fn signature(&self) -> Signature<'_> {
        Signature::now("Test User", "test@example.com").expect("Failed to create signature")
    }

    /// Write `content` to `name` in the working tree without staging it.
    pub fn write(&self, name: &str, content: &str) {
        let file_path = self.dir.path().join(name);
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        fs::write(&file_path, content).expect("Failed to write test file");
    }

    /// Add `name` to the index.
    pub fn stage(&self, name: &str) {
        let mut index = self.repo.index().expect("Failed to get index");
        index.add_path(Path::new(name)).expect("Failed to add file");
        index.write().expect("Failed to write index");
    }

    /// Write and stage in one step.
    pub fn write_staged(&self, name: &str, content: &str) {
        self.write(name, content);
        self.stage(name);
    }

    /// Commit the current index. Returns the commit OID.
    pub fn commit(&self, message: &str) -> Oid {
        let sig = self.signature();

        let mut index = self.repo.index().expect("Failed to get index");
        let tree_id = index.write_tree().expect("Failed to write tree");
        let tree = self.repo.find_tree(tree_id).expect("Failed to find tree");

        // Get parent commit if exists
        let parent = self.repo.head().ok().and_then(|h| h.peel_to_commit().ok());

        let parents: Vec<&git2::Commit> = parent.iter().collect();

        self.repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .expect("Failed to create commit")
    }

    /// Commit a single file with `content`.
    pub fn commit_file(&self, name: &str, content: &str, message: &str) -> Oid {
        self.write_staged(name, content);
        self.commit(message)
    }
}

/// Create an executable shell script and return the temp directory + script path.
pub fn create_mock_script(script_content: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let script_path = temp_dir.path().join("mock_claude.sh");

    let mut file = File::create(&script_path).expect("Failed to create mock script");
    file.write_all(script_content.as_bytes())
        .expect("Failed to write mock script");

    // Make executable
    let mut perms = fs::metadata(&script_path)
        .expect("Failed to get metadata")
        .permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&script_path, perms).expect("Failed to set permissions");

    (temp_dir, script_path)
}

/// Scripted backend that records every prompt it receives.
///
/// Replies are consumed in order; running out is a test bug.
pub struct ScriptedBackend {
    cli_available: bool,
    cli_replies: Mutex<Vec<Result<String, BackendError>>>,
    api_replies: Mutex<Vec<Result<String, BackendError>>>,
    pub calls: Mutex<Vec<(&'static str, String)>>,
}

impl ScriptedBackend {
    pub fn new(cli_available: bool) -> Self {
        Self {
            cli_available,
            cli_replies: Mutex::new(Vec::new()),
            api_replies: Mutex::new(Vec::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn cli_reply(self, reply: Result<&str, BackendError>) -> Self {
        self.cli_replies.lock().unwrap().push(reply.map(str::to_string));
        self
    }

    pub fn api_reply(self, reply: Result<&str, BackendError>) -> Self {
        self.api_replies.lock().unwrap().push(reply.map(str::to_string));
        self
    }

    pub fn calls(&self) -> Vec<(&'static str, String)> {
        self.calls.lock().unwrap().clone()
    }

    fn next(&self, method: &'static str, prompt: &str) -> Result<String, BackendError> {
        self.calls.lock().unwrap().push((method, prompt.to_string()));
        let replies = match method {
            "cli" => &self.cli_replies,
            _ => &self.api_replies,
        };
        let mut replies = replies.lock().unwrap();
        assert!(!replies.is_empty(), "unexpected {} call", method);
        replies.remove(0)
    }
}

#[async_trait]
impl Backend for ScriptedBackend {
    fn has_cli(&self) -> bool {
        self.cli_available
    }

    async fn run_cli(&self, prompt: &str) -> Result<String, BackendError> {
        self.next("cli", prompt)
    }

    async fn run_api(&self, prompt: &str) -> Result<String, BackendError> {
        self.next("api", prompt)
    }
}
