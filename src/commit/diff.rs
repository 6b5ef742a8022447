//! Diff retrieval from a repository path.
//!
//! Diff text and stat summaries come from `git diff` subprocesses (unified
//! context of one line, 10 MiB ceiling). `git2` is only used to tell a fresh
//! repository apart from one with history.

use std::fmt;
use std::path::Path;

use git2::{ErrorCode, Repository};
use serde::Deserialize;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::error::DiffError;
use crate::process::{CaptureError, OUTPUT_LIMIT, run_capped};

/// Which changes to summarize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DiffSourceMode {
    /// Index only.
    Staged,
    /// Everything since the latest commit.
    All,
    /// Staged, or everything when nothing is staged.
    #[default]
    Auto,
}

impl DiffSourceMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiffSourceMode::Staged => "staged",
            DiffSourceMode::All => "all",
            DiffSourceMode::Auto => "auto",
        }
    }
}

impl fmt::Display for DiffSourceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Paired diff text and `--stat` summary for one comparison basis.
///
/// Never truncated here; prompt construction applies its own cap.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffBundle {
    pub diff: String,
    pub stats: String,
}

impl DiffBundle {
    pub fn new(diff: impl Into<String>, stats: impl Into<String>) -> Self {
        Self {
            diff: diff.into(),
            stats: stats.into(),
        }
    }

    /// True when neither the diff nor the stats carry any content.
    pub fn is_blank(&self) -> bool {
        self.diff.trim().is_empty() && self.stats.trim().is_empty()
    }

    /// Combine two bundles field by field, newline-joined, `self` first.
    ///
    /// Empty fields are skipped so a one-sided change is returned unchanged.
    fn join(self, other: DiffBundle) -> DiffBundle {
        DiffBundle {
            diff: join_nonempty(self.diff, other.diff),
            stats: join_nonempty(self.stats, other.stats),
        }
    }
}

fn join_nonempty(first: String, second: String) -> String {
    match (first.is_empty(), second.is_empty()) {
        (_, true) => first,
        (true, false) => second,
        (false, false) => format!("{first}\n{second}"),
    }
}

/// Retrieve the diff bundle for `repo_path` according to `mode`.
pub async fn get_diff(repo_path: &Path, mode: DiffSourceMode) -> Result<DiffBundle, DiffError> {
    let bundle = match mode {
        DiffSourceMode::Staged => staged_diff(repo_path).await?,
        DiffSourceMode::All => all_diff(repo_path).await?,
        DiffSourceMode::Auto => match staged_diff(repo_path).await {
            Ok(staged) if !staged.diff.trim().is_empty() => staged,
            Ok(_) => {
                debug!("No staged changes, falling back to all changes");
                all_diff(repo_path).await?
            }
            Err(e) => {
                warn!("Staged diff failed ({e}), falling back to all changes");
                all_diff(repo_path).await?
            }
        },
    };

    debug!(
        "Diff ({}): {} bytes, stats {} bytes",
        mode,
        bundle.diff.len(),
        bundle.stats.len()
    );

    Ok(bundle)
}

/// Changes in the index.
async fn staged_diff(repo_path: &Path) -> Result<DiffBundle, DiffError> {
    query_bundle(repo_path, &["diff", "--cached"]).await
}

/// Changes in the working tree not yet in the index.
async fn unstaged_diff(repo_path: &Path) -> Result<DiffBundle, DiffError> {
    query_bundle(repo_path, &["diff"]).await
}

/// All pending changes: against HEAD, or staged + unstaged in a repository
/// without commits.
async fn all_diff(repo_path: &Path) -> Result<DiffBundle, DiffError> {
    if has_commits(repo_path)? {
        return query_bundle(repo_path, &["diff", "HEAD"]).await;
    }

    debug!("Repository has no commits, combining staged and unstaged changes");
    let (staged, unstaged) = tokio::try_join!(staged_diff(repo_path), unstaged_diff(repo_path))?;
    Ok(staged.join(unstaged))
}

/// Run the diff and stat variants of one query concurrently.
async fn query_bundle(repo_path: &Path, base: &[&str]) -> Result<DiffBundle, DiffError> {
    let diff_args: Vec<&str> = base
        .iter()
        .copied()
        .chain(["--no-color", "--no-ext-diff", "--unified=1"])
        .collect();
    let stat_args: Vec<&str> = base
        .iter()
        .copied()
        .chain(["--no-color", "--no-ext-diff", "--stat"])
        .collect();

    let (diff, stats) = tokio::try_join!(git(repo_path, &diff_args), git(repo_path, &stat_args))?;
    Ok(DiffBundle { diff, stats })
}

async fn git(repo_path: &Path, args: &[&str]) -> Result<String, DiffError> {
    let mut command = Command::new("git");
    command.args(args).current_dir(repo_path);

    let output = run_capped(command, None, OUTPUT_LIMIT)
        .await
        .map_err(|e| match e {
            CaptureError::Spawn(e) | CaptureError::Io(e) => DiffError::SpawnFailed(e),
            CaptureError::TooLarge { limit } => DiffError::OutputTooLarge {
                command: format!("git {}", args.join(" ")),
                limit,
            },
        })?;

    if !output.status.success() {
        return Err(DiffError::GitFailed {
            command: format!("git {}", args.join(" ")),
            code: output.code(),
            stderr: output.stderr_lossy().trim().to_string(),
        });
    }

    Ok(output.stdout_lossy())
}

/// Whether HEAD resolves to a commit.
///
/// `repo_path` may be any directory inside the working tree, as for `git`.
/// Returns `Ok(false)` for repos with no commits (unborn branch / not found)
/// and `Err` for real failures (not a repository, corrupt HEAD).
fn has_commits(repo_path: &Path) -> Result<bool, DiffError> {
    let repo = Repository::discover(repo_path).map_err(DiffError::History)?;

    match repo.head() {
        Ok(head) => {
            head.peel_to_commit().map_err(DiffError::History)?;
            Ok(true)
        }
        Err(e) if e.code() == ErrorCode::UnbornBranch || e.code() == ErrorCode::NotFound => {
            Ok(false)
        }
        Err(e) => Err(DiffError::History(e)),
    }
}
