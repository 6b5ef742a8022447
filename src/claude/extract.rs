//! Commit message extraction from raw CLI output.
//!
//! The CLI may wrap its answer in explanations, so the answer is taken to be
//! the conventional-commit-shaped line closest to the end of the output.

use std::sync::LazyLock;

use regex_lite::Regex;

/// Returned when the CLI produced no non-blank output at all.
pub const FALLBACK_MESSAGE: &str = "chore: update code";

static CONVENTIONAL_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(feat|fix|docs|style|refactor|test|chore|perf)(\(.+\))?:.+").expect("Invalid regex")
});

/// Whether `line` looks like `type(scope): subject` with a known type.
pub fn is_conventional_line(line: &str) -> bool {
    CONVENTIONAL_LINE.is_match(line)
}

/// Pick one commit message line out of raw CLI output.
///
/// Lines are trimmed and blank lines dropped. Scanning from the last line
/// backward, the first conventional line wins; otherwise the last non-blank
/// line; otherwise [`FALLBACK_MESSAGE`].
pub fn extract_commit_message(output: &str) -> String {
    let lines: Vec<&str> = output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    lines
        .iter()
        .rev()
        .find(|line| is_conventional_line(line))
        .or(lines.last())
        .map(|line| line.to_string())
        .unwrap_or_else(|| FALLBACK_MESSAGE.to_string())
}
