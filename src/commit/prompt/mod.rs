//! Prompt construction for commit message generation.
//!
//! Each supported language provides the same three prompts (generation,
//! edit, managed) through [`PromptTemplates`]. The custom commit style
//! bypasses the providers entirely and renders the user's template.

mod en;
mod ua;
mod zh;

use std::fmt;
use std::sync::LazyLock;

use regex_lite::{Captures, Regex};
use serde::Deserialize;

use crate::commit::diff::{DiffBundle, DiffSourceMode};

/// Maximum number of diff characters embedded in any prompt.
pub const MAX_DIFF_CHARS: usize = 6000;

/// Maximum subject length requested from the model.
pub const SUBJECT_MAX_CHARS: usize = 50;

/// Closed set of conventional commit types the prompts allow.
pub const COMMIT_TYPES: [&str; 8] = [
    "feat", "fix", "refactor", "docs", "style", "test", "chore", "perf",
];

/// Language of the generated commit message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Ua,
    Zh,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Ua => "ua",
            Language::Zh => "zh",
        }
    }

    /// The prompt provider for this language.
    pub fn templates(&self) -> &'static dyn PromptTemplates {
        match self {
            Language::En => &en::English,
            Language::Ua => &ua::Ukrainian,
            Language::Zh => &zh::Chinese,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Commit message style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CommitStyle {
    /// `type(scope): subject`
    #[default]
    Conventional,
    /// User-supplied template with `{diff}` and `{stats}` placeholders.
    Custom,
}

/// Inputs of the managed-mode prompt.
#[derive(Debug, Clone, Copy)]
pub struct ManagedOptions<'a> {
    pub keep_co_authored_by: bool,
    pub multi_line: bool,
    pub diff_source: DiffSourceMode,
    pub custom_instruction: &'a str,
}

/// Language-specific prompt text.
///
/// `diff` arguments are already truncated to [`MAX_DIFF_CHARS`].
pub trait PromptTemplates: Sync {
    fn generation(&self, diff: &str, stats: &str, multi_line: bool) -> String;

    fn edit(&self, current_message: &str, feedback: &str, diff: &str, stats: &str) -> String;

    fn managed(&self, options: &ManagedOptions<'_>) -> String;
}

/// Build the prompt for a fresh commit message.
///
/// `Custom` style with a template renders the template and ignores
/// `language` and `multi_line`; `Custom` without a template falls back to
/// the conventional prompt.
pub fn build_generation_prompt(
    bundle: &DiffBundle,
    language: Language,
    style: CommitStyle,
    multi_line: bool,
    custom_template: Option<&str>,
) -> String {
    if let (CommitStyle::Custom, Some(template)) = (style, custom_template) {
        return render_custom_template(template, truncate_diff(&bundle.diff), &bundle.stats);
    }

    language
        .templates()
        .generation(truncate_diff(&bundle.diff), &bundle.stats, multi_line)
}

/// Build the prompt that revises `current_message` according to `feedback`.
pub fn build_edit_prompt(
    current_message: &str,
    feedback: &str,
    bundle: &DiffBundle,
    language: Language,
) -> String {
    language.templates().edit(
        current_message,
        feedback,
        truncate_diff(&bundle.diff),
        &bundle.stats,
    )
}

/// Build the managed-mode prompt. The local agent inspects the changes itself.
pub fn build_managed_prompt(language: Language, options: &ManagedOptions<'_>) -> String {
    language.templates().managed(options)
}

/// First [`MAX_DIFF_CHARS`] characters of `diff`.
pub fn truncate_diff(diff: &str) -> &str {
    match diff.char_indices().nth(MAX_DIFF_CHARS) {
        Some((end, _)) => &diff[..end],
        None => diff,
    }
}

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{(diff|stats)\}").expect("Invalid regex"));

/// Replace every `{diff}` and `{stats}` in `template` in a single pass.
///
/// Substituted text is never rescanned, so a diff that itself contains
/// `{stats}` is embedded verbatim.
pub fn render_custom_template(template: &str, diff: &str, stats: &str) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures<'_>| match &caps[1] {
            "diff" => diff.to_string(),
            _ => stats.to_string(),
        })
        .into_owned()
}

/// Commit types joined for the providers, e.g. `feat/fix/...`.
fn types_list() -> String {
    COMMIT_TYPES.join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_LANGUAGES: [Language; 3] = [Language::En, Language::Ua, Language::Zh];

    fn bundle(diff: &str, stats: &str) -> DiffBundle {
        DiffBundle::new(diff, stats)
    }

    #[test]
    fn test_truncate_diff_exactly_max_chars() {
        let diff = "a".repeat(MAX_DIFF_CHARS + 500);
        assert_eq!(truncate_diff(&diff).len(), MAX_DIFF_CHARS);
    }

    #[test]
    fn test_truncate_diff_short_input_unchanged() {
        assert_eq!(truncate_diff("+line\n"), "+line\n");
        let exact = "b".repeat(MAX_DIFF_CHARS);
        assert_eq!(truncate_diff(&exact), exact);
    }

    #[test]
    fn test_truncate_diff_counts_characters_not_bytes() {
        let diff = "ї".repeat(MAX_DIFF_CHARS + 10);
        let truncated = truncate_diff(&diff);
        assert_eq!(truncated.chars().count(), MAX_DIFF_CHARS);
    }

    #[test]
    fn test_generation_prompt_truncates_diff_but_not_stats() {
        let diff = format!("{}{}", "d".repeat(MAX_DIFF_CHARS), "TAIL_MARKER");
        let stats = format!("{} files changed", "s".repeat(20_000));
        for language in ALL_LANGUAGES {
            let prompt = build_generation_prompt(
                &bundle(&diff, &stats),
                language,
                CommitStyle::Conventional,
                false,
                None,
            );
            assert!(prompt.contains(&"d".repeat(MAX_DIFF_CHARS)));
            assert!(!prompt.contains("TAIL_MARKER"), "{language} embedded the diff tail");
            assert!(prompt.contains(&stats), "{language} altered the stats");
        }
    }

    #[test]
    fn test_every_language_embeds_rules() {
        for language in ALL_LANGUAGES {
            let prompt = build_generation_prompt(
                &bundle("+code\n", "1 file changed"),
                language,
                CommitStyle::Conventional,
                false,
                None,
            );
            assert!(prompt.contains("<type>(<scope>): <subject>"), "{language}");
            for ty in COMMIT_TYPES {
                assert!(prompt.contains(ty), "{language} is missing type {ty}");
            }
            assert!(prompt.contains("50"), "{language} is missing the subject limit");
            assert!(prompt.contains("+code"));
            assert!(prompt.contains("1 file changed"));
        }
    }

    #[test]
    fn test_multi_line_changes_output_instruction() {
        for language in ALL_LANGUAGES {
            let b = bundle("+x\n", "1 file");
            let single = build_generation_prompt(&b, language, CommitStyle::Conventional, false, None);
            let multi = build_generation_prompt(&b, language, CommitStyle::Conventional, true, None);
            assert_ne!(single, multi, "{language} ignores multi_line");
        }
    }

    #[test]
    fn test_custom_template_is_pure_substitution() {
        let template = "Summarize:\n{stats}\n---\n{diff}\n(again: {diff})";
        let prompt = build_generation_prompt(
            &bundle("+added", "1 file changed"),
            Language::Ua,
            CommitStyle::Custom,
            true,
            Some(template),
        );
        assert_eq!(
            prompt,
            "Summarize:\n1 file changed\n---\n+added\n(again: +added)"
        );
    }

    #[test]
    fn test_custom_template_does_not_rescan_substituted_text() {
        let prompt = render_custom_template("{diff}|{stats}", "literal {stats} in diff", "S");
        assert_eq!(prompt, "literal {stats} in diff|S");
    }

    #[test]
    fn test_custom_template_is_idempotent() {
        let template = "{diff}::{stats}::{other}";
        let first = render_custom_template(template, "D", "S");
        let second = render_custom_template(template, "D", "S");
        assert_eq!(first, second);
        assert_eq!(first, "D::S::{other}");
    }

    #[test]
    fn test_custom_template_truncates_diff() {
        let diff = "z".repeat(MAX_DIFF_CHARS + 1);
        let prompt = build_generation_prompt(
            &bundle(&diff, ""),
            Language::En,
            CommitStyle::Custom,
            false,
            Some("{diff}"),
        );
        assert_eq!(prompt.len(), MAX_DIFF_CHARS);
    }

    #[test]
    fn test_custom_style_without_template_falls_back() {
        let prompt = build_generation_prompt(
            &bundle("+x", "1 file"),
            Language::En,
            CommitStyle::Custom,
            false,
            None,
        );
        assert!(prompt.contains("<type>(<scope>): <subject>"));
    }

    #[test]
    fn test_edit_prompt_embeds_message_and_feedback() {
        for language in ALL_LANGUAGES {
            let prompt = build_edit_prompt(
                "feat(api): added rate limiting",
                "make it shorter",
                &bundle("+limit\n", "1 file changed"),
                language,
            );
            assert!(prompt.contains("feat(api): added rate limiting"), "{language}");
            assert!(prompt.contains("make it shorter"), "{language}");
            assert!(prompt.contains("+limit"), "{language}");
            assert!(prompt.contains("1 file changed"), "{language}");
        }
    }

    #[test]
    fn test_edit_prompt_truncates_diff() {
        let diff = format!("{}TAIL_MARKER", "e".repeat(MAX_DIFF_CHARS));
        let prompt = build_edit_prompt("fix: x", "shorter", &bundle(&diff, ""), Language::En);
        assert!(!prompt.contains("TAIL_MARKER"));
    }

    #[test]
    fn test_managed_prompt_reflects_options() {
        for language in ALL_LANGUAGES {
            let options = ManagedOptions {
                keep_co_authored_by: false,
                multi_line: false,
                diff_source: DiffSourceMode::Staged,
                custom_instruction: "Focus on the API changes",
            };
            let prompt = build_managed_prompt(language, &options);
            assert!(prompt.contains("Focus on the API changes"), "{language}");
            assert!(prompt.contains("git diff --cached"), "{language}");
            assert!(prompt.contains("Co-Authored-By"), "{language}");

            let all = build_managed_prompt(
                language,
                &ManagedOptions {
                    diff_source: DiffSourceMode::All,
                    ..options
                },
            );
            assert!(all.contains("git diff HEAD"), "{language}");
            assert!(!all.contains("git diff --cached"), "{language}");
        }
    }

    #[test]
    fn test_managed_prompt_omits_blank_instruction() {
        let with = build_managed_prompt(
            Language::En,
            &ManagedOptions {
                keep_co_authored_by: true,
                multi_line: true,
                diff_source: DiffSourceMode::Auto,
                custom_instruction: "be terse",
            },
        );
        let without = build_managed_prompt(
            Language::En,
            &ManagedOptions {
                keep_co_authored_by: true,
                multi_line: true,
                diff_source: DiffSourceMode::Auto,
                custom_instruction: "   ",
            },
        );
        assert!(with.contains("be terse"));
        assert!(with.len() > without.len());
    }

    #[test]
    fn test_co_authored_by_flag_changes_prompt() {
        let base = ManagedOptions {
            keep_co_authored_by: false,
            multi_line: false,
            diff_source: DiffSourceMode::Auto,
            custom_instruction: "",
        };
        let drop = build_managed_prompt(Language::En, &base);
        let keep = build_managed_prompt(
            Language::En,
            &ManagedOptions {
                keep_co_authored_by: true,
                ..base
            },
        );
        assert_ne!(drop, keep);
    }
}
