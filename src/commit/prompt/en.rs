//! English prompts.

use super::{ManagedOptions, MAX_DIFF_CHARS, PromptTemplates, SUBJECT_MAX_CHARS, types_list};
use crate::commit::diff::DiffSourceMode;

pub(super) struct English;

const EXAMPLES: &str = "feat(auth): added Google OAuth provider
fix(api): fixed validation error in user endpoint
refactor(store): optimized cart state management
docs(readme): updated installation instructions";

fn rules() -> String {
    format!(
        r#"- Format: <type>(<scope>): <subject>
- Type: {types}
- Subject in PAST TENSE (what WAS DONE), max {SUBJECT_MAX_CHARS} characters, no period
- Use verbs like: added, fixed, updated, removed, refactored
- WRONG: "add feature", "fix bug", "update styles"
- CORRECT: "added feature", "fixed bug", "updated styles""#,
        types = types_list(),
    )
}

fn output_rule(multi_line: bool) -> &'static str {
    if multi_line {
        "Return ONLY the commit message: the subject line, a blank line, then 2-4 short \"- \" bullet points in past tense. No explanations."
    } else {
        "Return ONLY the commit message (one line), no explanations."
    }
}

impl PromptTemplates for English {
    fn generation(&self, diff: &str, stats: &str, multi_line: bool) -> String {
        format!(
            r#"Analyze git changes and generate commit message in conventional commits format.

Change statistics:
{stats}

Diff (first {MAX_DIFF_CHARS} characters):
{diff}

STRICT RULES:
{rules}

Examples:
{EXAMPLES}

{output}"#,
            rules = rules(),
            output = output_rule(multi_line),
        )
    }

    fn edit(&self, current_message: &str, feedback: &str, diff: &str, stats: &str) -> String {
        format!(
            r#"You wrote this commit message for the git changes below:

{current_message}

The user wants it changed:
{feedback}

Revise the existing message according to the feedback. Do not start over: keep everything the feedback does not ask to change.

Change statistics:
{stats}

Diff (first {MAX_DIFF_CHARS} characters):
{diff}

RULES (unless the feedback explicitly overrides them):
{rules}

Return ONLY the revised commit message, no explanations."#,
            rules = rules(),
        )
    }

    fn managed(&self, options: &ManagedOptions<'_>) -> String {
        let scope = match options.diff_source {
            DiffSourceMode::Staged => "the staged changes (`git diff --cached`)",
            DiffSourceMode::All => "all uncommitted changes (`git diff HEAD`)",
            DiffSourceMode::Auto => {
                "the staged changes (`git diff --cached`); if nothing is staged, all uncommitted changes (`git diff HEAD`)"
            }
        };

        let attribution = if options.keep_co_authored_by {
            "You may end the message with a Co-Authored-By trailer."
        } else {
            "Do NOT add a Co-Authored-By trailer or any other attribution."
        };

        let mut prompt = format!(
            r#"Write a git commit message for this repository.

Inspect the changes yourself with git. Describe {scope}.
Do not stage files, do not create the commit, and do not modify anything.

STRICT RULES:
{rules}
- {attribution}

Examples:
{EXAMPLES}"#,
            rules = rules(),
        );

        let instruction = options.custom_instruction.trim();
        if !instruction.is_empty() {
            prompt.push_str(&format!("\n\nAdditional instructions from the user:\n{instruction}"));
        }

        prompt.push_str("\n\n");
        prompt.push_str(output_rule(options.multi_line));
        prompt
    }
}
