//! claude-commit - CLI entry point.

use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dialoguer::{Input, Select};
use git2::Repository;
use tracing_subscriber::EnvFilter;

use claude_commit::commit::{
    Choice, CommitStyle, DiffSourceMode, Interaction, Language, Refinement, RefinementSession,
    edit_commit_message, generate, generate_with_custom_prompt, run_session,
};
use claude_commit::config::{Config, Overrides};
use claude_commit::error::ValidationError;
use claude_commit::llm::{ClaudeBackend, MethodPreference, Progress};

/// Generate conventional commit messages from pending changes using Claude.
#[derive(Parser, Debug)]
#[command(name = "claude-commit")]
#[command(about = "Generate conventional commit messages from pending changes using Claude")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Repository to describe (any path inside it)
    #[arg(short = 'C', long, default_value = ".", global = true)]
    repo: PathBuf,

    /// Config file (defaults to .claude-commit.toml, then ~/.config/claude-commit.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Language of the message
    #[arg(long, value_enum, global = true)]
    language: Option<Language>,

    /// Generation method
    #[arg(long, value_enum, global = true)]
    method: Option<MethodPreference>,

    /// Which changes to describe
    #[arg(long, value_enum, global = true)]
    diff_source: Option<DiffSourceMode>,

    /// Commit message style
    #[arg(long, value_enum, global = true)]
    style: Option<CommitStyle>,

    /// Ask for a subject line plus a short bullet body (`--multi-line=false` to disable)
    #[arg(long, global = true, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    multi_line: Option<bool>,

    /// Let Claude Code inspect the changes itself; requires --method cli (`--managed=false` to disable)
    #[arg(long, global = true, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    managed: Option<bool>,

    /// Model used by the API backend
    #[arg(long, global = true)]
    model: Option<String>,

    /// Command line that runs the local CLI
    #[arg(long, global = true)]
    cli_command: Option<String>,

    /// Print the first message without offering refinements
    #[arg(long, global = true)]
    no_interactive: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a message and refine it interactively (default)
    Generate,

    /// Generate in managed mode, guided by an instruction
    Custom {
        /// Instruction for Claude, e.g. "Focus on the API changes"
        prompt: String,
    },

    /// Revise an existing message with feedback
    Edit {
        /// Message to revise
        #[arg(long)]
        message: String,

        /// What to change, e.g. "Make it shorter"
        #[arg(long)]
        feedback: String,
    },
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            language: self.language,
            preferred_method: self.method,
            diff_source: self.diff_source,
            commit_style: self.style,
            multi_line: self.multi_line,
            managed: self.managed,
            model: self.model.clone(),
            cli_command: self.cli_command.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let repo_path = discover_repo(&cli.repo)?;

    let config = Config::load(cli.config.as_deref(), &repo_path)
        .context("Failed to load configuration")?
        .with_overrides(cli.overrides());
    config.validate().context("Invalid configuration")?;

    let backend = ClaudeBackend::from_config(&config).in_dir(&repo_path);
    let report = |phase: &str| eprintln!("{}", phase);
    let progress = Progress::new(&report);

    let message = match cli.command.unwrap_or(Command::Generate) {
        Command::Generate if cli.no_interactive || !io::stdin().is_terminal() => {
            generate(&repo_path, &config, &backend, progress)
                .await
                .context("Failed to generate commit")?
        }
        Command::Generate => {
            let mut session = RefinementSession::new(&config, &backend);
            run_session(&mut session, &repo_path, &mut TerminalUi, progress)
                .await
                .context("Failed to generate commit")?
        }
        Command::Custom { prompt } => {
            generate_with_custom_prompt(&config, &backend, &prompt, progress)
                .await
                .context("Failed to regenerate")?
        }
        Command::Edit { message, feedback } => {
            edit_commit_message(&repo_path, &config, &backend, &message, &feedback, progress)
                .await
                .context("Failed to regenerate")?
        }
    };

    println!("{}", message);

    Ok(())
}

/// Log to stderr; `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
    let default = if verbose { "claude_commit=debug,warn" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Resolve the working tree root containing `path`.
fn discover_repo(path: &Path) -> Result<PathBuf> {
    let repo = Repository::discover(path).context(
        "Not a git repository. Run claude-commit from within a git repository.",
    )?;

    repo.workdir()
        .map(Path::to_path_buf)
        .context("Bare repositories have no changes to describe")
}

/// dialoguer prompts on stderr; stdout stays reserved for the final message.
struct TerminalUi;

impl Interaction for TerminalUi {
    fn show_message(&mut self, message: &str) {
        eprintln!();
        eprintln!("{}", message);
        eprintln!();
    }

    fn choose(&mut self, refinement: Refinement) -> io::Result<Choice> {
        let refine = match refinement {
            Refinement::EditWithFeedback => "Edit with feedback",
            Refinement::CustomPrompt => "Custom prompt",
        };

        let selection = Select::new()
            .with_prompt("Commit message generated!")
            .items(&[refine, "Accept"])
            .default(1)
            .interact_opt()
            .map_err(io::Error::other)?;

        Ok(match selection {
            Some(0) => Choice::Refine,
            _ => Choice::Accept,
        })
    }

    fn ask_feedback(&mut self) -> io::Result<Option<String>> {
        ask("Enter your feedback to improve the commit message (e.g. 'Make it shorter')")
    }

    fn ask_custom_prompt(&mut self) -> io::Result<Option<String>> {
        ask("Enter custom prompt to guide commit message generation (e.g. 'Focus on the API changes')")
    }

    fn show_validation(&mut self, error: &ValidationError) {
        eprintln!("{}", error);
    }
}

/// Blank answers are passed through so the session can reject them.
fn ask(prompt: &str) -> io::Result<Option<String>> {
    let answer: String = Input::new()
        .with_prompt(prompt)
        .allow_empty(true)
        .interact_text()
        .map_err(io::Error::other)?;

    Ok(Some(answer))
}
