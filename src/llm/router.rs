//! Backend selection and fallback orchestration.

use std::fmt;

use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::error::{BackendError, MethodFailure, OrchestrationError};

use super::backend::Backend;

/// A concrete way of running a prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Cli,
    Api,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Cli => "Claude CLI",
            Method::Api => "Claude API",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configured method preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum MethodPreference {
    /// Local CLI only.
    Cli,
    /// Remote API only.
    Api,
    /// CLI when installed, then the API.
    #[default]
    Auto,
}

impl MethodPreference {
    pub fn as_str(&self) -> &'static str {
        match self {
            MethodPreference::Cli => "cli",
            MethodPreference::Api => "api",
            MethodPreference::Auto => "auto",
        }
    }

    /// Ordered attempts for this preference.
    ///
    /// A pinned method is always attempted exactly once. `auto` leaves the
    /// CLI out entirely when it is not installed.
    pub fn attempt_plan(&self, cli_available: bool) -> Vec<Method> {
        match self {
            MethodPreference::Cli => vec![Method::Cli],
            MethodPreference::Api => vec![Method::Api],
            MethodPreference::Auto if cli_available => vec![Method::Cli, Method::Api],
            MethodPreference::Auto => vec![Method::Api],
        }
    }

    fn is_pinned(&self) -> bool {
        !matches!(self, MethodPreference::Auto)
    }
}

impl fmt::Display for MethodPreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Optional human-readable phase reporting. Never affects control flow.
#[derive(Clone, Copy, Default)]
pub struct Progress<'a> {
    callback: Option<&'a (dyn Fn(&str) + Send + Sync)>,
}

impl<'a> Progress<'a> {
    pub fn new(callback: &'a (dyn Fn(&str) + Send + Sync)) -> Self {
        Self {
            callback: Some(callback),
        }
    }

    pub fn none() -> Self {
        Self::default()
    }

    pub fn report(&self, phase: &str) {
        debug!("Progress: {}", phase);
        if let Some(callback) = self.callback {
            callback(phase);
        }
    }
}

impl fmt::Debug for Progress<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Progress")
            .field("callback", &self.callback.is_some())
            .finish()
    }
}

/// Successful generation with metadata.
#[derive(Debug)]
pub struct Completion {
    pub message: String,
    pub method: Method,
    /// Attempts that failed before `method` succeeded.
    pub earlier_failures: Vec<MethodFailure>,
}

/// Runs prompts through the attempt plan of a method preference.
pub struct Orchestrator<'a> {
    backend: &'a dyn Backend,
    preference: MethodPreference,
}

impl<'a> Orchestrator<'a> {
    pub fn new(backend: &'a dyn Backend, preference: MethodPreference) -> Self {
        Self {
            backend,
            preference,
        }
    }

    /// Run `prompt` through each planned method in order until one succeeds.
    ///
    /// Attempts are strictly sequential. A pinned preference surfaces its
    /// single failure as [`OrchestrationError::Pinned`]; `auto` records every
    /// failure and surfaces [`OrchestrationError::Exhausted`].
    pub async fn generate(
        &self,
        prompt: &str,
        progress: Progress<'_>,
    ) -> Result<Completion, OrchestrationError> {
        let cli_available = match self.preference {
            MethodPreference::Api => false,
            _ => self.backend.has_cli(),
        };
        let plan = self.preference.attempt_plan(cli_available);

        debug!(
            "Attempt plan for '{}' (CLI available: {}): {:?}",
            self.preference, cli_available, plan
        );

        let mut failures = Vec::new();

        for method in plan {
            progress.report(&format!("Generating with {}...", method));

            match self.attempt(method, cli_available, prompt).await {
                Ok(message) => {
                    info!("Generated commit message with {}", method);
                    return Ok(Completion {
                        message,
                        method,
                        earlier_failures: failures,
                    });
                }
                Err(error) if self.preference.is_pinned() => {
                    return Err(OrchestrationError::Pinned {
                        method,
                        source: error,
                    });
                }
                Err(error) => {
                    warn!("{} failed ({}): {}", method, error.kind(), error);
                    failures.push(MethodFailure { method, error });
                }
            }
        }

        Err(OrchestrationError::Exhausted { failures })
    }

    async fn attempt(
        &self,
        method: Method,
        cli_available: bool,
        prompt: &str,
    ) -> Result<String, BackendError> {
        debug!("Sending {} character prompt to {}", prompt.chars().count(), method);
        match method {
            Method::Cli if !cli_available => Err(BackendError::NotAvailable),
            Method::Cli => self.backend.run_cli(prompt).await,
            Method::Api => self.backend.run_api(prompt).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use mockall::Sequence;
    use mockall::predicate::eq;

    use super::*;
    use crate::error::BackendErrorKind;
    use crate::llm::backend::MockBackend;

    fn process_error() -> BackendError {
        BackendError::NonZeroExit {
            code: 1,
            stderr: "boom".to_string(),
        }
    }

    #[test]
    fn default_preference_is_auto() {
        assert_eq!(MethodPreference::default(), MethodPreference::Auto);
    }

    #[test]
    fn attempt_plans() {
        assert_eq!(MethodPreference::Cli.attempt_plan(true), vec![Method::Cli]);
        assert_eq!(MethodPreference::Cli.attempt_plan(false), vec![Method::Cli]);
        assert_eq!(MethodPreference::Api.attempt_plan(true), vec![Method::Api]);
        assert_eq!(
            MethodPreference::Auto.attempt_plan(true),
            vec![Method::Cli, Method::Api]
        );
        assert_eq!(MethodPreference::Auto.attempt_plan(false), vec![Method::Api]);
    }

    #[tokio::test]
    async fn auto_returns_cli_result_without_touching_api() {
        let mut backend = MockBackend::new();
        backend.expect_has_cli().return_const(true);
        backend
            .expect_run_cli()
            .with(eq("prompt"))
            .times(1)
            .returning(|_| Ok("feat: added x".to_string()));
        backend.expect_run_api().times(0);

        let orchestrator = Orchestrator::new(&backend, MethodPreference::Auto);
        let completion = orchestrator.generate("prompt", Progress::none()).await.unwrap();

        assert_eq!(completion.message, "feat: added x");
        assert_eq!(completion.method, Method::Cli);
        assert!(completion.earlier_failures.is_empty());
    }

    #[tokio::test]
    async fn auto_without_cli_goes_straight_to_api() {
        let mut backend = MockBackend::new();
        backend.expect_has_cli().return_const(false);
        backend.expect_run_cli().times(0);
        backend
            .expect_run_api()
            .times(1)
            .returning(|_| Ok("fix: fixed y".to_string()));

        let orchestrator = Orchestrator::new(&backend, MethodPreference::Auto);
        let completion = orchestrator.generate("prompt", Progress::none()).await.unwrap();

        assert_eq!(completion.method, Method::Api);
        assert!(completion.earlier_failures.is_empty());
    }

    #[tokio::test]
    async fn auto_cli_failure_falls_through_to_api_in_order() {
        let mut seq = Sequence::new();
        let mut backend = MockBackend::new();
        backend.expect_has_cli().return_const(true);
        backend
            .expect_run_cli()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Err(process_error()));
        backend
            .expect_run_api()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok("docs: updated readme".to_string()));

        let orchestrator = Orchestrator::new(&backend, MethodPreference::Auto);
        let completion = orchestrator.generate("prompt", Progress::none()).await.unwrap();

        assert_eq!(completion.message, "docs: updated readme");
        assert_eq!(completion.method, Method::Api);
        assert_eq!(completion.earlier_failures.len(), 1);
        assert_eq!(completion.earlier_failures[0].method, Method::Cli);
    }

    #[tokio::test]
    async fn auto_both_failing_surfaces_api_error_last() {
        let mut backend = MockBackend::new();
        backend.expect_has_cli().return_const(true);
        backend
            .expect_run_cli()
            .times(1)
            .returning(|_| Err(process_error()));
        backend
            .expect_run_api()
            .times(1)
            .returning(|_| Err(BackendError::AuthMissing));

        let orchestrator = Orchestrator::new(&backend, MethodPreference::Auto);
        let err = orchestrator
            .generate("prompt", Progress::none())
            .await
            .unwrap_err();

        match &err {
            OrchestrationError::Exhausted { failures } => {
                assert_eq!(failures.len(), 2);
                assert_eq!(failures[0].method, Method::Cli);
                assert_eq!(failures[1].method, Method::Api);
            }
            other => panic!("Expected Exhausted, got {:?}", other),
        }
        assert_eq!(
            err.final_error().map(BackendError::kind),
            Some(BackendErrorKind::AuthMissing)
        );
        assert!(err.to_string().starts_with("ANTHROPIC_API_KEY not found"));
    }

    #[tokio::test]
    async fn pinned_cli_failure_does_not_fall_back() {
        let mut backend = MockBackend::new();
        backend.expect_has_cli().return_const(true);
        backend
            .expect_run_cli()
            .times(1)
            .returning(|_| Err(process_error()));
        backend.expect_run_api().times(0);

        let orchestrator = Orchestrator::new(&backend, MethodPreference::Cli);
        let err = orchestrator
            .generate("prompt", Progress::none())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            OrchestrationError::Pinned {
                method: Method::Cli,
                ..
            }
        ));
        assert_eq!(
            err.final_error().map(BackendError::kind),
            Some(BackendErrorKind::ProcessError)
        );
    }

    #[tokio::test]
    async fn pinned_cli_unavailable_is_not_available_without_spawning() {
        let mut backend = MockBackend::new();
        backend.expect_has_cli().return_const(false);
        backend.expect_run_cli().times(0);
        backend.expect_run_api().times(0);

        let orchestrator = Orchestrator::new(&backend, MethodPreference::Cli);
        let err = orchestrator
            .generate("prompt", Progress::none())
            .await
            .unwrap_err();

        assert_eq!(
            err.final_error().map(BackendError::kind),
            Some(BackendErrorKind::NotAvailable)
        );
        assert!(err.to_string().contains("npm install -g @anthropic-ai/claude-code"));
    }

    #[tokio::test]
    async fn pinned_api_never_probes_cli() {
        let mut backend = MockBackend::new();
        backend.expect_has_cli().times(0);
        backend.expect_run_cli().times(0);
        backend
            .expect_run_api()
            .times(1)
            .returning(|_| Err(BackendError::Upstream("connection reset".to_string())));

        let orchestrator = Orchestrator::new(&backend, MethodPreference::Api);
        let err = orchestrator
            .generate("prompt", Progress::none())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            OrchestrationError::Pinned {
                method: Method::Api,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn progress_reports_each_attempt() {
        let mut backend = MockBackend::new();
        backend.expect_has_cli().return_const(true);
        backend
            .expect_run_cli()
            .returning(|_| Err(process_error()));
        backend
            .expect_run_api()
            .returning(|_| Ok("chore: bumped deps".to_string()));

        let phases = Mutex::new(Vec::new());
        let record = |phase: &str| phases.lock().unwrap().push(phase.to_string());

        let orchestrator = Orchestrator::new(&backend, MethodPreference::Auto);
        orchestrator
            .generate("prompt", Progress::new(&record))
            .await
            .unwrap();

        let phases = phases.into_inner().unwrap();
        assert_eq!(
            phases,
            vec![
                "Generating with Claude CLI...".to_string(),
                "Generating with Claude API...".to_string()
            ]
        );
    }
}
