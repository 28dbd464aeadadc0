//! Generate-execute-repair agent.
//!
//! The central state machine of the pipeline: execute the current candidate,
//! and on failure feed the diagnostic back to the generator to produce a
//! revised candidate, bounded by the configured retry budget.
//!
//! Reaching the budget is a normal terminal outcome, not an error: the
//! caller receives the last (still failing) candidate together with its
//! diagnostic. The only hard failure paths are generator transport errors
//! and probe infrastructure errors, which abort the session immediately.
//!
//! Repair responses are instructed to contain only code, so extraction uses
//! the fence-only policy. The attempt history is a bounded, append-only log
//! consumed solely by prompt construction: once more than one failure has
//! been observed, the repair prompt flags the repetition and tells the
//! generator to stop inventing toolkit APIs. Diagnostic texts are never
//! compared for similarity.

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::collect_streamed;
use crate::error::PipelineError;
use crate::llm::{GenerationRequest, LlmProvider, PredictionHint};
use crate::pipeline::RunConfig;
use crate::probe::ExecutionProbe;
use crate::progress::ProgressSink;
use crate::prompts::build_repair_messages;
use crate::script::Script;
use crate::utils::{extract_code, ExtractionPolicy};

/// Terminal outcome of a repair session.
#[derive(Debug, Clone)]
pub enum RepairOutcome {
    /// A probe reported no diagnostic; the candidate is accepted.
    Succeeded(Script),
    /// The retry budget ran out; the candidate still carries its last
    /// diagnostic for inspection.
    ExhaustedRetries(Script),
}

impl RepairOutcome {
    /// The final candidate, accepted or failing.
    pub fn script(&self) -> &Script {
        match self {
            Self::Succeeded(script) | Self::ExhaustedRetries(script) => script,
        }
    }

    /// Consumes the outcome, returning the final candidate.
    pub fn into_script(self) -> Script {
        match self {
            Self::Succeeded(script) | Self::ExhaustedRetries(script) => script,
        }
    }

    /// True when the session ended with an accepted candidate.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded(_))
    }
}

/// Agent running the repair loop.
pub struct FixerAgent {
    llm: Arc<dyn LlmProvider>,
    probe: Arc<dyn ExecutionProbe>,
}

impl std::fmt::Debug for FixerAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FixerAgent").finish_non_exhaustive()
    }
}

impl FixerAgent {
    /// Creates a new fixer agent.
    pub fn new(llm: Arc<dyn LlmProvider>, probe: Arc<dyn ExecutionProbe>) -> Self {
        Self { llm, probe }
    }

    /// Runs the repair loop on an initial candidate.
    ///
    /// Performs at most `config.fix_iters` repair transitions. Every
    /// candidate, including the last one produced at the cap, is probed
    /// before the session terminates.
    pub async fn repair(
        &self,
        script: Script,
        design: &str,
        config: &RunConfig,
        progress: &dyn ProgressSink,
    ) -> Result<RepairOutcome, PipelineError> {
        let mut current = script;
        let mut attempts: usize = 0;
        let mut history: Vec<String> = Vec::new();

        loop {
            current = self.probe.execute(&current).await?;

            let Some(diagnostic) = current.diagnostic().map(str::to_string) else {
                info!(attempts, id = %current.id, "Candidate accepted");
                progress.complete();
                return Ok(RepairOutcome::Succeeded(current));
            };

            history.push(diagnostic.clone());

            if attempts >= config.fix_iters {
                warn!(
                    attempts,
                    id = %current.id,
                    "Retry budget exhausted, returning failing candidate"
                );
                progress.complete();
                return Ok(RepairOutcome::ExhaustedRetries(current));
            }

            debug!(
                attempt = attempts + 1,
                cap = config.fix_iters,
                "Candidate failed, requesting repair"
            );

            let messages = build_repair_messages(
                design,
                &current.code,
                &diagnostic,
                history.len(),
                &config.library,
            );
            let request = GenerationRequest::new(config.coding_model.clone(), messages)
                .with_prediction(PredictionHint::content(current.code.clone()));

            let output = collect_streamed(&*self.llm, request, progress)
                .await
                .map_err(PipelineError::Repair)?;

            let code = extract_code(&output, ExtractionPolicy::FenceOnly);
            current = Script::new(code);
            attempts += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use futures::StreamExt;
    use std::sync::Mutex;

    use crate::error::{LlmError, ProbeError};
    use crate::llm::{GenerationResponse, TokenStream};
    use crate::progress::{BoundedProgress, NoopProgress};

    /// Provider replaying canned streamed repairs, recording every request.
    struct ScriptedProvider {
        responses: Mutex<Vec<String>>,
        requests: Mutex<Vec<GenerationRequest>>,
    }

    impl ScriptedProvider {
        fn new(responses: &[&str]) -> Self {
            let mut responses: Vec<String> = responses.iter().map(|s| s.to_string()).collect();
            responses.reverse();
            Self {
                responses: Mutex::new(responses),
                requests: Mutex::new(Vec::new()),
            }
        }

        fn repair_count(&self) -> usize {
            self.requests.lock().expect("lock poisoned").len()
        }
    }

    #[async_trait]
    impl LlmProvider for ScriptedProvider {
        async fn generate(
            &self,
            _request: GenerationRequest,
        ) -> Result<GenerationResponse, LlmError> {
            unimplemented!("fixer only streams")
        }

        async fn generate_stream(
            &self,
            request: GenerationRequest,
        ) -> Result<TokenStream, LlmError> {
            self.requests.lock().expect("lock poisoned").push(request);
            let text = self
                .responses
                .lock()
                .expect("lock poisoned")
                .pop()
                .unwrap_or_else(|| "print('fallback')".to_string());
            let fragments: Vec<Result<String, LlmError>> =
                text.chars().map(|c| Ok(c.to_string())).collect();
            Ok(futures::stream::iter(fragments).boxed())
        }
    }

    /// Probe failing a fixed number of executions before succeeding.
    struct FlakyProbe {
        failures_remaining: Mutex<usize>,
        executions: Mutex<usize>,
    }

    impl FlakyProbe {
        fn failing(times: usize) -> Self {
            Self {
                failures_remaining: Mutex::new(times),
                executions: Mutex::new(0),
            }
        }

        fn execution_count(&self) -> usize {
            *self.executions.lock().expect("lock poisoned")
        }
    }

    #[async_trait]
    impl ExecutionProbe for FlakyProbe {
        async fn execute(&self, script: &Script) -> Result<Script, ProbeError> {
            *self.executions.lock().expect("lock poisoned") += 1;
            let mut remaining = self.failures_remaining.lock().expect("lock poisoned");
            if *remaining > 0 {
                *remaining -= 1;
                let n = *self.executions.lock().expect("lock poisoned");
                Ok(script.with_diagnostic(format!("Traceback: failure {n}")))
            } else {
                Ok(script.clean())
            }
        }
    }

    fn config(fix_iters: usize) -> RunConfig {
        RunConfig::new().with_fix_iters(fix_iters)
    }

    #[tokio::test]
    async fn test_first_probe_success_means_zero_repairs() {
        let provider = Arc::new(ScriptedProvider::new(&[]));
        let probe = Arc::new(FlakyProbe::failing(0));
        let agent = FixerAgent::new(provider.clone(), probe.clone());

        let outcome = agent
            .repair(Script::new("fine"), "design", &config(10), &NoopProgress)
            .await
            .expect("repair should succeed");

        assert!(outcome.is_success());
        assert_eq!(provider.repair_count(), 0);
        assert_eq!(probe.execution_count(), 1);
    }

    #[tokio::test]
    async fn test_always_failing_probe_exhausts_exact_cap() {
        let provider = Arc::new(ScriptedProvider::new(&["fix1", "fix2", "fix3", "fix4"]));
        let probe = Arc::new(FlakyProbe::failing(usize::MAX));
        let agent = FixerAgent::new(provider.clone(), probe.clone());

        let outcome = agent
            .repair(Script::new("broken"), "design", &config(2), &NoopProgress)
            .await
            .expect("exhaustion is not an error");

        // Exactly 2 repair transitions; every candidate probed.
        assert!(!outcome.is_success());
        assert_eq!(provider.repair_count(), 2);
        assert_eq!(probe.execution_count(), 3);

        // The returned candidate still carries its diagnostic.
        let script = outcome.script();
        assert!(!script.is_clean());
        assert!(script.diagnostic().unwrap().contains("failure 3"));
    }

    #[tokio::test]
    async fn test_zero_cap_performs_no_repairs() {
        let provider = Arc::new(ScriptedProvider::new(&[]));
        let probe = Arc::new(FlakyProbe::failing(usize::MAX));
        let agent = FixerAgent::new(provider.clone(), probe.clone());

        let outcome = agent
            .repair(Script::new("broken"), "design", &config(0), &NoopProgress)
            .await
            .expect("exhaustion is not an error");

        assert!(!outcome.is_success());
        assert_eq!(provider.repair_count(), 0);
        assert_eq!(probe.execution_count(), 1);
    }

    #[tokio::test]
    async fn test_recovers_after_failures_within_budget() {
        let provider = Arc::new(ScriptedProvider::new(&[
            "```python\nrepaired_once()\n```",
            "```python\nrepaired_twice()\n```",
        ]));
        let probe = Arc::new(FlakyProbe::failing(2));
        let agent = FixerAgent::new(provider.clone(), probe.clone());

        let outcome = agent
            .repair(Script::new("broken"), "design", &config(5), &NoopProgress)
            .await
            .expect("repair should succeed");

        assert!(outcome.is_success());
        assert_eq!(provider.repair_count(), 2);
        assert_eq!(outcome.script().code, "repaired_twice()");
        assert!(outcome.script().is_clean());
    }

    #[tokio::test]
    async fn test_repair_requests_carry_context_and_prediction() {
        let provider = Arc::new(ScriptedProvider::new(&["fixed()", "fixed_again()"]));
        let probe = Arc::new(FlakyProbe::failing(2));
        let agent = FixerAgent::new(provider.clone(), probe.clone());

        let _ = agent
            .repair(
                Script::new("original_code()"),
                "the design",
                &config(5),
                &NoopProgress,
            )
            .await
            .expect("repair should succeed");

        let requests = provider.requests.lock().unwrap();

        // First repair: design as user turn, failing code as assistant turn,
        // error block; no repeated-failure note yet.
        let first = &requests[0];
        assert_eq!(first.messages[1].content, "the design");
        assert_eq!(first.messages[2].content, "original_code()");
        assert!(first.messages[3].content.contains("<error>"));
        assert!(!first.messages[3].content.contains("Previous errors were similar"));
        assert_eq!(
            first.prediction.as_ref().unwrap().content,
            "original_code()"
        );

        // Second repair: history has two entries, so the note appears and
        // the prediction tracks the newest failing candidate.
        let second = &requests[1];
        assert!(second.messages[3].content.contains("Previous errors were similar"));
        assert_eq!(second.prediction.as_ref().unwrap().content, "fixed()");
    }

    #[tokio::test]
    async fn test_generator_transport_failure_aborts() {
        struct FailingProvider;

        #[async_trait]
        impl LlmProvider for FailingProvider {
            async fn generate(
                &self,
                _request: GenerationRequest,
            ) -> Result<GenerationResponse, LlmError> {
                Err(LlmError::RequestFailed("boom".to_string()))
            }

            async fn generate_stream(
                &self,
                _request: GenerationRequest,
            ) -> Result<TokenStream, LlmError> {
                Err(LlmError::RequestFailed("boom".to_string()))
            }
        }

        let probe = Arc::new(FlakyProbe::failing(usize::MAX));
        let agent = FixerAgent::new(Arc::new(FailingProvider), probe);

        let err = agent
            .repair(Script::new("broken"), "design", &config(3), &NoopProgress)
            .await
            .expect_err("transport failure must propagate");
        assert!(matches!(err, PipelineError::Repair(_)));
    }

    #[tokio::test]
    async fn test_progress_advances_per_streamed_fragment_and_completes() {
        let provider = Arc::new(ScriptedProvider::new(&["abcde"]));
        let probe = Arc::new(FlakyProbe::failing(1));
        let agent = FixerAgent::new(provider, probe);
        let progress = BoundedProgress::new(1000);

        let outcome = agent
            .repair(Script::new("broken"), "design", &config(5), &progress)
            .await
            .expect("repair should succeed");

        assert!(outcome.is_success());
        // One fragment per character streamed, then pinned to total.
        assert!(progress.is_complete());
    }
}
