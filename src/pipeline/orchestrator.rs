//! The pipeline coordinator.
//!
//! Sequences Clarification → Design → Synthesis → Repair, threading the
//! shared run configuration and a per-stage progress signal through each
//! stage. Each stage produces exactly the input the next one consumes:
//! dialogue → enriched request → design document → candidate → outcome.

use std::sync::Arc;

use tracing::info;

use crate::agents::{BuilderAgent, ClarifierAgent, DesignerAgent, FixerAgent, RepairOutcome};
use crate::agents::clarifier::Dialogue;
use crate::error::PipelineError;
use crate::interact::Questioner;
use crate::llm::{LlmProvider, MAX_COMPLETION_TOKENS};
use crate::probe::ExecutionProbe;
use crate::progress::StageProgress;

use super::config::RunConfig;

/// Progress units declared per streamed stage, derived from the completion
/// budget the same way the stage totals are sized everywhere else.
const STAGE_PROGRESS_BUDGET: u64 = (MAX_COMPLETION_TOKENS / 15) as u64;

/// Everything a completed run produced.
#[derive(Debug)]
pub struct PipelineResult {
    /// The recorded clarification dialogue.
    pub dialogue: Dialogue,
    /// The design document the candidate was built against.
    pub design: String,
    /// Terminal outcome of the repair session; carries the final candidate.
    pub outcome: RepairOutcome,
}

/// Coordinator owning the agents for one pipeline.
pub struct PipelineOrchestrator {
    config: RunConfig,
    clarifier: ClarifierAgent,
    designer: DesignerAgent,
    builder: BuilderAgent,
    fixer: FixerAgent,
}

impl std::fmt::Debug for PipelineOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineOrchestrator")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl PipelineOrchestrator {
    /// Creates an orchestrator sharing one provider across all agents.
    pub fn new(
        config: RunConfig,
        llm: Arc<dyn LlmProvider>,
        probe: Arc<dyn ExecutionProbe>,
    ) -> Self {
        Self {
            clarifier: ClarifierAgent::new(llm.clone()),
            designer: DesignerAgent::new(llm.clone()),
            builder: BuilderAgent::new(llm.clone()),
            fixer: FixerAgent::new(llm, probe),
            config,
        }
    }

    /// The configuration this orchestrator runs with.
    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Runs the full pipeline on a request.
    ///
    /// The returned result may carry a still-failing candidate: retry
    /// exhaustion in the repair stage is a normal terminal outcome, and the
    /// caller decides whether to warn or proceed. Only transport and
    /// infrastructure failures surface as errors.
    pub async fn run(
        &self,
        request: &str,
        questioner: &dyn Questioner,
        progress: &dyn StageProgress,
    ) -> Result<PipelineResult, PipelineError> {
        info!(library = %self.config.library, "Pipeline started");

        let dialogue = self
            .clarifier
            .clarify(request, &self.config, questioner)
            .await?;
        let enriched = dialogue.enriched();

        let design_sink = progress.begin("design", STAGE_PROGRESS_BUDGET);
        let design = self
            .designer
            .design(&enriched, &self.config, design_sink.as_ref())
            .await?;

        let build_sink = progress.begin("build", STAGE_PROGRESS_BUDGET);
        let script = self
            .builder
            .synthesize(&design, &self.config, build_sink.as_ref())
            .await?;

        let fix_total = STAGE_PROGRESS_BUDGET * self.config.fix_iters.max(1) as u64;
        let fix_sink = progress.begin("fix", fix_total);
        let outcome = self
            .fixer
            .repair(script, &design, &self.config, fix_sink.as_ref())
            .await?;

        info!(
            success = outcome.is_success(),
            pairs = dialogue.pairs.len(),
            "Pipeline finished"
        );

        Ok(PipelineResult {
            dialogue,
            design,
            outcome,
        })
    }
}
