//! Design document agent.
//!
//! Turns the enriched request into a design document with the reasoning
//! model, optionally followed by a bounded number of critique-and-revise
//! refinement passes. Failures here are fatal: the coordinator performs no
//! stage-level retry.

use std::sync::Arc;

use tracing::{debug, info};

use super::collect_streamed;
use crate::error::PipelineError;
use crate::llm::{GenerationRequest, LlmProvider};
use crate::pipeline::RunConfig;
use crate::progress::ProgressSink;
use crate::prompts::{build_design_messages, build_refine_messages};

/// Agent producing the design document.
pub struct DesignerAgent {
    llm: Arc<dyn LlmProvider>,
}

impl std::fmt::Debug for DesignerAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DesignerAgent").finish_non_exhaustive()
    }
}

impl DesignerAgent {
    /// Creates a new designer agent.
    pub fn new(llm: Arc<dyn LlmProvider>) -> Self {
        Self { llm }
    }

    /// Generates the design document, refining it when configured.
    pub async fn design(
        &self,
        enriched_request: &str,
        config: &RunConfig,
        progress: &dyn ProgressSink,
    ) -> Result<String, PipelineError> {
        let request = GenerationRequest::new(
            config.reasoning_model.clone(),
            build_design_messages(enriched_request),
        );

        let mut design = collect_streamed(&*self.llm, request, progress)
            .await
            .map_err(PipelineError::Design)?;
        debug!(len = design.len(), "Design document generated");

        if config.should_refine {
            for pass in 0..config.refine_iters {
                let request = GenerationRequest::new(
                    config.reasoning_model.clone(),
                    build_refine_messages(enriched_request, &design),
                );
                design = collect_streamed(&*self.llm, request, progress)
                    .await
                    .map_err(PipelineError::Design)?;
                debug!(pass, len = design.len(), "Design document refined");
            }
        }

        progress.complete();
        info!(refined = config.should_refine, "Design stage complete");
        Ok(design)
    }
}
