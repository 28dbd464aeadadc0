//! Code synthesis agent.
//!
//! Streams the coding model against the design document and extracts the
//! initial candidate script. Synthesis responses are asked to carry an
//! explicit `<code>` block, so extraction tries tags before fences.

use std::sync::Arc;

use tracing::info;

use super::collect_streamed;
use crate::error::PipelineError;
use crate::llm::{GenerationRequest, LlmProvider};
use crate::pipeline::RunConfig;
use crate::progress::ProgressSink;
use crate::prompts::build_synthesis_messages;
use crate::script::Script;
use crate::utils::{extract_code, ExtractionPolicy};

/// Agent producing the initial candidate script.
pub struct BuilderAgent {
    llm: Arc<dyn LlmProvider>,
}

impl std::fmt::Debug for BuilderAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuilderAgent").finish_non_exhaustive()
    }
}

impl BuilderAgent {
    /// Creates a new builder agent.
    pub fn new(llm: Arc<dyn LlmProvider>) -> Self {
        Self { llm }
    }

    /// Synthesizes the first candidate from the design document.
    pub async fn synthesize(
        &self,
        design: &str,
        config: &RunConfig,
        progress: &dyn ProgressSink,
    ) -> Result<Script, PipelineError> {
        let request = GenerationRequest::new(
            config.coding_model.clone(),
            build_synthesis_messages(design, &config.library),
        );

        let output = collect_streamed(&*self.llm, request, progress)
            .await
            .map_err(PipelineError::Synthesis)?;
        progress.complete();

        let code = extract_code(&output, ExtractionPolicy::TagThenFence);
        let script = Script::new(code);
        info!(
            id = %script.id,
            lines = script.line_count(),
            library = %config.library,
            "Initial candidate synthesized"
        );
        Ok(script)
    }
}
