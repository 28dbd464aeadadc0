//! Pipeline agents.
//!
//! Each stage of the pipeline is an agent wrapping a shared LLM provider:
//!
//! - [`clarifier`] - bounded Q/A dialogue enriching an under-specified request
//! - [`designer`] - design document generation with optional refinement passes
//! - [`builder`] - code synthesis against the chosen TUI toolkit
//! - [`fixer`] - the generate-execute-repair loop
//!
//! Agents own no mutable state across runs; everything they accumulate
//! (clarification pairs, attempt histories) lives for a single invocation.

pub mod builder;
pub mod clarifier;
pub mod designer;
pub mod fixer;

pub use builder::BuilderAgent;
pub use clarifier::{ClarifierAgent, Dialogue, QaPair, SENTINEL};
pub use designer::DesignerAgent;
pub use fixer::{FixerAgent, RepairOutcome};

use futures::StreamExt;

use crate::error::LlmError;
use crate::llm::{GenerationRequest, LlmProvider};
use crate::progress::ProgressSink;

/// Streams a generation to completion, advancing the progress signal once
/// per fragment, and returns the concatenated text.
pub(crate) async fn collect_streamed(
    provider: &dyn LlmProvider,
    request: GenerationRequest,
    progress: &dyn ProgressSink,
) -> Result<String, LlmError> {
    let mut stream = provider.generate_stream(request).await?;
    let mut output = String::new();
    while let Some(fragment) = stream.next().await {
        output.push_str(&fragment?);
        progress.advance();
    }
    Ok(output)
}
