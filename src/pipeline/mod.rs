//! Pipeline orchestration for TUI generation.
//!
//! This module provides the coordinator that turns a natural-language
//! request into a (hopefully) working TUI script.
//!
//! # Pipeline Flow
//!
//! 1. **Clarification**: a bounded Q/A dialogue enriches the request
//! 2. **Design**: the reasoning model writes a design document, optionally
//!    refined for a configured number of passes
//! 3. **Synthesis**: the coding model implements the design against the
//!    chosen toolkit
//! 4. **Repair**: the candidate is executed and regenerated from its own
//!    failures until it runs cleanly or the retry budget is exhausted
//!
//! Stages run strictly in order on a single logical thread of control. The
//! coordinator retries nothing itself; only the repair loop has internal
//! retry, and design/synthesis failures propagate as fatal.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tuiforge::llm::OpenAiCompatClient;
//! use tuiforge::pipeline::{PipelineOrchestrator, RunConfig};
//! use tuiforge::probe::SubprocessProbe;
//! use tuiforge::interact::StdinQuestioner;
//! use tuiforge::progress::TracingStageProgress;
//!
//! let config = RunConfig::new().with_library("textual").with_fix_iters(5);
//! let llm = Arc::new(OpenAiCompatClient::from_env()?);
//! let probe = Arc::new(SubprocessProbe::new());
//! let orchestrator = PipelineOrchestrator::new(config, llm, probe);
//!
//! let result = orchestrator
//!     .run("a kanban board", &StdinQuestioner, &TracingStageProgress)
//!     .await?;
//!
//! if result.outcome.is_success() {
//!     println!("{}", result.outcome.script().code);
//! }
//! ```

pub mod config;
pub mod orchestrator;

pub use config::RunConfig;
pub use orchestrator::{PipelineOrchestrator, PipelineResult};
