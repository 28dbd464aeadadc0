//! LLM prompts for the TUI generation pipeline.
//!
//! This module contains the prompts for each stage of the pipeline and the
//! per-toolkit hint tables.
//!
//! # Architecture
//!
//! - [`hints`] - Static lookup data describing what actually exists in each
//!   supported TUI toolkit, spliced into synthesis prompts to discourage the
//!   model from inventing APIs
//! - [`stages`] - System prompts for clarify/design/refine/build/fix and the
//!   pure message-construction helpers each agent calls
//!
//! Message construction is deliberately pure: every builder is a function of
//! its explicit inputs (design text, previous candidate, diagnostic, history
//! length), which keeps prompt assembly testable without a model in the loop.

pub mod hints;
pub mod stages;

pub use hints::{library_hints, SUPPORTED_LIBRARIES};
pub use stages::{
    build_clarify_system, build_design_messages, build_refine_messages, build_repair_messages,
    build_synthesis_messages, clarify_round_message, BUILD_SYSTEM_TEMPLATE,
    CLARIFY_SYSTEM_TEMPLATE, DESIGN_SYSTEM, FIX_SYSTEM_TEMPLATE, REFINE_SYSTEM,
};
