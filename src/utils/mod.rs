//! Shared utility functions for tuiforge.
//!
//! This module provides common utilities used across multiple modules,
//! including source-code extraction from LLM responses.

pub mod code_extraction;

pub use code_extraction::{
    extract_code, extract_fenced_block, extract_tagged_block, ExtractionPolicy, CODE_CLOSE_TAG,
    CODE_OPEN_TAG, FENCE_MARKER,
};
