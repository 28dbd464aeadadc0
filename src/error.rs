//! Error types for tuiforge operations.
//!
//! Defines error types for the major subsystems:
//! - LLM API interactions (transport, parsing, rate limits)
//! - Execution probe infrastructure
//! - Configuration loading and validation
//! - Pipeline stage failures
//!
//! Ordinary failures of a *generated* script are not errors: they are carried
//! as the diagnostic on the candidate and drive the repair loop.

use thiserror::Error;

/// Errors that can occur during LLM operations.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Missing API base URL: TUIFORGE_API_BASE environment variable not set")]
    MissingApiBase,

    #[error("Missing API key: TUIFORGE_API_KEY environment variable not set")]
    MissingApiKey,

    #[error("HTTP request failed: {0}")]
    RequestFailed(String),

    #[error("Failed to parse LLM response: {0}")]
    ParseError(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("API error ({code}): {message}")]
    ApiError { code: u16, message: String },

    #[error("Token stream interrupted: {0}")]
    StreamInterrupted(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur in the execution probe's own infrastructure.
///
/// A candidate script that crashes is *not* a `ProbeError`; the probe records
/// its stderr as the candidate's diagnostic and returns normally.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("Interpreter '{0}' not found on PATH")]
    InterpreterNotFound(String),

    #[error("Failed to stage candidate script: {0}")]
    Staging(String),

    #[error("Failed to spawn candidate process: {0}")]
    Spawn(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that abort a pipeline run.
///
/// Only fatal conditions surface here: generator transport failures, probe
/// infrastructure failures, and interactive IO failures. Retry exhaustion in
/// the repair loop is a returned value, never a `PipelineError`.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Clarification stage failed: {0}")]
    Clarification(#[source] LlmError),

    #[error("Design stage failed: {0}")]
    Design(#[source] LlmError),

    #[error("Synthesis stage failed: {0}")]
    Synthesis(#[source] LlmError),

    #[error("Repair stage failed: {0}")]
    Repair(#[source] LlmError),

    #[error("Execution probe failed: {0}")]
    Probe(#[from] ProbeError),

    #[error("Interactive IO failed: {0}")]
    Interaction(#[from] std::io::Error),
}
