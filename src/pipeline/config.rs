//! Run configuration for the generation pipeline.
//!
//! A [`RunConfig`] is set once at startup and read-only for the duration of
//! a run: toolkit identity, iteration budgets, and the model identities for
//! the two generator roles (reasoning vs. coding).

use crate::error::ConfigError;

/// Configuration for one pipeline run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// TUI toolkit the generated program must use.
    pub library: String,
    /// Whether to run the design-refinement pass.
    pub should_refine: bool,
    /// Number of refinement iterations when refinement is enabled.
    pub refine_iters: usize,
    /// Repair attempt cap per session.
    pub fix_iters: usize,
    /// Clarification question cap per session.
    pub max_questions: usize,
    /// Model for clarification and design phases.
    pub reasoning_model: String,
    /// Model for coding and debugging phases.
    pub coding_model: String,
}

impl Default for RunConfig {
    fn default() -> Self {
        let default_model = std::env::var("TUIFORGE_DEFAULT_MODEL").unwrap_or_default();
        Self {
            library: "urwid".to_string(),
            should_refine: false,
            refine_iters: 1,
            fix_iters: 10,
            max_questions: 10,
            reasoning_model: default_model.clone(),
            coding_model: default_model,
        }
    }
}

impl RunConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the toolkit identity.
    pub fn with_library(mut self, library: impl Into<String>) -> Self {
        self.library = library.into();
        self
    }

    /// Enables or disables the design-refinement pass.
    pub fn with_refine(mut self, should_refine: bool) -> Self {
        self.should_refine = should_refine;
        self
    }

    /// Sets the refinement iteration count.
    pub fn with_refine_iters(mut self, refine_iters: usize) -> Self {
        self.refine_iters = refine_iters;
        self
    }

    /// Sets the repair attempt cap.
    pub fn with_fix_iters(mut self, fix_iters: usize) -> Self {
        self.fix_iters = fix_iters;
        self
    }

    /// Sets the clarification question cap.
    pub fn with_max_questions(mut self, max_questions: usize) -> Self {
        self.max_questions = max_questions;
        self
    }

    /// Sets the model for clarification and design.
    pub fn with_reasoning_model(mut self, model: impl Into<String>) -> Self {
        self.reasoning_model = model.into();
        self
    }

    /// Sets the model for coding and debugging.
    pub fn with_coding_model(mut self, model: impl Into<String>) -> Self {
        self.coding_model = model.into();
        self
    }

    /// Creates configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `TUIFORGE_LIBRARY`: Toolkit identity (default: urwid)
    /// - `TUIFORGE_REFINE`: Enable design refinement (default: false)
    /// - `TUIFORGE_REFINE_ITERS`: Refinement iterations (default: 1)
    /// - `TUIFORGE_FIX_ITERS`: Repair attempt cap (default: 10)
    /// - `TUIFORGE_MAX_QUESTIONS`: Clarification round cap (default: 10)
    /// - `TUIFORGE_REASONING_MODEL`: Model for clarification/design
    /// - `TUIFORGE_CODING_MODEL`: Model for synthesis/repair
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` when a numeric or boolean variable
    /// fails to parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("TUIFORGE_LIBRARY") {
            config.library = val;
        }

        if let Ok(val) = std::env::var("TUIFORGE_REFINE") {
            config.should_refine = parse_env_bool(&val, "TUIFORGE_REFINE")?;
        }

        if let Ok(val) = std::env::var("TUIFORGE_REFINE_ITERS") {
            config.refine_iters = parse_env_value(&val, "TUIFORGE_REFINE_ITERS")?;
        }

        if let Ok(val) = std::env::var("TUIFORGE_FIX_ITERS") {
            config.fix_iters = parse_env_value(&val, "TUIFORGE_FIX_ITERS")?;
        }

        if let Ok(val) = std::env::var("TUIFORGE_MAX_QUESTIONS") {
            config.max_questions = parse_env_value(&val, "TUIFORGE_MAX_QUESTIONS")?;
        }

        if let Ok(val) = std::env::var("TUIFORGE_REASONING_MODEL") {
            config.reasoning_model = val;
        }

        if let Ok(val) = std::env::var("TUIFORGE_CODING_MODEL") {
            config.coding_model = val;
        }

        Ok(config)
    }
}

/// Parses an environment variable value with context on failure.
fn parse_env_value<T: std::str::FromStr>(val: &str, key: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    val.parse().map_err(|e: T::Err| ConfigError::InvalidValue {
        key: key.to_string(),
        message: e.to_string(),
    })
}

/// Parses a boolean environment variable ("true"/"false"/"1"/"0").
fn parse_env_bool(val: &str, key: &str) -> Result<bool, ConfigError> {
    match val.to_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        other => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("expected boolean, got '{other}'"),
        }),
    }
}
