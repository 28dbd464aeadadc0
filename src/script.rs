//! The candidate script entity.
//!
//! A [`Script`] is one generated or repaired version of the target TUI
//! program. Candidates are immutable once produced: the repair loop never
//! edits a script in place, it derives a fresh one from the previous
//! candidate's failure. The execution probe is the single writer of the
//! diagnostic field, and it does so by returning a new value.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One generated candidate of the target program.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Script {
    /// Unique identifier for this candidate.
    pub id: String,
    /// Complete source text of the candidate.
    pub code: String,
    /// Captured standard-error text from the last execution, if it failed.
    /// `None` means the candidate has not failed a probe.
    pub stderr: Option<String>,
    /// Timestamp when this candidate was produced.
    pub created_at: DateTime<Utc>,
}

impl Script {
    /// Creates a fresh candidate with no execution diagnostic.
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            code: code.into(),
            stderr: None,
            created_at: Utc::now(),
        }
    }

    /// Returns a copy of this candidate carrying the given diagnostic.
    ///
    /// Used by probes to report a failed execution without mutating the
    /// original candidate.
    pub fn with_diagnostic(&self, stderr: impl Into<String>) -> Self {
        Self {
            stderr: Some(stderr.into()),
            ..self.clone()
        }
    }

    /// Returns a copy of this candidate with the diagnostic cleared.
    pub fn clean(&self) -> Self {
        Self {
            stderr: None,
            ..self.clone()
        }
    }

    /// True when the last execution reported no diagnostic.
    pub fn is_clean(&self) -> bool {
        self.stderr.is_none()
    }

    /// The last execution diagnostic, if any.
    pub fn diagnostic(&self) -> Option<&str> {
        self.stderr.as_deref()
    }

    /// Returns the line count of the source text.
    pub fn line_count(&self) -> usize {
        self.code.lines().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_script_is_clean() {
        let script = Script::new("print('hello')");
        assert!(script.is_clean());
        assert_eq!(script.diagnostic(), None);
        assert_eq!(script.line_count(), 1);
    }

    #[test]
    fn test_with_diagnostic_does_not_mutate_original() {
        let script = Script::new("raise ValueError");
        let failed = script.with_diagnostic("ValueError");

        assert!(script.is_clean());
        assert!(!failed.is_clean());
        assert_eq!(failed.diagnostic(), Some("ValueError"));
        assert_eq!(failed.id, script.id);
        assert_eq!(failed.code, script.code);
    }

    #[test]
    fn test_clean_clears_diagnostic() {
        let failed = Script::new("x = 1").with_diagnostic("boom");
        let clean = failed.clean();
        assert!(clean.is_clean());
        assert_eq!(clean.code, "x = 1");
    }
}
