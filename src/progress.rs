//! Progress signaling for streamed generation stages.
//!
//! The pipeline advances a progress signal once per streamed token so a
//! caller can render feedback; the core itself renders nothing. The sink is
//! bounded by a caller-supplied total and guarantees it never advances past
//! it; stage completion pins the counter to the total.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// A monotonically-advancing progress signal.
///
/// Implementations must tolerate being advanced more times than the declared
/// total (generation length is not known up front).
pub trait ProgressSink: Send + Sync {
    /// Advances the signal by one unit, saturating at the total.
    fn advance(&self);

    /// Pins the signal to its total, marking the stage complete.
    fn complete(&self);
}

/// A bounded, monotonic progress counter.
#[derive(Debug)]
pub struct BoundedProgress {
    position: AtomicU64,
    total: u64,
}

impl BoundedProgress {
    /// Creates a counter bounded by `total` units.
    pub fn new(total: u64) -> Self {
        Self {
            position: AtomicU64::new(0),
            total,
        }
    }

    /// Creates a shared counter bounded by `total` units.
    pub fn shared(total: u64) -> Arc<Self> {
        Arc::new(Self::new(total))
    }

    /// Current position, always `<= total`.
    pub fn position(&self) -> u64 {
        self.position.load(Ordering::Relaxed)
    }

    /// The declared total.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// True once the counter has been pinned to its total.
    pub fn is_complete(&self) -> bool {
        self.position() >= self.total
    }
}

impl ProgressSink for BoundedProgress {
    fn advance(&self) {
        // fetch_update never publishes a value past the total.
        let _ = self
            .position
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |pos| {
                (pos < self.total).then_some(pos + 1)
            });
    }

    fn complete(&self) {
        self.position.store(self.total, Ordering::Relaxed);
    }
}

/// A sink that discards all progress updates.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopProgress;

impl ProgressSink for NoopProgress {
    fn advance(&self) {}

    fn complete(&self) {}
}

/// Opens one progress sink per pipeline stage.
///
/// Each streamed stage declares its own token budget up front; the
/// coordinator asks for a fresh sink so a completed stage never pins the
/// counter of the next one.
pub trait StageProgress: Send + Sync {
    /// Starts tracking a stage with the given total.
    fn begin(&self, stage: &str, total: u64) -> Arc<dyn ProgressSink>;
}

/// Stage progress that discards all updates.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopStageProgress;

impl StageProgress for NoopStageProgress {
    fn begin(&self, _stage: &str, _total: u64) -> Arc<dyn ProgressSink> {
        Arc::new(NoopProgress)
    }
}

/// Stage progress that logs stage boundaries through `tracing`.
///
/// Per-fragment advances stay silent; only stage start and completion are
/// worth a log line.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingStageProgress;

impl StageProgress for TracingStageProgress {
    fn begin(&self, stage: &str, total: u64) -> Arc<dyn ProgressSink> {
        tracing::info!(stage, total, "Stage started");
        Arc::new(LoggedProgress {
            inner: BoundedProgress::new(total),
            stage: stage.to_string(),
        })
    }
}

/// Bounded counter that logs when its stage completes.
#[derive(Debug)]
struct LoggedProgress {
    inner: BoundedProgress,
    stage: String,
}

impl ProgressSink for LoggedProgress {
    fn advance(&self) {
        self.inner.advance();
    }

    fn complete(&self) {
        self.inner.complete();
        tracing::info!(stage = %self.stage, "Stage complete");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_counts_units() {
        let progress = BoundedProgress::new(10);
        progress.advance();
        progress.advance();
        progress.advance();
        assert_eq!(progress.position(), 3);
        assert!(!progress.is_complete());
    }

    #[test]
    fn test_never_advances_past_total() {
        let progress = BoundedProgress::new(2);
        for _ in 0..100 {
            progress.advance();
        }
        assert_eq!(progress.position(), 2);
    }

    #[test]
    fn test_complete_pins_to_total() {
        let progress = BoundedProgress::new(50);
        progress.advance();
        progress.complete();
        assert_eq!(progress.position(), 50);
        assert!(progress.is_complete());
    }

    #[test]
    fn test_zero_total_is_immediately_complete() {
        let progress = BoundedProgress::new(0);
        progress.advance();
        assert_eq!(progress.position(), 0);
        assert!(progress.is_complete());
    }
}
