use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::DEFAULT_CONCURRENCY;

pub mod progress;
pub mod scoring;

pub use progress::{LogProgress, ProgressReporter};
pub use scoring::{ScoringPipeline, score_record, validate_theme};

/// How records are dispatched to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FanOut {
    /// One call at a time, in input order.
    Sequential,
    /// Up to `limit` calls in flight; a limit of zero is treated as one.
    Bounded { limit: usize },
}

impl Default for FanOut {
    fn default() -> Self {
        FanOut::Bounded {
            limit: DEFAULT_CONCURRENCY,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub fan_out: FanOut,
    /// Calls per record before giving up, counting the first.
    pub max_attempts: u32,
    /// Base delay between attempts, multiplied by the attempt number.
    pub retry_backoff: Duration,
    /// Pause after each record while still holding its concurrency slot.
    pub pause_between_calls: Duration,
    /// `None` leaves timeouts to the backend.
    pub call_timeout: Option<Duration>,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            fan_out: FanOut::default(),
            max_attempts: 5,
            retry_backoff: Duration::from_secs(1),
            pause_between_calls: Duration::from_millis(200),
            call_timeout: None,
        }
    }
}

/// Cooperative stop signal for a running batch.
///
/// Records already in flight finish; records not yet started are skipped.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}
