use std::time::Instant;

/// Receives "N / total scored" updates as records complete.
pub trait ProgressReporter: Send + Sync {
    fn report_progress(&self, done: usize, total: usize);
}

impl<F> ProgressReporter for F
where
    F: Fn(usize, usize) + Send + Sync,
{
    fn report_progress(&self, done: usize, total: usize) {
        self(done, total)
    }
}

/// Logs progress with rate and ETA every tenth record and for the last five.
///
/// Rates are measured from construction, so build it right before the batch.
#[derive(Debug)]
pub struct LogProgress {
    started: Instant,
}

impl LogProgress {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
        }
    }
}

impl Default for LogProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressReporter for LogProgress {
    fn report_progress(&self, done: usize, total: usize) {
        if done % 10 != 0 && done + 5 <= total {
            return;
        }

        let elapsed = self.started.elapsed().as_secs_f64();
        let rate = if elapsed > 0.0 {
            done as f64 / elapsed
        } else {
            0.0
        };
        let eta = if rate > 0.0 {
            (total - done.min(total)) as f64 / rate
        } else {
            0.0
        };
        log::info!(
            "Completed {done}/{total} records... elapsed: {elapsed:.1}s, \
             rate: {rate:.1} records/s, ETA: {eta:.1}s"
        );
    }
}
