use std::time::Duration;

use futures::StreamExt;
use futures::stream::FuturesUnordered;
use tokio::sync::Semaphore;

use crate::domain::article::ArticleRecord;
use crate::domain::scoring::{BatchReport, ScoringResult, ScoringSummary};
use crate::errors::{ScreeningError, ScreeningResult};
use crate::processing::{CancelHandle, FanOut, PipelineOptions, ProgressReporter};
use crate::scoring::{
    BackendError, BackendResult, ScoringBackend, ScoringPrompt, build_prompt, extract_score,
};

/// Rejects blank or whitespace-only themes.
pub fn validate_theme(theme: &str) -> ScreeningResult<()> {
    if theme.trim().is_empty() {
        return Err(ScreeningError::ValidationFailure(
            "research theme must not be blank".to_string(),
        ));
    }
    Ok(())
}

async fn call_backend<B>(
    backend: &B,
    prompt: &ScoringPrompt,
    timeout: Option<Duration>,
) -> BackendResult<String>
where
    B: ScoringBackend + ?Sized,
{
    let call = backend.complete(prompt, true);
    match timeout {
        Some(limit) => tokio::time::timeout(limit, call)
            .await
            .map_err(|_| BackendError::Timeout)?,
        None => call.await,
    }
}

/// Linear backoff for the given attempt, saturating at [`Duration::MAX`].
fn backoff_delay(base: Duration, attempt: u32, factor: u32) -> Duration {
    base.saturating_mul(attempt.saturating_mul(factor))
}

/// Scores one record, retrying failed calls and unparseable replies.
///
/// Never fails: exhausted retries yield a result with `score == None`.
pub async fn score_record<B>(
    backend: &B,
    theme: &str,
    title: &str,
    abstract_text: &str,
    options: &PipelineOptions,
) -> ScoringResult
where
    B: ScoringBackend + ?Sized,
{
    let prompt = build_prompt(theme, title, abstract_text);
    let attempts = options.max_attempts.max(1);
    let mut last_text = String::new();

    for attempt in 1..=attempts {
        let delay = match call_backend(backend, &prompt, options.call_timeout).await {
            Ok(text) => {
                if let Some(score) = extract_score(&text) {
                    return ScoringResult::scored(score, text);
                }
                log::warn!("No score in reply (attempt {attempt}/{attempts}): {text:?}");
                last_text = text;
                backoff_delay(options.retry_backoff, attempt, 1)
            }
            Err(e) if !e.is_retryable() => {
                log::error!("Backend call failed, not retrying: {e}");
                break;
            }
            Err(e @ BackendError::RateLimited(_)) => {
                log::warn!("Rate limited (attempt {attempt}/{attempts}): {e}");
                backoff_delay(options.retry_backoff, attempt, 3)
            }
            Err(e) => {
                log::warn!("Backend call failed (attempt {attempt}/{attempts}): {e}");
                backoff_delay(options.retry_backoff, attempt, 1)
            }
        };

        if attempt < attempts && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }

    ScoringResult::failed(last_text)
}

fn unscored_message(idx: usize, record: &ArticleRecord, result: &ScoringResult) -> String {
    format!(
        "Record {idx} ({:?}) left unscored, last reply: {:?}",
        record.title, result.raw_model_text
    )
}

/// Scores batches of records against one theme.
///
/// Holds no state between batches apart from the cancel handle.
pub struct ScoringPipeline<B> {
    backend: B,
    options: PipelineOptions,
    cancel: CancelHandle,
}

impl<B> ScoringPipeline<B>
where
    B: ScoringBackend,
{
    pub fn new(backend: B, options: PipelineOptions) -> Self {
        Self {
            backend,
            options,
            cancel: CancelHandle::new(),
        }
    }

    pub fn with_cancel(mut self, cancel: CancelHandle) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Scores every record and writes `relevancy_score` by input index.
    ///
    /// A blank theme is rejected before any backend call. Per-record
    /// failures leave the score as `None` and only show up in the summary.
    pub async fn score_all<P>(
        &self,
        records: &mut [ArticleRecord],
        theme: &str,
        progress: &P,
    ) -> ScreeningResult<BatchReport>
    where
        P: ProgressReporter + ?Sized,
    {
        validate_theme(theme)?;

        log::info!(
            "Scoring {} records ({:?})",
            records.len(),
            self.options.fan_out
        );

        let results = match self.options.fan_out {
            FanOut::Sequential => self.run_sequential(records, theme, progress).await,
            FanOut::Bounded { limit } => {
                self.run_bounded(records, theme, limit.max(1), progress)
                    .await
            }
        };

        let mut summary = ScoringSummary {
            total: records.len(),
            ..Default::default()
        };
        for (record, result) in records.iter_mut().zip(&results) {
            match result {
                Some(result) => {
                    record.relevancy_score = result.score;
                    if result.succeeded {
                        summary.succeeded += 1;
                    } else {
                        summary.failed += 1;
                    }
                }
                None => summary.skipped += 1,
            }
        }

        log::info!(
            "Finished scoring: total={}, succeeded={}, failed={}, skipped={}",
            summary.total,
            summary.succeeded,
            summary.failed,
            summary.skipped
        );

        Ok(BatchReport { summary, results })
    }

    /// Shared per-record step for both fan-out strategies.
    ///
    /// Returns `None` when the batch was cancelled before this record began.
    async fn score_slot(
        &self,
        idx: usize,
        theme: &str,
        record: &ArticleRecord,
    ) -> Option<ScoringResult> {
        if self.cancel.is_cancelled() {
            return None;
        }
        let result = score_record(
            &self.backend,
            theme,
            &record.title,
            &record.abstract_text,
            &self.options,
        )
        .await;
        if !result.succeeded {
            log::warn!("{}", unscored_message(idx, record, &result));
        }
        if !self.options.pause_between_calls.is_zero() {
            tokio::time::sleep(self.options.pause_between_calls).await;
        }
        Some(result)
    }

    async fn run_sequential<P>(
        &self,
        records: &[ArticleRecord],
        theme: &str,
        progress: &P,
    ) -> Vec<Option<ScoringResult>>
    where
        P: ProgressReporter + ?Sized,
    {
        let total = records.len();
        let mut results = Vec::with_capacity(total);
        for (idx, record) in records.iter().enumerate() {
            let result = self.score_slot(idx, theme, record).await;
            if result.is_some() {
                progress.report_progress(idx + 1, total);
            }
            results.push(result);
        }
        results
    }

    /// Drives all records concurrently from one task; a [`Semaphore`] caps
    /// in-flight calls and each completion lands in its own index slot.
    async fn run_bounded<P>(
        &self,
        records: &[ArticleRecord],
        theme: &str,
        limit: usize,
        progress: &P,
    ) -> Vec<Option<ScoringResult>>
    where
        P: ProgressReporter + ?Sized,
    {
        let total = records.len();
        let semaphore = Semaphore::new(limit);
        let mut slots: Vec<Option<ScoringResult>> = vec![None; total];

        let mut pending = records
            .iter()
            .enumerate()
            .map(|(idx, record)| {
                let semaphore = &semaphore;
                async move {
                    let _permit = semaphore.acquire().await.ok();
                    (idx, self.score_slot(idx, theme, record).await)
                }
            })
            .collect::<FuturesUnordered<_>>();

        let mut done = 0;
        while let Some((idx, result)) = pending.next().await {
            if result.is_some() {
                done += 1;
                progress.report_progress(done, total);
            }
            slots[idx] = result;
        }

        slots
    }
}
