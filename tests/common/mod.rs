//! Helpers for integration tests.
#![allow(dead_code)]

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use sysreview_screener::domain::article::ArticleRecord;
use sysreview_screener::processing::{FanOut, PipelineOptions};
use sysreview_screener::scoring::{BackendResult, ScoringBackend, ScoringPrompt};

/// Options with retries and pauses switched off.
pub fn fast_options(fan_out: FanOut) -> PipelineOptions {
    PipelineOptions {
        fan_out,
        max_attempts: 1,
        retry_backoff: Duration::ZERO,
        pause_between_calls: Duration::ZERO,
        call_timeout: None,
    }
}

/// Records titled `Record 0` .. `Record n-1`.
pub fn numbered_records(n: usize) -> Vec<ArticleRecord> {
    (0..n)
        .map(|i| ArticleRecord {
            title: format!("Record {i}"),
            abstract_text: format!("Abstract {i}"),
            ..Default::default()
        })
        .collect()
}

fn record_index(prompt: &ScoringPrompt) -> usize {
    prompt
        .user
        .lines()
        .find_map(|line| line.strip_prefix("Title: Record "))
        .and_then(|n| n.trim().parse().ok())
        .unwrap_or(0)
}

/// Always replies with the same text and counts calls.
pub struct FixedBackend {
    reply: String,
    calls: AtomicUsize,
}

impl FixedBackend {
    pub fn new(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ScoringBackend for FixedBackend {
    async fn complete(
        &self,
        _prompt: &ScoringPrompt,
        _deterministic: bool,
    ) -> BackendResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.reply.clone())
    }
}

/// Replies `(index % 10) + 1` for `Record <index>`, delaying earlier records
/// longer so the last request resolves first.
pub struct ReverseDelayBackend {
    total: usize,
    step: Duration,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    completion_order: Mutex<Vec<usize>>,
}

impl ReverseDelayBackend {
    pub fn new(total: usize, step: Duration) -> Self {
        Self {
            total,
            step,
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            completion_order: Mutex::new(Vec::new()),
        }
    }

    pub fn expected_score(index: usize) -> u8 {
        (index % 10) as u8 + 1
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn completion_order(&self) -> Vec<usize> {
        self.completion_order.lock().expect("lock").clone()
    }
}

#[async_trait]
impl ScoringBackend for ReverseDelayBackend {
    async fn complete(
        &self,
        prompt: &ScoringPrompt,
        _deterministic: bool,
    ) -> BackendResult<String> {
        let index = record_index(prompt);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let remaining = self.total.saturating_sub(index) as u32;
        tokio::time::sleep(self.step * remaining).await;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.completion_order.lock().expect("lock").push(index);
        Ok(format!("Score: {}", Self::expected_score(index)))
    }
}

/// Collects every progress update.
#[derive(Default)]
pub struct RecordingProgress {
    updates: Mutex<Vec<(usize, usize)>>,
}

impl RecordingProgress {
    pub fn updates(&self) -> Vec<(usize, usize)> {
        self.updates.lock().expect("lock").clone()
    }
}

impl sysreview_screener::processing::ProgressReporter for RecordingProgress {
    fn report_progress(&self, done: usize, total: usize) {
        self.updates.lock().expect("lock").push((done, total));
    }
}
