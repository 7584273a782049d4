use serde::Serialize;

/// Outcome of scoring one record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScoringResult {
    pub score: Option<u8>,
    /// Last text returned by the backend, kept for diagnostics.
    pub raw_model_text: String,
    pub succeeded: bool,
}

impl ScoringResult {
    pub fn scored(score: u8, raw_model_text: String) -> Self {
        Self {
            score: Some(score),
            raw_model_text,
            succeeded: true,
        }
    }

    pub fn failed(raw_model_text: String) -> Self {
        Self {
            score: None,
            raw_model_text,
            succeeded: false,
        }
    }
}

/// Aggregated counts for a scoring batch.
///
/// `total == succeeded + failed + skipped`; `skipped` counts records never
/// attempted because the batch was cancelled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScoringSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
}

/// Everything a batch produces besides the scores written into the records.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub summary: ScoringSummary,
    /// Indexed like the input records; `None` for skipped records.
    pub results: Vec<Option<ScoringResult>>,
}
