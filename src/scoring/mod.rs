use async_trait::async_trait;
use thiserror::Error;

pub mod extract;
pub mod openai;
pub mod prompt;

pub use extract::extract_score;
pub use prompt::{ScoringPrompt, build_prompt};

/// Failures of a single backend call.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("failed to build backend client: {0}")]
    Build(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("rate limited: {0}")]
    RateLimited(String),
    #[error("authentication rejected: {0}")]
    Auth(String),
    #[error("backend returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("malformed response: {0}")]
    Malformed(String),
    #[error("request timed out")]
    Timeout,
}

impl BackendError {
    /// Whether retrying the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, BackendError::Auth(_) | BackendError::Build(_))
    }
}

pub type BackendResult<T> = Result<T, BackendError>;

/// A language model that turns a scoring prompt into raw text.
#[async_trait]
pub trait ScoringBackend: Send + Sync {
    /// Submits the prompt and returns the model's raw reply.
    ///
    /// With `deterministic` set the backend uses its lowest-variability
    /// sampling so identical prompts tend to get identical replies.
    async fn complete(&self, prompt: &ScoringPrompt, deterministic: bool) -> BackendResult<String>;
}
