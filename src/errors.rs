//! Crate-level error taxonomy.
//!
//! Every condition the host has to render differently gets its own variant.
//! Per-record backend failures live in [`crate::scoring::BackendError`] and
//! never surface here.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScreeningError {
    /// The export could not be opened or read.
    #[error("failed to read {path:?}: {source}")]
    ReadFailure {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The export was readable but contained no records.
    #[error("no records found")]
    NoRecordsFound,

    /// Input rejected before any backend call was made.
    #[error("validation failed: {0}")]
    ValidationFailure(String),

    #[error("export failed: {0}")]
    Export(String),

    #[error("credentials error: {0}")]
    Credentials(String),

    #[error("configuration error: {0}")]
    Config(String),
}

pub type ScreeningResult<T> = Result<T, ScreeningError>;

impl From<csv::Error> for ScreeningError {
    fn from(e: csv::Error) -> Self {
        ScreeningError::Export(e.to_string())
    }
}

impl From<config::ConfigError> for ScreeningError {
    fn from(e: config::ConfigError) -> Self {
        ScreeningError::Config(e.to_string())
    }
}
