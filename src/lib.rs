pub mod domain;
pub mod errors;
pub mod models;
pub mod parser;
pub mod processing;
pub mod repository;
pub mod scoring;

/// In-flight backend calls allowed when nothing else is configured.
pub const DEFAULT_CONCURRENCY: usize = 5;
