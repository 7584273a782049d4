use std::path::PathBuf;

use serde::Serialize;

use crate::domain::article::ArticleRecord;
use crate::errors::{ScreeningError, ScreeningResult};
use crate::repository::RecordWriter;

#[derive(Serialize)]
struct CsvRow<'a> {
    authors: String,
    title: &'a str,
    #[serde(rename = "abstract")]
    abstract_text: &'a str,
    year: &'a str,
    doi: &'a str,
    relevancy_score: Option<u8>,
}

impl<'a> From<&'a ArticleRecord> for CsvRow<'a> {
    fn from(record: &'a ArticleRecord) -> Self {
        Self {
            authors: record.joined_authors(),
            title: &record.title,
            abstract_text: &record.abstract_text,
            year: record.year.as_deref().unwrap_or_default(),
            doi: record.doi_or_url.as_deref().unwrap_or_default(),
            relevancy_score: record.relevancy_score,
        }
    }
}

/// Writes records as CSV, one row per record in the given order.
#[derive(Debug, Clone)]
pub struct CsvRecordWriter {
    path: PathBuf,
}

impl CsvRecordWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl RecordWriter for CsvRecordWriter {
    fn write_rows(&self, records: &[ArticleRecord]) -> ScreeningResult<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| {
                ScreeningError::Export(format!("cannot create {}: {e}", parent.display()))
            })?;
        }

        let mut writer = csv::Writer::from_path(&self.path)?;
        for record in records {
            writer.serialize(CsvRow::from(record))?;
        }
        writer
            .flush()
            .map_err(|e| ScreeningError::Export(e.to_string()))?;

        log::info!("Saved {} rows to {}", records.len(), self.path.display());
        Ok(())
    }
}
