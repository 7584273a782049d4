//! Capabilities the core consumes from its host, plus file-backed
//! implementations used by the binary.

use crate::domain::article::ArticleRecord;
use crate::errors::ScreeningResult;

pub mod credentials;
pub mod export;
pub mod source;

pub use credentials::FileCredentialStore;
pub use export::CsvRecordWriter;
pub use source::{FileTextSource, FileThemeSource};

pub trait TextSource {
    /// Returns the export split into lines.
    fn read_text_source(&self) -> ScreeningResult<Vec<String>>;
}

pub trait ThemeSource {
    /// Returns the research theme; may be blank, callers validate.
    fn get_theme_text(&self) -> ScreeningResult<String>;
}

pub trait RecordWriter {
    fn write_rows(&self, records: &[ArticleRecord]) -> ScreeningResult<()>;
}

pub trait CredentialStore {
    fn load_api_key(&self) -> Option<String>;
    fn save_api_key(&self, key: &str) -> ScreeningResult<()>;
    fn delete_api_key(&self) -> ScreeningResult<()>;
}

impl ThemeSource for String {
    fn get_theme_text(&self) -> ScreeningResult<String> {
        Ok(self.clone())
    }
}
