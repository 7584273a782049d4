use std::path::{Path, PathBuf};

use crate::errors::{ScreeningError, ScreeningResult};
use crate::repository::{TextSource, ThemeSource};

fn read_lossy(path: &Path) -> ScreeningResult<String> {
    let bytes = std::fs::read(path).map_err(|source| ScreeningError::ReadFailure {
        path: path.to_path_buf(),
        source,
    })?;
    let text = String::from_utf8_lossy(&bytes);
    Ok(text.strip_prefix('\u{feff}').unwrap_or(&text).to_string())
}

/// Tagged export stored on disk.
///
/// Invalid UTF-8 is replaced rather than rejected, exports from reference
/// managers are not always clean.
#[derive(Debug, Clone)]
pub struct FileTextSource {
    path: PathBuf,
}

impl FileTextSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TextSource for FileTextSource {
    fn read_text_source(&self) -> ScreeningResult<Vec<String>> {
        let text = read_lossy(&self.path)?;
        Ok(text.lines().map(str::to_string).collect())
    }
}

/// Theme text kept in a file.
#[derive(Debug, Clone)]
pub struct FileThemeSource {
    path: PathBuf,
}

impl FileThemeSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ThemeSource for FileThemeSource {
    fn get_theme_text(&self) -> ScreeningResult<String> {
        read_lossy(&self.path)
    }
}
