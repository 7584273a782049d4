use std::path::{Path, PathBuf};

use crate::errors::{ScreeningError, ScreeningResult};
use crate::repository::CredentialStore;

pub const API_KEY_ENV_VAR: &str = "OPENAI_API_KEY";
pub const KEY_FILENAME: &str = "sysreviewhelper_key.txt";

/// API key kept in a plain file, with an environment variable override.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    key_path: PathBuf,
    env_var: Option<String>,
}

impl FileCredentialStore {
    /// Store whose key file sits at `key_path`; `OPENAI_API_KEY` wins when set.
    pub fn new(key_path: impl Into<PathBuf>) -> Self {
        Self {
            key_path: key_path.into(),
            env_var: Some(API_KEY_ENV_VAR.to_string()),
        }
    }

    /// Store that never consults the environment.
    pub fn file_only(key_path: impl Into<PathBuf>) -> Self {
        Self {
            key_path: key_path.into(),
            env_var: None,
        }
    }

    /// Key file next to the running executable, falling back to the
    /// working directory when the executable path is unknown.
    pub fn beside_executable() -> Self {
        let dir = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf))
            .unwrap_or_else(|| PathBuf::from("."));
        Self::new(dir.join(KEY_FILENAME))
    }

    pub fn key_path(&self) -> &Path {
        &self.key_path
    }
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

impl CredentialStore for FileCredentialStore {
    fn load_api_key(&self) -> Option<String> {
        if let Some(var) = &self.env_var
            && let Some(key) = std::env::var(var).ok().as_deref().and_then(non_blank)
        {
            return Some(key);
        }

        match std::fs::read(&self.key_path) {
            Ok(bytes) => non_blank(&String::from_utf8_lossy(&bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                log::warn!("Cannot read key file {}: {e}", self.key_path.display());
                None
            }
        }
    }

    fn save_api_key(&self, key: &str) -> ScreeningResult<()> {
        let key = non_blank(key)
            .ok_or_else(|| ScreeningError::Credentials("empty API key".to_string()))?;
        std::fs::write(&self.key_path, key).map_err(|e| {
            ScreeningError::Credentials(format!(
                "cannot write {}: {e}",
                self.key_path.display()
            ))
        })
    }

    fn delete_api_key(&self) -> ScreeningResult<()> {
        match std::fs::remove_file(&self.key_path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ScreeningError::Credentials(format!(
                "cannot delete {}: {e}",
                self.key_path.display()
            ))),
        }
    }
}
