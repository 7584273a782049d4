//! Configuration model loaded from external sources.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use url::Url;

use crate::DEFAULT_CONCURRENCY;
use crate::errors::{ScreeningError, ScreeningResult};
use crate::processing::{FanOut, PipelineOptions};
use crate::scoring::openai::{DEFAULT_API_BASE_URL, DEFAULT_MODEL, OpenAiSettings};

pub const DEFAULT_CONFIG_FILE: &str = "screener.yaml";
pub const ENV_PREFIX: &str = "SCREENER";

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
/// Settings for scoring runs.
pub struct ScreenerConfig {
    pub model: String,
    pub api_base_url: String,
    pub concurrency: usize,
    pub sequential: bool,
    pub max_attempts: u32,
    pub retry_backoff_ms: u64,
    pub pause_between_calls_ms: u64,
    pub request_timeout_secs: Option<u64>,
    pub key_file: Option<PathBuf>,
}

impl Default for ScreenerConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            concurrency: DEFAULT_CONCURRENCY,
            sequential: false,
            max_attempts: 5,
            retry_backoff_ms: 1000,
            pause_between_calls_ms: 200,
            request_timeout_secs: None,
            key_file: None,
        }
    }
}

impl ScreenerConfig {
    /// Layers the YAML file (optional unless `path` is given explicitly)
    /// and `SCREENER_*` environment variables over the defaults.
    pub fn load(path: Option<&Path>) -> ScreeningResult<Self> {
        let file = match path {
            Some(path) => config::File::from(path).required(true),
            None => config::File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let settings = config::Config::builder()
            .add_source(file)
            .add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    pub fn pipeline_options(&self) -> PipelineOptions {
        let fan_out = if self.sequential {
            FanOut::Sequential
        } else {
            FanOut::Bounded {
                limit: self.concurrency.max(1),
            }
        };

        PipelineOptions {
            fan_out,
            max_attempts: self.max_attempts.max(1),
            retry_backoff: Duration::from_millis(self.retry_backoff_ms),
            pause_between_calls: Duration::from_millis(self.pause_between_calls_ms),
            call_timeout: self.request_timeout_secs.map(Duration::from_secs),
        }
    }

    pub fn openai_settings(&self, api_key: String) -> ScreeningResult<OpenAiSettings> {
        let mut base = self.api_base_url.clone();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url = Url::parse(&base)
            .map_err(|e| ScreeningError::Config(format!("invalid api_base_url {base}: {e}")))?;

        Ok(OpenAiSettings {
            api_key,
            model: self.model.clone(),
            base_url,
            timeout: self.request_timeout_secs.map(Duration::from_secs),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::time::Duration;

    use super::ScreenerConfig;
    use crate::processing::FanOut;

    #[test]
    fn defaults_map_to_bounded_pipeline() {
        let options = ScreenerConfig::default().pipeline_options();

        assert_eq!(options.fan_out, FanOut::Bounded { limit: 5 });
        assert_eq!(options.max_attempts, 5);
        assert_eq!(options.pause_between_calls, Duration::from_millis(200));
        assert_eq!(options.call_timeout, None);
    }

    #[test]
    fn yaml_file_overrides_defaults() {
        let mut file = tempfile::Builder::new()
            .suffix(".yaml")
            .tempfile()
            .expect("temp file");
        writeln!(
            file,
            "model: gpt-test\nconcurrency: 8\nsequential: true\nrequest_timeout_secs: 30"
        )
        .expect("write");

        let config = ScreenerConfig::load(Some(file.path())).expect("config loads");

        assert_eq!(config.model, "gpt-test");
        assert_eq!(config.concurrency, 8);
        assert_eq!(config.max_attempts, 5);

        let options = config.pipeline_options();
        assert_eq!(options.fan_out, FanOut::Sequential);
        assert_eq!(options.call_timeout, Some(Duration::from_secs(30)));
    }

    #[test]
    fn base_url_gets_trailing_slash() {
        let config = ScreenerConfig {
            api_base_url: "http://localhost:8080/v1".to_string(),
            ..Default::default()
        };

        let settings = config
            .openai_settings("key".to_string())
            .expect("valid url");

        assert_eq!(settings.base_url.as_str(), "http://localhost:8080/v1/");
    }

    #[test]
    fn invalid_base_url_is_a_config_error() {
        let config = ScreenerConfig {
            api_base_url: "not a url".to_string(),
            ..Default::default()
        };

        assert!(config.openai_settings("key".to_string()).is_err());
    }
}
