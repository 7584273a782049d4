use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::scoring::{BackendError, BackendResult, ScoringBackend, ScoringPrompt};

pub const DEFAULT_API_BASE_URL: &str = "https://api.openai.com/v1/";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Connection settings for [`OpenAiBackend`].
#[derive(Debug, Clone)]
pub struct OpenAiSettings {
    pub api_key: String,
    pub model: String,
    pub base_url: Url,
    /// `None` keeps the HTTP client's default.
    pub timeout: Option<Duration>,
}

/// Scores prompts through an OpenAI-compatible chat-completions endpoint.
pub struct OpenAiBackend {
    api_key: String,
    model: String,
    endpoint: Url,
    client: reqwest::Client,
}

impl OpenAiBackend {
    pub fn new(settings: OpenAiSettings) -> BackendResult<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = settings.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| BackendError::Build(e.to_string()))?;
        let endpoint = settings
            .base_url
            .join("chat/completions")
            .map_err(|e| BackendError::Build(e.to_string()))?;

        Ok(Self {
            api_key: settings.api_key,
            model: settings.model,
            endpoint,
            client,
        })
    }
}

#[async_trait]
impl ScoringBackend for OpenAiBackend {
    async fn complete(&self, prompt: &ScoringPrompt, deterministic: bool) -> BackendResult<String> {
        let body = ChatRequest {
            model: &self.model,
            temperature: deterministic.then_some(0.0),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &prompt.system,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt.user,
                },
            ],
        };

        let res = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(self.api_key.trim())
            .json(&body)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = res.status();
        if !status.is_success() {
            let text = res
                .text()
                .await
                .map(|body| api_error_message(&body))
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            return Err(match status {
                StatusCode::TOO_MANY_REQUESTS => BackendError::RateLimited(text),
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => BackendError::Auth(text),
                _ => BackendError::Status {
                    status: status.as_u16(),
                    body: text,
                },
            });
        }

        let parsed: ChatResponse = res
            .json()
            .await
            .map_err(|e| BackendError::Malformed(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| BackendError::Malformed("response has no message content".to_string()))
    }
}

/// Pulls `error.message` out of an API error body, keeping the raw body
/// when it is not the usual JSON envelope.
fn api_error_message(body: &str) -> String {
    serde_json::from_str::<ErrorEnvelope>(body)
        .map(|envelope| envelope.error.message)
        .unwrap_or_else(|_| body.to_string())
}

fn map_transport_error(e: reqwest::Error) -> BackendError {
    if e.is_timeout() {
        BackendError::Timeout
    } else {
        BackendError::Network(e.to_string())
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

#[cfg(test)]
mod tests {
    use super::{ChatMessage, ChatRequest, api_error_message};

    #[test]
    fn error_message_is_unwrapped_from_envelope() {
        let body = r#"{"error":{"message":"You exceeded your current quota","type":"insufficient_quota"}}"#;
        assert_eq!(api_error_message(body), "You exceeded your current quota");
        assert_eq!(api_error_message("gateway timeout"), "gateway timeout");
    }

    #[test]
    fn deterministic_request_pins_temperature() {
        let body = ChatRequest {
            model: "m",
            temperature: Some(0.0),
            messages: vec![ChatMessage {
                role: "user",
                content: "hi",
            }],
        };
        let json = serde_json::to_value(&body).expect("request serializes");
        assert_eq!(json["temperature"], 0.0);

        let body = ChatRequest {
            temperature: None,
            ..body
        };
        let json = serde_json::to_value(&body).expect("request serializes");
        assert!(json.get("temperature").is_none());
    }
}
