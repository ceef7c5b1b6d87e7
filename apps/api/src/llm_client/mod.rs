/// LLM Client — the single point of entry for chat-completion calls.
///
/// ARCHITECTURAL RULE: No other module may call the completion API directly.
/// All LLM interactions go through a `CompletionClient`.
///
/// Speaks the OpenAI-compatible `/chat/completions` wire format (Groq by default).
/// There is no retry: a failed call is surfaced to the caller once.
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub const MIN_TEMPERATURE: f32 = 0.0;
pub const MAX_TEMPERATURE: f32 = 1.0;
pub const DEFAULT_TEMPERATURE: f32 = 0.5;
pub const MIN_MAX_TOKENS: u32 = 2048;
pub const MAX_MAX_TOKENS: u32 = 32786;
pub const DEFAULT_MAX_TOKENS: u32 = 8192;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("LLM returned empty content")]
    EmptyContent,
}

/// Rejected completion parameters, detected before any network call.
#[derive(Debug, Error, PartialEq)]
pub enum SettingsError {
    #[error("unknown model '{0}'")]
    UnknownModel(String),

    #[error("temperature must be between 0.0 and 1.0, got {0}")]
    Temperature(f32),

    #[error("max_tokens must be between 2048 and 32786, got {0}")]
    MaxTokens(u32),
}

// ────────────────────────────────────────────────────────────────────────────
// Model allow-list
// ────────────────────────────────────────────────────────────────────────────

/// Models the service is allowed to request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Model {
    #[default]
    #[serde(rename = "mixtral-8x7b-32768")]
    Mixtral8x7b,
    #[serde(rename = "llama3-8b-8192")]
    Llama3_8b,
    #[serde(rename = "llama-3.1-8b-instant")]
    Llama31_8bInstant,
}

impl Model {
    pub const ALL: [Model; 3] = [Model::Mixtral8x7b, Model::Llama3_8b, Model::Llama31_8bInstant];

    pub fn id(self) -> &'static str {
        match self {
            Model::Mixtral8x7b => "mixtral-8x7b-32768",
            Model::Llama3_8b => "llama3-8b-8192",
            Model::Llama31_8bInstant => "llama-3.1-8b-instant",
        }
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Model {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Model::ALL
            .into_iter()
            .find(|m| m.id() == s)
            .ok_or_else(|| SettingsError::UnknownModel(s.to_string()))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Per-request settings
// ────────────────────────────────────────────────────────────────────────────

/// Everything a single completion call needs, built fresh for each request.
/// The credential travels with the call instead of living in shared state.
#[derive(Clone)]
pub struct CompletionSettings {
    api_key: String,
    pub model: Model,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl CompletionSettings {
    pub fn new(
        api_key: String,
        model: Model,
        temperature: f32,
        max_tokens: u32,
    ) -> Result<Self, SettingsError> {
        // NaN fails the range check too
        if !(MIN_TEMPERATURE..=MAX_TEMPERATURE).contains(&temperature) {
            return Err(SettingsError::Temperature(temperature));
        }
        if !(MIN_MAX_TOKENS..=MAX_MAX_TOKENS).contains(&max_tokens) {
            return Err(SettingsError::MaxTokens(max_tokens));
        }
        Ok(Self {
            api_key,
            model,
            temperature,
            max_tokens,
        })
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }
}

impl fmt::Debug for CompletionSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompletionSettings")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Client trait
// ────────────────────────────────────────────────────────────────────────────

/// A chat-completion backend. Implemented by `LlmClient` for the real API and
/// by canned responders in tests.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Sends `prompt` as a single user message and returns the completion text.
    async fn complete(&self, settings: &CompletionSettings, prompt: &str)
        -> Result<String, LlmError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Wire format
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    max_tokens: u32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
pub struct ChoiceMessage {
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

impl ChatResponse {
    /// Extracts the text of the first choice.
    pub fn text(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.content.as_deref())
            .filter(|t| !t.trim().is_empty())
    }
}

#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

// ────────────────────────────────────────────────────────────────────────────
// HTTP client
// ────────────────────────────────────────────────────────────────────────────

/// HTTP client for an OpenAI-compatible chat-completion endpoint.
/// Holds only the connection pool and endpoint; credentials arrive per call.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_url: String,
}

impl LlmClient {
    pub fn new(api_url: String, timeout: Duration) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            api_url,
        })
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Makes a raw call to the completion API, returning the full response object.
    pub async fn call(
        &self,
        settings: &CompletionSettings,
        prompt: &str,
    ) -> Result<ChatResponse, LlmError> {
        let request_body = ChatRequest {
            model: settings.model.id(),
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(settings.api_key())
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                status: status.as_u16(),
                message: api_error_message(body),
            });
        }

        let body = response.text().await?;
        let chat_response = decode_response(&body)?;

        if let Some(usage) = &chat_response.usage {
            debug!(
                "Completion call succeeded: prompt_tokens={}, completion_tokens={}",
                usage.prompt_tokens, usage.completion_tokens
            );
        }

        Ok(chat_response)
    }
}

#[async_trait]
impl CompletionClient for LlmClient {
    async fn complete(
        &self,
        settings: &CompletionSettings,
        prompt: &str,
    ) -> Result<String, LlmError> {
        let response = self.call(settings, prompt).await?;
        response
            .text()
            .map(str::to_string)
            .ok_or(LlmError::EmptyContent)
    }
}

fn decode_response(body: &str) -> Result<ChatResponse, LlmError> {
    serde_json::from_str(body).map_err(LlmError::Parse)
}

/// Pulls `error.message` out of an API error body, falling back to the raw body.
fn api_error_message(body: String) -> String {
    serde_json::from_str::<ApiError>(&body)
        .map(|e| e.error.message)
        .unwrap_or(body)
}
