//! LLM backend abstraction and implementations.
//!
//! Enum-based dispatch over concrete backends, avoiding the
//! dyn-compatibility issues with async trait methods. Implementations
//! exist for OpenAI-compatible chat completions APIs and the Anthropic
//! Messages API, both over HTTP via `reqwest`.
//!
//! The adapter does not care which model answers. It sends a prompt and
//! expects a text response containing JSON.

use reverie_engine::config::OracleConfig;
use tracing::warn;

use crate::error::AdapterError;
use crate::prompt::RenderedPrompt;

/// An LLM backend that can process a prompt and return a response.
///
/// Uses enum dispatch instead of trait objects because async methods
/// are not dyn-compatible in Rust.
pub enum LlmBackend {
    /// OpenAI-compatible chat completions API.
    OpenAi(OpenAiBackend),
    /// Anthropic Messages API.
    Anthropic(AnthropicBackend),
}

impl LlmBackend {
    /// Create a backend from the oracle configuration.
    ///
    /// Unknown backend names fall through to the OpenAI-compatible
    /// implementation with a warning, since most local endpoints speak
    /// that dialect.
    pub fn from_config(config: &OracleConfig) -> Self {
        match config.backend.as_str() {
            "anthropic" => Self::Anthropic(AnthropicBackend::new(config)),
            "openai" => Self::OpenAi(OpenAiBackend::new(config)),
            other => {
                warn!(backend = other, "Unknown oracle backend, assuming OpenAI-compatible");
                Self::OpenAi(OpenAiBackend::new(config))
            }
        }
    }

    /// Send a prompt to the LLM and return the response text.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::Backend`] if the HTTP call fails or the
    /// response cannot be extracted.
    pub async fn complete(&self, prompt: &RenderedPrompt) -> Result<String, AdapterError> {
        match self {
            Self::OpenAi(backend) => backend.complete(prompt).await,
            Self::Anthropic(backend) => backend.complete(prompt).await,
        }
    }

    /// Human-readable name for logging.
    pub const fn name(&self) -> &str {
        match self {
            Self::OpenAi(_) => "openai-compatible",
            Self::Anthropic(_) => "anthropic",
        }
    }
}

/// Backend for OpenAI-compatible chat completions APIs.
///
/// Works with `OpenAI`, `DeepSeek`, and Ollama endpoints. Sends requests to
/// `{api_url}/chat/completions`.
pub struct OpenAiBackend {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
}

impl OpenAiBackend {
    /// Create a new OpenAI-compatible backend.
    pub fn new(config: &OracleConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        }
    }

    async fn complete(&self, prompt: &RenderedPrompt) -> Result<String, AdapterError> {
        let url = format!("{}/chat/completions", self.api_url);

        let body = serde_json::json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": prompt.system},
                {"role": "user", "content": prompt.user}
            ],
            "temperature": 0.8,
            "max_tokens": 1024,
            "response_format": {"type": "json_object"}
        });

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| AdapterError::Backend(format!("OpenAI request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "unable to read error body".to_owned());
            return Err(AdapterError::Backend(format!(
                "OpenAI returned {status}: {error_body}"
            )));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| AdapterError::Backend(format!("OpenAI response parse failed: {e}")))?;

        extract_openai_content(&json)
    }
}

/// Extract the text content from an `OpenAI` chat completions response.
fn extract_openai_content(json: &serde_json::Value) -> Result<String, AdapterError> {
    json.get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(serde_json::Value::as_str)
        .map(ToOwned::to_owned)
        .ok_or_else(|| {
            AdapterError::Backend("OpenAI response missing choices[0].message.content".to_owned())
        })
}

/// Backend for the Anthropic Messages API.
///
/// Anthropic uses a different request format from `OpenAI`:
/// - `x-api-key` header instead of `Authorization: Bearer`
/// - System prompt is a top-level field, not a message
/// - Response structure is `content[0].text`
pub struct AnthropicBackend {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
}

impl AnthropicBackend {
    /// Create a new Anthropic Messages API backend.
    pub fn new(config: &OracleConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        }
    }

    async fn complete(&self, prompt: &RenderedPrompt) -> Result<String, AdapterError> {
        let url = format!("{}/messages", self.api_url);

        let body = serde_json::json!({
            "model": self.model,
            "max_tokens": 1024,
            "system": prompt.system,
            "messages": [
                {"role": "user", "content": prompt.user}
            ]
        });

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| AdapterError::Backend(format!("Anthropic request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "unable to read error body".to_owned());
            return Err(AdapterError::Backend(format!(
                "Anthropic returned {status}: {error_body}"
            )));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| AdapterError::Backend(format!("Anthropic response parse failed: {e}")))?;

        extract_anthropic_content(&json)
    }
}

/// Extract the text content from an Anthropic Messages API response.
fn extract_anthropic_content(json: &serde_json::Value) -> Result<String, AdapterError> {
    json.get("content")
        .and_then(|c| c.get(0))
        .and_then(|b| b.get("text"))
        .and_then(serde_json::Value::as_str)
        .map(ToOwned::to_owned)
        .ok_or_else(|| {
            AdapterError::Backend("Anthropic response missing content[0].text".to_owned())
        })
}
