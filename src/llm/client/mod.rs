//! LLM client for receipt field extraction.
//!
//! Supports OpenAI-compatible chat completions and the Ollama chat API.

mod config;
mod prompts;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub use config::{LlmConfig, LlmProvider};
pub use prompts::{DEFAULT_EXTRACTION_PROMPT, DEFAULT_SYSTEM_PROMPT};

/// Errors that can occur during LLM operations.
#[derive(Debug, Error)]
pub enum LlmError {
    /// Failed to connect to LLM service
    #[error("Connection error: {0}")]
    Connection(String),
    /// API returned an error
    #[error("API error: {0}")]
    Api(String),
    /// Failed to parse response
    #[error("Parse error: {0}")]
    Parse(String),
    /// Provider needs an API key and none is configured
    #[error("No API key configured for {0} (set OPENAI_API_KEY or LLM_API_KEY)")]
    MissingApiKey(&'static str),
}

/// A chat-style completion service.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Send a system instruction and a user prompt, returning the reply text.
    async fn complete(&self, system: &str, prompt: &str) -> Result<String, LlmError>;

    /// Temperature used for completions.
    fn temperature(&self) -> f32;
}

/// LLM client backed by an HTTP API.
pub struct LlmClient {
    config: LlmConfig,
    client: Client,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

/// OpenAI chat completions request format.
#[derive(Debug, Serialize)]
struct OpenAiRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAiMessage {
    #[serde(default)]
    content: Option<String>,
}

impl OpenAiResponse {
    /// Text of the first choice. A choice with a null `content` (refusals,
    /// tool calls) is reported separately from an empty `choices` list.
    fn first_content(self) -> Result<String, LlmError> {
        let choice = self
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::Parse("response contained no choices".to_string()))?;
        choice
            .message
            .content
            .ok_or_else(|| LlmError::Parse("first choice had no message content".to_string()))
    }
}

/// Ollama chat request format.
#[derive(Debug, Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f32,
    num_predict: u32,
}

#[derive(Debug, Deserialize)]
struct OllamaResponse {
    message: OllamaMessage,
}

#[derive(Debug, Deserialize)]
struct OllamaMessage {
    content: String,
}

impl LlmClient {
    /// Create a new LLM client with the given configuration.
    pub fn new(config: LlmConfig, timeout: Duration) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LlmError::Connection(e.to_string()))?;

        Ok(Self { config, client })
    }

    /// Get the config.
    pub fn config(&self) -> &LlmConfig {
        &self.config
    }

    /// Whether the client has what it needs to make calls.
    pub fn is_configured(&self) -> bool {
        match self.config.provider {
            LlmProvider::OpenAI => self.config.api_key.is_some(),
            LlmProvider::Ollama => true,
        }
    }

    fn messages<'a>(system: &'a str, prompt: &'a str) -> Vec<ChatMessage<'a>> {
        vec![
            ChatMessage {
                role: "system",
                content: system,
            },
            ChatMessage {
                role: "user",
                content: prompt,
            },
        ]
    }

    /// Call an OpenAI-compatible chat completions endpoint.
    async fn call_openai(&self, system: &str, prompt: &str) -> Result<String, LlmError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(LlmError::MissingApiKey("openai"))?;

        let request = OpenAiRequest {
            model: &self.config.model,
            messages: Self::messages(system, prompt),
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        let url = format!(
            "{}/v1/chat/completions",
            self.config.endpoint().trim_end_matches('/')
        );
        let resp = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| LlmError::Connection(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(LlmError::Api(format!("HTTP {}: {}", status, body)));
        }

        let parsed: OpenAiResponse = resp
            .json()
            .await
            .map_err(|e| LlmError::Parse(e.to_string()))?;

        parsed.first_content()
    }

    /// Call the Ollama chat API.
    async fn call_ollama(&self, system: &str, prompt: &str) -> Result<String, LlmError> {
        let request = OllamaRequest {
            model: &self.config.model,
            messages: Self::messages(system, prompt),
            stream: false,
            options: OllamaOptions {
                temperature: self.config.temperature,
                num_predict: self.config.max_tokens,
            },
        };

        let url = format!("{}/api/chat", self.config.endpoint().trim_end_matches('/'));
        let resp = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| LlmError::Connection(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(LlmError::Api(format!("HTTP {}: {}", status, body)));
        }

        let parsed: OllamaResponse = resp
            .json()
            .await
            .map_err(|e| LlmError::Parse(e.to_string()))?;

        Ok(parsed.message.content)
    }
}

#[async_trait]
impl ChatModel for LlmClient {
    async fn complete(&self, system: &str, prompt: &str) -> Result<String, LlmError> {
        debug!(
            "Requesting completion from {} ({})",
            self.config.provider.as_str(),
            self.config.model
        );
        let reply = match self.config.provider {
            LlmProvider::OpenAI => self.call_openai(system, prompt).await?,
            LlmProvider::Ollama => self.call_ollama(system, prompt).await?,
        };
        Ok(reply.trim().to_string())
    }

    fn temperature(&self) -> f32 {
        self.config.temperature
    }
}
