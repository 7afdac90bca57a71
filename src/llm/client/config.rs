//! LLM client configuration.

use serde::{Deserialize, Serialize};

use super::prompts::{DEFAULT_EXTRACTION_PROMPT, DEFAULT_SYSTEM_PROMPT};

/// LLM provider type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    /// OpenAI-compatible API (OpenAI, Groq, Together.ai, etc.)
    #[default]
    OpenAI,
    /// Ollama API (local)
    Ollama,
}

impl LlmProvider {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "openai" | "groq" | "together" => Some(Self::OpenAI),
            "ollama" => Some(Self::Ollama),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAI => "openai",
            Self::Ollama => "ollama",
        }
    }

    fn default_endpoint(&self) -> &'static str {
        match self {
            Self::OpenAI => "https://api.openai.com",
            Self::Ollama => "http://localhost:11434",
        }
    }
}

/// Configuration for LLM client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmConfig {
    /// LLM provider (openai or ollama)
    #[serde(default)]
    pub provider: LlmProvider,
    /// API endpoint; unset means the provider's default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    /// API key for OpenAI-compatible providers
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
    /// Model to use for extraction
    #[serde(default = "default_model")]
    pub model: String,
    /// Maximum tokens in response
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Temperature for generation (0.0 - 1.0)
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Custom system instruction
    #[serde(default)]
    pub system_prompt: Option<String>,
    /// Custom extraction prompt (uses the {content} placeholder)
    #[serde(default)]
    pub extraction_prompt: Option<String>,
}

fn default_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_max_tokens() -> u32 {
    512
}

fn default_temperature() -> f32 {
    0.2
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: LlmProvider::default(),
            endpoint: None,
            api_key: None,
            model: default_model(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            system_prompt: None,
            extraction_prompt: None,
        }
    }
}

impl LlmConfig {
    /// Apply overrides from an environment-like variable source.
    ///
    /// Recognized variables:
    /// - `LLM_PROVIDER`: "openai" (default), "groq", "together" or "ollama"
    /// - `LLM_ENDPOINT`: API endpoint (defaults based on provider)
    /// - `LLM_API_KEY`: API key, falling back to `OPENAI_API_KEY`
    /// - `LLM_MODEL`: Model name
    /// - `LLM_MAX_TOKENS`: Maximum tokens in response
    /// - `LLM_TEMPERATURE`: Generation temperature (0.0-1.0)
    pub(crate) fn with_overrides_from(mut self, var: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(val) = var("LLM_PROVIDER") {
            if let Some(provider) = LlmProvider::parse(&val) {
                self.provider = provider;
                if val.eq_ignore_ascii_case("groq") {
                    self.endpoint = Some("https://api.groq.com/openai".to_string());
                } else if val.eq_ignore_ascii_case("together") {
                    self.endpoint = Some("https://api.together.xyz".to_string());
                }
            }
        }

        // Explicit endpoint always wins
        if let Some(endpoint) = var("LLM_ENDPOINT") {
            self.endpoint = Some(endpoint);
        }

        if let Some(key) = var("LLM_API_KEY").or_else(|| var("OPENAI_API_KEY")) {
            self.api_key = Some(key);
        }

        if let Some(val) = var("LLM_MODEL") {
            self.model = val;
        }
        if let Some(n) = var("LLM_MAX_TOKENS").and_then(|v| v.parse().ok()) {
            self.max_tokens = n;
        }
        if let Some(t) = var("LLM_TEMPERATURE").and_then(|v| v.parse().ok()) {
            self.temperature = t;
        }
        self
    }

    /// The configured endpoint, or the provider's default when unset.
    pub fn endpoint(&self) -> &str {
        self.endpoint
            .as_deref()
            .unwrap_or_else(|| self.provider.default_endpoint())
    }

    /// Get the system prompt, using custom or default.
    pub fn get_system_prompt(&self) -> &str {
        self.system_prompt
            .as_deref()
            .unwrap_or(DEFAULT_SYSTEM_PROMPT)
    }

    /// Get the extraction prompt, using custom or default.
    pub fn get_extraction_prompt(&self) -> &str {
        self.extraction_prompt
            .as_deref()
            .unwrap_or(DEFAULT_EXTRACTION_PROMPT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = LlmConfig::default();
        assert_eq!(config.provider, LlmProvider::OpenAI);
        assert_eq!(config.endpoint(), "https://api.openai.com");
        assert_eq!(config.model, "gpt-3.5-turbo");
        assert!((config.temperature - 0.2).abs() < f32::EPSILON);
        assert!(config.get_extraction_prompt().contains("{content}"));
    }

    #[test]
    fn test_openai_key_fallback() {
        let config = LlmConfig::default().with_overrides_from(vars(&[("OPENAI_API_KEY", "sk-1")]));
        assert_eq!(config.api_key.as_deref(), Some("sk-1"));

        let config = LlmConfig::default().with_overrides_from(vars(&[
            ("OPENAI_API_KEY", "sk-1"),
            ("LLM_API_KEY", "explicit"),
        ]));
        assert_eq!(config.api_key.as_deref(), Some("explicit"));
    }

    #[test]
    fn test_provider_switch_moves_default_endpoint() {
        let config = LlmConfig::default().with_overrides_from(vars(&[("LLM_PROVIDER", "ollama")]));
        assert_eq!(config.provider, LlmProvider::Ollama);
        assert_eq!(config.endpoint(), "http://localhost:11434");

        let config = LlmConfig::default().with_overrides_from(vars(&[("LLM_PROVIDER", "groq")]));
        assert_eq!(config.provider, LlmProvider::OpenAI);
        assert_eq!(config.endpoint(), "https://api.groq.com/openai");
    }

    #[test]
    fn test_explicit_endpoint_wins() {
        let config = LlmConfig::default().with_overrides_from(vars(&[
            ("LLM_PROVIDER", "ollama"),
            ("LLM_ENDPOINT", "http://gpu-box:11434"),
            ("LLM_TEMPERATURE", "0.0"),
            ("LLM_MAX_TOKENS", "not-a-number"),
        ]));
        assert_eq!(config.endpoint(), "http://gpu-box:11434");
        assert_eq!(config.temperature, 0.0);
        assert_eq!(config.max_tokens, 512);
    }

    #[test]
    fn test_file_provider_without_endpoint_uses_provider_default() {
        let config: LlmConfig =
            toml::from_str("provider = \"ollama\"\nmodel = \"llama3\"").unwrap();
        assert_eq!(config.endpoint, None);
        assert_eq!(config.endpoint(), "http://localhost:11434");

        let config: LlmConfig =
            toml::from_str("provider = \"ollama\"\nendpoint = \"http://gpu-box:11434\"").unwrap();
        assert_eq!(config.endpoint(), "http://gpu-box:11434");
    }
}
