//! Language-model integration for receipt field extraction.
//!
//! Talks to an OpenAI-compatible chat completions API by default, or to a
//! local Ollama server.

mod client;

pub use client::{ChatModel, LlmClient, LlmConfig, LlmError, LlmProvider};
pub use client::{DEFAULT_EXTRACTION_PROMPT, DEFAULT_SYSTEM_PROMPT};
