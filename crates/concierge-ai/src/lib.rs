//! # Concierge AI
//!
//! Text generation for the `ask` command. [`TextGenerator`] is the seam the
//! commands depend on; [`GeminiClient`] implements it over the Gemini
//! `generateContent` REST endpoint.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod gemini;

pub use error::{AiError, AiResult};
pub use gemini::GeminiClient;

use async_trait::async_trait;
use concierge_config::AiConfig;
use serde::Serialize;

/// Sampling parameters sent with each prompt.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    /// Sampling temperature.
    pub temperature: f32,
    /// Nucleus sampling mass.
    pub top_p: f32,
    /// Top-k sampling cutoff.
    pub top_k: u32,
    /// Upper bound on generated tokens.
    pub max_output_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            top_p: 0.95,
            top_k: 40,
            max_output_tokens: 1024,
        }
    }
}

impl From<&AiConfig> for GenerationConfig {
    fn from(config: &AiConfig) -> Self {
        Self {
            temperature: config.temperature,
            top_p: config.top_p,
            top_k: config.top_k,
            max_output_tokens: config.max_output_tokens,
        }
    }
}

/// Something that turns a prompt into text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generates a reply to `prompt`.
    async fn generate(&self, prompt: &str, config: &GenerationConfig) -> AiResult<String>;

    /// Model name, for logs.
    fn model(&self) -> &str;
}
