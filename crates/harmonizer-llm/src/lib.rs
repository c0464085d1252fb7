//! Harmonizer LLM Provider Layer
//!
//! Pluggable text-generation and embedding backends behind one async trait.
//!
//! # Architecture
//!
//! The extraction pipeline needs two capabilities from a model service:
//! `generate(prompt) -> text` and `embed(text) -> vector`. Both live on
//! [`LlmProvider`]; backends are swapped by configuration (see
//! [`ProviderConfig`] and [`build_provider`]).
//!
//! # Providers
//!
//! - `MockProvider`: Deterministic mock for testing
//! - `OllamaProvider`: Local Ollama API integration
//! - `OpenAiProvider`: Hosted OpenAI Responses + Embeddings API
//!
//! # Examples
//!
//! ```
//! use harmonizer_llm::{GenerationParams, LlmProvider, MockProvider};
//!
//! # async fn example() {
//! let provider = MockProvider::new("id: demo.rule");
//! let text = provider.generate("any prompt", &GenerationParams::default()).await.unwrap();
//! assert_eq!(text, "id: demo.rule");
//! # }
//! ```

#![warn(missing_docs)]

pub mod config;
mod http;
pub mod mock;
pub mod ollama;
pub mod openai;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use config::{build_provider, Backend, ProviderConfig};
pub use mock::MockProvider;
pub use ollama::OllamaProvider;
pub use openai::OpenAiProvider;

/// Errors that can occur during LLM operations
#[derive(Error, Debug)]
pub enum LlmError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Invalid response from LLM
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// Provider misconfigured (missing credential, bad endpoint)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Generic error
    #[error("LLM error: {0}")]
    Other(String),
}

/// Decoding parameters for a generation call
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    /// Upper bound on generated tokens
    pub max_output_tokens: u32,

    /// Sampling temperature
    pub temperature: f32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            max_output_tokens: 800,
            temperature: 0.2,
        }
    }
}

/// A model service that can generate text and embed it
///
/// Implementations must treat an empty generation as an error so callers
/// can rely on non-empty output.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Generate a completion for `prompt`
    async fn generate(&self, prompt: &str, params: &GenerationParams) -> Result<String, LlmError>;

    /// Compute an embedding vector for `text`
    async fn embed(&self, text: &str) -> Result<Vec<f32>, LlmError>;

    /// Name of the generation model, for logs
    fn model_name(&self) -> &str;
}
