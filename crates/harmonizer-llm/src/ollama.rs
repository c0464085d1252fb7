//! Ollama Provider Implementation
//!
//! Provides integration with Ollama's local LLM API, for running a small
//! model on the same machine instead of calling a hosted service.
//!
//! # Features
//!
//! - Async HTTP communication with Ollama API
//! - Configurable endpoint, generation model and embedding model
//! - Retry logic with exponential backoff
//! - Timeout handling
//!
//! # Examples
//!
//! ```no_run
//! use harmonizer_llm::{GenerationParams, LlmProvider, OllamaProvider};
//!
//! # async fn example() -> Result<(), harmonizer_llm::LlmError> {
//! let provider = OllamaProvider::new("http://localhost:11434", "llama3.2")?;
//! let text = provider.generate("Say hello", &GenerationParams::default()).await?;
//! # Ok(())
//! # }
//! ```

use crate::http::{build_client, non_empty, post_json};
use crate::{GenerationParams, LlmError, LlmProvider};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Default Ollama API endpoint
pub const DEFAULT_ENDPOINT: &str = "http://localhost:11434";

/// Default generation model
pub const DEFAULT_MODEL: &str = "llama3.2";

/// Default embedding model
pub const DEFAULT_EMBEDDING_MODEL: &str = "nomic-embed-text";

/// Default timeout for LLM requests (30 seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default number of retry attempts
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Ollama API provider for local LLM inference
pub struct OllamaProvider {
    endpoint: String,
    model: String,
    embedding_model: String,
    client: reqwest::Client,
    max_retries: u32,
}

/// Request body for Ollama generate API
#[derive(Serialize)]
struct OllamaGenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Serialize)]
struct OllamaOptions {
    temperature: f32,
    num_predict: u32,
}

/// Response from Ollama generate API
#[derive(Deserialize)]
struct OllamaGenerateResponse {
    response: String,
}

#[derive(Serialize)]
struct OllamaEmbeddingRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Deserialize)]
struct OllamaEmbeddingResponse {
    embedding: Vec<f32>,
}

impl OllamaProvider {
    /// Create a new Ollama provider
    ///
    /// # Parameters
    ///
    /// - `endpoint`: Ollama API endpoint (e.g., "http://localhost:11434")
    /// - `model`: Model to use (e.g., "llama3.2", "mistral")
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>) -> Result<Self, LlmError> {
        Self::with_timeout(endpoint, model, DEFAULT_TIMEOUT_SECS)
    }

    /// Create a provider whose requests time out after `timeout_secs`
    pub fn with_timeout(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        timeout_secs: u64,
    ) -> Result<Self, LlmError> {
        let endpoint: String = endpoint.into();
        Ok(Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            model: model.into(),
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            client: build_client(timeout_secs)?,
            max_retries: DEFAULT_MAX_RETRIES,
        })
    }

    /// Create a new Ollama provider on the default local endpoint
    pub fn default_endpoint(model: impl Into<String>) -> Result<Self, LlmError> {
        Self::new(DEFAULT_ENDPOINT, model)
    }

    /// Set the model used for embeddings
    pub fn with_embedding_model(mut self, model: impl Into<String>) -> Self {
        self.embedding_model = model.into();
        self
    }

    /// Set the maximum number of retry attempts
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }
}

#[async_trait]
impl LlmProvider for OllamaProvider {
    async fn generate(&self, prompt: &str, params: &GenerationParams) -> Result<String, LlmError> {
        let url = format!("{}/api/generate", self.endpoint);
        let request_body = OllamaGenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
            options: OllamaOptions {
                temperature: params.temperature,
                num_predict: params.max_output_tokens,
            },
        };

        let response: OllamaGenerateResponse = post_json(
            &self.client,
            &url,
            None,
            &request_body,
            self.max_retries,
            &self.model,
        )
        .await?;

        non_empty(&response.response)
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, LlmError> {
        let url = format!("{}/api/embeddings", self.endpoint);
        let request_body = OllamaEmbeddingRequest {
            model: &self.embedding_model,
            prompt: text,
        };

        let response: OllamaEmbeddingResponse = post_json(
            &self.client,
            &url,
            None,
            &request_body,
            self.max_retries,
            &self.embedding_model,
        )
        .await?;

        if response.embedding.is_empty() {
            return Err(LlmError::InvalidResponse("Empty embedding".to_string()));
        }
        Ok(response.embedding)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::spawn_stub;
    use axum::{routing::post, Json, Router};
    use serde_json::{json, Value};

    #[test]
    fn test_ollama_provider_creation() {
        let provider = OllamaProvider::new("http://localhost:11434/", "llama2").unwrap();
        assert_eq!(provider.endpoint, "http://localhost:11434");
        assert_eq!(provider.model, "llama2");
        assert_eq!(provider.embedding_model, DEFAULT_EMBEDDING_MODEL);
        assert_eq!(provider.max_retries, DEFAULT_MAX_RETRIES);
    }

    #[test]
    fn test_ollama_provider_default_endpoint() {
        let provider = OllamaProvider::default_endpoint("mistral").unwrap();
        assert_eq!(provider.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(provider.model_name(), "mistral");
    }

    #[test]
    fn test_ollama_provider_builders() {
        let provider = OllamaProvider::new("http://localhost:11434", "llama2")
            .unwrap()
            .with_max_retries(5)
            .with_embedding_model("all-minilm");
        assert_eq!(provider.max_retries, 5);
        assert_eq!(provider.embedding_model, "all-minilm");
    }

    #[tokio::test]
    async fn test_ollama_generate_against_stub() {
        let router = Router::new().route(
            "/api/generate",
            post(|Json(body): Json<Value>| async move {
                assert_eq!(body["stream"], json!(false));
                assert_eq!(body["options"]["num_predict"], json!(300));
                Json(json!({ "response": "  id: abap.rule\n", "done": true }))
            }),
        );
        let endpoint = spawn_stub(router).await;

        let provider = OllamaProvider::new(endpoint, "llama3.2").unwrap();
        let params = GenerationParams {
            max_output_tokens: 300,
            temperature: 0.3,
        };
        let text = provider.generate("prompt", &params).await.unwrap();
        assert_eq!(text, "id: abap.rule");
    }

    #[tokio::test]
    async fn test_ollama_embed_against_stub() {
        let router = Router::new().route(
            "/api/embeddings",
            post(|| async { Json(json!({ "embedding": [0.1, 0.2, 0.3] })) }),
        );
        let endpoint = spawn_stub(router).await;

        let provider = OllamaProvider::new(endpoint, "llama3.2").unwrap();
        let vector = provider.embed("text").await.unwrap();
        assert_eq!(vector.len(), 3);
    }

    #[tokio::test]
    async fn test_ollama_empty_generation_is_error() {
        let router = Router::new().route(
            "/api/generate",
            post(|| async { Json(json!({ "response": "   ", "done": true })) }),
        );
        let endpoint = spawn_stub(router).await;

        let provider = OllamaProvider::new(endpoint, "llama3.2").unwrap();
        let result = provider.generate("prompt", &GenerationParams::default()).await;
        assert!(matches!(result, Err(LlmError::InvalidResponse(_))));
    }

    #[tokio::test]
    async fn test_ollama_missing_model() {
        // No routes: every request is a 404
        let endpoint = spawn_stub(Router::new()).await;

        let provider = OllamaProvider::new(endpoint, "ghost").unwrap();
        let result = provider.generate("prompt", &GenerationParams::default()).await;
        assert!(matches!(result, Err(LlmError::ModelNotAvailable(m)) if m == "ghost"));
    }

    #[tokio::test]
    async fn test_ollama_error_handling() {
        // Use invalid endpoint to trigger error
        let provider = OllamaProvider::new("http://localhost:99999", "llama2")
            .unwrap()
            .with_max_retries(1);

        let result = provider.generate("test", &GenerationParams::default()).await;

        match result {
            Err(LlmError::Communication(_)) => {} // Expected
            _ => panic!("Expected Communication error"),
        }
    }
}
