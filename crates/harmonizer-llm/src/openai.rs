//! OpenAI Provider Implementation
//!
//! Hosted generation through the Responses API and embeddings through the
//! Embeddings API. The API key is supplied by the caller; [`build_provider`]
//! reads it from the environment once at startup.
//!
//! [`build_provider`]: crate::build_provider

use crate::http::{build_client, non_empty, post_json};
use crate::{GenerationParams, LlmError, LlmProvider};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Default API base URL
pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1";

/// Default generation model
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Default embedding model
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";

/// Hosted OpenAI provider
pub struct OpenAiProvider {
    endpoint: String,
    model: String,
    embedding_model: String,
    api_key: String,
    client: reqwest::Client,
    max_retries: u32,
}

#[derive(Serialize)]
struct ResponsesRequest<'a> {
    model: &'a str,
    input: &'a str,
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Deserialize)]
struct ResponsesResponse {
    #[serde(default)]
    output: Vec<OutputItem>,
}

#[derive(Deserialize)]
struct OutputItem {
    #[serde(default)]
    content: Vec<ContentPart>,
}

#[derive(Deserialize)]
struct ContentPart {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

impl ResponsesResponse {
    /// Concatenate every `output_text` part, in order
    fn output_text(&self) -> String {
        self.output
            .iter()
            .flat_map(|item| item.content.iter())
            .filter(|part| part.kind == "output_text")
            .filter_map(|part| part.text.as_deref())
            .collect()
    }
}

#[derive(Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

impl OpenAiProvider {
    /// Create a provider against `endpoint` with the given credential
    pub fn new(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
        timeout_secs: u64,
    ) -> Result<Self, LlmError> {
        let api_key: String = api_key.into();
        if api_key.trim().is_empty() {
            return Err(LlmError::Configuration("API key is empty".to_string()));
        }

        let endpoint: String = endpoint.into();
        Ok(Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            model: model.into(),
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            api_key,
            client: build_client(timeout_secs)?,
            max_retries: crate::ollama::DEFAULT_MAX_RETRIES,
        })
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
impl LlmProvider for OpenAiProvider {
    async fn generate(&self, prompt: &str, params: &GenerationParams) -> Result<String, LlmError> {
        let url = format!("{}/responses", self.endpoint);
        let request_body = ResponsesRequest {
            model: &self.model,
            input: prompt,
            temperature: params.temperature,
            max_output_tokens: params.max_output_tokens,
        };

        let response: ResponsesResponse = post_json(
            &self.client,
            &url,
            Some(&self.api_key),
            &request_body,
            self.max_retries,
            &self.model,
        )
        .await?;

        non_empty(&response.output_text())
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, LlmError> {
        let url = format!("{}/embeddings", self.endpoint);
        let request_body = EmbeddingsRequest {
            model: &self.embedding_model,
            input: text,
        };

        let response: EmbeddingsResponse = post_json(
            &self.client,
            &url,
            Some(&self.api_key),
            &request_body,
            self.max_retries,
            &self.embedding_model,
        )
        .await?;

        response
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| LlmError::InvalidResponse("No embedding in response".to_string()))
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::spawn_stub;
    use axum::http::{HeaderMap, StatusCode};
    use axum::{routing::post, Json, Router};
    use serde_json::{json, Value};

    #[test]
    fn test_empty_api_key_rejected() {
        let result = OpenAiProvider::new(DEFAULT_ENDPOINT, DEFAULT_MODEL, "  ", 30);
        assert!(matches!(result, Err(LlmError::Configuration(_))));
    }

    #[test]
    fn test_output_text_concatenates_parts() {
        let response: ResponsesResponse = serde_json::from_value(json!({
            "output": [
                { "type": "reasoning", "content": [] },
                { "type": "message", "content": [
                    { "type": "output_text", "text": "id: a\n" },
                    { "type": "refusal", "refusal": "no" },
                    { "type": "output_text", "text": "type: code" }
                ]}
            ]
        }))
        .unwrap();
        assert_eq!(response.output_text(), "id: a\ntype: code");
    }

    #[tokio::test]
    async fn test_generate_against_stub() {
        let router = Router::new().route(
            "/responses",
            post(|headers: HeaderMap, Json(body): Json<Value>| async move {
                assert_eq!(headers["authorization"], "Bearer sk-test");
                assert_eq!(body["model"], json!("gpt-4o-mini"));
                assert_eq!(body["max_output_tokens"], json!(800));
                Json(json!({
                    "output": [{ "type": "message", "content": [
                        { "type": "output_text", "text": "id: abap.db.no_select_star" }
                    ]}]
                }))
            }),
        );
        let endpoint = spawn_stub(router).await;

        let provider = OpenAiProvider::new(endpoint, DEFAULT_MODEL, "sk-test", 30).unwrap();
        let text = provider
            .generate("prompt", &GenerationParams::default())
            .await
            .unwrap();
        assert_eq!(text, "id: abap.db.no_select_star");
    }

    #[tokio::test]
    async fn test_embed_against_stub() {
        let router = Router::new().route(
            "/embeddings",
            post(|Json(body): Json<Value>| async move {
                assert_eq!(body["model"], json!("text-embedding-3-small"));
                Json(json!({ "data": [{ "embedding": [0.5, 0.5], "index": 0 }] }))
            }),
        );
        let endpoint = spawn_stub(router).await;

        let provider = OpenAiProvider::new(endpoint, DEFAULT_MODEL, "sk-test", 30).unwrap();
        assert_eq!(provider.embed("text").await.unwrap(), vec![0.5, 0.5]);
    }

    #[tokio::test]
    async fn test_unauthorized_is_not_retried() {
        let router = Router::new().route(
            "/responses",
            post(|| async { (StatusCode::UNAUTHORIZED, "bad key") }),
        );
        let endpoint = spawn_stub(router).await;

        let provider = OpenAiProvider::new(endpoint, DEFAULT_MODEL, "sk-wrong", 30).unwrap();
        let result = provider.generate("prompt", &GenerationParams::default()).await;
        match result {
            Err(LlmError::Communication(msg)) => assert!(msg.contains("401")),
            other => panic!("Expected Communication error, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn test_rate_limit_surfaces() {
        let router = Router::new().route(
            "/responses",
            post(|| async { (StatusCode::TOO_MANY_REQUESTS, "slow down") }),
        );
        let endpoint = spawn_stub(router).await;

        let provider = OpenAiProvider::new(endpoint, DEFAULT_MODEL, "sk-test", 30)
            .unwrap()
            .with_max_retries(1);
        let result = provider.generate("prompt", &GenerationParams::default()).await;
        assert!(matches!(result, Err(LlmError::RateLimitExceeded)));
    }
}
