//! Mock provider for deterministic testing
//!
//! Returns pre-configured generations without any network calls, and
//! hash-based embeddings that are:
//!
//! - **Deterministic**: Same text always produces same embedding
//! - **Normalized**: All vectors have unit length (for cosine similarity)
//! - **Diverse**: Different texts produce different embeddings

use crate::{GenerationParams, LlmError, LlmProvider};
use async_trait::async_trait;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Mutex, MutexGuard};

/// Default embedding dimension for mock vectors
pub const DEFAULT_MOCK_DIMENSION: usize = 64;

#[derive(Debug, Default)]
struct MockState {
    /// (prompt marker, response); first marker found in the prompt wins
    responses: Vec<(String, String)>,
    /// Prompt markers that make generation fail
    errors: Vec<String>,
    /// When set, every embed call fails with this message
    embed_error: Option<String>,
    call_count: usize,
}

/// Mock LLM provider for deterministic testing
///
/// # Examples
///
/// ```
/// use harmonizer_llm::{GenerationParams, LlmProvider, MockProvider};
///
/// # async fn example() {
/// let mut provider = MockProvider::new("Fixed response");
/// provider.add_response("naming", "id: naming.rule");
///
/// let params = GenerationParams::default();
/// assert_eq!(provider.generate("a naming prompt", &params).await.unwrap(), "id: naming.rule");
/// assert_eq!(provider.generate("anything else", &params).await.unwrap(), "Fixed response");
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct MockProvider {
    default_response: String,
    dimension: usize,
    state: Arc<Mutex<MockState>>,
}

impl MockProvider {
    /// Create a new MockProvider with a fixed response for all prompts
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default_response: response.into(),
            dimension: DEFAULT_MOCK_DIMENSION,
            state: Arc::new(Mutex::new(MockState::default())),
        }
    }

    /// Set the embedding dimension
    pub fn with_dimension(mut self, dimension: usize) -> Self {
        self.dimension = dimension;
        self
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Respond with `response` whenever the prompt contains `marker`
    pub fn add_response(&mut self, marker: impl Into<String>, response: impl Into<String>) {
        self.state().responses.push((marker.into(), response.into()));
    }

    /// Fail generation whenever the prompt contains `marker`
    pub fn add_error(&mut self, marker: impl Into<String>) {
        self.state().errors.push(marker.into());
    }

    /// Make every embed call fail with `message`
    pub fn fail_embeddings(&mut self, message: impl Into<String>) {
        self.state().embed_error = Some(message.into());
    }

    /// Get the number of times generate was called
    pub fn call_count(&self) -> usize {
        self.state().call_count
    }

    /// Reset the call count
    pub fn reset_call_count(&self) {
        self.state().call_count = 0;
    }

    /// Hash text with a seed to get a deterministic f32 value in [-1, 1]
    fn hash_with_seed(text: &str, seed: u64) -> f32 {
        let mut hasher = DefaultHasher::new();
        text.hash(&mut hasher);
        seed.hash(&mut hasher);
        let hash_value = hasher.finish();

        let normalized = (hash_value as f64 / u64::MAX as f64) * 2.0 - 1.0;
        normalized as f32
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("Default mock response")
    }
}

#[async_trait]
impl LlmProvider for MockProvider {
    async fn generate(&self, prompt: &str, _params: &GenerationParams) -> Result<String, LlmError> {
        let mut state = self.state();
        state.call_count += 1;

        if let Some(marker) = state.errors.iter().find(|m| prompt.contains(m.as_str())) {
            return Err(LlmError::Other(format!("Mock error for '{}'", marker)));
        }

        let response = state
            .responses
            .iter()
            .find(|(marker, _)| prompt.contains(marker.as_str()))
            .map(|(_, response)| response.clone())
            .unwrap_or_else(|| self.default_response.clone());

        if response.trim().is_empty() {
            return Err(LlmError::InvalidResponse("Model returned empty text".to_string()));
        }
        Ok(response)
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, LlmError> {
        if let Some(message) = &self.state().embed_error {
            return Err(LlmError::Other(message.clone()));
        }

        let mut embedding: Vec<f32> = (0..self.dimension)
            .map(|i| Self::hash_with_seed(text, i as u64))
            .collect();

        let magnitude: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if magnitude > 0.0 {
            for value in &mut embedding {
                *value /= magnitude;
            }
        }

        Ok(embedding)
    }

    fn model_name(&self) -> &str {
        "mock"
    }
}
