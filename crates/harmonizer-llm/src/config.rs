//! Provider selection from configuration

use crate::{ollama, openai, LlmError, LlmProvider, MockProvider, OllamaProvider, OpenAiProvider};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// Which backend serves generation and embeddings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Local Ollama instance
    Ollama,
    /// Hosted OpenAI API
    #[serde(rename = "openai")]
    OpenAi,
    /// Deterministic in-process mock
    Mock,
}

impl Default for Backend {
    fn default() -> Self {
        Backend::Ollama
    }
}

impl Backend {
    fn default_endpoint(&self) -> &'static str {
        match self {
            Backend::Ollama => ollama::DEFAULT_ENDPOINT,
            Backend::OpenAi => openai::DEFAULT_ENDPOINT,
            Backend::Mock => "",
        }
    }

    fn default_model(&self) -> &'static str {
        match self {
            Backend::Ollama => ollama::DEFAULT_MODEL,
            Backend::OpenAi => openai::DEFAULT_MODEL,
            Backend::Mock => "mock",
        }
    }

    fn default_embedding_model(&self) -> &'static str {
        match self {
            Backend::Ollama => ollama::DEFAULT_EMBEDDING_MODEL,
            Backend::OpenAi => openai::DEFAULT_EMBEDDING_MODEL,
            Backend::Mock => "mock",
        }
    }
}

/// Provider configuration, usually the `[provider]` table of the server config
///
/// Endpoint and model names default per backend when omitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Backend to use
    #[serde(default)]
    pub backend: Backend,

    /// API base URL
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Generation model
    #[serde(default)]
    pub model: Option<String>,

    /// Embedding model
    #[serde(default)]
    pub embedding_model: Option<String>,

    /// Environment variable holding the API key (hosted backend only)
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Attempts per request before giving up
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Canned generation for the mock backend
    #[serde(default)]
    pub mock_response: Option<String>,
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

fn default_timeout_secs() -> u64 {
    ollama::DEFAULT_TIMEOUT_SECS
}

fn default_max_retries() -> u32 {
    ollama::DEFAULT_MAX_RETRIES
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self::for_backend(Backend::default())
    }
}

impl ProviderConfig {
    /// Defaults for a given backend
    pub fn for_backend(backend: Backend) -> Self {
        Self {
            backend,
            endpoint: None,
            model: None,
            embedding_model: None,
            api_key_env: default_api_key_env(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            mock_response: None,
        }
    }

    /// Endpoint, falling back to the backend default
    pub fn endpoint(&self) -> &str {
        self.endpoint
            .as_deref()
            .unwrap_or_else(|| self.backend.default_endpoint())
    }

    /// Generation model, falling back to the backend default
    pub fn model(&self) -> &str {
        self.model
            .as_deref()
            .unwrap_or_else(|| self.backend.default_model())
    }

    /// Embedding model, falling back to the backend default
    pub fn embedding_model(&self) -> &str {
        self.embedding_model
            .as_deref()
            .unwrap_or_else(|| self.backend.default_embedding_model())
    }
}

/// Build the configured provider
///
/// The hosted backend reads its API key from the environment variable named
/// by `api_key_env`; a missing key is a configuration error.
pub fn build_provider(config: &ProviderConfig) -> Result<Arc<dyn LlmProvider>, LlmError> {
    let provider: Arc<dyn LlmProvider> = match config.backend {
        Backend::Ollama => Arc::new(
            OllamaProvider::with_timeout(config.endpoint(), config.model(), config.timeout_secs)?
                .with_embedding_model(config.embedding_model())
                .with_max_retries(config.max_retries),
        ),
        Backend::OpenAi => {
            let api_key = std::env::var(&config.api_key_env).map_err(|_| {
                LlmError::Configuration(format!(
                    "environment variable {} is not set",
                    config.api_key_env
                ))
            })?;
            Arc::new(
                OpenAiProvider::new(
                    config.endpoint(),
                    config.model(),
                    api_key,
                    config.timeout_secs,
                )?
                .with_embedding_model(config.embedding_model())
                .with_max_retries(config.max_retries),
            )
        }
        Backend::Mock => Arc::new(MockProvider::new(
            config
                .mock_response
                .clone()
                .unwrap_or_else(|| "id: mock.rule\ntype: code\ntitle: Mock rule".to_string()),
        )),
    };

    info!(
        "Using {:?} backend at '{}' with model '{}'",
        config.backend,
        config.endpoint(),
        provider.model_name()
    );

    Ok(provider)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_follow_backend() {
        let config = ProviderConfig::for_backend(Backend::OpenAi);
        assert_eq!(config.endpoint(), "https://api.openai.com/v1");
        assert_eq!(config.model(), "gpt-4o-mini");
        assert_eq!(config.embedding_model(), "text-embedding-3-small");

        let config = ProviderConfig::default();
        assert_eq!(config.backend, Backend::Ollama);
        assert_eq!(config.endpoint(), "http://localhost:11434");
    }

    #[test]
    fn test_parse_toml() {
        let config: ProviderConfig = toml::from_str(
            r#"
            backend = "openai"
            model = "gpt-4.1-mini"
            api_key_env = "HARMONIZER_TEST_KEY"
            max_retries = 1
            "#,
        )
        .unwrap();

        assert_eq!(config.backend, Backend::OpenAi);
        assert_eq!(config.model(), "gpt-4.1-mini");
        assert_eq!(config.embedding_model(), "text-embedding-3-small");
        assert_eq!(config.api_key_env, "HARMONIZER_TEST_KEY");
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.max_retries, 1);
    }

    #[test]
    fn test_missing_api_key_is_configuration_error() {
        let mut config = ProviderConfig::for_backend(Backend::OpenAi);
        config.api_key_env = "HARMONIZER_KEY_THAT_IS_NEVER_SET".to_string();

        let result = build_provider(&config);
        assert!(matches!(result, Err(LlmError::Configuration(msg)) if msg.contains("HARMONIZER_KEY_THAT_IS_NEVER_SET")));
    }

    #[test]
    fn test_build_mock_and_ollama() {
        let mock = build_provider(&ProviderConfig::for_backend(Backend::Mock)).unwrap();
        assert_eq!(mock.model_name(), "mock");

        let ollama = build_provider(&ProviderConfig::default()).unwrap();
        assert_eq!(ollama.model_name(), "llama3.2");
    }
}
