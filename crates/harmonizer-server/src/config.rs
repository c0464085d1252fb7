//! Configuration file parsing for the server.
//!
//! Loads the bind address, CORS origins, the model provider, extractor
//! tuning, and optional seed rules from TOML.

use harmonizer_extractor::ExtractorConfig;
use harmonizer_llm::{LlmError, ProviderConfig};
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

/// Server configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse config TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Missing required field
    #[error("Missing required configuration field: {0}")]
    MissingField(String),

    /// A value is out of range
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    /// The model provider could not be built
    #[error("Provider configuration error: {0}")]
    Provider(#[from] LlmError),
}

/// Server configuration loaded from TOML
///
/// Every field has a default, so an empty file is a valid local setup.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Bind address (e.g., "127.0.0.1")
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Bind port (e.g., 8000)
    #[serde(default = "default_bind_port")]
    pub bind_port: u16,

    /// Origins allowed to call the API from a browser
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,

    /// Generation and embedding backend
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Extraction pipeline tuning
    #[serde(default)]
    pub extractor: ExtractorConfig,

    /// Rules recorded in memory at startup
    #[serde(default)]
    pub seed_rules: Vec<SeedRule>,
}

/// A pre-existing rule loaded at startup
#[derive(Debug, Clone, Deserialize)]
pub struct SeedRule {
    /// Rule identifier
    pub id: String,

    /// Rule YAML
    pub yaml: String,
}

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

fn default_bind_port() -> u16 {
    8000
}

fn default_allowed_origins() -> Vec<String> {
    vec![
        "http://localhost:5173".to_string(),
        "http://127.0.0.1:5173".to_string(),
    ]
}

impl ServerConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse and validate configuration from a TOML string
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: ServerConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Check required fields and ranges
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bind_address.trim().is_empty() {
            return Err(ConfigError::MissingField("bind_address".to_string()));
        }
        if let Some(seed) = self.seed_rules.iter().find(|s| s.id.trim().is_empty()) {
            return Err(ConfigError::MissingField(format!(
                "seed_rules.id (rule starting {:?})",
                seed.yaml.lines().next().unwrap_or_default()
            )));
        }
        self.extractor.validate().map_err(ConfigError::Invalid)
    }

    /// Configuration for a local Ollama model on the default port
    pub fn default_local_config() -> Self {
        ServerConfig {
            bind_address: default_bind_address(),
            bind_port: default_bind_port(),
            allowed_origins: default_allowed_origins(),
            provider: ProviderConfig::default(),
            extractor: ExtractorConfig::local_model(),
            seed_rules: Vec::new(),
        }
    }

    /// Get the full bind address (address:port)
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.bind_port)
    }
}
