//! Configuration for the Extractor

use harmonizer_llm::GenerationParams;
use harmonizer_store::DEFAULT_DUPLICATE_THRESHOLD;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the Extractor
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Characters of input text included in the prompt
    pub max_prompt_chars: usize,

    /// Upper bound on generated tokens
    pub max_output_tokens: u32,

    /// Sampling temperature
    pub temperature: f32,

    /// Embedding similarity above which a rule is flagged as a duplicate
    pub duplicate_threshold: f32,

    /// Maximum time for a single generation call (seconds)
    pub extraction_timeout_secs: u64,

    /// Lines of an uploaded document turned into rule candidates
    pub max_document_candidates: usize,
}

impl ExtractorConfig {
    /// Get the extraction timeout as a Duration
    pub fn extraction_timeout(&self) -> Duration {
        Duration::from_secs(self.extraction_timeout_secs)
    }

    /// Decoding parameters for the generation client
    pub fn generation_params(&self) -> GenerationParams {
        GenerationParams {
            max_output_tokens: self.max_output_tokens,
            temperature: self.temperature,
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_prompt_chars == 0 {
            return Err("max_prompt_chars must be greater than 0".to_string());
        }
        if self.max_output_tokens == 0 {
            return Err("max_output_tokens must be greater than 0".to_string());
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(format!("temperature {} out of range [0.0, 2.0]", self.temperature));
        }
        if !(0.0..=1.0).contains(&self.duplicate_threshold) {
            return Err(format!(
                "duplicate_threshold {} out of range [0.0, 1.0]",
                self.duplicate_threshold
            ));
        }
        if self.extraction_timeout_secs == 0 {
            return Err("extraction_timeout_secs must be greater than 0".to_string());
        }
        if self.max_document_candidates == 0 {
            return Err("max_document_candidates must be greater than 0".to_string());
        }
        Ok(())
    }
}

impl Default for ExtractorConfig {
    /// Defaults tuned for a hosted model
    fn default() -> Self {
        Self {
            max_prompt_chars: 4_000,
            max_output_tokens: 800,
            temperature: 0.2,
            duplicate_threshold: DEFAULT_DUPLICATE_THRESHOLD,
            extraction_timeout_secs: 120,
            max_document_candidates: 5,
        }
    }
}

impl ExtractorConfig {
    /// Preset for a small locally-hosted model: shorter output, slightly warmer sampling
    pub fn local_model() -> Self {
        Self {
            max_output_tokens: 300,
            temperature: 0.3,
            ..Self::default()
        }
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}
