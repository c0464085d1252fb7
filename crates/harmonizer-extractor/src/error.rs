//! Error types for the Extractor

use harmonizer_llm::LlmError;
use thiserror::Error;

/// Errors that can occur inside the extraction pipeline
///
/// None of these reach API callers: the pipeline converts every one of them
/// into a fallback rule.
#[derive(Error, Debug)]
pub enum ExtractorError {
    /// Generation call failed
    #[error("Generation failed: {0}")]
    Generation(LlmError),

    /// Embedding call failed
    #[error("Embedding failed: {0}")]
    Embedding(LlmError),

    /// Generation did not finish within the configured timeout
    #[error("Extraction timeout after {0}s")]
    Timeout(u64),

    /// Rule memory could not be locked
    #[error("Rule memory unavailable: {0}")]
    Memory(String),
}
