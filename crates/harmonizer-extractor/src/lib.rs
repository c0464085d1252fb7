//! Harmonizer Extractor
//!
//! Turns free-form text, code snippets, and uploaded documents into YAML
//! governance rules with a generative model.
//!
//! # Architecture
//!
//! ```text
//! Text → classify → prompt → LLM → YAML → embed → duplicate check → Rule Memory
//! ```
//!
//! Any failure along the way yields a fixed fallback rule instead of an
//! error, so callers always get something to show.
//!
//! # Example Usage
//!
//! ```no_run
//! use harmonizer_domain::RuleCandidate;
//! use harmonizer_extractor::{ExtractorConfig, RuleExtractor};
//! use harmonizer_llm::MockProvider;
//! use std::sync::Arc;
//!
//! # async fn example() {
//! let llm = MockProvider::new("id: abap.db.no_select_star\ntype: code\n");
//! let extractor = RuleExtractor::new(Arc::new(llm), ExtractorConfig::default());
//!
//! let outcome = extractor
//!     .extract(&RuleCandidate::new("SELECT * FROM mara."))
//!     .await;
//!
//! println!("{} (confidence {:.2})", outcome.yaml(), outcome.confidence());
//! if let Some(id) = outcome.duplicate_of() {
//!     println!("Looks like a duplicate of {}", id);
//! }
//! # }
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod document;
pub mod error;
pub mod extractor;
pub mod parser;
pub mod prompt;
pub mod types;


pub use config::ExtractorConfig;
pub use document::{extract_document_text, split_candidates};
pub use error::ExtractorError;
pub use extractor::RuleExtractor;
pub use parser::{parse_rule_yaml, RuleFields};
pub use prompt::PromptBuilder;
pub use types::{
    DocumentRuleResult, DocumentUpload, ExtractedRule, ExtractionOutcome, FallbackRule,
    OutcomeSummary, RuleExtraction, FALLBACK_CONFIDENCE, FALLBACK_RULE_ID,
};
