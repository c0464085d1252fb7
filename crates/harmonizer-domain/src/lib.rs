//! Harmonizer Domain Layer
//!
//! Core vocabulary for governance rule extraction. Like the rest of the
//! domain layer, this crate has no runtime dependencies; infrastructure
//! (LLM clients, rule memory, HTTP) lives in other crates.
//!
//! ## Key Concepts
//!
//! - **Rule**: a YAML record describing an enforceable coding or design convention
//! - **Category**: one of code, design, naming, performance, template
//! - **Rule Candidate**: raw text submitted for extraction
//! - **Category Counts**: the static per-category summary shown on the dashboard

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod candidate;
pub mod category;
pub mod summary;

// Re-exports for convenience
pub use candidate::RuleCandidate;
pub use category::{classify_category, Category};
pub use summary::CategoryCounts;
