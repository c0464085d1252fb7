//! Harmonizer Rule Memory
//!
//! In-process storage of extracted rules and the similarity machinery used
//! to flag near-duplicates.
//!
//! # Architecture
//!
//! - [`RuleMemory`]: identifier → YAML text and optional embedding
//! - [`cosine_similarity`]: the similarity scorer
//! - [`DuplicateDetector`]: linear scan for the best match above a threshold
//!
//! There is no persistence and no vector index; memory lives as long as its
//! owner and is scanned linearly.
//!
//! # Examples
//!
//! ```
//! use harmonizer_store::{DuplicateDetector, MemoryEntry, RuleMemory};
//!
//! let mut memory = RuleMemory::new();
//! memory.insert("rule_1", MemoryEntry::new("id: rule_1", vec![0.6, 0.8]));
//!
//! let check = DuplicateDetector::default().check(&[0.6, 0.8], &memory);
//! assert_eq!(check.duplicate_of.as_deref(), Some("rule_1"));
//! ```

#![warn(missing_docs)]

pub mod duplicate;
pub mod memory;
pub mod similarity;

pub use duplicate::{DuplicateCheck, DuplicateDetector, DEFAULT_DUPLICATE_THRESHOLD};
pub use memory::{MemoryEntry, RuleMemory};
pub use similarity::cosine_similarity;
