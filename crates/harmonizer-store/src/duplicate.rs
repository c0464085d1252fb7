//! Similarity-based duplicate detection against rule memory

use crate::memory::RuleMemory;
use crate::similarity::cosine_similarity;
use tracing::debug;

/// Default similarity threshold for embedding vectors
pub const DEFAULT_DUPLICATE_THRESHOLD: f32 = 0.88;

/// Outcome of a duplicate scan
#[derive(Debug, Clone, PartialEq)]
pub struct DuplicateCheck {
    /// Identifier of the most similar prior rule, if it crossed the threshold
    pub duplicate_of: Option<String>,

    /// Highest similarity seen across all comparable entries (0.0 when none)
    pub best_similarity: f32,
}

impl DuplicateCheck {
    /// The similarity to report to callers: present only when a duplicate was flagged
    pub fn reported_similarity(&self) -> Option<f32> {
        self.duplicate_of
            .as_ref()
            .map(|_| self.best_similarity.clamp(0.0, 1.0))
    }
}

/// Finds the closest prior rule by cosine similarity
#[derive(Debug, Clone, Copy)]
pub struct DuplicateDetector {
    threshold: f32,
}

impl DuplicateDetector {
    /// Create a detector that flags similarities strictly above `threshold`
    pub fn new(threshold: f32) -> Self {
        Self { threshold }
    }

    /// The configured threshold
    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Scan memory for the entry most similar to `vector`
    ///
    /// Entries without a stored vector, or with a vector of another
    /// dimension, are skipped. Ties keep the first entry in identifier order.
    pub fn check(&self, vector: &[f32], memory: &RuleMemory) -> DuplicateCheck {
        let mut best_similarity = 0.0_f32;
        let mut best_id: Option<&str> = None;

        for (id, entry) in memory.iter() {
            let Some(stored) = entry.vector.as_deref() else {
                continue;
            };

            let Some(similarity) = cosine_similarity(vector, stored) else {
                debug!(
                    "Skipping rule '{}': dimension {} != {}",
                    id,
                    stored.len(),
                    vector.len()
                );
                continue;
            };

            if similarity > best_similarity {
                best_similarity = similarity;
                best_id = Some(id);
            }
        }

        let duplicate_of = best_id
            .filter(|_| best_similarity > self.threshold)
            .map(str::to_string);

        DuplicateCheck {
            duplicate_of,
            best_similarity,
        }
    }
}

impl Default for DuplicateDetector {
    fn default() -> Self {
        Self::new(DEFAULT_DUPLICATE_THRESHOLD)
    }
}
