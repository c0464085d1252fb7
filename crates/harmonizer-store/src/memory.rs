//! In-process rule memory
//!
//! Holds every rule extracted during the life of the process, keyed by rule
//! identifier. Nothing is persisted; the owner creates one at startup and
//! clears it at shutdown.

use std::collections::BTreeMap;

/// Stored representation of a previously extracted rule
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryEntry {
    /// The rule's YAML text, as returned to the caller
    pub yaml: String,

    /// Embedding used for duplicate detection; seeded rules may have none
    pub vector: Option<Vec<f32>>,
}

impl MemoryEntry {
    /// Create an entry with an embedding
    pub fn new(yaml: impl Into<String>, vector: Vec<f32>) -> Self {
        Self {
            yaml: yaml.into(),
            vector: Some(vector),
        }
    }

    /// Create an entry without an embedding
    pub fn without_vector(yaml: impl Into<String>) -> Self {
        Self {
            yaml: yaml.into(),
            vector: None,
        }
    }
}

/// Mapping from rule identifier to stored rule
///
/// Identifiers are unique; inserting an existing identifier overwrites the
/// previous entry (last write wins). There is no eviction and no capacity
/// bound.
///
/// # Examples
///
/// ```
/// use harmonizer_store::{MemoryEntry, RuleMemory};
///
/// let mut memory = RuleMemory::new();
/// let id = memory.next_sequential_id();
/// assert_eq!(id, "rule_1");
/// memory.insert(id.clone(), MemoryEntry::new("id: x", vec![1.0, 0.0]));
/// assert!(memory.get(&id).is_some());
/// ```
#[derive(Debug, Default, Clone)]
pub struct RuleMemory {
    entries: BTreeMap<String, MemoryEntry>,
}

impl RuleMemory {
    /// Create an empty memory
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite an entry, returning the previous one if any
    pub fn insert(&mut self, id: impl Into<String>, entry: MemoryEntry) -> Option<MemoryEntry> {
        self.entries.insert(id.into(), entry)
    }

    /// Look up an entry by identifier
    pub fn get(&self, id: &str) -> Option<&MemoryEntry> {
        self.entries.get(id)
    }

    /// Check whether an identifier is present
    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// Number of stored rules
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the memory is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over entries in identifier order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &MemoryEntry)> {
        self.entries.iter().map(|(id, entry)| (id.as_str(), entry))
    }

    /// Synthesize an identifier from the current entry count (`rule_<count+1>`)
    ///
    /// The result can collide with an existing key after overwrites; the
    /// insert then replaces that entry.
    pub fn next_sequential_id(&self) -> String {
        format!("rule_{}", self.entries.len() + 1)
    }

    /// Drop every entry, returning how many were removed
    pub fn clear(&mut self) -> usize {
        let removed = self.entries.len();
        self.entries.clear();
        removed
    }
}
