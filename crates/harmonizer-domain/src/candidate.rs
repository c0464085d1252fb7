//! Rule candidate - the unit of input to the extraction pipeline

use crate::category::{classify_category, Category};

/// Raw text submitted for rule extraction
///
/// Candidates are ephemeral: one is created per request (or per document
/// paragraph) and dropped once the pipeline returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleCandidate {
    /// Free-form text or code snippet
    pub text: String,

    /// Caller-supplied category, if any
    pub category: Option<Category>,
}

impl RuleCandidate {
    /// Create a candidate without a category hint
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            category: None,
        }
    }

    /// Attach a caller-supplied category
    pub fn with_category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    /// The caller's category, or the classifier's guess when none was given
    pub fn resolved_category(&self) -> Category {
        self.category.unwrap_or_else(|| classify_category(&self.text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolved_category_uses_classifier() {
        let candidate = RuleCandidate::new("Follow the adapter pattern");
        assert_eq!(candidate.resolved_category(), Category::Design);
    }

    #[test]
    fn test_caller_category_wins() {
        let candidate = RuleCandidate::new("SELECT * FROM mara").with_category(Category::Performance);
        assert_eq!(candidate.resolved_category(), Category::Performance);
    }
}
