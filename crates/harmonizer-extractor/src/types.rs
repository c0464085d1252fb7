//! Core types for the Extractor

use crate::parser::RuleFields;
use harmonizer_domain::Category;
use serde::Serialize;

/// Confidence reported for the fallback rule
pub const FALLBACK_CONFIDENCE: f64 = 0.2;

/// Identifier carried by the fallback rule
pub const FALLBACK_RULE_ID: &str = "abap.generic.rule";

/// A rule produced by the model and recorded in rule memory
#[derive(Debug, Clone)]
pub struct ExtractedRule {
    /// Identifier under which the rule was stored
    pub id: String,
    /// YAML text as generated (code fence removed); may be malformed
    pub yaml: String,
    /// Parsed form, absent when the YAML did not parse
    pub fields: Option<RuleFields>,
    /// Confidence in [0, 1]
    pub confidence: f64,
    /// Category the prompt was built for
    pub category: Category,
}

/// A successful pass through the pipeline
#[derive(Debug, Clone)]
pub struct RuleExtraction {
    /// The extracted rule
    pub rule: ExtractedRule,
    /// Identifier of the most similar prior rule, when above the threshold
    pub duplicate_of: Option<String>,
    /// Similarity to `duplicate_of`; `None` when no duplicate was flagged
    pub similarity: Option<f32>,
}

/// Minimal rule returned when extraction fails
#[derive(Debug, Clone)]
pub struct FallbackRule {
    /// Fixed-shape YAML embedding the error message
    pub yaml: String,
    /// Diagnostic that caused the fallback
    pub error: String,
    /// Category the request was made for
    pub category: Category,
}

impl FallbackRule {
    /// Build the fallback document for an error message
    pub fn new(error: impl Into<String>, category: Category) -> Self {
        let error = error.into();
        let yaml = format!(
            "id: {}\ntype: code\ntitle: Extraction failed\ndescription: \"{}\"\nconfidence: {}\n",
            FALLBACK_RULE_ID,
            escape_double_quoted(&error),
            FALLBACK_CONFIDENCE
        );
        Self {
            yaml,
            error,
            category,
        }
    }
}

fn escape_double_quoted(message: &str) -> String {
    let mut escaped = String::with_capacity(message.len());
    for c in message.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Result of one pipeline invocation
///
/// Extraction never fails from the caller's point of view; internal
/// failures degrade to [`ExtractionOutcome::Fallback`].
#[derive(Debug, Clone)]
pub enum ExtractionOutcome {
    /// The model produced a rule
    Extracted(RuleExtraction),
    /// Something failed; a fixed fallback rule stands in
    Fallback(FallbackRule),
}

impl ExtractionOutcome {
    /// YAML text of the rule
    pub fn yaml(&self) -> &str {
        match self {
            Self::Extracted(e) => &e.rule.yaml,
            Self::Fallback(f) => &f.yaml,
        }
    }

    /// Confidence in [0, 1]
    pub fn confidence(&self) -> f64 {
        match self {
            Self::Extracted(e) => e.rule.confidence,
            Self::Fallback(_) => FALLBACK_CONFIDENCE,
        }
    }

    /// Identifier of the prior rule this one duplicates
    pub fn duplicate_of(&self) -> Option<&str> {
        match self {
            Self::Extracted(e) => e.duplicate_of.as_deref(),
            Self::Fallback(_) => None,
        }
    }

    /// Similarity to the duplicated rule
    pub fn similarity(&self) -> Option<f32> {
        match self {
            Self::Extracted(e) => e.similarity,
            Self::Fallback(_) => None,
        }
    }

    /// Category used for the request
    pub fn category(&self) -> Category {
        match self {
            Self::Extracted(e) => e.rule.category,
            Self::Fallback(f) => f.category,
        }
    }

    /// Whether this is the fallback rule
    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Fallback(_))
    }
}

/// An uploaded document
#[derive(Debug, Clone, Default)]
pub struct DocumentUpload {
    /// Client-supplied filename
    pub filename: String,
    /// Declared MIME type
    pub content_type: Option<String>,
    /// Raw file contents
    pub bytes: Vec<u8>,
}

impl DocumentUpload {
    /// Create an upload from a filename and its bytes
    pub fn new(filename: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: filename.into(),
            content_type: None,
            bytes: bytes.into(),
        }
    }

    /// Set the declared MIME type
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Whether the upload should be decoded as PDF
    pub fn is_pdf(&self) -> bool {
        self.filename.to_lowercase().ends_with(".pdf")
            || self
                .content_type
                .as_deref()
                .is_some_and(|ct| ct.eq_ignore_ascii_case("application/pdf"))
    }
}

/// One line of a document and the rule extracted from it
#[derive(Debug, Clone)]
pub struct DocumentRuleResult {
    /// The line the rule was extracted from
    pub source_snippet: String,
    /// Pipeline result for that line
    pub outcome: ExtractionOutcome,
}

/// Serializable view of an outcome, as returned over HTTP
#[derive(Debug, Clone, Serialize)]
pub struct OutcomeSummary {
    /// YAML text of the rule
    pub yaml: String,
    /// Confidence in [0, 1]
    pub confidence: f64,
    /// Identifier of the duplicated rule, if any
    pub duplicate_of: Option<String>,
    /// Similarity to the duplicated rule, if any
    pub similarity: Option<f32>,
    /// True for the fallback rule
    pub degraded: bool,
}

impl From<&ExtractionOutcome> for OutcomeSummary {
    fn from(outcome: &ExtractionOutcome) -> Self {
        Self {
            yaml: outcome.yaml().to_string(),
            confidence: outcome.confidence(),
            duplicate_of: outcome.duplicate_of().map(str::to_string),
            similarity: outcome.similarity(),
            degraded: outcome.is_degraded(),
        }
    }
}
