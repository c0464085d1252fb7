//! Core Extractor implementation

use crate::config::ExtractorConfig;
use crate::document::{extract_document_text, split_candidates};
use crate::error::ExtractorError;
use crate::parser::{self, embedding_text, parse_rule_yaml, strip_code_fence};
use crate::prompt::PromptBuilder;
use crate::types::{
    DocumentRuleResult, DocumentUpload, ExtractedRule, ExtractionOutcome, FallbackRule,
    RuleExtraction,
};
use harmonizer_domain::{Category, RuleCandidate};
use harmonizer_llm::{LlmError, LlmProvider};
use harmonizer_store::{DuplicateDetector, MemoryEntry, RuleMemory};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::time::timeout;
use tracing::{debug, error, info};

/// Confidence for a rule that parsed but carries no `confidence` field
pub const PARSED_DEFAULT_CONFIDENCE: f64 = 0.9;

/// Confidence for a rule whose YAML did not parse
pub const UNPARSED_DEFAULT_CONFIDENCE: f64 = 0.7;

/// The Extractor turns rule candidates into YAML rules
///
/// Rule memory is injected and shared; the lock is only ever held for the
/// synchronous duplicate scan and insert, never across a model call.
pub struct RuleExtractor {
    provider: Arc<dyn LlmProvider>,
    memory: Arc<Mutex<RuleMemory>>,
    detector: DuplicateDetector,
    config: ExtractorConfig,
}

impl RuleExtractor {
    /// Create an Extractor with an empty rule memory
    pub fn new(provider: Arc<dyn LlmProvider>, config: ExtractorConfig) -> Self {
        Self::with_memory(provider, Arc::new(Mutex::new(RuleMemory::new())), config)
    }

    /// Create an Extractor over an existing rule memory
    pub fn with_memory(
        provider: Arc<dyn LlmProvider>,
        memory: Arc<Mutex<RuleMemory>>,
        config: ExtractorConfig,
    ) -> Self {
        Self {
            provider,
            memory,
            detector: DuplicateDetector::new(config.duplicate_threshold),
            config,
        }
    }

    /// Shared handle to the rule memory
    pub fn memory(&self) -> Arc<Mutex<RuleMemory>> {
        Arc::clone(&self.memory)
    }

    /// Active configuration
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Record a pre-existing rule
    ///
    /// Seeded rules have no embedding and are skipped by duplicate detection.
    pub fn seed_memory(
        &self,
        id: impl Into<String>,
        yaml: impl Into<String>,
    ) -> Result<(), ExtractorError> {
        let id = id.into();
        self.lock_memory()?.insert(id.clone(), MemoryEntry::without_vector(yaml));
        debug!("Seeded rule '{}'", id);
        Ok(())
    }

    /// Extract one rule
    ///
    /// Never fails: any internal error produces [`ExtractionOutcome::Fallback`].
    pub async fn extract(&self, candidate: &RuleCandidate) -> ExtractionOutcome {
        let category = candidate.resolved_category();
        info!(
            "Starting extraction: category '{}', text length {}",
            category,
            candidate.text.len()
        );

        match self.try_extract(&candidate.text, category).await {
            Ok(extraction) => {
                info!(
                    "Extracted rule '{}' (confidence {:.2}, duplicate of {:?})",
                    extraction.rule.id, extraction.rule.confidence, extraction.duplicate_of
                );
                ExtractionOutcome::Extracted(extraction)
            }
            Err(e) => {
                error!("Extraction failed, returning fallback rule: {}", e);
                ExtractionOutcome::Fallback(FallbackRule::new(e.to_string(), category))
            }
        }
    }

    async fn try_extract(
        &self,
        text: &str,
        category: Category,
    ) -> Result<RuleExtraction, ExtractorError> {
        let prompt = PromptBuilder::new(text, category)
            .with_max_chars(self.config.max_prompt_chars)
            .build();
        debug!("Prompt length: {} chars", prompt.len());

        let params = self.config.generation_params();
        let response = timeout(
            self.config.extraction_timeout(),
            self.provider.generate(&prompt, &params),
        )
        .await
        .map_err(|_| ExtractorError::Timeout(self.config.extraction_timeout_secs))?
        .map_err(ExtractorError::Generation)?;

        let yaml = strip_code_fence(&response);
        if yaml.is_empty() {
            return Err(ExtractorError::Generation(LlmError::InvalidResponse(
                "Model returned an empty code block".to_string(),
            )));
        }
        debug!("Generated YAML length: {} chars", yaml.len());

        let fields = parse_rule_yaml(yaml);
        let vector = self
            .provider
            .embed(&embedding_text(fields.as_ref(), yaml))
            .await
            .map_err(ExtractorError::Embedding)?;

        let (id, check) = {
            let mut memory = self.lock_memory()?;
            let check = self.detector.check(&vector, &memory);
            let id = fields
                .as_ref()
                .and_then(parser::rule_id)
                .unwrap_or_else(|| memory.next_sequential_id());
            if memory.insert(id.clone(), MemoryEntry::new(yaml, vector)).is_some() {
                debug!("Overwrote existing rule '{}'", id);
            }
            (id, check)
        };

        let confidence = match &fields {
            Some(f) => parser::confidence(f).unwrap_or(PARSED_DEFAULT_CONFIDENCE),
            None => UNPARSED_DEFAULT_CONFIDENCE,
        };

        Ok(RuleExtraction {
            similarity: check.reported_similarity(),
            duplicate_of: check.duplicate_of,
            rule: ExtractedRule {
                id,
                yaml: yaml.to_string(),
                fields,
                confidence,
                category,
            },
        })
    }

    /// Extract rules from the first lines of an uploaded document
    ///
    /// Lines are processed one after another, so later lines see the rules
    /// recorded for earlier ones.
    pub async fn extract_document(&self, upload: &DocumentUpload) -> Vec<DocumentRuleResult> {
        let text = extract_document_text(upload).await;
        let snippets = split_candidates(&text, self.config.max_document_candidates);
        info!(
            "Document '{}' yielded {} candidate lines",
            upload.filename,
            snippets.len()
        );

        let mut results = Vec::with_capacity(snippets.len());
        for snippet in snippets {
            let outcome = self.extract(&RuleCandidate::new(snippet.as_str())).await;
            results.push(DocumentRuleResult {
                source_snippet: snippet,
                outcome,
            });
        }
        results
    }

    fn lock_memory(&self) -> Result<MutexGuard<'_, RuleMemory>, ExtractorError> {
        self.memory
            .lock()
            .map_err(|e| ExtractorError::Memory(e.to_string()))
    }
}
