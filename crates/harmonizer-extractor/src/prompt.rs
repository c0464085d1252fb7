//! LLM prompt engineering for rule extraction

use harmonizer_domain::Category;

/// Builds the extraction prompt for one rule candidate
pub struct PromptBuilder<'a> {
    text: &'a str,
    category: Category,
    max_chars: usize,
}

impl<'a> PromptBuilder<'a> {
    /// Create a new prompt builder
    pub fn new(text: &'a str, category: Category) -> Self {
        Self {
            text,
            category,
            max_chars: 4_000,
        }
    }

    /// Limit how many characters of the input text are included
    pub fn with_max_chars(mut self, max_chars: usize) -> Self {
        self.max_chars = max_chars;
        self
    }

    /// Build the complete extraction prompt
    ///
    /// Never fails; oversized input is truncated at a character boundary.
    pub fn build(&self) -> String {
        let excerpt = truncate_chars(self.text, self.max_chars);

        let mut prompt = String::with_capacity(excerpt.len() + 1_024);
        prompt.push_str(template_for(self.category));
        prompt.push_str("\n\n");
        prompt.push_str(input_label(self.category));
        prompt.push_str(":\n");
        prompt.push_str(excerpt);
        prompt.push_str("\n\n");
        prompt.push_str(OUTPUT_CUE);
        prompt
    }
}

/// The first `max_chars` characters of `text`
fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

fn template_for(category: Category) -> &'static str {
    match category {
        Category::Code => CODE_RULE_PROMPT,
        Category::Design => DESIGN_RULE_PROMPT,
        Category::Naming => NAMING_RULE_PROMPT,
        Category::Performance => PERFORMANCE_RULE_PROMPT,
        Category::Template => TEMPLATE_RULE_PROMPT,
    }
}

fn input_label(category: Category) -> &'static str {
    match category {
        Category::Design => "Guideline",
        _ => "Code or text",
    }
}

const CODE_RULE_PROMPT: &str = r#"You are an ABAP code quality assistant.
Given a code snippet or standard text, extract ONE enforceable governance rule.

Respond ONLY in valid YAML with these fields:
id, type (code|design|naming|performance|template), title, severity,
description, selector (pattern), fix (snippet), examples (good/bad),
rationale, confidence."#;

const DESIGN_RULE_PROMPT: &str = r#"You are a software architecture assistant.
Analyze this design or guideline paragraph and produce ONE rule.

Respond ONLY in valid YAML with these fields:
id, type, title, severity, enforces, template, rationale, confidence."#;

const NAMING_RULE_PROMPT: &str = r#"You are an ABAP naming convention reviewer.
From the following text, extract ONE naming rule.

Respond ONLY in valid YAML with these fields:
id, type, title, severity, description, pattern (naming pattern or prefix),
examples (good/bad), rationale, confidence."#;

const PERFORMANCE_RULE_PROMPT: &str = r#"You are an ABAP performance reviewer.
From the following code or text, extract ONE performance rule.

Respond ONLY in valid YAML with these fields:
id, type, title, severity, description, selector (pattern), fix (snippet),
impact, rationale, confidence."#;

const TEMPLATE_RULE_PROMPT: &str = r#"You are a code template curator.
From the following snippet or text, extract ONE reusable template rule.

Respond ONLY in valid YAML with these fields:
id, type, title, severity, description, template (snippet), placeholders,
rationale, confidence."#;

const OUTPUT_CUE: &str = "Return ONLY the YAML document, no explanations.\nYAML Rule:";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_includes_text() {
        let prompt = PromptBuilder::new("SELECT * FROM mara.", Category::Code).build();
        assert!(prompt.contains("SELECT * FROM mara."));
        assert!(prompt.ends_with("YAML Rule:"));
    }

    #[test]
    fn test_template_selected_by_category() {
        let code = PromptBuilder::new("x", Category::Code).build();
        assert!(code.contains("ABAP code quality assistant"));
        assert!(code.contains("selector (pattern)"));

        let design = PromptBuilder::new("x", Category::Design).build();
        assert!(design.contains("software architecture assistant"));
        assert!(design.contains("enforces"));
        assert!(design.contains("Guideline:\nx"));

        let naming = PromptBuilder::new("x", Category::Naming).build();
        assert!(naming.contains("naming pattern or prefix"));

        let perf = PromptBuilder::new("x", Category::Performance).build();
        assert!(perf.contains("impact"));

        let template = PromptBuilder::new("x", Category::Template).build();
        assert!(template.contains("placeholders"));
    }

    #[test]
    fn test_every_template_asks_for_id_and_confidence() {
        for category in Category::ALL {
            let prompt = PromptBuilder::new("x", category).build();
            assert!(prompt.contains("id, type"), "{} template", category);
            assert!(prompt.contains("confidence"), "{} template", category);
        }
    }

    #[test]
    fn test_truncates_long_input() {
        let text = format!("{}{}", "a".repeat(10), "b".repeat(10));
        let prompt = PromptBuilder::new(&text, Category::Code)
            .with_max_chars(10)
            .build();
        assert!(prompt.contains(&"a".repeat(10)));
        assert!(!prompt.contains('b'));
    }

    #[test]
    fn test_truncation_respects_char_boundaries() {
        let text = "äöü".repeat(5);
        assert_eq!(truncate_chars(&text, 4), "äöüä");
        assert_eq!(truncate_chars("short", 100), "short");
        assert_eq!(truncate_chars("", 3), "");
    }
}
