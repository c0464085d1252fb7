//! Validate generated YAML and read the fields the pipeline needs

use serde_json::{Map, Value};
use tracing::warn;

/// A parsed rule: field name to value
pub type RuleFields = Map<String, Value>;

/// Remove a surrounding Markdown code fence, if any
///
/// Models sometimes wrap YAML in ```` ```yaml ```` blocks even when told not to.
pub fn strip_code_fence(response: &str) -> &str {
    let trimmed = response.trim();
    if !trimmed.starts_with("```") {
        return trimmed;
    }

    // Drop the opening fence line (```yaml or ```)
    let body = match trimmed.find('\n') {
        Some(idx) => &trimmed[idx + 1..],
        None => return "",
    };

    body.trim_end()
        .strip_suffix("```")
        .unwrap_or(body)
        .trim()
}

/// Parse YAML text into a rule mapping
///
/// Returns `None` for malformed YAML and for documents that are not a
/// mapping. No schema is enforced.
pub fn parse_rule_yaml(yaml: &str) -> Option<RuleFields> {
    match serde_yaml_bw::from_str::<RuleFields>(yaml) {
        Ok(fields) => Some(fields),
        Err(e) => {
            warn!("Generated rule is not a YAML mapping: {}", e);
            None
        }
    }
}

/// The rule's `id` field, when it is a non-empty string or a number
pub fn rule_id(fields: &RuleFields) -> Option<String> {
    match fields.get("id")? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// The rule's numeric `confidence` field, clamped to [0, 1]
pub fn confidence(fields: &RuleFields) -> Option<f64> {
    fields
        .get("confidence")
        .and_then(Value::as_f64)
        .filter(|c| c.is_finite())
        .map(|c| c.clamp(0.0, 1.0))
}

/// Text fed to the embedding model: `"{title} {description} {selector}"`
///
/// Falls back to the raw YAML when the rule did not parse or when all three
/// fields are missing.
pub fn embedding_text(fields: Option<&RuleFields>, yaml: &str) -> String {
    let Some(fields) = fields else {
        return yaml.to_string();
    };

    let text = ["title", "description", "selector"]
        .iter()
        .map(|key| render_field(fields.get(*key)))
        .collect::<Vec<_>>()
        .join(" ");

    if text.trim().is_empty() {
        yaml.to_string()
    } else {
        text
    }
}

fn render_field(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_strip_code_fence() {
        assert_eq!(strip_code_fence("```yaml\nid: a\ntype: code\n```"), "id: a\ntype: code");
        assert_eq!(strip_code_fence("```\nid: a\n```\n"), "id: a");
        assert_eq!(strip_code_fence("  id: a  "), "id: a");
        assert_eq!(strip_code_fence("```"), "");
    }

    #[test]
    fn test_strip_code_fence_without_closing() {
        assert_eq!(strip_code_fence("```yaml\nid: a"), "id: a");
    }

    #[test]
    fn test_parse_valid_rule() {
        let yaml = "id: abap.db.no_select_star\ntype: code\nseverity: major\nconfidence: 0.85\n";
        let fields = parse_rule_yaml(yaml).unwrap();

        assert_eq!(rule_id(&fields).as_deref(), Some("abap.db.no_select_star"));
        assert_eq!(fields["severity"], json!("major"));
        assert_eq!(confidence(&fields), Some(0.85));
    }

    #[test]
    fn test_parse_nested_fields() {
        let yaml = "id: x\nexamples:\n  good: SELECT matnr FROM mara\n  bad: SELECT * FROM mara\n";
        let fields = parse_rule_yaml(yaml).unwrap();
        assert_eq!(fields["examples"]["bad"], json!("SELECT * FROM mara"));
    }

    #[test]
    fn test_parse_malformed_yaml() {
        assert!(parse_rule_yaml("id: [unclosed").is_none());
        assert!(parse_rule_yaml("{unclosed: map").is_none());
    }

    #[test]
    fn test_non_mapping_is_not_a_rule() {
        assert!(parse_rule_yaml("just a sentence").is_none());
        assert!(parse_rule_yaml("- a\n- b").is_none());
    }

    #[test]
    fn test_mapping_without_expected_fields_still_parses() {
        let fields = parse_rule_yaml("foo: bar").unwrap();
        assert!(rule_id(&fields).is_none());
        assert!(confidence(&fields).is_none());
    }

    #[test]
    fn test_numeric_id() {
        let fields = parse_rule_yaml("id: 42").unwrap();
        assert_eq!(rule_id(&fields).as_deref(), Some("42"));

        let fields = parse_rule_yaml("id: \"  \"").unwrap();
        assert!(rule_id(&fields).is_none());
    }

    #[test]
    fn test_confidence_clamped() {
        let fields = parse_rule_yaml("confidence: 1.7").unwrap();
        assert_eq!(confidence(&fields), Some(1.0));

        let fields = parse_rule_yaml("confidence: high").unwrap();
        assert_eq!(confidence(&fields), None);
    }

    #[test]
    fn test_embedding_text_from_fields() {
        let fields = parse_rule_yaml(
            "title: No SELECT star\ndescription: List columns\nselector:\n  pattern: 'SELECT *'\n",
        )
        .unwrap();
        assert_eq!(
            embedding_text(Some(&fields), "ignored"),
            r#"No SELECT star List columns {"pattern":"SELECT *"}"#
        );
    }

    #[test]
    fn test_embedding_text_missing_fields() {
        let fields = parse_rule_yaml("title: Only title").unwrap();
        assert_eq!(embedding_text(Some(&fields), "yaml"), "Only title  ");

        let fields = parse_rule_yaml("id: x").unwrap();
        assert_eq!(embedding_text(Some(&fields), "id: x"), "id: x");
        assert_eq!(embedding_text(None, "raw text"), "raw text");
    }
}
