//! Category module - the closed set of rule categories

use std::fmt;

/// Category of a governance rule
///
/// Drives prompt template selection and is echoed back to API callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    /// Code-level rules (statements, calls, error handling)
    Code,

    /// Architecture and design guidelines
    Design,

    /// Naming conventions and prefixes
    Naming,

    /// Performance and optimization rules
    Performance,

    /// Reusable templates and snippets
    Template,
}

/// Marker substrings checked against upper-cased text, in priority order
const MARKERS: &[(Category, &[&str])] = &[
    (Category::Code, &["SELECT", "TRY.", "METHOD", "CALL FUNCTION"]),
    (Category::Design, &["DESIGN", "PATTERN"]),
    (Category::Naming, &["NAME", "PREFIX"]),
    (Category::Performance, &["PERFORMANCE", "OPTIMIZE"]),
    (Category::Template, &["TEMPLATE", "SNIPPET"]),
];

impl Category {
    /// All categories, in declaration order
    pub const ALL: [Category; 5] = [
        Category::Code,
        Category::Design,
        Category::Naming,
        Category::Performance,
        Category::Template,
    ];

    /// Get the category name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Code => "code",
            Category::Design => "design",
            Category::Naming => "naming",
            Category::Performance => "performance",
            Category::Template => "template",
        }
    }

    /// Parse a category from a string (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "code" => Some(Category::Code),
            "design" => Some(Category::Design),
            "naming" => Some(Category::Naming),
            "performance" => Some(Category::Performance),
            "template" => Some(Category::Template),
            _ => None,
        }
    }
}

impl Default for Category {
    fn default() -> Self {
        Category::Code
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid category: {}", s))
    }
}

/// Guess the category of raw text from marker keywords
///
/// Total and deterministic: text with no marker falls back to [`Category::Code`].
///
/// # Examples
///
/// ```
/// use harmonizer_domain::{classify_category, Category};
///
/// assert_eq!(classify_category("SELECT * FROM mara"), Category::Code);
/// assert_eq!(classify_category("Prefer the strategy design pattern"), Category::Design);
/// assert_eq!(classify_category("hello"), Category::Code);
/// ```
pub fn classify_category(text: &str) -> Category {
    let upper = text.to_uppercase();
    MARKERS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| upper.contains(k)))
        .map(|(category, _)| *category)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_markers() {
        assert_eq!(classify_category("SELECT * FROM vbak"), Category::Code);
        assert_eq!(classify_category("try. something catch"), Category::Code);
        assert_eq!(classify_category("CALL FUNCTION 'BAPI_X'"), Category::Code);
    }

    #[test]
    fn test_design_pattern() {
        assert_eq!(classify_category("Use the DESIGN PATTERN facade"), Category::Design);
    }

    #[test]
    fn test_code_markers_take_priority() {
        // "METHOD" wins over "PATTERN"
        assert_eq!(
            classify_category("Each method must follow the observer pattern"),
            Category::Code
        );
    }

    #[test]
    fn test_other_categories() {
        assert_eq!(classify_category("Variables need a prefix lv_"), Category::Naming);
        assert_eq!(classify_category("Optimize loops over internal tables"), Category::Performance);
        assert_eq!(classify_category("Reuse this snippet for headers"), Category::Template);
    }

    #[test]
    fn test_default_is_code() {
        assert_eq!(classify_category(""), Category::Code);
        assert_eq!(classify_category("nothing to see here"), Category::Code);
    }

    #[test]
    fn test_parse_round_trip() {
        for category in Category::ALL {
            assert_eq!(Category::parse(category.as_str()), Some(category));
            assert_eq!(category.to_string(), category.as_str());
        }
        assert_eq!(" Naming ".parse::<Category>(), Ok(Category::Naming));
        assert!("bogus".parse::<Category>().is_err());
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: classification is deterministic for arbitrary text
        #[test]
        fn test_classification_deterministic(text in ".*") {
            prop_assert_eq!(classify_category(&text), classify_category(&text));
        }

        /// Property: any text containing SELECT is classified as code
        #[test]
        fn test_select_always_code(prefix in "[a-z ]{0,20}", suffix in "[a-z ]{0,20}") {
            let text = format!("{}SELECT{}", prefix, suffix);
            prop_assert_eq!(classify_category(&text), Category::Code);
        }
    }
}
