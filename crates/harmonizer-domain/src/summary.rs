//! Static rule counts per category for the dashboard summary

use crate::category::Category;

/// Rule counts per category
///
/// The dashboard summary is not derived from rule memory; it reports
/// these fixed counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryCounts {
    /// Code rules
    pub code: u32,
    /// Design rules
    pub design: u32,
    /// Naming rules
    pub naming: u32,
    /// Performance rules
    pub performance: u32,
    /// Template rules
    pub template: u32,
}

impl CategoryCounts {
    /// The fixed counts served by the summary endpoint
    pub const fn published() -> Self {
        Self {
            code: 58,
            design: 23,
            naming: 35,
            performance: 19,
            template: 12,
        }
    }

    /// Count for a single category
    pub fn get(&self, category: Category) -> u32 {
        match category {
            Category::Code => self.code,
            Category::Design => self.design,
            Category::Naming => self.naming,
            Category::Performance => self.performance,
            Category::Template => self.template,
        }
    }

    /// Sum over all categories
    pub fn total(&self) -> u32 {
        Category::ALL.iter().map(|c| self.get(*c)).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_published_total() {
        let counts = CategoryCounts::published();
        assert_eq!(counts.total(), 147);
        assert_eq!(counts.get(Category::Naming), 35);
    }
}
