//! Category naming rules.
//!
//! The sheet marks category boundaries with separator rows but does not name
//! the categories. A category is named by looking at the first product after
//! the separator and checking it against an ordered keyword table. This is a
//! heuristic: it is only as good as the catalog's naming conventions, and the
//! first matching rule wins when a name contains several keywords.

use serde::{Deserialize, Serialize};

/// Maps a keyword found in a product name to a category name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRule {
    pub keyword: String,
    pub category: String,
}

impl CategoryRule {
    #[must_use]
    pub fn new(keyword: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            category: category.into(),
        }
    }
}

/// An ordered keyword table with fallback labels.
///
/// After a separator the table is applied to the first named product that
/// follows, however many blank or nameless rows come before it. There is no
/// fixed lookahead window; a category only falls back to the previous name
/// when no named product follows at all.
///
/// Deserializes from JSON so a deployment can swap the table without code
/// changes:
///
/// ```
/// use parts_order_core::CategoryRules;
///
/// let rules: CategoryRules = serde_json::from_str(r#"{
///     "rules": [{"keyword": "filter", "category": "Filters"}],
///     "other_label": "Other",
///     "default_label": "Products"
/// }"#).unwrap();
///
/// assert_eq!(rules.classify("Oil Filter"), "Filters");
/// assert_eq!(rules.classify("Spark Plug"), "Other");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRules {
    pub rules: Vec<CategoryRule>,
    /// Used after a separator when no keyword matches.
    pub other_label: String,
    /// Used for products before the first separator, or when there are none.
    pub default_label: String,
}

impl Default for CategoryRules {
    /// The auto-parts table: ignition coils, sensors, airbag clock springs.
    fn default() -> Self {
        Self {
            rules: vec![
                CategoryRule::new("بوبينه", "البوبينات"),
                CategoryRule::new("حساس", "الحساسات"),
                CategoryRule::new("شريط", "شرائط الإيرباج"),
            ],
            other_label: "منتجات أخرى".to_owned(),
            default_label: "المنتجات".to_owned(),
        }
    }
}

impl CategoryRules {
    /// A table with no rules.
    #[must_use]
    pub fn new(default_label: impl Into<String>, other_label: impl Into<String>) -> Self {
        Self {
            rules: Vec::new(),
            other_label: other_label.into(),
            default_label: default_label.into(),
        }
    }

    /// Append a rule. Rules are tried in the order they were added.
    #[must_use]
    pub fn with_rule(mut self, keyword: impl Into<String>, category: impl Into<String>) -> Self {
        self.rules.push(CategoryRule::new(keyword, category));
        self
    }

    /// Category name for a product name.
    ///
    /// Case-insensitive substring match; the first matching rule wins.
    #[must_use]
    pub fn classify(&self, product_name: &str) -> &str {
        let haystack = product_name.to_lowercase();
        self.rules
            .iter()
            .find(|rule| !rule.keyword.is_empty() && haystack.contains(&rule.keyword.to_lowercase()))
            .map_or(self.other_label.as_str(), |rule| rule.category.as_str())
    }
}
