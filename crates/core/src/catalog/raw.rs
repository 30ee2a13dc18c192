//! Raw spreadsheet rows.
//!
//! Sheet exports are loosely typed: a price column holds numbers for most
//! rows and text for a few, an item name that looks numeric comes back as a
//! number, and the separator flag may be a boolean, `1`, or `"TRUE"`. Rows are
//! therefore kept as [`RawValue`]s and only interpreted by the normalizer.

use serde::{Deserialize, Serialize};

/// A single loosely-typed cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Bool(bool),
    Number(serde_json::Number),
    Text(String),
}

impl RawValue {
    /// Build a text cell.
    #[must_use]
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    /// The cell rendered as text, trimmed.
    #[must_use]
    pub fn as_text(&self) -> String {
        match self {
            Self::Bool(b) => b.to_string(),
            Self::Number(n) => n.to_string(),
            Self::Text(s) => s.trim().to_owned(),
        }
    }

    /// Read the cell as a yes/no flag.
    ///
    /// `true`, non-zero numbers, and the strings `true`, `yes`, `1`, `x`
    /// (any case) are truthy.
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Bool(b) => *b,
            Self::Number(n) => n.as_f64().is_some_and(|v| v != 0.0),
            Self::Text(s) => matches!(
                s.trim().to_lowercase().as_str(),
                "true" | "yes" | "1" | "x"
            ),
        }
    }
}

impl From<i64> for RawValue {
    fn from(n: i64) -> Self {
        Self::Number(n.into())
    }
}

impl From<&str> for RawValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}

impl From<bool> for RawValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

/// One spreadsheet row.
///
/// Column headers are accepted in English or as the original Arabic sheet
/// headers (`البند`, `المنشأ`, `السعر`). Unknown columns are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    #[serde(default, alias = "البند", alias = "Name", alias = "item")]
    pub name: Option<RawValue>,
    #[serde(default, alias = "المنشأ", alias = "Origin")]
    pub origin: Option<RawValue>,
    #[serde(default, alias = "السعر", alias = "Price")]
    pub price: Option<RawValue>,
    #[serde(
        default,
        alias = "isSeparator",
        alias = "separator",
        skip_serializing_if = "Option::is_none"
    )]
    pub is_separator: Option<RawValue>,
}

impl RawRecord {
    /// A product row with an integer price.
    #[must_use]
    pub fn product(name: &str, origin: &str, price: i64) -> Self {
        Self {
            name: Some(name.into()),
            origin: Some(origin.into()),
            price: Some(price.into()),
            is_separator: None,
        }
    }

    /// A product row with the price exactly as typed.
    #[must_use]
    pub fn with_price_text(name: &str, origin: &str, price: &str) -> Self {
        Self {
            name: Some(name.into()),
            origin: Some(origin.into()),
            price: Some(price.into()),
            is_separator: None,
        }
    }

    /// A separator row.
    #[must_use]
    pub fn separator() -> Self {
        Self {
            is_separator: Some(true.into()),
            ..Self::default()
        }
    }

    /// Whether this row is a category separator.
    #[must_use]
    pub fn is_separator(&self) -> bool {
        self.is_separator.as_ref().is_some_and(RawValue::is_truthy)
    }

    /// The name cell as trimmed text; empty when missing.
    #[must_use]
    pub fn name_text(&self) -> String {
        self.name.as_ref().map(RawValue::as_text).unwrap_or_default()
    }

    /// The origin cell as trimmed text; empty when missing.
    #[must_use]
    pub fn origin_text(&self) -> String {
        self.origin.as_ref().map(RawValue::as_text).unwrap_or_default()
    }
}
