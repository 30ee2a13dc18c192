//! Product name type.

use core::fmt;
use std::borrow::Borrow;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`ProductName`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum NameError {
    /// The input is empty or only whitespace.
    #[error("product name cannot be empty")]
    Empty,
}

/// The name of a product, which is also its identity.
///
/// Names come straight from the spreadsheet's item column. The cart, the
/// price index and the order message are all keyed by this value, so two
/// rows with the same name are the same product.
///
/// ## Constraints
///
/// - Surrounding whitespace is trimmed
/// - Inner runs of whitespace and control characters (line breaks
///   included) become a single space, so a name always fits on one line
/// - Must not be empty after trimming
///
/// ## Examples
///
/// ```
/// use parts_order_core::ProductName;
///
/// assert_eq!(ProductName::parse("  Filter A ").unwrap().as_str(), "Filter A");
/// assert_eq!(ProductName::parse("Coil\nHyundai").unwrap().as_str(), "Coil Hyundai");
/// assert!(ProductName::parse("").is_err());
/// assert!(ProductName::parse("   ").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(try_from = "String", into = "String")]
pub struct ProductName(String);

impl ProductName {
    /// Parse a `ProductName` from a string.
    ///
    /// # Errors
    ///
    /// Returns [`NameError::Empty`] if the input is empty after trimming.
    pub fn parse(s: &str) -> Result<Self, NameError> {
        let words: Vec<&str> = s
            .split(|c: char| c.is_whitespace() || c.is_control())
            .filter(|word| !word.is_empty())
            .collect();
        if words.is_empty() {
            return Err(NameError::Empty);
        }
        Ok(Self(words.join(" ")))
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `ProductName` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ProductName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for ProductName {
    type Err = NameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ProductName {
    type Error = NameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ProductName> for String {
    fn from(name: ProductName) -> Self {
        name.0
    }
}

impl AsRef<str> for ProductName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for ProductName {
    fn borrow(&self) -> &str {
        &self.0
    }
}
