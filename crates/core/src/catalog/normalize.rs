//! Raw rows to typed, categorized products.
//!
//! A bad row never fails the load. Rows without a name are dropped, prices
//! that cannot be read become zero, and every such decision is recorded as a
//! [`RowIssue`] so the caller can show or log it.

use std::collections::HashSet;

use serde::Serialize;

use super::raw::{RawRecord, RawValue};
use super::rules::CategoryRules;
use super::{Catalog, Category, Product};
use crate::types::{Price, PriceError, ProductName};

/// What was wrong with a row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum RowIssueKind {
    /// No item name; the row was dropped.
    MissingName,
    /// No price; priced at zero.
    MissingPrice,
    /// Price is not a number; priced at zero.
    InvalidPrice(String),
    /// Price is below zero; priced at zero.
    NegativePrice(String),
    /// Name already seen earlier in the sheet; the row was dropped.
    DuplicateName(String),
}

/// A row-level problem found while normalizing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowIssue {
    /// Zero-based index of the row in the source.
    pub row: usize,
    pub kind: RowIssueKind,
}

/// Summary of a normalization pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NormalizeReport {
    /// Rows read from the source, separators included.
    pub rows: usize,
    /// Products that made it into the catalog.
    pub products: usize,
    /// Separator rows seen.
    pub separators: usize,
    pub issues: Vec<RowIssue>,
}

impl NormalizeReport {
    /// Rows that were dropped entirely.
    #[must_use]
    pub fn dropped(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| {
                matches!(
                    i.kind,
                    RowIssueKind::MissingName | RowIssueKind::DuplicateName(_)
                )
            })
            .count()
    }
}

/// Normalize raw rows into a catalog.
///
/// A separator row closes the current category and starts a new one, named
/// by classifying the next named product row with `rules`. Consecutive
/// separators never produce an empty category. Without separators the whole
/// sheet is one category named `rules.default_label`.
#[must_use]
pub fn normalize(records: &[RawRecord], rules: &CategoryRules) -> (Catalog, NormalizeReport) {
    let mut report = NormalizeReport {
        rows: records.len(),
        ..NormalizeReport::default()
    };
    let mut categories = Vec::new();
    let mut current_name = rules.default_label.clone();
    let mut current = Vec::new();
    let mut seen = HashSet::new();

    for (row, record) in records.iter().enumerate() {
        if record.is_separator() {
            report.separators += 1;
            if !current.is_empty() {
                categories.push(Category {
                    name: current_name.clone(),
                    products: std::mem::take(&mut current),
                });
            }
            if let Some(next) = next_product_name(records, row) {
                current_name = rules.classify(&next).to_owned();
            }
            continue;
        }

        let Ok(name) = ProductName::parse(&record.name_text()) else {
            report.issues.push(RowIssue {
                row,
                kind: RowIssueKind::MissingName,
            });
            continue;
        };

        if !seen.insert(name.clone()) {
            tracing::debug!(row, name = %name, "duplicate product name dropped");
            report.issues.push(RowIssue {
                row,
                kind: RowIssueKind::DuplicateName(name.into_inner()),
            });
            continue;
        }

        let price = match coerce_price(record.price.as_ref()) {
            Ok(price) => price,
            Err(kind) => {
                tracing::debug!(row, name = %name, issue = ?kind, "price coerced to zero");
                report.issues.push(RowIssue { row, kind });
                Price::ZERO
            }
        };

        current.push(Product::new(name, record.origin_text(), price));
    }

    if !current.is_empty() {
        categories.push(Category {
            name: current_name,
            products: current,
        });
    }

    let catalog = Catalog::new(categories);
    report.products = catalog.len();

    if !report.issues.is_empty() {
        tracing::warn!(
            issues = report.issues.len(),
            dropped = report.dropped(),
            "catalog rows needed cleanup"
        );
    }

    (catalog, report)
}

/// Name of the first named, non-separator row after `row`. Scans to the end
/// of the sheet.
fn next_product_name(records: &[RawRecord], row: usize) -> Option<String> {
    records
        .iter()
        .skip(row + 1)
        .filter(|r| !r.is_separator())
        .map(RawRecord::name_text)
        .find(|name| !name.is_empty())
}

/// Read a price cell, or say why it could not be read.
fn coerce_price(value: Option<&RawValue>) -> Result<Price, RowIssueKind> {
    let text = match value {
        None => return Err(RowIssueKind::MissingPrice),
        Some(RawValue::Bool(b)) => return Err(RowIssueKind::InvalidPrice(b.to_string())),
        Some(other) => other.as_text(),
    };

    Price::parse_loose(&text).map_err(|e| match e {
        PriceError::Empty => RowIssueKind::MissingPrice,
        PriceError::Invalid(raw) => RowIssueKind::InvalidPrice(raw),
        PriceError::Negative(_) => RowIssueKind::NegativePrice(text),
    })
}
