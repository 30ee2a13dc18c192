//! The product catalog.
//!
//! A catalog is built once per load from the raw spreadsheet rows and never
//! mutated afterwards. A reload builds a new [`Catalog`]; anything holding the
//! old one keeps a consistent view until it lets go.
//!
//! # Modules
//!
//! - [`raw`] - Loosely-typed rows as they come out of the spreadsheet
//! - [`rules`] - Keyword table used to name categories
//! - [`normalize`] - Raw rows to typed, categorized products

pub mod normalize;
pub mod raw;
pub mod rules;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{Price, ProductName};

pub use normalize::{NormalizeReport, RowIssue, RowIssueKind, normalize};
pub use raw::{RawRecord, RawValue};
pub use rules::{CategoryRule, CategoryRules};

/// A sellable product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Unique name, also the cart key.
    pub name: ProductName,
    /// Country or brand of origin, free text.
    pub origin: String,
    /// Current unit price.
    pub price: Price,
}

impl Product {
    /// Create a new product.
    #[must_use]
    pub const fn new(name: ProductName, origin: String, price: Price) -> Self {
        Self {
            name,
            origin,
            price,
        }
    }

    /// Whether the name or origin contains `needle`.
    ///
    /// `needle` must already be lowercased.
    #[must_use]
    pub fn matches(&self, needle: &str) -> bool {
        needle.is_empty()
            || self.name.as_str().to_lowercase().contains(needle)
            || self.origin.to_lowercase().contains(needle)
    }
}

/// A named group of products, in spreadsheet order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    pub products: Vec<Product>,
}

/// Position of a product inside the catalog.
#[derive(Debug, Clone, Copy)]
struct Slot {
    category: usize,
    product: usize,
}

/// An immutable, categorized set of products with a name index.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    categories: Vec<Category>,
    index: HashMap<ProductName, Slot>,
}

impl Catalog {
    /// Create an empty catalog.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a catalog from categories.
    ///
    /// Empty categories are dropped. If a name appears more than once, the
    /// first occurrence is the one the index points to.
    #[must_use]
    pub fn new(categories: Vec<Category>) -> Self {
        let categories: Vec<Category> = categories
            .into_iter()
            .filter(|c| !c.products.is_empty())
            .collect();

        let mut index = HashMap::new();
        for (ci, category) in categories.iter().enumerate() {
            for (pi, product) in category.products.iter().enumerate() {
                index.entry(product.name.clone()).or_insert(Slot {
                    category: ci,
                    product: pi,
                });
            }
        }

        Self { categories, index }
    }

    /// Build a single-category catalog.
    #[must_use]
    pub fn flat(name: impl Into<String>, products: Vec<Product>) -> Self {
        Self::new(vec![Category {
            name: name.into(),
            products,
        }])
    }

    #[must_use]
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Iterate every product in catalog order.
    pub fn products(&self) -> impl Iterator<Item = &Product> {
        self.categories.iter().flat_map(|c| c.products.iter())
    }

    /// Iterate every product with the name of its category.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &Product)> {
        self.categories
            .iter()
            .flat_map(|c| c.products.iter().map(move |p| (c.name.as_str(), p)))
    }

    /// Look up a product by name.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&Product> {
        let slot = self.index.get(name)?;
        self.categories
            .get(slot.category)
            .and_then(|c| c.products.get(slot.product))
    }

    /// Current price of a product, if it is in the catalog.
    #[must_use]
    pub fn price_of(&self, name: &str) -> Option<Price> {
        self.find(name).map(|p| p.price)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Number of products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.categories.iter().map(|c| c.products.len()).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Position of a product in catalog order, used to sort order lines.
    #[must_use]
    pub fn position(&self, name: &str) -> Option<usize> {
        let slot = self.index.get(name)?;
        let before: usize = self
            .categories
            .iter()
            .take(slot.category)
            .map(|c| c.products.len())
            .sum();
        Some(before + slot.product)
    }
}

/// The catalog source could not be read at all.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("catalog could not be loaded: {reason}")]
pub struct LoadFailure {
    pub reason: String,
}

impl LoadFailure {
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// How a catalog load went.
#[derive(Debug, Clone)]
pub enum LoadStatus {
    /// The source was read; row-level problems are in the report.
    Loaded(NormalizeReport),
    /// The source could not be read; the catalog is empty.
    Failed(LoadFailure),
}

/// A catalog together with the outcome of loading it.
///
/// "Could not load" and "loaded zero rows" both give an empty catalog; the
/// status is what tells them apart.
#[derive(Debug, Clone)]
pub struct CatalogLoad {
    catalog: Catalog,
    status: LoadStatus,
}

impl CatalogLoad {
    /// Normalize raw records into a loaded catalog.
    #[must_use]
    pub fn from_records(records: Vec<RawRecord>, rules: &CategoryRules) -> Self {
        let (catalog, report) = normalize(&records, rules);
        Self {
            catalog,
            status: LoadStatus::Loaded(report),
        }
    }

    /// An empty catalog carrying the load failure.
    #[must_use]
    pub fn failed(failure: LoadFailure) -> Self {
        tracing::warn!(reason = %failure.reason, "catalog load failed");
        Self {
            catalog: Catalog::empty(),
            status: LoadStatus::Failed(failure),
        }
    }

    /// Build from the result of a loader call.
    #[must_use]
    pub fn from_result<E: std::fmt::Display>(
        result: Result<Vec<RawRecord>, E>,
        rules: &CategoryRules,
    ) -> Self {
        match result {
            Ok(records) => Self::from_records(records, rules),
            Err(e) => Self::failed(LoadFailure::new(e.to_string())),
        }
    }

    #[must_use]
    pub const fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    #[must_use]
    pub const fn status(&self) -> &LoadStatus {
        &self.status
    }

    /// The failure, if the source could not be read.
    #[must_use]
    pub const fn failure(&self) -> Option<&LoadFailure> {
        match &self.status {
            LoadStatus::Failed(failure) => Some(failure),
            LoadStatus::Loaded(_) => None,
        }
    }

    /// The normalization report, if the source was read.
    #[must_use]
    pub const fn report(&self) -> Option<&NormalizeReport> {
        match &self.status {
            LoadStatus::Loaded(report) => Some(report),
            LoadStatus::Failed(_) => None,
        }
    }

    /// Whether checkout may proceed against this catalog.
    #[must_use]
    pub const fn is_available(&self) -> bool {
        matches!(self.status, LoadStatus::Loaded(_))
    }
}
