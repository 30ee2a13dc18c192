//! Search filter and pagination over the catalog.
//!
//! Every view is computed from the full catalog: filter first, then slice the
//! flattened matches into pages, then regroup the page by category for
//! display. Nothing is cached between calls, so the same state and catalog
//! always give the same page.

use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::{Catalog, Product};

/// Page sizes offered to the user.
pub const PAGE_SIZE_OPTIONS: [usize; 4] = [5, 10, 15, 20];

/// Page size used when none is configured.
pub const DEFAULT_PAGE_SIZE: NonZeroUsize = NonZeroUsize::new(10).expect("10 is non-zero");

/// Errors from view state updates.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ViewError {
    #[error("page size must be at least 1")]
    ZeroPageSize,
}

/// Search term and page position of one session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewState {
    search: String,
    page: usize,
    per_page: NonZeroUsize,
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl ViewState {
    /// Empty search on the first page.
    #[must_use]
    pub const fn new(per_page: NonZeroUsize) -> Self {
        Self {
            search: String::new(),
            page: 0,
            per_page,
        }
    }

    /// Empty search on the first page, with a page size given as a plain number.
    ///
    /// # Errors
    ///
    /// Returns [`ViewError::ZeroPageSize`] if `per_page` is zero.
    pub fn with_page_size(per_page: usize) -> Result<Self, ViewError> {
        NonZeroUsize::new(per_page)
            .map(Self::new)
            .ok_or(ViewError::ZeroPageSize)
    }

    #[must_use]
    pub fn search(&self) -> &str {
        &self.search
    }

    /// Zero-based page index.
    #[must_use]
    pub const fn page(&self) -> usize {
        self.page
    }

    #[must_use]
    pub const fn per_page(&self) -> NonZeroUsize {
        self.per_page
    }

    /// Change the search term. Returns whether it changed.
    ///
    /// A new term moves back to the first page.
    pub fn set_search(&mut self, term: &str) -> bool {
        if self.search == term {
            return false;
        }
        term.clone_into(&mut self.search);
        self.page = 0;
        true
    }

    /// Change the page size. Returns whether it changed.
    ///
    /// A new size moves back to the first page.
    ///
    /// # Errors
    ///
    /// Returns [`ViewError::ZeroPageSize`] if `per_page` is zero.
    pub fn set_per_page(&mut self, per_page: usize) -> Result<bool, ViewError> {
        let per_page = NonZeroUsize::new(per_page).ok_or(ViewError::ZeroPageSize)?;
        if self.per_page == per_page {
            return Ok(false);
        }
        self.per_page = per_page;
        self.page = 0;
        Ok(true)
    }

    /// Jump to a page. Call [`ViewState::clamp`] once the page count is known.
    pub const fn set_page(&mut self, page: usize) {
        self.page = page;
    }

    pub const fn first_page(&mut self) {
        self.page = 0;
    }

    pub const fn prev_page(&mut self) {
        self.page = self.page.saturating_sub(1);
    }

    pub fn next_page(&mut self, total_pages: usize) {
        self.page = (self.page + 1).min(total_pages.saturating_sub(1));
    }

    pub const fn last_page(&mut self, total_pages: usize) {
        self.page = total_pages.saturating_sub(1);
    }

    /// Keep the page index inside `[0, total_pages - 1]`.
    pub fn clamp(&mut self, total_pages: usize) {
        self.page = self.page.min(total_pages.saturating_sub(1));
    }
}

/// A product together with the name of its category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Listing<'a> {
    pub category: &'a str,
    pub product: &'a Product,
}

/// Every product of the catalog, in order, as listings.
pub fn listings(catalog: &Catalog) -> impl Iterator<Item = Listing<'_>> {
    catalog
        .entries()
        .map(|(category, product)| Listing { category, product })
}

/// Keep the listings whose name or origin contains `term`, ignoring case.
///
/// Order is preserved. A blank term keeps everything. Applying the same term
/// twice gives the same result as applying it once.
pub fn filter<'a, I>(listings: I, term: &str) -> Vec<Listing<'a>>
where
    I: IntoIterator<Item = Listing<'a>>,
{
    let needle = term.trim().to_lowercase();
    listings
        .into_iter()
        .filter(|l| l.product.matches(&needle))
        .collect()
}

/// Consecutive products on a page that share a category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageGroup<'a> {
    /// Header to show above the products.
    pub category: &'a str,
    pub products: Vec<&'a Product>,
}

/// One page of filtered products.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageView<'a> {
    /// Products on this page, grouped into runs of the same category.
    pub groups: Vec<PageGroup<'a>>,
    /// Zero-based index of this page.
    pub page: usize,
    /// Always at least 1, even when nothing matched.
    pub total_pages: usize,
    /// Products matching the filter across all pages.
    pub total_matches: usize,
    pub per_page: NonZeroUsize,
}

impl<'a> PageView<'a> {
    /// Nothing matched the filter.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.total_matches == 0
    }

    /// Products on this page, in order.
    pub fn products(&self) -> impl Iterator<Item = &'a Product> + '_ {
        self.groups.iter().flat_map(|g| g.products.iter().copied())
    }

    /// Number of products on this page.
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.iter().map(|g| g.products.len()).sum()
    }

    #[must_use]
    pub const fn has_prev(&self) -> bool {
        self.page > 0
    }

    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.page + 1 < self.total_pages
    }

    /// One-based position of the first product on this page, 0 if none.
    #[must_use]
    pub fn first_position(&self) -> usize {
        if self.len() == 0 {
            0
        } else {
            self.page * self.per_page.get() + 1
        }
    }
}

/// Number of pages needed for `matches` products, never less than 1.
#[must_use]
pub const fn page_count(matches: usize, per_page: NonZeroUsize) -> usize {
    if matches == 0 {
        1
    } else {
        matches.div_ceil(per_page.get())
    }
}

/// Slice page `page` out of the filtered listings.
///
/// Page `p` holds matches `[p * n, p * n + n)`. A page past the end is
/// returned with no products; clamping the index is up to the caller.
#[must_use]
pub fn paginate<'a>(matches: &[Listing<'a>], page: usize, per_page: NonZeroUsize) -> PageView<'a> {
    let n = per_page.get();
    let start = page.saturating_mul(n);

    let mut groups: Vec<PageGroup<'a>> = Vec::new();
    for listing in matches.iter().skip(start).take(n) {
        match groups.last_mut() {
            Some(group) if group.category == listing.category => group.products.push(listing.product),
            _ => groups.push(PageGroup {
                category: listing.category,
                products: vec![listing.product],
            }),
        }
    }

    PageView {
        groups,
        page,
        total_pages: page_count(matches.len(), per_page),
        total_matches: matches.len(),
        per_page,
    }
}

/// Filter the catalog with the state's search term and cut the state's page.
#[must_use]
pub fn compute<'a>(catalog: &'a Catalog, state: &ViewState) -> PageView<'a> {
    let matches = filter(listings(catalog), state.search());
    paginate(&matches, state.page(), state.per_page())
}
