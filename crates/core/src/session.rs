//! One user's browsing session.
//!
//! A [`Session`] owns the cart and view state of a single user. Callers keep
//! one per user and pass the current catalog into each operation; sessions
//! never share state with each other, while any number of them may read the
//! same catalog.

use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};

use crate::cart::{Cart, ReconcileReport};
use crate::catalog::{Catalog, CatalogLoad, Product};
use crate::order::{
    Checkout, DestinationNumber, OrderError, OrderMetadata, OrderTotals, SelectedItems,
    compute_totals, deep_link, render_totals, selected_items,
};
use crate::types::ProductName;
use crate::view::{self, DEFAULT_PAGE_SIZE, PageView, ViewState};

/// Cart and view state of one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    cart: Cart,
    view: ViewState,
    /// Page size a new order starts with.
    #[serde(default = "default_page_size")]
    default_per_page: NonZeroUsize,
}

const fn default_page_size() -> NonZeroUsize {
    DEFAULT_PAGE_SIZE
}

impl Default for Session {
    fn default() -> Self {
        Self::new(ViewState::default())
    }
}

impl Session {
    /// A fresh session with the given view state. Its page size becomes the
    /// one every new order starts with.
    #[must_use]
    pub fn new(view: ViewState) -> Self {
        Self {
            cart: Cart::new(),
            default_per_page: view.per_page(),
            view,
        }
    }

    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    pub const fn cart_mut(&mut self) -> &mut Cart {
        &mut self.cart
    }

    #[must_use]
    pub const fn view_state(&self) -> &ViewState {
        &self.view
    }

    pub const fn view_state_mut(&mut self) -> &mut ViewState {
        &mut self.view
    }

    /// The current page.
    ///
    /// Clamps the stored page index first, so a page index left over from a
    /// larger result set never points past the end.
    pub fn view<'a>(&mut self, catalog: &'a Catalog) -> PageView<'a> {
        let matches = view::filter(view::listings(catalog), self.view.search());
        self.view
            .clamp(view::page_count(matches.len(), self.view.per_page()));
        view::paginate(&matches, self.view.page(), self.view.per_page())
    }

    /// Add one of `product`. Returns the new quantity.
    pub fn increment(&mut self, product: &Product) -> u32 {
        self.cart.increment(product)
    }

    /// Remove one of the named product. Returns the new quantity.
    pub fn decrement(&mut self, name: &str) -> u32 {
        self.cart.decrement(name)
    }

    #[must_use]
    pub fn selected(&self) -> SelectedItems {
        selected_items(&self.cart)
    }

    /// Totals of the cart against `catalog`.
    #[must_use]
    pub fn totals(&self, catalog: &Catalog) -> OrderTotals {
        compute_totals(&self.selected(), catalog)
    }

    /// Refresh the cart's cached prices from `catalog`.
    pub fn reconcile(&mut self, catalog: &Catalog) -> ReconcileReport {
        self.cart.reconcile_prices(catalog)
    }

    /// Start a new order: empty cart and a default view (no search, first
    /// page, the session's starting page size).
    pub fn new_order(&mut self) {
        self.cart.clear();
        self.view = ViewState::new(self.default_per_page);
    }

    /// Prepare the order for sending.
    ///
    /// Reconciles the cart against the loaded catalog and renders the message
    /// and link. The cart is left as is; call [`Session::complete`] once the
    /// message has actually been handed off.
    ///
    /// # Errors
    ///
    /// - [`OrderError::CatalogUnavailable`] if the catalog failed to load
    /// - [`OrderError::EmptyCart`] if nothing is selected
    /// - [`OrderError::NothingOrderable`] if every selected product has left
    ///   the catalog
    /// - [`OrderError::Overflow`] if a line cost or the total does not fit
    pub fn checkout(
        &mut self,
        load: &CatalogLoad,
        destination: &DestinationNumber,
        metadata: &OrderMetadata,
    ) -> Result<Checkout, OrderError> {
        if let Some(failure) = load.failure() {
            return Err(OrderError::CatalogUnavailable(failure.reason.clone()));
        }

        let selected = self.selected();
        if selected.is_empty() {
            return Err(OrderError::EmptyCart);
        }

        let reconcile = self.cart.reconcile_prices(load.catalog());
        let totals = compute_totals(&selected, load.catalog());
        if totals.has_overflow() {
            let names: Vec<&str> = totals.overflowed.iter().map(ProductName::as_str).collect();
            return Err(OrderError::Overflow(names.join(", ")));
        }
        if totals.lines.is_empty() {
            return Err(OrderError::NothingOrderable);
        }
        let message = render_totals(&totals, metadata);
        let link = deep_link(destination, &message);

        tracing::info!(
            lines = totals.lines.len(),
            items = totals.item_count,
            total = %totals.total_cost,
            stale = totals.stale.len(),
            "order prepared"
        );

        Ok(Checkout {
            totals,
            message,
            link,
            reconcile,
        })
    }

    /// The order was sent; start over.
    pub fn complete(&mut self) {
        self.new_order();
    }
}
