//! Parts Order Core - Catalog, cart and order message logic.
//!
//! This crate is the part of Parts Order that has real invariants:
//! - `catalog` - Normalize raw spreadsheet rows into categorized products
//! - `view` - Search filter and stable pagination over the catalog
//! - `cart` - Quantity cart keyed by product name, with price reconciliation
//! - `order` - Totals, order message rendering and the WhatsApp deep-link
//! - `session` - The caller-owned cart + view state of one user session
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients, no rendering. Loading the spreadsheet and presenting pages is the
//! job of the `cli` crate, which calls into this one.
//!
//! # Example
//!
//! ```
//! use parts_order_core::{CatalogLoad, OrderMetadata, RawRecord, Session};
//!
//! let load = CatalogLoad::from_records(
//!     vec![
//!         RawRecord::product("Filter A", "Korea", 100),
//!         RawRecord::product("Filter B", "China", 150),
//!     ],
//!     &Default::default(),
//! );
//!
//! let mut session = Session::default();
//! let filter_a = load.catalog().find("Filter A").unwrap().clone();
//! session.cart_mut().increment(&filter_a);
//! session.cart_mut().increment(&filter_a);
//!
//! let totals = session.totals(load.catalog());
//! assert_eq!(totals.item_count, 2);
//! assert_eq!(totals.total_cost.to_string(), "200");
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod order;
pub mod session;
pub mod types;
pub mod view;

pub use cart::{Cart, CartEntry, ReconcileReport, Repriced};
pub use catalog::{
    Catalog, CatalogLoad, Category, CategoryRule, CategoryRules, LoadFailure, LoadStatus,
    NormalizeReport, Product, RawRecord, RawValue, RowIssue, RowIssueKind,
};
pub use order::{
    Checkout, DEEP_LINK_BASE, DestinationError, DestinationNumber, OrderError, OrderLine,
    OrderMetadata, OrderTotals, SelectedItems, StaleSelection, compute_totals, deep_link,
    parse_order_lines, render_message, render_totals, selected_items,
};
pub use session::Session;
pub use types::*;
pub use view::{
    DEFAULT_PAGE_SIZE, Listing, PAGE_SIZE_OPTIONS, PageGroup, PageView, ViewError, ViewState,
    filter, listings, page_count, paginate,
};
