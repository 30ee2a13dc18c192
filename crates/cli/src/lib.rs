//! Parts Order CLI - Catalog loading and terminal presentation.
//!
//! This crate holds everything around the core that touches the outside
//! world:
//! - [`config`] - Settings from environment variables
//! - [`loader`] - Fetch raw catalog rows from a file or HTTP endpoint
//! - [`store`] - Shared, TTL-cached catalog snapshot
//! - [`render`] - Plain-text rendering of pages, carts and orders
//!
//! The `parts-order` binary wires these into its subcommands.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod loader;
pub mod render;
pub mod store;

pub use config::{ConfigError, OrderConfig};
pub use loader::{CatalogLoader, CatalogSource, LoadError, SourceError};
pub use store::CatalogStore;
