//! Load the catalog and report what the normalizer found.

use std::fmt::Write as _;

use parts_order_cli::CatalogStore;
use parts_order_cli::render::render_status;

use super::{emit, require_catalog};

/// Print the load report and a per-category product count.
///
/// # Errors
///
/// Returns an error if the catalog cannot be loaded.
pub async fn run(store: &CatalogStore) -> Result<(), Box<dyn std::error::Error>> {
    let load = require_catalog(store).await?;

    let mut out = format!("Source: {}\n", store.source());
    out.push_str(&render_status(load.status()));
    for category in load.catalog().categories() {
        let _ = writeln!(out, "{}: {} products", category.name, category.products.len());
    }

    emit(&out)?;
    Ok(())
}
