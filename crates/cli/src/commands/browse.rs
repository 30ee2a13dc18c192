//! Print one page of the catalog.

use parts_order_cli::render::render_page;
use parts_order_cli::{CatalogStore, OrderConfig};
use parts_order_core::{Session, ViewState};

use super::{emit, require_catalog};

/// Show page `page` (1-based) of the products matching `search`.
///
/// Pages past the end are clamped to the last page.
///
/// # Errors
///
/// Returns an error if the catalog cannot be loaded or `per_page` is zero.
pub async fn run(
    config: &OrderConfig,
    store: &CatalogStore,
    search: Option<&str>,
    page: usize,
    per_page: Option<usize>,
) -> Result<(), Box<dyn std::error::Error>> {
    let load = require_catalog(store).await?;

    let state = match per_page {
        Some(n) => ViewState::with_page_size(n)?,
        None => ViewState::new(config.items_per_page),
    };
    let mut session = Session::new(state);
    let search = search.unwrap_or_default();
    session.view_state_mut().set_search(search);
    session.view_state_mut().set_page(page.saturating_sub(1));

    let view = session.view(load.catalog());
    emit(&render_page(
        &view,
        session.cart(),
        search,
        &config.metadata.currency,
    ))?;
    Ok(())
}
