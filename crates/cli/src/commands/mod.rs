//! Subcommand implementations.

pub mod browse;
pub mod check;
pub mod quote;
pub mod shell;

use std::io::{self, Write};
use std::sync::Arc;

use parts_order_cli::CatalogStore;
use parts_order_cli::render::render_status;
use parts_order_core::CatalogLoad;

/// Write command output to stdout.
pub fn emit(text: &str) -> io::Result<()> {
    let mut out = io::stdout().lock();
    out.write_all(text.as_bytes())?;
    out.flush()
}

/// The current catalog, or an error if it could not be loaded.
///
/// # Errors
///
/// Returns the load failure as an error.
pub async fn require_catalog(
    store: &CatalogStore,
) -> Result<Arc<CatalogLoad>, Box<dyn std::error::Error>> {
    let load = store.current().await;
    if let Some(failure) = load.failure() {
        emit(&render_status(load.status()))?;
        return Err(failure.clone().into());
    }
    Ok(load)
}
