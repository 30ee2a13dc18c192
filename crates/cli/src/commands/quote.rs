//! Price a list of items without an interactive session.

use parts_order_cli::render::render_checkout;
use parts_order_cli::{CatalogStore, OrderConfig};
use parts_order_core::Session;
use thiserror::Error;

use super::{emit, require_catalog};

/// Problems with `--item` arguments.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QuoteError {
    #[error("item {0:?} is not in the form NAME=QUANTITY")]
    Malformed(String),
    #[error("invalid quantity in {0:?}")]
    Quantity(String),
    #[error("unknown product: {0}")]
    UnknownProduct(String),
}

/// Split `NAME=QUANTITY`. The quantity follows the last `=`.
fn parse_item(item: &str) -> Result<(&str, u32), QuoteError> {
    let (name, quantity) = item
        .rsplit_once('=')
        .ok_or_else(|| QuoteError::Malformed(item.to_owned()))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(QuoteError::Malformed(item.to_owned()));
    }
    let quantity = quantity
        .trim()
        .parse()
        .map_err(|_| QuoteError::Quantity(item.to_owned()))?;
    Ok((name, quantity))
}

/// Build a cart from `items` and print the order message and link.
///
/// Repeated names add up.
///
/// # Errors
///
/// Returns an error if the catalog cannot be loaded, an item is malformed or
/// unknown, or nothing was selected.
pub async fn run(
    config: &OrderConfig,
    store: &CatalogStore,
    items: &[String],
) -> Result<(), Box<dyn std::error::Error>> {
    let load = require_catalog(store).await?;
    let mut session = Session::default();

    for item in items {
        let (name, quantity) = parse_item(item)?;
        let product = load
            .catalog()
            .find(name)
            .ok_or_else(|| QuoteError::UnknownProduct(name.to_owned()))?;
        let total = session
            .cart()
            .quantity(product.name.as_str())
            .saturating_add(quantity);
        session.cart_mut().set_quantity(product, total);
    }

    let checkout = session.checkout(&load, &config.destination, &config.metadata)?;
    emit(&render_checkout(&checkout, &config.metadata.currency))?;
    Ok(())
}
