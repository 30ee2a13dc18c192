//! Order totals, order message and the WhatsApp deep-link.
//!
//! Totals are always priced from the catalog passed in, never from the
//! prices cached in the cart, so what the user sees and what gets sent is
//! the latest known price.
//!
//! # Message format
//!
//! ```text
//! {store_name}
//! {heading}
//!
//! - {name}: {quantity} × {unit price} = {subtotal}
//! - ...
//!
//! {item_count_label}: {item_count}
//! {total_label}: {total_cost} {currency}
//! ```
//!
//! Item lines follow catalog order, so the same cart and catalog always
//! produce the same bytes. [`parse_order_lines`] reads the item lines back.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cart::{Cart, ReconcileReport};
use crate::catalog::Catalog;
use crate::types::{Price, ProductName};

/// Products actually ordered and their quantities. Never holds a zero.
pub type SelectedItems = BTreeMap<ProductName, u32>;

const ITEM_PREFIX: &str = "- ";
const QUANTITY_SEPARATOR: &str = ": ";
const TIMES: &str = " × ";

/// Host of the WhatsApp click-to-chat links.
pub const DEEP_LINK_BASE: &str = "https://wa.me/";

/// What is in the cart, as far as ordering is concerned.
#[must_use]
pub fn selected_items(cart: &Cart) -> SelectedItems {
    cart.iter()
        .filter(|(_, entry)| entry.quantity > 0)
        .map(|(name, entry)| (name.clone(), entry.quantity))
        .collect()
}

/// One priced line of an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderLine {
    pub name: ProductName,
    pub quantity: u32,
    pub unit_price: Price,
    pub subtotal: Decimal,
}

/// A selected product the catalog no longer has.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StaleSelection {
    pub name: ProductName,
    pub quantity: u32,
}

/// Totals of an order against a catalog.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct OrderTotals {
    /// Priced lines, in catalog order.
    pub lines: Vec<OrderLine>,
    /// Sum of all selected quantities, stale ones included.
    pub item_count: u64,
    /// Sum of line subtotals. Stale selections are not counted.
    pub total_cost: Decimal,
    /// Selections that could not be priced, by name.
    pub stale: Vec<StaleSelection>,
    /// Selections whose cost does not fit in a `Decimal`. They are left out
    /// of `lines` and `total_cost`.
    pub overflowed: Vec<ProductName>,
}

impl OrderTotals {
    /// Whether any selection could not be priced.
    #[must_use]
    pub fn has_stale(&self) -> bool {
        !self.stale.is_empty()
    }

    /// Whether any line or the total overflowed.
    #[must_use]
    pub fn has_overflow(&self) -> bool {
        !self.overflowed.is_empty()
    }
}

/// Price the selection against the current catalog.
#[must_use]
pub fn compute_totals(selected: &SelectedItems, catalog: &Catalog) -> OrderTotals {
    let mut totals = OrderTotals::default();
    let mut priced = Vec::with_capacity(selected.len());

    for (name, &quantity) in selected {
        if quantity == 0 {
            continue;
        }
        totals.item_count += u64::from(quantity);

        match (catalog.price_of(name.as_str()), catalog.position(name.as_str())) {
            (Some(unit_price), Some(position)) => {
                let Some((subtotal, total)) = unit_price
                    .times(quantity)
                    .and_then(|sub| Some((sub, totals.total_cost.checked_add(sub)?)))
                else {
                    tracing::warn!(name = %name, quantity, "order line cost overflowed");
                    totals.overflowed.push(name.clone());
                    continue;
                };
                totals.total_cost = total;
                priced.push((
                    position,
                    OrderLine {
                        name: name.clone(),
                        quantity,
                        unit_price,
                        subtotal,
                    },
                ));
            }
            _ => totals.stale.push(StaleSelection {
                name: name.clone(),
                quantity,
            }),
        }
    }

    priced.sort_by_key(|(position, _)| *position);
    totals.lines = priced.into_iter().map(|(_, line)| line).collect();
    totals.total_cost = totals.total_cost.normalize();
    totals
}

/// Fixed text around the item lines of an order message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderMetadata {
    pub store_name: String,
    pub heading: String,
    pub item_count_label: String,
    pub total_label: String,
    pub currency: String,
}

impl Default for OrderMetadata {
    fn default() -> Self {
        Self {
            store_name: "شركة المهندس لقطع غيار السيارات".to_owned(),
            heading: "🧾 طلب جديد:".to_owned(),
            item_count_label: "📦 عدد الأصناف".to_owned(),
            total_label: "✅ الإجمالي".to_owned(),
            currency: "جنيه".to_owned(),
        }
    }
}

/// Render the order message.
///
/// Deterministic: the same selection, catalog and metadata always give the
/// same string.
#[must_use]
pub fn render_message(
    selected: &SelectedItems,
    catalog: &Catalog,
    metadata: &OrderMetadata,
) -> String {
    render_totals(&compute_totals(selected, catalog), metadata)
}

/// Render the order message from already computed totals.
#[must_use]
pub fn render_totals(totals: &OrderTotals, metadata: &OrderMetadata) -> String {
    let mut message = String::new();
    let _ = writeln!(message, "{}", metadata.store_name);
    let _ = writeln!(message, "{}", metadata.heading);
    message.push('\n');

    for line in &totals.lines {
        let _ = writeln!(
            message,
            "{ITEM_PREFIX}{}{QUANTITY_SEPARATOR}{}{TIMES}{} = {}",
            line.name, line.quantity, line.unit_price, line.subtotal
        );
    }

    message.push('\n');
    let _ = writeln!(
        message,
        "{}: {}",
        metadata.item_count_label, totals.item_count
    );
    let _ = write!(
        message,
        "{}: {} {}",
        metadata.total_label, totals.total_cost, metadata.currency
    );
    message
}

/// Read the item lines of a rendered message back into name and quantity.
///
/// Lines that do not look like item lines are skipped. Names may themselves
/// contain `": "`; the quantity is taken after the last one.
#[must_use]
pub fn parse_order_lines(message: &str) -> BTreeMap<String, u32> {
    message
        .lines()
        .filter_map(|line| {
            let rest = line.strip_prefix(ITEM_PREFIX)?;
            let (name, amounts) = rest.rsplit_once(QUANTITY_SEPARATOR)?;
            let (quantity, _) = amounts.split_once(TIMES)?;
            let quantity = quantity.trim().parse().ok()?;
            Some((name.to_owned(), quantity))
        })
        .collect()
}

/// Errors from parsing a [`DestinationNumber`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DestinationError {
    #[error("destination number cannot be empty")]
    Empty,
    #[error("destination number may only contain digits: {0}")]
    InvalidCharacter(String),
}

/// A WhatsApp phone number in international format, digits only.
///
/// ```
/// use parts_order_core::DestinationNumber;
///
/// let number = DestinationNumber::parse("+20 100-123-4567").unwrap();
/// assert_eq!(number.as_str(), "201001234567");
/// assert!(DestinationNumber::parse("call me").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DestinationNumber(String);

impl DestinationNumber {
    /// Parse a phone number.
    ///
    /// A leading `+`, spaces, dashes and parentheses are dropped; anything
    /// else that is not a digit is rejected.
    ///
    /// # Errors
    ///
    /// Returns an error if no digits remain or a character is not allowed.
    pub fn parse(s: &str) -> Result<Self, DestinationError> {
        let trimmed = s.trim();
        let body = trimmed.strip_prefix('+').unwrap_or(trimmed);

        let mut digits = String::with_capacity(body.len());
        for c in body.chars() {
            match c {
                '0'..='9' => digits.push(c),
                ' ' | '-' | '(' | ')' => {}
                _ => return Err(DestinationError::InvalidCharacter(trimmed.to_owned())),
            }
        }

        if digits.is_empty() {
            return Err(DestinationError::Empty);
        }
        Ok(Self(digits))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DestinationNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for DestinationNumber {
    type Error = DestinationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<DestinationNumber> for String {
    fn from(number: DestinationNumber) -> Self {
        number.0
    }
}

/// Build the click-to-chat link that opens WhatsApp with `message` typed in.
#[must_use]
pub fn deep_link(destination: &DestinationNumber, message: &str) -> String {
    format!(
        "{DEEP_LINK_BASE}{}?text={}",
        destination.as_str(),
        urlencoding::encode(message)
    )
}

/// Reasons checkout cannot go ahead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderError {
    #[error("the catalog failed to load: {0}")]
    CatalogUnavailable(String),
    #[error("no products selected")]
    EmptyCart,
    #[error("nothing in the cart is still in the catalog")]
    NothingOrderable,
    #[error("order total is too large: {0}")]
    Overflow(String),
}

/// Everything needed to send an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checkout {
    pub totals: OrderTotals,
    pub message: String,
    pub link: String,
    /// Price changes and missing products found while reconciling the cart.
    pub reconcile: ReconcileReport,
}
