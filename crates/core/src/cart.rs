//! The quantity cart.
//!
//! Entries are keyed by product name and hold a quantity plus the price seen
//! when the product was last added or reconciled. The cart is kept sparse: an
//! entry whose quantity reaches zero is removed on the spot.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, Product};
use crate::types::{Price, ProductName};

/// Quantity and cached unit price of one product in the cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartEntry {
    /// Always at least 1 while the entry is in the cart.
    pub quantity: u32,
    /// Price snapshot; refreshed by [`Cart::reconcile_prices`].
    pub price: Price,
}

/// A price change picked up during reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repriced {
    pub name: ProductName,
    pub old: Price,
    pub new: Price,
}

/// Outcome of [`Cart::reconcile_prices`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Entries whose cached price changed.
    pub repriced: Vec<Repriced>,
    /// Entries whose product is no longer in the catalog. They stay in the
    /// cart with their last known price.
    pub stale: Vec<ProductName>,
}

impl ReconcileReport {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.repriced.is_empty() && self.stale.is_empty()
    }
}

/// Product name to quantity, for one session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    entries: HashMap<ProductName, CartEntry>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one of `product`. Returns the new quantity.
    pub fn increment(&mut self, product: &Product) -> u32 {
        let entry = self
            .entries
            .entry(product.name.clone())
            .or_insert(CartEntry {
                quantity: 0,
                price: product.price,
            });
        entry.quantity = entry.quantity.saturating_add(1);
        entry.quantity
    }

    /// Remove one of `name`. Returns the new quantity.
    ///
    /// Does nothing for a product that is not in the cart, and drops the
    /// entry when the quantity reaches zero.
    pub fn decrement(&mut self, name: &str) -> u32 {
        let Some(entry) = self.entries.get_mut(name) else {
            return 0;
        };
        entry.quantity = entry.quantity.saturating_sub(1);
        let quantity = entry.quantity;
        if quantity == 0 {
            self.entries.remove(name);
        }
        quantity
    }

    /// Set the quantity of `product` outright. Zero removes it.
    pub fn set_quantity(&mut self, product: &Product, quantity: u32) {
        match self.entries.entry(product.name.clone()) {
            Entry::Occupied(occupied) if quantity == 0 => {
                occupied.remove();
            }
            Entry::Occupied(mut occupied) => {
                occupied.get_mut().quantity = quantity;
            }
            Entry::Vacant(vacant) if quantity > 0 => {
                vacant.insert(CartEntry {
                    quantity,
                    price: product.price,
                });
            }
            Entry::Vacant(_) => {}
        }
    }

    /// Quantity of `name`, zero when absent.
    #[must_use]
    pub fn quantity(&self, name: &str) -> u32 {
        self.entries.get(name).map_or(0, |e| e.quantity)
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&CartEntry> {
        self.entries.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ProductName, &CartEntry)> {
        self.entries.iter()
    }

    /// Number of distinct products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove everything.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Refresh cached prices from `catalog`.
    ///
    /// Entries for products the catalog no longer has keep their last known
    /// price and are listed as stale; they are never removed here.
    pub fn reconcile_prices(&mut self, catalog: &Catalog) -> ReconcileReport {
        let mut report = ReconcileReport::default();

        for (name, entry) in &mut self.entries {
            match catalog.price_of(name.as_str()) {
                Some(current) if current != entry.price => {
                    report.repriced.push(Repriced {
                        name: name.clone(),
                        old: entry.price,
                        new: current,
                    });
                    entry.price = current;
                }
                Some(_) => {}
                None => report.stale.push(name.clone()),
            }
        }

        // HashMap order is arbitrary; keep reports stable
        report.repriced.sort_by(|a, b| a.name.cmp(&b.name));
        report.stale.sort();

        if !report.is_clean() {
            tracing::debug!(
                repriced = report.repriced.len(),
                stale = report.stale.len(),
                "cart reconciled against catalog"
            );
        }

        report
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn product(name: &str, price: u32) -> Product {
        Product::new(
            ProductName::parse(name).unwrap(),
            "Korea".to_owned(),
            Price::from_units(price),
        )
    }

    #[test]
    fn test_increment_creates_entry() {
        let mut cart = Cart::new();
        let a = product("Filter A", 100);
        assert_eq!(cart.increment(&a), 1);
        assert_eq!(cart.increment(&a), 2);
        assert_eq!(cart.get("Filter A").unwrap().price, Price::from_units(100));
    }

    #[test]
    fn test_decrement_absent_is_noop() {
        let mut cart = Cart::new();
        assert_eq!(cart.decrement("Filter A"), 0);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_decrement_to_zero_removes_entry() {
        let mut cart = Cart::new();
        let a = product("Filter A", 100);
        cart.increment(&a);
        assert_eq!(cart.decrement("Filter A"), 0);
        assert!(cart.get("Filter A").is_none());
        assert_eq!(cart.decrement("Filter A"), 0);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_quantity_is_floored_running_sum() {
        // +1 / -1 sequences, checked against max(0, ...) applied per step
        let sequences: [&[i8]; 5] = [
            &[1, 1, -1],
            &[-1, -1, 1],
            &[1, -1, -1, 1, 1],
            &[-1, 1, 1, 1, -1, -1, -1, -1, 1],
            &[],
        ];
        let a = product("Filter A", 100);

        for steps in sequences {
            let mut cart = Cart::new();
            let mut expected: u32 = 0;
            for step in steps {
                if *step > 0 {
                    cart.increment(&a);
                    expected += 1;
                } else {
                    cart.decrement("Filter A");
                    expected = expected.saturating_sub(1);
                }
                assert_eq!(cart.quantity("Filter A"), expected, "{steps:?}");
            }
            assert_eq!(cart.get("Filter A").is_some(), expected > 0);
        }
    }

    #[test]
    fn test_set_quantity() {
        let mut cart = Cart::new();
        let a = product("Filter A", 100);

        cart.set_quantity(&a, 0);
        assert!(cart.is_empty());

        cart.set_quantity(&a, 5);
        assert_eq!(cart.quantity("Filter A"), 5);

        cart.set_quantity(&a, 2);
        assert_eq!(cart.quantity("Filter A"), 2);

        cart.set_quantity(&a, 0);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_clear() {
        let mut cart = Cart::new();
        cart.increment(&product("Filter A", 100));
        cart.increment(&product("Filter B", 150));
        assert_eq!(cart.len(), 2);
        cart.clear();
        assert!(cart.is_empty());
    }

    #[test]
    fn test_reconcile_updates_prices_and_keeps_stale() {
        let mut cart = Cart::new();
        cart.increment(&product("Filter A", 100));
        cart.increment(&product("Filter A", 100));
        cart.increment(&product("Filter B", 150));
        cart.increment(&product("Filter C", 70));

        let reloaded = Catalog::flat("All", vec![product("Filter A", 120), product("Filter C", 70)]);
        let report = cart.reconcile_prices(&reloaded);

        assert_eq!(
            report.repriced,
            vec![Repriced {
                name: ProductName::parse("Filter A").unwrap(),
                old: Price::from_units(100),
                new: Price::from_units(120),
            }]
        );
        assert_eq!(report.stale, vec![ProductName::parse("Filter B").unwrap()]);

        assert_eq!(cart.get("Filter A").unwrap().price, Price::from_units(120));
        assert_eq!(cart.get("Filter A").unwrap().quantity, 2);
        assert_eq!(cart.get("Filter B").unwrap().price, Price::from_units(150));
        assert_eq!(cart.len(), 3);
    }

    #[test]
    fn test_reconcile_clean() {
        let mut cart = Cart::new();
        let a = product("Filter A", 100);
        cart.increment(&a);
        let report = cart.reconcile_prices(&Catalog::flat("All", vec![a]));
        assert!(report.is_clean());
    }
}
