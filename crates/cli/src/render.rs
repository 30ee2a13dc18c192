//! Plain-text rendering for the terminal.
//!
//! Everything here returns a `String`; writing it out is left to the caller.

use std::fmt::Write as _;

use parts_order_core::{
    Cart, Checkout, LoadStatus, NormalizeReport, OrderTotals, PageView, ReconcileReport,
    RowIssueKind,
};

/// Render one page of products.
///
/// Products are numbered from 1 within the page; the shell accepts these
/// numbers in place of names. Quantities already in `cart` are shown next to
/// each product.
#[must_use]
pub fn render_page(page: &PageView<'_>, cart: &Cart, search: &str, currency: &str) -> String {
    let mut out = String::new();

    if page.is_empty() {
        if search.trim().is_empty() {
            out.push_str("The catalog is empty.\n");
        } else {
            let _ = writeln!(out, "No products match \"{}\".", search.trim());
        }
        return out;
    }

    let mut number = 1;
    for group in &page.groups {
        let _ = writeln!(out, "== {} ==", group.category);
        for product in &group.products {
            let _ = write!(
                out,
                "{number:>3}. {} ({}) - {} {currency}",
                product.name, product.origin, product.price
            );
            let quantity = cart.quantity(product.name.as_str());
            if quantity > 0 {
                let _ = write!(out, "  [x{quantity}]");
            }
            out.push('\n');
            number += 1;
        }
    }

    let _ = write!(
        out,
        "Page {} of {} ({} items)",
        page.page + 1,
        page.total_pages,
        page.total_matches
    );
    if !search.trim().is_empty() {
        let _ = write!(out, " matching \"{}\"", search.trim());
    }
    out.push('\n');
    out
}

/// Render the cart with line subtotals and the running total.
#[must_use]
pub fn render_cart(totals: &OrderTotals, currency: &str) -> String {
    let mut out = String::new();

    if totals.lines.is_empty() && totals.stale.is_empty() && !totals.has_overflow() {
        out.push_str("Cart is empty.\n");
        return out;
    }

    for line in &totals.lines {
        let _ = writeln!(
            out,
            "  {}: {} × {} = {} {currency}",
            line.name, line.quantity, line.unit_price, line.subtotal
        );
    }
    for stale in &totals.stale {
        let _ = writeln!(
            out,
            "  {}: {} (no longer in the catalog, not counted)",
            stale.name, stale.quantity
        );
    }
    for name in &totals.overflowed {
        let _ = writeln!(out, "  {name}: cost too large to add up, not counted");
    }
    let _ = writeln!(
        out,
        "Items: {}  Total: {} {currency}",
        totals.item_count, totals.total_cost
    );
    out
}

/// Describe price changes and vanished products, or `None` if there were none.
#[must_use]
pub fn render_reconcile(report: &ReconcileReport, currency: &str) -> Option<String> {
    if report.is_clean() {
        return None;
    }

    let mut out = String::new();
    for change in &report.repriced {
        let _ = writeln!(
            out,
            "Price changed: {} {} → {} {currency}",
            change.name, change.old, change.new
        );
    }
    for name in &report.stale {
        let _ = writeln!(out, "No longer available: {name}");
    }
    Some(out)
}

/// Render a prepared order: notices, the message, and the link to send it.
#[must_use]
pub fn render_checkout(checkout: &Checkout, currency: &str) -> String {
    let mut out = String::new();
    if let Some(notice) = render_reconcile(&checkout.reconcile, currency) {
        out.push_str(&notice);
        out.push('\n');
    }
    out.push_str(&checkout.message);
    out.push_str("\n\n");
    let _ = writeln!(out, "Send: {}", checkout.link);
    out
}

/// Summarize a normalization pass, one line per row issue.
#[must_use]
pub fn render_report(report: &NormalizeReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} rows, {} products, {} separators, {} dropped",
        report.rows,
        report.products,
        report.separators,
        report.dropped()
    );
    for issue in &report.issues {
        let what = match &issue.kind {
            RowIssueKind::MissingName => "missing name, dropped".to_owned(),
            RowIssueKind::MissingPrice => "missing price, priced at 0".to_owned(),
            RowIssueKind::InvalidPrice(raw) => format!("invalid price {raw:?}, priced at 0"),
            RowIssueKind::NegativePrice(raw) => format!("negative price {raw}, priced at 0"),
            RowIssueKind::DuplicateName(name) => format!("duplicate of {name:?}, dropped"),
        };
        // Rows are shown one-based, matching sheet row numbers after the header
        let _ = writeln!(out, "  row {}: {what}", issue.row + 1);
    }
    out
}

/// Render the status line of a catalog load.
#[must_use]
pub fn render_status(status: &LoadStatus) -> String {
    match status {
        LoadStatus::Loaded(report) => render_report(report),
        LoadStatus::Failed(failure) => {
            format!("Catalog unavailable: {}\n", failure.reason)
        }
    }
}
