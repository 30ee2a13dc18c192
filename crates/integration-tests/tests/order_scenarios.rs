//! End-to-end ordering flows through the core.
//!
//! Each test drives a [`Session`] the way a front end would: load a catalog,
//! browse, fill the cart, then check out.

#![allow(clippy::unwrap_used)]

use parts_order_core::{
    CatalogLoad, CategoryRules, DestinationNumber, LoadFailure, OrderError, OrderMetadata,
    RawRecord, Session, ViewState, parse_order_lines, render_message,
};
use parts_order_integration_tests::{arabic_sheet, numbered_sheet};

fn load_json(rows: &serde_json::Value) -> CatalogLoad {
    let records: Vec<RawRecord> = serde_json::from_value(rows.clone()).unwrap();
    CatalogLoad::from_records(records, &CategoryRules::default())
}

fn filters() -> CatalogLoad {
    CatalogLoad::from_records(
        vec![
            RawRecord::product("Filter A", "Korea", 100),
            RawRecord::product("Filter B", "China", 150),
        ],
        &CategoryRules::default(),
    )
}

fn destination() -> DestinationNumber {
    DestinationNumber::parse("+20 100 123 4567").unwrap()
}

fn english() -> OrderMetadata {
    OrderMetadata {
        store_name: "Parts Co".to_owned(),
        heading: "New order:".to_owned(),
        item_count_label: "Items".to_owned(),
        total_label: "Total".to_owned(),
        currency: "EGP".to_owned(),
    }
}

#[test]
fn test_two_filters_total_350() {
    let load = filters();
    let mut session = Session::default();
    let a = load.catalog().find("Filter A").unwrap().clone();
    let b = load.catalog().find("Filter B").unwrap().clone();

    session.increment(&a);
    session.increment(&a);
    session.increment(&b);

    let selected = session.selected();
    assert_eq!(selected.len(), 2);
    assert_eq!(selected.get("Filter A"), Some(&2));
    assert_eq!(selected.get("Filter B"), Some(&1));

    let totals = session.totals(load.catalog());
    assert_eq!(totals.item_count, 3);
    assert_eq!(totals.total_cost.to_string(), "350");
}

#[test]
fn test_25_items_paginate_into_3_pages() {
    let load = load_json(&numbered_sheet(25));
    let mut session = Session::new(ViewState::with_page_size(10).unwrap());

    let first = session.view(load.catalog());
    assert_eq!(first.total_pages, 3);
    assert_eq!(first.len(), 10);
    assert_eq!(first.products().next().unwrap().name.as_str(), "Part 01");

    session.view_state_mut().last_page(first.total_pages);
    let last = session.view(load.catalog());
    assert_eq!(last.page, 2);
    assert_eq!(last.len(), 5);
    let names: Vec<_> = last.products().map(|p| p.name.to_string()).collect();
    assert_eq!(names, ["Part 21", "Part 22", "Part 23", "Part 24", "Part 25"]);
}

#[test]
fn test_every_match_appears_once_across_pages() {
    let load = load_json(&numbered_sheet(23));
    for per_page in 1..=24 {
        let mut session = Session::new(ViewState::with_page_size(per_page).unwrap());
        session.view_state_mut().set_search("part 1");

        let mut seen = Vec::new();
        let total_pages = session.view(load.catalog()).total_pages;
        for page in 0..total_pages {
            session.view_state_mut().set_page(page);
            seen.extend(session.view(load.catalog()).products().map(|p| p.name.to_string()));
        }

        let expected: Vec<String> = (10..=19).map(|i| format!("Part {i}")).collect();
        assert_eq!(seen, expected, "per_page = {per_page}");
    }
}

#[test]
fn test_reprice_on_reload_gives_240() {
    let old = filters();
    let mut session = Session::default();
    let a = old.catalog().find("Filter A").unwrap().clone();
    session.increment(&a);
    session.increment(&a);
    assert_eq!(session.cart().get("Filter A").unwrap().price.to_string(), "100");

    let new = CatalogLoad::from_records(
        vec![
            RawRecord::product("Filter A", "Korea", 120),
            RawRecord::product("Filter B", "China", 150),
        ],
        &CategoryRules::default(),
    );

    let totals = session.totals(new.catalog());
    assert_eq!(totals.total_cost.to_string(), "240");

    let report = session.reconcile(new.catalog());
    assert_eq!(report.repriced.len(), 1);
    assert_eq!(report.repriced[0].old.to_string(), "100");
    assert_eq!(report.repriced[0].new.to_string(), "120");
    assert_eq!(session.cart().get("Filter A").unwrap().price.to_string(), "120");
}

#[test]
fn test_removed_product_is_stale_not_fatal() {
    let old = filters();
    let mut session = Session::default();
    session.increment(&old.catalog().find("Filter A").unwrap().clone());
    session.increment(&old.catalog().find("Filter B").unwrap().clone());

    let new = CatalogLoad::from_records(
        vec![RawRecord::product("Filter A", "Korea", 100)],
        &CategoryRules::default(),
    );

    let checkout = session
        .checkout(&new, &destination(), &english())
        .unwrap();
    assert_eq!(checkout.totals.total_cost.to_string(), "100");
    assert_eq!(checkout.totals.item_count, 2);
    assert!(checkout.totals.has_stale());
    assert_eq!(checkout.reconcile.stale.len(), 1);
    assert!(!checkout.message.contains("Filter B"));
    // Still in the cart until the user removes it
    assert_eq!(session.cart().quantity("Filter B"), 1);
}

#[test]
fn test_checkout_message_and_link() {
    let load = filters();
    let mut session = Session::default();
    let a = load.catalog().find("Filter A").unwrap().clone();
    let b = load.catalog().find("Filter B").unwrap().clone();
    session.increment(&b);
    session.increment(&a);
    session.increment(&a);

    let checkout = session.checkout(&load, &destination(), &english()).unwrap();
    assert_eq!(
        checkout.message,
        "Parts Co\nNew order:\n\n- Filter A: 2 × 100 = 200\n- Filter B: 1 × 150 = 150\n\nItems: 3\nTotal: 350 EGP"
    );
    assert!(checkout.link.starts_with("https://wa.me/201001234567?text=Parts%20Co%0ANew%20order%3A"));

    let parsed = parse_order_lines(&checkout.message);
    assert_eq!(parsed.get("Filter A"), Some(&2));
    assert_eq!(parsed.get("Filter B"), Some(&1));

    // Checkout leaves the cart alone; completing starts over
    assert_eq!(session.cart().len(), 2);
    session.complete();
    assert!(session.cart().is_empty());
    assert_eq!(session.view_state().search(), "");
}

#[test]
fn test_render_parse_round_trip_arabic_sheet() {
    let load = load_json(&arabic_sheet());
    let mut session = Session::default();
    for product in load.catalog().products().cloned().collect::<Vec<_>>() {
        session.increment(&product);
        session.increment(&product);
    }

    let message = render_message(&session.selected(), load.catalog(), &OrderMetadata::default());
    let parsed = parse_order_lines(&message);

    let expected: std::collections::BTreeMap<String, u32> = session
        .selected()
        .into_iter()
        .map(|(name, quantity)| (name.into_inner(), quantity))
        .collect();
    assert_eq!(parsed, expected);
    assert!(message.ends_with("✅ الإجمالي: 4040 جنيه"));
}

#[test]
fn test_arabic_sheet_categories_and_prices() {
    let load = load_json(&arabic_sheet());
    let catalog = load.catalog();

    let names: Vec<_> = catalog.categories().iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["المنتجات", "الحساسات"]);
    assert_eq!(catalog.price_of("بوبينه كيا سيراتو").unwrap().to_string(), "420");
    assert_eq!(catalog.price_of("حساس كرنك تويوتا").unwrap().to_string(), "1250");
    assert_eq!(catalog.price_of("حساس كامة").unwrap().to_string(), "0");

    let report = load.report().unwrap();
    assert_eq!(report.rows, 5);
    assert_eq!(report.products, 4);
    assert_eq!(report.separators, 1);
    assert_eq!(report.issues.len(), 1);
}

#[test]
fn test_search_by_origin_resets_page() {
    let load = load_json(&arabic_sheet());
    let mut session = Session::new(ViewState::with_page_size(1).unwrap());
    session.view_state_mut().set_page(3);
    assert_eq!(session.view(load.catalog()).page, 3);

    session.view_state_mut().set_search("كوريا");
    let view = session.view(load.catalog());
    assert_eq!(view.page, 0);
    assert_eq!(view.total_matches, 2);
    assert_eq!(view.total_pages, 2);
}

#[test]
fn test_failed_load_refuses_checkout() {
    let load = CatalogLoad::failed(LoadFailure::new("connection refused"));
    let mut session = Session::default();

    let view = session.view(load.catalog());
    assert!(view.is_empty());
    assert_eq!(view.total_pages, 1);

    assert_eq!(
        session.checkout(&load, &destination(), &english()),
        Err(OrderError::CatalogUnavailable("connection refused".to_owned()))
    );
}

#[test]
fn test_empty_cart_refuses_checkout() {
    let load = filters();
    let mut session = Session::default();
    let a = load.catalog().find("Filter A").unwrap().clone();
    session.increment(&a);
    session.decrement("Filter A");
    session.decrement("Filter A");

    assert_eq!(session.cart().quantity("Filter A"), 0);
    assert_eq!(
        session.checkout(&load, &destination(), &english()),
        Err(OrderError::EmptyCart)
    );
}

#[test]
fn test_multiline_sheet_name_round_trips_as_one_line() {
    let load = load_json(&serde_json::json!([
        {"name": "Coil\nHyundai", "origin": "Korea", "price": 350},
        {"name": "Filter A", "origin": "Korea", "price": 100}
    ]));
    let coil = load.catalog().find("Coil Hyundai").unwrap().clone();
    let mut session = Session::default();
    session.increment(&coil);

    let checkout = session.checkout(&load, &destination(), &english()).unwrap();
    assert!(checkout.message.contains("- Coil Hyundai: 1 × 350 = 350"));

    let parsed = parse_order_lines(&checkout.message);
    assert_eq!(parsed.len(), 1);
    assert_eq!(parsed.get("Coil Hyundai"), Some(&1));
}

#[test]
fn test_all_stale_cart_refuses_checkout() {
    let mut session = Session::default();
    session.increment(&filters().catalog().find("Filter B").unwrap().clone());

    let without_b = CatalogLoad::from_records(
        vec![RawRecord::product("Filter A", "Korea", 100)],
        &CategoryRules::default(),
    );
    assert_eq!(
        session.checkout(&without_b, &destination(), &english()),
        Err(OrderError::NothingOrderable)
    );
}
