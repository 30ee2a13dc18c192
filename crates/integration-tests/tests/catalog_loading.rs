//! Loader and store tests against real files and a mocked HTTP sheet.

#![allow(clippy::unwrap_used)]

use std::path::PathBuf;
use std::time::Duration;

use parts_order_cli::loader::CatalogLoader;
use parts_order_cli::{CatalogSource, CatalogStore, LoadError};
use parts_order_core::{CategoryRules, LoadStatus};
use parts_order_integration_tests::{
    SHEET_PATH, TempCatalog, arabic_sheet, numbered_sheet, sheet_source,
};
use secrecy::SecretString;
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn store(source: CatalogSource, ttl: Duration) -> CatalogStore {
    CatalogStore::new(
        CatalogLoader::new(source, None),
        CategoryRules::default(),
        ttl,
    )
}

#[tokio::test]
async fn test_file_catalog_loads() {
    let file = TempCatalog::new(&arabic_sheet());
    let store = store(file.source(), Duration::from_secs(300));

    let load = store.current().await;
    assert!(load.is_available());
    assert_eq!(load.catalog().len(), 4);
    assert_eq!(load.catalog().categories().len(), 2);
}

#[tokio::test]
async fn test_missing_file_is_a_failure_not_an_empty_catalog() {
    let store = store(
        CatalogSource::File(PathBuf::from("/nonexistent/parts-order/catalog.json")),
        Duration::from_secs(300),
    );

    let load = store.current().await;
    assert!(!load.is_available());
    assert!(load.catalog().is_empty());
    assert!(load.failure().unwrap().reason.contains("cannot read"));
}

#[tokio::test]
async fn test_empty_sheet_is_loaded_not_failed() {
    let file = TempCatalog::new(&json!([]));
    let load = store(file.source(), Duration::from_secs(300)).current().await;

    assert!(load.is_available());
    assert!(load.catalog().is_empty());
    assert!(matches!(load.status(), LoadStatus::Loaded(report) if report.rows == 0));
}

#[tokio::test]
async fn test_not_an_array_is_a_failure() {
    let file = TempCatalog::new(&json!({"error": "quota exceeded"}));
    let loader = CatalogLoader::new(file.source(), None);

    assert!(matches!(loader.fetch().await, Err(LoadError::Shape(_))));
    let load = store(file.source(), Duration::from_secs(300)).current().await;
    assert!(!load.is_available());
}

#[tokio::test]
async fn test_snapshot_is_cached_until_refresh() {
    let file = TempCatalog::new(&numbered_sheet(3));
    let store = store(file.source(), Duration::from_secs(300));

    let first = store.current().await;
    file.write(&numbered_sheet(5));

    let cached = store.current().await;
    assert!(std::sync::Arc::ptr_eq(&first, &cached));
    assert_eq!(cached.catalog().len(), 3);

    let refreshed = store.refresh().await;
    assert_eq!(refreshed.catalog().len(), 5);
    // Readers holding the old snapshot still see it unchanged
    assert_eq!(first.catalog().len(), 3);
}

#[tokio::test]
async fn test_failed_load_is_retried() {
    let file = TempCatalog::new(&json!("not rows"));
    let store = store(file.source(), Duration::from_secs(300));

    assert!(!store.current().await.is_available());

    file.write(&numbered_sheet(2));
    let load = store.current().await;
    assert!(load.is_available());
    assert_eq!(load.catalog().len(), 2);
}

async fn mount_sheet(server: &MockServer, status: u16, body: &serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(SHEET_PATH))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_http_catalog_with_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(SHEET_PATH))
        .and(header("authorization", "Bearer kJ8#mQ2$vX9!pL4@"))
        .respond_with(ResponseTemplate::new(200).set_body_json(arabic_sheet()))
        .expect(1)
        .mount(&server)
        .await;

    let token = SecretString::from("kJ8#mQ2$vX9!pL4@".to_owned());
    let loader = CatalogLoader::new(sheet_source(&server), Some(token));

    let records = loader.fetch().await.unwrap();
    assert_eq!(records.len(), 5);

    server.verify().await;
}

#[tokio::test]
async fn test_http_without_token_sends_no_authorization() {
    let server = MockServer::start().await;
    mount_sheet(&server, 200, &numbered_sheet(2)).await;

    let loader = CatalogLoader::new(sheet_source(&server), None);
    assert_eq!(loader.fetch().await.unwrap().len(), 2);

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(!requests.first().unwrap().headers.contains_key("authorization"));
}

#[tokio::test]
async fn test_http_values_range() {
    let server = MockServer::start().await;
    mount_sheet(
        &server,
        200,
        &json!({
            "range": "Sheet1!A1:C3",
            "majorDimension": "ROWS",
            "values": [["name", "origin", "price"], ["Filter A", "Korea", "100"], ["Filter B", "China", "150"]]
        }),
    )
    .await;

    let load = store(sheet_source(&server), Duration::from_secs(300)).current().await;
    assert_eq!(load.catalog().len(), 2);
    assert_eq!(load.catalog().price_of("Filter B").unwrap().to_string(), "150");
}

#[tokio::test]
async fn test_http_error_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(SHEET_PATH))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({"error": "unavailable"})))
        .expect(1)
        .mount(&server)
        .await;

    let loader = CatalogLoader::new(sheet_source(&server), None);
    assert!(matches!(
        loader.fetch().await,
        Err(LoadError::Status { status: 503, .. })
    ));
}

#[tokio::test]
async fn test_ttl_expiry_reloads_new_prices() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(SHEET_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{"name": "Filter A", "origin": "Korea", "price": 100}])),
        )
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_sheet(
        &server,
        200,
        &json!([{"name": "Filter A", "origin": "Korea", "price": 120}]),
    )
    .await;
    let store = store(sheet_source(&server), Duration::from_millis(200));

    let first = store.current().await;
    assert_eq!(first.catalog().price_of("Filter A").unwrap().to_string(), "100");
    assert_eq!(store.current().await.catalog().len(), 1);
    assert_eq!(server.received_requests().await.unwrap().len(), 1);

    tokio::time::sleep(Duration::from_millis(400)).await;

    let reloaded = store.current().await;
    assert_eq!(reloaded.catalog().price_of("Filter A").unwrap().to_string(), "120");
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}
