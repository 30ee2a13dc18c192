//! Integration tests for Parts Order.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p parts-order-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `order_scenarios` - Browse, cart and checkout flows through the core
//! - `catalog_loading` - Loader and store against files and a local HTTP sheet
//!
//! No external services are needed: file catalogs go to the system temp
//! directory and HTTP catalogs are served by a `wiremock` server on localhost.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::{Path, PathBuf};

use parts_order_cli::CatalogSource;
use serde_json::{Value, json};
use url::Url;
use wiremock::MockServer;

/// Two filters, a separator, then two sensors, in the sheet's Arabic headers.
#[must_use]
pub fn arabic_sheet() -> Value {
    json!([
        {"البند": "بوبينه هيونداي النترا", "المنشأ": "كوريا", "السعر": 350},
        {"البند": "بوبينه كيا سيراتو", "المنشأ": "كوريا", "السعر": "٤٢٠"},
        {"is_separator": true},
        {"البند": "حساس كرنك تويوتا", "المنشأ": "اليابان", "السعر": "1,250"},
        {"البند": "حساس كامة", "المنشأ": "الصين", "السعر": ""}
    ])
}

/// `count` products named `Part 01`, `Part 02`, ... priced 10 each.
#[must_use]
pub fn numbered_sheet(count: usize) -> Value {
    Value::Array(
        (1..=count)
            .map(|i| json!({"name": format!("Part {i:02}"), "origin": "Egypt", "price": 10}))
            .collect(),
    )
}

/// A JSON catalog file in the temp directory, removed on drop.
pub struct TempCatalog {
    path: PathBuf,
}

impl TempCatalog {
    /// Write `rows` to a uniquely named file.
    ///
    /// # Panics
    ///
    /// Panics if the file cannot be written.
    #[must_use]
    pub fn new(rows: &Value) -> Self {
        let path = std::env::temp_dir().join(format!("parts-order-{}.json", uuid::Uuid::new_v4()));
        let catalog = Self { path };
        catalog.write(rows);
        catalog
    }

    /// Replace the file contents.
    ///
    /// # Panics
    ///
    /// Panics if the file cannot be written.
    #[allow(clippy::expect_used)]
    pub fn write(&self, rows: &Value) {
        std::fs::write(&self.path, rows.to_string()).expect("write temp catalog");
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn source(&self) -> CatalogSource {
        CatalogSource::File(self.path.clone())
    }
}

impl Drop for TempCatalog {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

/// Route the mocked sheet is served on.
pub const SHEET_PATH: &str = "/rows";

/// A catalog source pointing at [`SHEET_PATH`] on a mock server.
///
/// # Panics
///
/// Panics if the server URI is not a valid URL.
#[must_use]
#[allow(clippy::expect_used)]
pub fn sheet_source(server: &MockServer) -> CatalogSource {
    let url = Url::parse(&format!("{}{SHEET_PATH}", server.uri())).expect("mock server url");
    CatalogSource::Http(url)
}
