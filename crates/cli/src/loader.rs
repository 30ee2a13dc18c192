//! Catalog row loading.
//!
//! Rows are read as JSON from a local file or an HTTP endpoint. Two shapes
//! are accepted:
//!
//! - An array of row objects, as produced by sheet-to-JSON bridges:
//!   `[{"name": "...", "origin": "...", "price": 100}, ...]`
//! - A Sheets API values range, where the first row holds the headers:
//!   `{"values": [["name", "origin", "price"], ["...", "...", "100"]]}`
//!
//! Anything else is a [`LoadError`]; a single malformed row is not.

use std::path::PathBuf;
use std::str::FromStr;

use parts_order_core::RawRecord;
use secrecy::{ExposeSecret, SecretString};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, instrument, warn};
use url::Url;

/// Errors that can occur while loading catalog rows.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Reading a local catalog file failed.
    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The endpoint answered with a non-success status.
    #[error("catalog endpoint returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The payload is not JSON.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The payload is JSON but not a list of rows.
    #[error("unexpected catalog shape: {0}")]
    Shape(&'static str),
}

/// Errors from parsing a [`CatalogSource`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SourceError {
    #[error("catalog source cannot be empty")]
    Empty,
    #[error("invalid catalog URL: {0}")]
    InvalidUrl(String),
    #[error("unsupported URL scheme: {0}")]
    UnsupportedScheme(String),
}

/// Where catalog rows are read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogSource {
    File(PathBuf),
    Http(Url),
}

impl FromStr for CatalogSource {
    type Err = SourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(SourceError::Empty);
        }

        if !s.contains("://") {
            return Ok(Self::File(PathBuf::from(s)));
        }

        let url = Url::parse(s).map_err(|e| SourceError::InvalidUrl(e.to_string()))?;
        match url.scheme() {
            "http" | "https" => Ok(Self::Http(url)),
            "file" => url
                .to_file_path()
                .map(Self::File)
                .map_err(|()| SourceError::InvalidUrl(s.to_owned())),
            other => Err(SourceError::UnsupportedScheme(other.to_owned())),
        }
    }
}

impl std::fmt::Display for CatalogSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Http(url) => write!(f, "{url}"),
        }
    }
}

/// Reads catalog rows from a [`CatalogSource`].
#[derive(Clone)]
pub struct CatalogLoader {
    client: reqwest::Client,
    source: CatalogSource,
    token: Option<SecretString>,
}

impl std::fmt::Debug for CatalogLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogLoader")
            .field("source", &self.source)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish_non_exhaustive()
    }
}

impl CatalogLoader {
    /// Create a loader. `token` is sent as a bearer token to HTTP sources.
    #[must_use]
    pub fn new(source: CatalogSource, token: Option<SecretString>) -> Self {
        Self {
            client: reqwest::Client::new(),
            source,
            token,
        }
    }

    #[must_use]
    pub const fn source(&self) -> &CatalogSource {
        &self.source
    }

    /// Fetch and decode all rows.
    ///
    /// # Errors
    ///
    /// Returns a [`LoadError`] if the source cannot be read or is not a list
    /// of rows.
    #[instrument(skip(self), fields(source = %self.source))]
    pub async fn fetch(&self) -> Result<Vec<RawRecord>, LoadError> {
        let body = match &self.source {
            CatalogSource::File(path) => {
                tokio::fs::read_to_string(path)
                    .await
                    .map_err(|source| LoadError::Io {
                        path: path.display().to_string(),
                        source,
                    })?
            }
            CatalogSource::Http(url) => self.fetch_http(url).await?,
        };

        let records = parse_records(&body)?;
        debug!(rows = records.len(), "catalog rows fetched");
        Ok(records)
    }

    async fn fetch_http(&self, url: &Url) -> Result<String, LoadError> {
        let mut request = self
            .client
            .get(url.clone())
            .header("Accept", "application/json");
        if let Some(token) = &self.token {
            request = request.bearer_auth(token.expose_secret());
        }

        let response = request.send().await?;
        let status = response.status();

        // Get response body as text first for better error diagnostics
        let body = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %body.chars().take(500).collect::<String>(),
                "catalog endpoint returned non-success status"
            );
            return Err(LoadError::Status {
                status: status.as_u16(),
                body: body.chars().take(200).collect(),
            });
        }

        Ok(body)
    }
}

/// Decode a JSON payload into raw rows.
///
/// # Errors
///
/// Returns [`LoadError::Parse`] for invalid JSON and [`LoadError::Shape`] when
/// the JSON is not one of the accepted shapes.
pub fn parse_records(body: &str) -> Result<Vec<RawRecord>, LoadError> {
    let value: Value = serde_json::from_str(body)?;

    match value {
        Value::Array(rows) => Ok(rows.into_iter().map(record_from_value).collect()),
        Value::Object(mut object) => match object.remove("values") {
            Some(Value::Array(rows)) => values_to_records(rows),
            Some(_) => Err(LoadError::Shape("\"values\" is not an array")),
            None => Err(LoadError::Shape("expected an array or a \"values\" range")),
        },
        _ => Err(LoadError::Shape("expected an array or a \"values\" range")),
    }
}

/// One row object to a record. Rows that are not objects become empty
/// records, which the normalizer drops and reports.
fn record_from_value(row: Value) -> RawRecord {
    if !row.is_object() {
        warn!(row = %row, "catalog row is not an object");
        return RawRecord::default();
    }
    serde_json::from_value(row).unwrap_or_else(|e| {
        warn!(error = %e, "catalog row could not be decoded");
        RawRecord::default()
    })
}

/// A values range (header row, then data rows) to records.
fn values_to_records(rows: Vec<Value>) -> Result<Vec<RawRecord>, LoadError> {
    let mut rows = rows.into_iter();
    let Some(Value::Array(header)) = rows.next() else {
        // An empty range is an empty sheet
        return Ok(Vec::new());
    };
    let header: Vec<String> = header
        .iter()
        .map(|h| h.as_str().map_or_else(|| h.to_string(), str::to_owned))
        .collect();

    Ok(rows
        .map(|row| match row {
            Value::Array(cells) => {
                // Trailing empty cells are omitted by the API, so rows may be short
                let object: Map<String, Value> = header
                    .iter()
                    .cloned()
                    .zip(cells)
                    .filter(|(key, _)| !key.is_empty())
                    .collect();
                record_from_value(Value::Object(object))
            }
            other => record_from_value(other),
        })
        .collect())
}
