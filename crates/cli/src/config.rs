//! Configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `PARTS_ORDER_CATALOG_SOURCE` - Catalog location: a file path, `file://` URL,
//!   or `http(s)://` URL serving the sheet rows as JSON
//! - `PARTS_ORDER_WHATSAPP_NUMBER` - Number orders are sent to, international format
//!
//! ## Optional
//! - `PARTS_ORDER_CATALOG_TOKEN` - Bearer token for HTTP catalog sources
//! - `PARTS_ORDER_ITEMS_PER_PAGE` - Products per page (default: 10)
//! - `PARTS_ORDER_CACHE_TTL_SECS` - How long a loaded catalog is reused (default: 300)
//! - `PARTS_ORDER_STORE_NAME` - First line of the order message
//! - `PARTS_ORDER_ORDER_HEADING` - Line under the store name
//! - `PARTS_ORDER_ITEM_COUNT_LABEL` - Label before the item count
//! - `PARTS_ORDER_TOTAL_LABEL` - Label before the total cost
//! - `PARTS_ORDER_CURRENCY` - Currency label after the total (default: جنيه)
//! - `PARTS_ORDER_CATEGORY_RULES` - Path to a JSON category rule table

use std::collections::BTreeMap;
use std::num::NonZeroUsize;
use std::path::Path;
use std::time::Duration;

use parts_order_core::{CategoryRules, DEFAULT_PAGE_SIZE, DestinationNumber, OrderMetadata};
use secrecy::SecretString;
use thiserror::Error;

use crate::loader::CatalogSource;

const DEFAULT_CACHE_TTL_SECS: u64 = 300;
const MIN_TOKEN_BITS_PER_CHAR: f64 = 3.0;

/// Fragments of tokens copied from setup instructions (matched lowercase).
const PLACEHOLDER_TOKENS: &[&str] = &["your-", "token-here", "changeme", "placeholder", "xxxx"];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
    #[error("Cannot read category rules from {0}: {1}")]
    CategoryRules(String, String),
}

/// Application configuration.
///
/// Implements `Debug` manually to redact the catalog token.
#[derive(Clone)]
pub struct OrderConfig {
    /// Where the catalog rows come from
    pub catalog_source: CatalogSource,
    /// Bearer token for HTTP catalog sources
    pub catalog_token: Option<SecretString>,
    /// WhatsApp number orders are addressed to
    pub destination: DestinationNumber,
    /// Default page size for new sessions
    pub items_per_page: NonZeroUsize,
    /// How long a loaded catalog is served before it is fetched again
    pub cache_ttl: Duration,
    /// Fixed text of the order message
    pub metadata: OrderMetadata,
    /// Keyword table used to name categories
    pub category_rules: CategoryRules,
}

impl std::fmt::Debug for OrderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderConfig")
            .field("catalog_source", &self.catalog_source)
            .field(
                "catalog_token",
                &self.catalog_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("destination", &self.destination)
            .field("items_per_page", &self.items_per_page)
            .field("cache_ttl", &self.cache_ttl)
            .field("metadata", &self.metadata)
            .field("category_rules", &self.category_rules.rules.len())
            .finish()
    }
}

impl OrderConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid, or
    /// if the catalog token looks like a placeholder.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Load configuration from a variable lookup.
    ///
    /// # Errors
    ///
    /// Same as [`OrderConfig::from_env`].
    pub fn from_vars<F>(var: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = Vars(var);

        let catalog_source = vars
            .required("PARTS_ORDER_CATALOG_SOURCE")?
            .parse::<CatalogSource>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("PARTS_ORDER_CATALOG_SOURCE".to_string(), e.to_string())
            })?;

        let catalog_token = vars
            .optional("PARTS_ORDER_CATALOG_TOKEN")
            .map(|token| {
                check_catalog_token(&token)?;
                Ok::<_, ConfigError>(SecretString::from(token))
            })
            .transpose()?;

        let destination = DestinationNumber::parse(&vars.required("PARTS_ORDER_WHATSAPP_NUMBER")?)
            .map_err(|e| {
                ConfigError::InvalidEnvVar("PARTS_ORDER_WHATSAPP_NUMBER".to_string(), e.to_string())
            })?;

        let items_per_page = vars
            .or_default(
                "PARTS_ORDER_ITEMS_PER_PAGE",
                &DEFAULT_PAGE_SIZE.get().to_string(),
            )
            .parse::<NonZeroUsize>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("PARTS_ORDER_ITEMS_PER_PAGE".to_string(), e.to_string())
            })?;

        let cache_ttl = vars
            .or_default(
                "PARTS_ORDER_CACHE_TTL_SECS",
                &DEFAULT_CACHE_TTL_SECS.to_string(),
            )
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|e| {
                ConfigError::InvalidEnvVar("PARTS_ORDER_CACHE_TTL_SECS".to_string(), e.to_string())
            })?;

        let defaults = OrderMetadata::default();
        let metadata = OrderMetadata {
            store_name: vars
                .optional("PARTS_ORDER_STORE_NAME")
                .unwrap_or(defaults.store_name),
            heading: vars
                .optional("PARTS_ORDER_ORDER_HEADING")
                .unwrap_or(defaults.heading),
            item_count_label: vars
                .optional("PARTS_ORDER_ITEM_COUNT_LABEL")
                .unwrap_or(defaults.item_count_label),
            total_label: vars
                .optional("PARTS_ORDER_TOTAL_LABEL")
                .unwrap_or(defaults.total_label),
            currency: vars
                .optional("PARTS_ORDER_CURRENCY")
                .unwrap_or(defaults.currency),
        };

        let category_rules = match vars.optional("PARTS_ORDER_CATEGORY_RULES") {
            Some(path) => load_category_rules(Path::new(&path))?,
            None => CategoryRules::default(),
        };

        Ok(Self {
            catalog_source,
            catalog_token,
            destination,
            items_per_page,
            cache_ttl,
            metadata,
            category_rules,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Variable lookup with the usual required/optional/default helpers.
struct Vars<F>(F);

impl<F> Vars<F>
where
    F: Fn(&str) -> Option<String>,
{
    /// Get a required variable. Blank counts as missing.
    fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.optional(key)
            .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
    }

    /// Get an optional variable. Blank counts as unset.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.trim().is_empty())
    }

    /// Get a variable with a default value.
    fn or_default(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }
}

/// Read a category rule table from a JSON file.
fn load_category_rules(path: &Path) -> Result<CategoryRules, ConfigError> {
    let display = path.display().to_string();
    let content = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::CategoryRules(display.clone(), e.to_string()))?;
    serde_json::from_str(&content).map_err(|e| ConfigError::CategoryRules(display, e.to_string()))
}

/// Bits of information per character, from character frequencies.
fn bits_per_char(token: &str) -> f64 {
    let mut counts: BTreeMap<char, u32> = BTreeMap::new();
    for c in token.chars() {
        *counts.entry(c).or_default() += 1;
    }
    let total: u32 = counts.values().sum();
    if total == 0 {
        return 0.0;
    }

    let total = f64::from(total);
    counts
        .values()
        .map(|&n| {
            let p = f64::from(n) / total;
            -p * p.log2()
        })
        .sum()
}

/// Reject a catalog token that is still a placeholder or too repetitive to
/// have been issued by the sheet provider.
fn check_catalog_token(token: &str) -> Result<(), ConfigError> {
    const KEY: &str = "PARTS_ORDER_CATALOG_TOKEN";

    let lower = token.to_lowercase();
    if let Some(fragment) = PLACEHOLDER_TOKENS.iter().find(|f| lower.contains(**f)) {
        return Err(ConfigError::InsecureSecret(
            KEY.to_string(),
            format!("looks like a placeholder (contains {fragment:?})"),
        ));
    }

    let bits = bits_per_char(token);
    if bits < MIN_TOKEN_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            KEY.to_string(),
            format!("too repetitive ({bits:.2} bits/char, need {MIN_TOKEN_BITS_PER_CHAR:.1})"),
        ));
    }

    Ok(())
}
