//! Shared catalog snapshot.
//!
//! The catalog is loaded once and reused by every session until the TTL runs
//! out. Readers hold an `Arc<CatalogLoad>`, so a reload swaps in a new snapshot
//! without disturbing anyone still looking at the old one.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use parts_order_core::{CatalogLoad, CategoryRules, LoadFailure};
use tracing::{info, instrument};

use crate::config::OrderConfig;
use crate::loader::{CatalogLoader, CatalogSource, LoadError};

/// TTL-cached catalog, cheap to clone.
#[derive(Clone)]
pub struct CatalogStore {
    inner: Arc<CatalogStoreInner>,
}

struct CatalogStoreInner {
    loader: CatalogLoader,
    rules: CategoryRules,
    cache: Cache<(), Arc<CatalogLoad>>,
}

impl std::fmt::Debug for CatalogStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogStore")
            .field("loader", &self.inner.loader)
            .finish_non_exhaustive()
    }
}

impl CatalogStore {
    /// Create a store that keeps a loaded catalog for `ttl`.
    #[must_use]
    pub fn new(loader: CatalogLoader, rules: CategoryRules, ttl: Duration) -> Self {
        let cache = Cache::builder().max_capacity(1).time_to_live(ttl).build();

        Self {
            inner: Arc::new(CatalogStoreInner {
                loader,
                rules,
                cache,
            }),
        }
    }

    #[must_use]
    pub fn from_config(config: &OrderConfig) -> Self {
        let loader = CatalogLoader::new(
            config.catalog_source.clone(),
            config.catalog_token.clone(),
        );
        Self::new(loader, config.category_rules.clone(), config.cache_ttl)
    }

    #[must_use]
    pub fn source(&self) -> &CatalogSource {
        self.inner.loader.source()
    }

    /// The current catalog snapshot, loading it if needed.
    ///
    /// A failed load is returned as a [`CatalogLoad`] in the failed state and
    /// is not cached, so the next call tries again.
    #[instrument(skip(self), fields(source = %self.source()))]
    pub async fn current(&self) -> Arc<CatalogLoad> {
        let result = self
            .inner
            .cache
            .try_get_with((), async {
                let records = self.inner.loader.fetch().await?;
                let load = CatalogLoad::from_records(records, &self.inner.rules);
                if let Some(report) = load.report() {
                    info!(
                        rows = report.rows,
                        products = report.products,
                        categories = load.catalog().categories().len(),
                        dropped = report.dropped(),
                        "catalog loaded"
                    );
                }
                Ok::<_, LoadError>(Arc::new(load))
            })
            .await;

        result.unwrap_or_else(|e| Arc::new(CatalogLoad::failed(LoadFailure::new(e.to_string()))))
    }

    /// Drop the cached snapshot and load again.
    pub async fn refresh(&self) -> Arc<CatalogLoad> {
        self.inner.cache.invalidate(&()).await;
        self.current().await
    }
}
