//! Application state shared across handlers.

use std::sync::Arc;

use laptop_shop_core::db::{ProductRepository, RepositoryError};
use laptop_shop_core::product::Product;
use moka::future::Cache;
use sqlx::PgPool;
use tracing::debug;

use crate::config::StorefrontConfig;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    pool: PgPool,
    catalog: Cache<(), Arc<Vec<Product>>>,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: StorefrontConfig, pool: PgPool) -> Self {
        let catalog = Cache::builder()
            .max_capacity(1)
            .time_to_live(config.catalog_cache_ttl)
            .build();

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                catalog,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// The active catalog, served from cache when fresh.
    ///
    /// Concurrent misses share one database load.
    ///
    /// # Errors
    ///
    /// Returns the repository error if the catalog cannot be loaded.
    pub async fn catalog(&self) -> Result<Arc<Vec<Product>>, Arc<RepositoryError>> {
        let pool = self.inner.pool.clone();
        self.inner
            .catalog
            .try_get_with((), async move {
                debug!("Catalog cache miss");
                let products = ProductRepository::new(&pool).list(true).await?;
                Ok::<_, RepositoryError>(Arc::new(products))
            })
            .await
    }

    /// Drop the cached catalog so the next read sees fresh stock.
    pub async fn invalidate_catalog(&self) {
        self.inner.catalog.invalidate_all();
        self.inner.catalog.run_pending_tasks().await;
    }
}
