//! Product repository.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::info;

use super::{RepositoryError, is_unique_violation};
use crate::product::{Product, ProductCondition, ProductInput};
use crate::types::ProductId;

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: ProductId,
    slug: String,
    name: String,
    brand: String,
    category: String,
    color: Option<String>,
    processor: Option<String>,
    ram_gb: Option<i32>,
    storage_gb: Option<i32>,
    condition: String,
    price: Decimal,
    stock: i32,
    is_active: bool,
    description: String,
    image_url: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ProductRow> for Product {
    type Error = RepositoryError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let condition: ProductCondition = row
            .condition
            .parse()
            .map_err(|e| RepositoryError::DataCorruption(format!("product {}: {e}", row.id)))?;

        Ok(Self {
            id: row.id,
            slug: row.slug,
            name: row.name,
            brand: row.brand,
            category: row.category,
            color: row.color,
            processor: row.processor,
            ram_gb: row.ram_gb,
            storage_gb: row.storage_gb,
            condition,
            price: row.price,
            stock: row.stock,
            is_active: row.is_active,
            description: row.description,
            image_url: row.image_url,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const PRODUCT_COLUMNS: &str = r"
    id, slug, name, brand, category, color, processor, ram_gb, storage_gb,
    condition, price, stock, is_active, description, image_url, created_at, updated_at
";

const SLUG_CONSTRAINT: &str = "product_slug_key";

// =============================================================================
// Repository
// =============================================================================

/// Repository for catalog products.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List products, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a row is invalid.
    pub async fn list(&self, active_only: bool) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            r"
            SELECT {PRODUCT_COLUMNS}
            FROM shop.product
            WHERE is_active OR NOT $1
            ORDER BY created_at DESC, id DESC
            "
        ))
        .bind(active_only)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Get a product by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM shop.product WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Get a product by slug.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_slug(&self, slug: &str) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM shop.product WHERE slug = $1"
        ))
        .bind(slug)
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Create a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the slug is taken.
    pub async fn create(&self, input: &ProductInput) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            r"
            INSERT INTO shop.product
                (slug, name, brand, category, color, processor, ram_gb, storage_gb,
                 condition, price, stock, is_active, description, image_url)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING {PRODUCT_COLUMNS}
            "
        ))
        .bind(input.effective_slug())
        .bind(input.name.trim())
        .bind(input.brand.trim())
        .bind(input.category.trim())
        .bind(input.color.as_deref())
        .bind(input.processor.as_deref())
        .bind(input.ram_gb)
        .bind(input.storage_gb)
        .bind(input.condition.as_str())
        .bind(input.price)
        .bind(input.stock)
        .bind(input.is_active)
        .bind(&input.description)
        .bind(input.image_url.as_deref())
        .fetch_one(self.pool)
        .await
        .map_err(slug_conflict)?;

        let product: Product = row.try_into()?;
        info!(product_id = %product.id, slug = %product.slug, "Product created");
        Ok(product)
    }

    /// Replace a product's descriptive fields. Stock is not touched here;
    /// use [`Self::adjust_stock`] so every change is a relative delta.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` for an unknown product and
    /// `RepositoryError::Conflict` if the new slug is taken.
    pub async fn update(
        &self,
        id: ProductId,
        input: &ProductInput,
    ) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            r"
            UPDATE shop.product
            SET slug = $2, name = $3, brand = $4, category = $5, color = $6,
                processor = $7, ram_gb = $8, storage_gb = $9, condition = $10,
                price = $11, is_active = $12, description = $13, image_url = $14,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {PRODUCT_COLUMNS}
            "
        ))
        .bind(id)
        .bind(input.effective_slug())
        .bind(input.name.trim())
        .bind(input.brand.trim())
        .bind(input.category.trim())
        .bind(input.color.as_deref())
        .bind(input.processor.as_deref())
        .bind(input.ram_gb)
        .bind(input.storage_gb)
        .bind(input.condition.as_str())
        .bind(input.price)
        .bind(input.is_active)
        .bind(&input.description)
        .bind(input.image_url.as_deref())
        .fetch_optional(self.pool)
        .await
        .map_err(slug_conflict)?
        .ok_or(RepositoryError::NotFound)?;

        row.try_into()
    }

    /// Show or hide a product in the storefront.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` for an unknown product.
    pub async fn set_active(
        &self,
        id: ProductId,
        active: bool,
    ) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            r"
            UPDATE shop.product SET is_active = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {PRODUCT_COLUMNS}
            "
        ))
        .bind(id)
        .bind(active)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        row.try_into()
    }

    /// Add `delta` (which may be negative) to a product's stock.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` for an unknown product and
    /// `RepositoryError::Conflict` if the result would be negative or would
    /// not fit the stock column.
    pub async fn adjust_stock(
        &self,
        id: ProductId,
        delta: i32,
    ) -> Result<Product, RepositoryError> {
        // BIGINT arithmetic so the range check itself cannot overflow.
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            r"
            UPDATE shop.product SET stock = (stock::BIGINT + $2)::INTEGER, updated_at = NOW()
            WHERE id = $1 AND stock::BIGINT + $2 BETWEEN 0 AND {max}
            RETURNING {PRODUCT_COLUMNS}
            ",
            max = i32::MAX
        ))
        .bind(id)
        .bind(i64::from(delta))
        .fetch_optional(self.pool)
        .await?;

        match row {
            Some(row) => {
                let product: Product = row.try_into()?;
                info!(product_id = %id, delta, stock = product.stock, "Stock adjusted");
                Ok(product)
            }
            None if self.get(id).await?.is_some() => Err(RepositoryError::Conflict(
                "stock cannot go below zero or above the maximum".to_owned(),
            )),
            None => Err(RepositoryError::NotFound),
        }
    }

    /// Insert or update a product keyed by slug, including its stock.
    ///
    /// Returns the product and whether it was newly inserted.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn upsert_by_slug(
        &self,
        input: &ProductInput,
    ) -> Result<(Product, bool), RepositoryError> {
        #[derive(sqlx::FromRow)]
        struct UpsertRow {
            #[sqlx(flatten)]
            product: ProductRow,
            inserted: bool,
        }

        let row = sqlx::query_as::<_, UpsertRow>(&format!(
            r"
            INSERT INTO shop.product
                (slug, name, brand, category, color, processor, ram_gb, storage_gb,
                 condition, price, stock, is_active, description, image_url)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            ON CONFLICT (slug) DO UPDATE
            SET name = EXCLUDED.name, brand = EXCLUDED.brand, category = EXCLUDED.category,
                color = EXCLUDED.color, processor = EXCLUDED.processor,
                ram_gb = EXCLUDED.ram_gb, storage_gb = EXCLUDED.storage_gb,
                condition = EXCLUDED.condition, price = EXCLUDED.price,
                stock = EXCLUDED.stock, is_active = EXCLUDED.is_active,
                description = EXCLUDED.description, image_url = EXCLUDED.image_url,
                updated_at = NOW()
            RETURNING {PRODUCT_COLUMNS}, (xmax = 0) AS inserted
            "
        ))
        .bind(input.effective_slug())
        .bind(input.name.trim())
        .bind(input.brand.trim())
        .bind(input.category.trim())
        .bind(input.color.as_deref())
        .bind(input.processor.as_deref())
        .bind(input.ram_gb)
        .bind(input.storage_gb)
        .bind(input.condition.as_str())
        .bind(input.price)
        .bind(input.stock)
        .bind(input.is_active)
        .bind(&input.description)
        .bind(input.image_url.as_deref())
        .fetch_one(self.pool)
        .await?;

        Ok((row.product.try_into()?, row.inserted))
    }

    /// Deactivate every product whose slug is not in `keep`.
    ///
    /// Products are never deleted because order lines reference them.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn deactivate_except(&self, keep: &[String]) -> Result<u64, RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE shop.product SET is_active = FALSE, updated_at = NOW()
            WHERE is_active AND NOT (slug = ANY($1))
            ",
        )
        .bind(keep)
        .execute(self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Active products with `stock <= threshold`, lowest stock first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn low_stock(&self, threshold: i32) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            r"
            SELECT {PRODUCT_COLUMNS}
            FROM shop.product
            WHERE is_active AND stock <= $1
            ORDER BY stock, name
            "
        ))
        .bind(threshold)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }
}

fn slug_conflict(err: sqlx::Error) -> RepositoryError {
    if is_unique_violation(&err, Some(SLUG_CONSTRAINT)) {
        RepositoryError::Conflict("a product with this slug already exists".to_owned())
    } else {
        RepositoryError::Database(err)
    }
}
