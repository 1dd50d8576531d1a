//! Aggregate queries behind the dashboard.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;

use laptop_shop_core::{OrderStatus, ProductId};

use super::RepositoryError;

/// Number of products in the best-seller list.
pub const TOP_PRODUCT_LIMIT: i64 = 5;

/// Revenue and order count over a time range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct SalesTotal {
    pub revenue: Decimal,
    pub orders: i64,
}

/// Orders per status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct StatusCount {
    pub status: OrderStatus,
    pub count: i64,
}

/// A best-selling product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct TopProduct {
    pub product_id: ProductId,
    pub name: String,
    pub quantity: i64,
    pub revenue: Decimal,
}

/// Repository for dashboard aggregates.
pub struct DashboardRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> DashboardRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Non-cancelled order revenue for `start <= created_at < end`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn sales_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<SalesTotal, RepositoryError> {
        let total = sqlx::query_as::<_, SalesTotal>(
            r"
            SELECT COALESCE(SUM(total), 0) AS revenue, COUNT(*) AS orders
            FROM shop.customer_order
            WHERE status <> 'cancelled' AND created_at >= $1 AND created_at < $2
            ",
        )
        .bind(start)
        .bind(end)
        .fetch_one(self.pool)
        .await?;
        Ok(total)
    }

    /// Order counts for every status that has at least one order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn status_counts(&self) -> Result<Vec<StatusCount>, RepositoryError> {
        let counts = sqlx::query_as::<_, StatusCount>(
            r"
            SELECT status, COUNT(*) AS count
            FROM shop.customer_order
            GROUP BY status
            ORDER BY status
            ",
        )
        .fetch_all(self.pool)
        .await?;
        Ok(counts)
    }

    /// Best sellers by quantity among non-cancelled orders created since `since`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn top_products(
        &self,
        since: DateTime<Utc>,
    ) -> Result<Vec<TopProduct>, RepositoryError> {
        let products = sqlx::query_as::<_, TopProduct>(
            r"
            SELECT l.product_id, p.name,
                   SUM(l.quantity)::BIGINT AS quantity,
                   SUM(l.line_total) AS revenue
            FROM shop.order_line l
            JOIN shop.customer_order o ON o.id = l.order_id
            JOIN shop.product p ON p.id = l.product_id
            WHERE o.status <> 'cancelled' AND o.created_at >= $1
            GROUP BY l.product_id, p.name
            ORDER BY quantity DESC, revenue DESC, p.name
            LIMIT $2
            ",
        )
        .bind(since)
        .bind(TOP_PRODUCT_LIMIT)
        .fetch_all(self.pool)
        .await?;
        Ok(products)
    }
}
