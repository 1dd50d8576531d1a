//! Cashflow entries and range summaries.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::{PgExecutor, PgPool, Postgres, QueryBuilder};
use tracing::info;

use laptop_shop_core::{AdminUserId, CashflowDirection, CashflowEntryId, OrderId};

use super::RepositoryError;
use crate::models::{CashflowEntry, CashflowSummary, CategoryTotal};

/// Category used for register sales.
pub const POS_SALE_CATEGORY: &str = "pos_sale";

/// Longest accepted category name.
pub const MAX_CATEGORY_LENGTH: usize = 64;

/// Fields for a new entry.
#[derive(Debug, Clone, Deserialize)]
pub struct NewCashflowEntry {
    pub direction: CashflowDirection,
    pub category: String,
    pub amount: Decimal,
    pub entry_date: NaiveDate,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub order_id: Option<OrderId>,
    #[serde(skip)]
    pub created_by: Option<AdminUserId>,
}

impl NewCashflowEntry {
    /// Check amount and category.
    ///
    /// # Errors
    ///
    /// Returns a message describing the first invalid field.
    pub fn validate(&self) -> Result<(), String> {
        if self.amount <= Decimal::ZERO {
            return Err("amount must be positive".to_owned());
        }
        let category = self.category.trim();
        if category.is_empty() {
            return Err("category is required".to_owned());
        }
        if category.chars().count() > MAX_CATEGORY_LENGTH {
            return Err(format!("category is longer than {MAX_CATEGORY_LENGTH} characters"));
        }
        Ok(())
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CashflowRow {
    id: CashflowEntryId,
    direction: CashflowDirection,
    category: String,
    amount: Decimal,
    entry_date: NaiveDate,
    description: String,
    order_id: Option<OrderId>,
    created_by: Option<AdminUserId>,
    created_at: DateTime<Utc>,
}

impl From<CashflowRow> for CashflowEntry {
    fn from(row: CashflowRow) -> Self {
        Self {
            id: row.id,
            direction: row.direction,
            category: row.category,
            amount: row.amount,
            entry_date: row.entry_date,
            description: row.description,
            order_id: row.order_id,
            created_by: row.created_by,
            created_at: row.created_at,
        }
    }
}

const ENTRY_COLUMNS: &str =
    "id, direction, category, amount, entry_date, description, order_id, created_by, created_at";

/// Insert an entry on any executor, so debt payments can write one inside
/// their own transaction.
pub(crate) async fn insert_entry<'e, E>(
    executor: E,
    entry: &NewCashflowEntry,
) -> Result<CashflowEntry, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let row = sqlx::query_as::<_, CashflowRow>(&format!(
        r"
        INSERT INTO shop.cashflow_entry
            (direction, category, amount, entry_date, description, order_id, created_by)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING {ENTRY_COLUMNS}
        "
    ))
    .bind(entry.direction)
    .bind(entry.category.trim().to_lowercase())
    .bind(entry.amount)
    .bind(entry.entry_date)
    .bind(entry.description.trim())
    .bind(entry.order_id)
    .bind(entry.created_by)
    .fetch_one(executor)
    .await?;

    Ok(row.into())
}

/// Repository for cashflow entries.
pub struct CashflowRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CashflowRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Entries dated within `from..=to`, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        direction: Option<CashflowDirection>,
    ) -> Result<Vec<CashflowEntry>, RepositoryError> {
        let mut query = QueryBuilder::<Postgres>::new(format!(
            "SELECT {ENTRY_COLUMNS} FROM shop.cashflow_entry WHERE entry_date BETWEEN "
        ));
        query.push_bind(from).push(" AND ").push_bind(to);
        if let Some(direction) = direction {
            query.push(" AND direction = ").push_bind(direction);
        }
        query.push(" ORDER BY entry_date DESC, id DESC");

        let rows = query
            .build_query_as::<CashflowRow>()
            .fetch_all(self.pool)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Record an entry. Categories are stored trimmed and lowercase.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, entry: &NewCashflowEntry) -> Result<CashflowEntry, RepositoryError> {
        let created = insert_entry(self.pool, entry).await?;
        info!(
            entry_id = %created.id,
            direction = ?created.direction,
            category = %created.category,
            amount = %created.amount,
            "Cashflow entry recorded"
        );
        Ok(created)
    }

    /// Delete an entry. Debt payments that referenced it keep their amount.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` for an unknown entry.
    pub async fn delete(&self, id: CashflowEntryId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM shop.cashflow_entry WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        info!(entry_id = %id, "Cashflow entry deleted");
        Ok(())
    }

    /// Income, expense and per-category totals within `from..=to`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn summary(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<CashflowSummary, RepositoryError> {
        let categories = sqlx::query_as::<_, CategoryTotal>(
            r"
            SELECT direction, category, SUM(amount) AS total
            FROM shop.cashflow_entry
            WHERE entry_date BETWEEN $1 AND $2
            GROUP BY direction, category
            ORDER BY direction, total DESC, category
            ",
        )
        .bind(from)
        .bind(to)
        .fetch_all(self.pool)
        .await?;

        Ok(CashflowSummary::from_totals(from, to, categories))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn entry(amount: i64, category: &str) -> NewCashflowEntry {
        NewCashflowEntry {
            direction: CashflowDirection::Expense,
            category: category.to_owned(),
            amount: Decimal::from(amount),
            entry_date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            description: String::new(),
            order_id: None,
            created_by: None,
        }
    }

    #[test]
    fn test_entry_validation() {
        assert!(entry(50_000, "listrik").validate().is_ok());
        assert!(entry(0, "listrik").validate().is_err());
        assert!(entry(-5, "listrik").validate().is_err());
        assert!(entry(50_000, "   ").validate().is_err());
        assert!(entry(50_000, &"x".repeat(65)).validate().is_err());
    }

    #[test]
    fn test_entry_deserializes_without_optional_fields() {
        let json = r#"{"direction":"income","category":"service","amount":"150000","entry_date":"2025-06-01"}"#;
        let parsed: NewCashflowEntry = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.direction, CashflowDirection::Income);
        assert_eq!(parsed.amount, Decimal::from(150_000));
        assert!(parsed.order_id.is_none());
        assert!(parsed.created_by.is_none());
    }
}
