//! Receivables and payables with installment payments.
//!
//! A payment locks the debt row, checks it against the outstanding
//! balance, writes the installment and its cashflow entry, and settles the
//! debt when nothing is left, all in one transaction.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{PgExecutor, PgPool, Postgres, QueryBuilder};
use thiserror::Error;
use tracing::{info, instrument};

use laptop_shop_core::{
    AdminUserId, CashflowEntryId, DebtId, DebtKind, DebtPaymentId, DebtStatus, PhoneNumber,
};

use super::RepositoryError;
use super::cashflow::{NewCashflowEntry, insert_entry};
use crate::models::{Debt, DebtPayment};

/// Fields for a new debt.
#[derive(Debug, Clone, Deserialize)]
pub struct NewDebt {
    pub kind: DebtKind,
    pub counterparty: String,
    #[serde(default)]
    pub phone: Option<PhoneNumber>,
    pub amount: Decimal,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub note: Option<String>,
}

impl NewDebt {
    /// Check amount and counterparty.
    ///
    /// # Errors
    ///
    /// Returns a message describing the first invalid field.
    pub fn validate(&self) -> Result<(), String> {
        if self.counterparty.trim().is_empty() {
            return Err("counterparty is required".to_owned());
        }
        if self.amount <= Decimal::ZERO {
            return Err("amount must be positive".to_owned());
        }
        Ok(())
    }
}

/// A payment to record against a debt.
#[derive(Debug, Clone, Deserialize)]
pub struct NewDebtPayment {
    pub amount: Decimal,
    pub paid_on: NaiveDate,
    #[serde(default)]
    pub note: Option<String>,
}

/// A debt with its payment history.
#[derive(Debug, Clone, Serialize)]
pub struct DebtDetail {
    #[serde(flatten)]
    pub debt: Debt,
    pub outstanding: Decimal,
    pub payments: Vec<DebtPayment>,
}

impl DebtDetail {
    fn new(debt: Debt, payments: Vec<DebtPayment>) -> Self {
        Self {
            outstanding: debt.outstanding(),
            debt,
            payments,
        }
    }
}

/// Open balances by kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OpenBalances {
    pub receivable: Decimal,
    pub payable: Decimal,
}

/// Errors from [`DebtRepository::record_payment`].
#[derive(Debug, Error)]
pub enum DebtPaymentError {
    #[error("debt not found")]
    NotFound,

    #[error("payment amount must be positive")]
    InvalidAmount,

    #[error("debt is already settled")]
    AlreadySettled,

    #[error("payment exceeds the outstanding balance of {outstanding}")]
    Overpayment { outstanding: Decimal },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct DebtRow {
    id: DebtId,
    kind: DebtKind,
    status: DebtStatus,
    counterparty: String,
    phone: Option<PhoneNumber>,
    amount: Decimal,
    paid: Decimal,
    due_date: Option<NaiveDate>,
    note: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<DebtRow> for Debt {
    fn from(row: DebtRow) -> Self {
        Self {
            id: row.id,
            kind: row.kind,
            status: row.status,
            counterparty: row.counterparty,
            phone: row.phone,
            amount: row.amount,
            paid: row.paid,
            due_date: row.due_date,
            note: row.note,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct DebtPaymentRow {
    id: DebtPaymentId,
    debt_id: DebtId,
    amount: Decimal,
    paid_on: NaiveDate,
    note: Option<String>,
    cashflow_entry_id: Option<CashflowEntryId>,
    created_at: DateTime<Utc>,
}

impl From<DebtPaymentRow> for DebtPayment {
    fn from(row: DebtPaymentRow) -> Self {
        Self {
            id: row.id,
            debt_id: row.debt_id,
            amount: row.amount,
            paid_on: row.paid_on,
            note: row.note,
            cashflow_entry_id: row.cashflow_entry_id,
            created_at: row.created_at,
        }
    }
}

const DEBT_COLUMNS: &str =
    "id, kind, status, counterparty, phone, amount, paid, due_date, note, created_at, updated_at";

/// Check a payment against a locked debt.
fn check_payment(debt: &Debt, amount: Decimal) -> Result<(), DebtPaymentError> {
    if amount <= Decimal::ZERO {
        return Err(DebtPaymentError::InvalidAmount);
    }
    if debt.status == DebtStatus::Settled {
        return Err(DebtPaymentError::AlreadySettled);
    }
    let outstanding = debt.outstanding();
    if amount > outstanding {
        return Err(DebtPaymentError::Overpayment { outstanding });
    }
    Ok(())
}

const fn payment_category(kind: DebtKind) -> &'static str {
    match kind {
        DebtKind::Receivable => "debt_collection",
        DebtKind::Payable => "debt_payment",
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for debts and their payments.
pub struct DebtRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> DebtRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Record a new debt.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, debt: &NewDebt) -> Result<Debt, RepositoryError> {
        let row = sqlx::query_as::<_, DebtRow>(&format!(
            r"
            INSERT INTO shop.debt (kind, counterparty, phone, amount, due_date, note)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {DEBT_COLUMNS}
            "
        ))
        .bind(debt.kind)
        .bind(debt.counterparty.trim())
        .bind(debt.phone.as_ref())
        .bind(debt.amount)
        .bind(debt.due_date)
        .bind(debt.note.as_deref().map(str::trim).filter(|n| !n.is_empty()))
        .fetch_one(self.pool)
        .await?;

        let created: Debt = row.into();
        info!(
            debt_id = %created.id,
            kind = ?created.kind,
            amount = %created.amount,
            "Debt recorded"
        );
        Ok(created)
    }

    /// List debts, open ones first by due date.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        kind: Option<DebtKind>,
        status: Option<DebtStatus>,
    ) -> Result<Vec<Debt>, RepositoryError> {
        let mut query = QueryBuilder::<Postgres>::new(format!(
            "SELECT {DEBT_COLUMNS} FROM shop.debt WHERE TRUE"
        ));
        if let Some(kind) = kind {
            query.push(" AND kind = ").push_bind(kind);
        }
        if let Some(status) = status {
            query.push(" AND status = ").push_bind(status);
        }
        query.push(" ORDER BY status, due_date NULLS LAST, id");

        let rows = query.build_query_as::<DebtRow>().fetch_all(self.pool).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Open debts whose due date is before `today`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn overdue(&self, today: NaiveDate) -> Result<Vec<Debt>, RepositoryError> {
        let rows = sqlx::query_as::<_, DebtRow>(&format!(
            r"
            SELECT {DEBT_COLUMNS} FROM shop.debt
            WHERE status = 'open' AND due_date < $1
            ORDER BY due_date, id
            "
        ))
        .bind(today)
        .fetch_all(self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// A debt with its payments.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: DebtId) -> Result<Option<DebtDetail>, RepositoryError> {
        let Some(row) = sqlx::query_as::<_, DebtRow>(&format!(
            "SELECT {DEBT_COLUMNS} FROM shop.debt WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        else {
            return Ok(None);
        };

        let payments = fetch_payments(self.pool, id).await?;
        Ok(Some(DebtDetail::new(row.into(), payments)))
    }

    /// Record a payment and its cashflow entry; settle the debt at zero.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, `InvalidAmount`, `AlreadySettled` or
    /// `Overpayment`; nothing is written in any error case.
    #[instrument(skip(self, payment), fields(debt_id = %id, amount = %payment.amount))]
    pub async fn record_payment(
        &self,
        id: DebtId,
        payment: &NewDebtPayment,
        recorded_by: Option<AdminUserId>,
    ) -> Result<DebtDetail, DebtPaymentError> {
        let mut tx = self.pool.begin().await?;

        let debt: Debt = sqlx::query_as::<_, DebtRow>(&format!(
            "SELECT {DEBT_COLUMNS} FROM shop.debt WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(DebtPaymentError::NotFound)?
        .into();

        check_payment(&debt, payment.amount)?;

        let entry = insert_entry(
            &mut *tx,
            &NewCashflowEntry {
                direction: debt.kind.payment_direction(),
                category: payment_category(debt.kind).to_owned(),
                amount: payment.amount,
                entry_date: payment.paid_on,
                description: format!("{} (#{})", debt.counterparty, debt.id),
                order_id: None,
                created_by: recorded_by,
            },
        )
        .await?;

        sqlx::query(
            r"
            INSERT INTO shop.debt_payment (debt_id, amount, paid_on, note, cashflow_entry_id)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(id)
        .bind(payment.amount)
        .bind(payment.paid_on)
        .bind(payment.note.as_deref())
        .bind(entry.id)
        .execute(&mut *tx)
        .await?;

        let (paid, status) = apply_payment(&debt, payment.amount);
        let updated: Debt = sqlx::query_as::<_, DebtRow>(&format!(
            r"
            UPDATE shop.debt SET paid = $2, status = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING {DEBT_COLUMNS}
            "
        ))
        .bind(id)
        .bind(paid)
        .bind(status)
        .fetch_one(&mut *tx)
        .await?
        .into();
        let payments = fetch_payments(&mut *tx, id).await?;

        tx.commit().await?;
        info!(
            debt_id = %id,
            paid = %paid,
            outstanding = %updated.outstanding(),
            settled = status == DebtStatus::Settled,
            "Debt payment recorded"
        );

        Ok(DebtDetail::new(updated, payments))
    }

    /// Outstanding totals of open debts.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn open_balances(&self) -> Result<OpenBalances, RepositoryError> {
        let rows: Vec<(DebtKind, Decimal)> = sqlx::query_as(
            r"
            SELECT kind, COALESCE(SUM(amount - paid), 0)
            FROM shop.debt
            WHERE status = 'open'
            GROUP BY kind
            ",
        )
        .fetch_all(self.pool)
        .await?;

        let mut balances = OpenBalances::default();
        for (kind, total) in rows {
            match kind {
                DebtKind::Receivable => balances.receivable = total,
                DebtKind::Payable => balances.payable = total,
            }
        }
        Ok(balances)
    }
}

/// Paid total and status after a checked payment of `amount`.
fn apply_payment(debt: &Debt, amount: Decimal) -> (Decimal, DebtStatus) {
    let paid = debt.paid + amount;
    let status = if paid >= debt.amount {
        DebtStatus::Settled
    } else {
        DebtStatus::Open
    };
    (paid, status)
}

async fn fetch_payments<'e, E>(executor: E, id: DebtId) -> Result<Vec<DebtPayment>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let rows = sqlx::query_as::<_, DebtPaymentRow>(
        r"
        SELECT id, debt_id, amount, paid_on, note, cashflow_entry_id, created_at
        FROM shop.debt_payment
        WHERE debt_id = $1
        ORDER BY paid_on, id
        ",
    )
    .bind(id)
    .fetch_all(executor)
    .await?;

    Ok(rows.into_iter().map(Into::into).collect())
}
