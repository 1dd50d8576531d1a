//! Cashflow and debt domain types.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use laptop_shop_core::{
    AdminUserId, CashflowDirection, CashflowEntryId, DebtId, DebtKind, DebtPaymentId, DebtStatus,
    OrderId, PhoneNumber,
};

/// A single movement of money in or out of the shop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CashflowEntry {
    pub id: CashflowEntryId,
    pub direction: CashflowDirection,
    pub category: String,
    pub amount: Decimal,
    pub entry_date: NaiveDate,
    pub description: String,
    /// Set for POS sales.
    pub order_id: Option<OrderId>,
    pub created_by: Option<AdminUserId>,
    pub created_at: DateTime<Utc>,
}

/// Total for one category in one direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct CategoryTotal {
    pub direction: CashflowDirection,
    pub category: String,
    pub total: Decimal,
}

/// Income and expense over a date range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CashflowSummary {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub income: Decimal,
    pub expense: Decimal,
    pub net: Decimal,
    pub categories: Vec<CategoryTotal>,
}

impl CashflowSummary {
    /// Build a summary from per-category totals.
    #[must_use]
    pub fn from_totals(from: NaiveDate, to: NaiveDate, categories: Vec<CategoryTotal>) -> Self {
        let sum = |direction| {
            categories
                .iter()
                .filter(|c| c.direction == direction)
                .map(|c| c.total)
                .sum::<Decimal>()
        };
        let income = sum(CashflowDirection::Income);
        let expense = sum(CashflowDirection::Expense);
        Self {
            from,
            to,
            income,
            expense,
            net: income - expense,
            categories,
        }
    }
}

/// Money owed to or by the shop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Debt {
    pub id: DebtId,
    pub kind: DebtKind,
    pub status: DebtStatus,
    pub counterparty: String,
    pub phone: Option<PhoneNumber>,
    pub amount: Decimal,
    pub paid: Decimal,
    pub due_date: Option<NaiveDate>,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Debt {
    /// What is still owed.
    #[must_use]
    pub fn outstanding(&self) -> Decimal {
        self.amount - self.paid
    }

    /// Open and past its due date as of `today`.
    #[must_use]
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.status == DebtStatus::Open && self.due_date.is_some_and(|due| due < today)
    }
}

/// One installment against a debt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DebtPayment {
    pub id: DebtPaymentId,
    pub debt_id: DebtId,
    pub amount: Decimal,
    pub paid_on: NaiveDate,
    pub note: Option<String>,
    pub cashflow_entry_id: Option<CashflowEntryId>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, d).unwrap()
    }

    #[test]
    fn test_summary_totals() {
        let summary = CashflowSummary::from_totals(
            date(1),
            date(30),
            vec![
                CategoryTotal {
                    direction: CashflowDirection::Income,
                    category: "pos_sale".to_owned(),
                    total: Decimal::from(30_000_000),
                },
                CategoryTotal {
                    direction: CashflowDirection::Income,
                    category: "debt_collection".to_owned(),
                    total: Decimal::from(2_000_000),
                },
                CategoryTotal {
                    direction: CashflowDirection::Expense,
                    category: "rent".to_owned(),
                    total: Decimal::from(5_000_000),
                },
            ],
        );
        assert_eq!(summary.income, Decimal::from(32_000_000));
        assert_eq!(summary.expense, Decimal::from(5_000_000));
        assert_eq!(summary.net, Decimal::from(27_000_000));
    }

    #[test]
    fn test_empty_summary_is_zero() {
        let summary = CashflowSummary::from_totals(date(1), date(1), Vec::new());
        assert_eq!(summary.net, Decimal::ZERO);
    }

    #[test]
    fn test_overdue_only_while_open() {
        let now = Utc::now();
        let mut debt = Debt {
            id: DebtId::new(1),
            kind: DebtKind::Receivable,
            status: DebtStatus::Open,
            counterparty: "Budi".to_owned(),
            phone: None,
            amount: Decimal::from(1_000_000),
            paid: Decimal::from(400_000),
            due_date: Some(date(10)),
            note: None,
            created_at: now,
            updated_at: now,
        };
        assert_eq!(debt.outstanding(), Decimal::from(600_000));
        assert!(!debt.is_overdue(date(10)));
        assert!(debt.is_overdue(date(11)));

        debt.status = DebtStatus::Settled;
        assert!(!debt.is_overdue(date(11)));
    }
}
