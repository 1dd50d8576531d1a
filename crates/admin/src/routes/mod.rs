//! HTTP route handlers for admin.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                        - Liveness check
//! GET    /health/ready                  - Readiness check (database)
//!
//! # Auth
//! POST   /api/auth/login                - Username/password login
//! POST   /api/auth/logout               - Logout
//! GET    /api/auth/me                   - Current admin
//!
//! # Staff accounts (owner)
//! GET    /api/users                     - List accounts
//! POST   /api/users                     - Create account
//! PATCH  /api/users/{id}/access         - Change role / active flag
//! PUT    /api/users/{id}/password       - Reset password
//!
//! # Catalog (list: any role, changes: admin)
//! GET    /api/products                  - List (?all=true includes inactive)
//! POST   /api/products                  - Create
//! GET    /api/products/{id}             - Detail
//! PUT    /api/products/{id}             - Update
//! POST   /api/products/{id}/activate    - Activate
//! POST   /api/products/{id}/deactivate  - Deactivate
//! POST   /api/products/{id}/stock       - Adjust stock by a signed delta
//!
//! # Orders (read: any role, changes: admin)
//! GET    /api/orders                    - List with filters
//! GET    /api/orders/{id}               - Detail
//! PATCH  /api/orders/{id}/status        - Status transition
//! POST   /api/orders/{id}/cancel        - Cancel and restock
//! GET    /api/orders/{id}/receipt       - Printable HTML receipt
//!
//! # POS (any role)
//! POST   /api/pos/sales                 - Register sale
//!
//! # Books (admin)
//! GET    /api/cashflow                  - Entries in a date range
//! POST   /api/cashflow                  - Record entry
//! DELETE /api/cashflow/{id}             - Delete entry
//! GET    /api/cashflow/summary          - Totals and per-category breakdown
//! GET    /api/debts                     - List debts
//! POST   /api/debts                     - Record debt
//! GET    /api/debts/overdue             - Open debts past due
//! GET    /api/debts/{id}                - Detail with payments
//! POST   /api/debts/{id}/payments       - Record payment
//!
//! # Staff
//! GET    /api/employees                 - List (any role)
//! POST   /api/employees                 - Create (admin)
//! PUT    /api/employees/{id}            - Update (admin)
//! POST   /api/employees/{id}/deactivate - Deactivate (admin)
//! POST   /api/employees/{id}/clock-in   - Clock in (any role)
//! POST   /api/employees/{id}/clock-out  - Clock out (any role)
//! GET    /api/attendance                - Attendance in a date range
//! POST   /api/attendance                - Record absent/leave day
//! GET    /api/payroll                   - Payroll report (owner)
//!
//! # Dashboard (any role)
//! GET    /api/dashboard                 - Overview
//! ```

pub mod admin_users;
pub mod auth;
pub mod cashflow;
pub mod dashboard;
pub mod debts;
pub mod orders;
pub mod pos;
pub mod products;
pub mod staff;

use axum::Router;
use chrono::{Datelike, NaiveDate};
use serde::Deserialize;

use crate::error::AppError;
use crate::state::AppState;

/// Longest range a report may cover.
const MAX_RANGE_DAYS: i64 = 366;

/// An inclusive `from`/`to` date query. Missing bounds default to the
/// current month up to today.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct DateRange {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl DateRange {
    /// Resolve the bounds against the shop-local `today`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` if `from` is after `to` or the range
    /// is longer than a year.
    pub fn resolve(self, today: NaiveDate) -> Result<(NaiveDate, NaiveDate), AppError> {
        let to = self.to.unwrap_or(today);
        let from = self
            .from
            .unwrap_or_else(|| to.with_day(1).unwrap_or(to));

        if from > to {
            return Err(AppError::Validation(format!(
                "range start {from} is after end {to}"
            )));
        }
        if (to - from).num_days() >= MAX_RANGE_DAYS {
            return Err(AppError::Validation(format!(
                "range may cover at most {MAX_RANGE_DAYS} days"
            )));
        }
        Ok((from, to))
    }
}

/// Create all routes for the admin console.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(auth::router())
        .merge(admin_users::router())
        .merge(products::router())
        .merge(orders::router())
        .merge(pos::router())
        .merge(cashflow::router())
        .merge(debts::router())
        .merge(staff::router())
        .merge(dashboard::router())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_date_range_defaults_to_month_to_date() {
        let today = date(2025, 6, 18);
        let (from, to) = DateRange::default().resolve(today).unwrap();
        assert_eq!(from, date(2025, 6, 1));
        assert_eq!(to, today);
    }

    #[test]
    fn test_date_range_from_defaults_to_start_of_to_month() {
        let range = DateRange {
            from: None,
            to: Some(date(2025, 2, 20)),
        };
        let (from, to) = range.resolve(date(2025, 6, 18)).unwrap();
        assert_eq!(from, date(2025, 2, 1));
        assert_eq!(to, date(2025, 2, 20));
    }

    #[test]
    fn test_date_range_rejects_reversed_and_long_ranges() {
        let today = date(2025, 6, 18);
        let reversed = DateRange {
            from: Some(date(2025, 6, 10)),
            to: Some(date(2025, 6, 1)),
        };
        assert!(matches!(
            reversed.resolve(today),
            Err(AppError::Validation(_))
        ));

        let long = DateRange {
            from: Some(date(2023, 1, 1)),
            to: Some(date(2025, 1, 1)),
        };
        assert!(long.resolve(today).is_err());

        let single_day = DateRange {
            from: Some(today),
            to: Some(today),
        };
        assert_eq!(single_day.resolve(today).unwrap(), (today, today));
    }
}
