//! Database operations for the back office.
//!
//! # Tables (schema `shop`)
//!
//! - `admin_user` - Staff accounts (username + Argon2 hash)
//! - `cashflow_entry` - Income and expenses, including POS sales
//! - `debt`, `debt_payment` - Receivables and payables with installments
//! - `employee`, `attendance` - Staff and one attendance row per local day
//! - `session` - tower-sessions store (shared with the storefront)
//!
//! Products and orders go through the shared repositories in
//! `laptop_shop_core::db`, re-exported here.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/core/migrations/` and run via:
//! ```bash
//! cargo run -p laptop-shop-cli -- migrate
//! ```

pub mod admin_users;
pub mod attendance;
pub mod cashflow;
pub mod dashboard;
pub mod debts;
pub mod employees;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

pub use admin_users::AdminUserRepository;
pub use attendance::AttendanceRepository;
pub use cashflow::CashflowRepository;
pub use dashboard::DashboardRepository;
pub use debts::DebtRepository;
pub use employees::EmployeeRepository;
pub use laptop_shop_core::db::{OrderRepository, ProductRepository, RepositoryError};

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
