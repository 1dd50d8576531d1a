//! Shared `PostgreSQL` access for order placement.
//!
//! # Tables (schema `shop`)
//!
//! - `product` - Catalog rows with facet columns and the `stock` counter
//! - `customer_order` - Order headers (storefront checkouts and POS sales)
//! - `order_line` - Lines with name and unit price captured at purchase time
//!
//! The back-office tables (`cashflow_entry`, `debt`, `employee`, ...) are
//! owned by the admin crate but live in the same migration set.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/core/migrations/` and run via:
//! ```bash
//! cargo run -p laptop-shop-cli -- migrate
//! ```

pub mod orders;
pub mod products;

use thiserror::Error;

pub use orders::{
    NewOrder, Order, OrderFilter, OrderLine, OrderRepository, OrderSummary, PaymentDetails,
    PlaceOrderError, SaleIncome, StatusChangeError,
};
pub use products::ProductRepository;

/// How many times a transaction is attempted before a serialization
/// failure or deadlock is reported to the caller.
pub const MAX_TRANSACTION_ATTEMPTS: u32 = 5;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., duplicate slug).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Whether `err` is a transient conflict that a fresh transaction may not hit.
///
/// `40001` is `serialization_failure`, `40P01` is `deadlock_detected`.
#[must_use]
pub fn is_transient(err: &sqlx::Error) -> bool {
    sqlx_state(err).is_some_and(|code| code == "40001" || code == "40P01")
}

/// Whether `err` is a unique violation, optionally on a specific constraint.
#[must_use]
pub fn is_unique_violation(err: &sqlx::Error, constraint: Option<&str>) -> bool {
    let sqlx::Error::Database(db) = err else {
        return false;
    };
    db.code().as_deref() == Some("23505")
        && constraint.is_none_or(|name| db.constraint() == Some(name))
}

fn sqlx_state(err: &sqlx::Error) -> Option<String> {
    match err {
        sqlx::Error::Database(db) => db.code().map(std::borrow::Cow::into_owned),
        _ => None,
    }
}
