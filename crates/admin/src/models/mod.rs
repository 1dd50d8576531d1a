//! Domain models for admin.
//!
//! Orders and products are shared with the storefront and live in
//! `laptop_shop_core`; the types here are back-office only.

pub mod admin_user;
pub mod bookkeeping;
pub mod session;
pub mod staff;

pub use admin_user::{AdminRole, AdminUser};
pub use bookkeeping::{CashflowEntry, CashflowSummary, CategoryTotal, Debt, DebtPayment};
pub use session::{CurrentAdmin, keys as session_keys};
pub use staff::{AttendanceRecord, Employee};
