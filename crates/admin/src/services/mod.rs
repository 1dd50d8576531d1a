//! Business logic services for admin.
//!
//! # Services
//!
//! - `attendance` - Clock-in classification in shop-local time
//! - `auth` - Username/password authentication (Argon2id)
//! - `payroll` - Pay computation from attendance
//! - `receipt` - Printable HTML receipts

pub mod attendance;
pub mod auth;
pub mod payroll;
pub mod receipt;

pub use auth::{AdminAuthError, AdminAuthService};
