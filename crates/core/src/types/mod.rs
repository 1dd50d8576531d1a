//! Core types for Laptop Shop.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod locale;
pub mod phone;
pub mod price;
pub mod status;

pub use id::*;
pub use locale::{Locale, Message};
pub use phone::{PhoneError, PhoneNumber};
pub use price::{CurrencyCode, Price};
pub use status::*;
