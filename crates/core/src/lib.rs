//! Laptop Shop Core - Shared types and order placement.
//!
//! This crate provides the pieces used by every Laptop Shop component:
//! - `storefront` - Public catalog, cart and checkout API
//! - `admin` - Back-office console (orders, POS, cashflow, attendance)
//! - `cli` - Command-line tools for migrations and seeding
//!
//! # Architecture
//!
//! Without features the crate is pure: types, cart arithmetic and checkout
//! validation, no I/O. The `postgres` feature adds [`db`], the repository
//! that both binaries go through to place and cancel orders, so the stock
//! invariant lives in exactly one place.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, prices, phone numbers, statuses and locales
//! - [`cart`] - Session cart lines and pricing
//! - [`checkout`] - Checkout request validation and stock checks
//! - [`product`] - Catalog product model and input validation
//! - [`db`] - Product and order repositories (`postgres` feature)

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod checkout;
#[cfg(feature = "postgres")]
pub mod db;
pub mod product;
pub mod types;

pub use types::*;
