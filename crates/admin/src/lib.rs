//! Laptop Shop admin library.
//!
//! This crate provides the back-office functionality as a library,
//! allowing it to be tested and reused (the CLI creates staff accounts
//! through [`services::AdminAuthService`]).
//!
//! # Security
//!
//! This crate can change prices, stock, orders and the books. Serve it on
//! the shop's LAN or behind TLS (`ADMIN_TLS_CERT`/`ADMIN_TLS_KEY`), never
//! on the public storefront host.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
