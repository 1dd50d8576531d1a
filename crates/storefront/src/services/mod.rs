//! Business logic services for storefront.
//!
//! # Services
//!
//! - `whatsapp` - Order handoff message and `wa.me` link

pub mod whatsapp;
