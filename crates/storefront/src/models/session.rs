//! Session keys.
//!
//! The storefront has no accounts; the session only carries shopper state.

/// Session keys for shopper data.
pub mod keys {
    /// Key for the shopper's [`Cart`](laptop_shop_core::cart::Cart).
    pub const CART: &str = "cart";

    /// Key for the shopper's chosen [`Locale`](laptop_shop_core::Locale).
    pub const LOCALE: &str = "locale";

    /// Key for numbers of orders placed in this session, newest last.
    pub const RECENT_ORDERS: &str = "recent_orders";
}
