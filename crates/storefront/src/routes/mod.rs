//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (database)
//!
//! # Catalog
//! GET  /api/products           - Listing with facet counts and price bounds
//! GET  /api/products/{slug}    - Product detail
//!
//! # Cart (session)
//! GET  /api/cart               - Priced cart
//! POST /api/cart/add           - Add a product
//! POST /api/cart/update        - Set a line's quantity
//! POST /api/cart/remove        - Remove a line
//! POST /api/cart/clear         - Empty the cart
//!
//! # Checkout
//! POST /api/checkout           - Place the order, returns WhatsApp handoff
//! GET  /api/orders/{number}    - Order tracking (?phone= must match)
//! ```

pub mod cart;
pub mod checkout;
pub mod orders;
pub mod products;

use axum::{
    Router,
    routing::{get, post},
};

use crate::middleware::{cart_rate_limiter, checkout_rate_limiter};
use crate::state::AppState;

/// Create the catalog routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/{slug}", get(products::show))
}

/// Create the cart routes router.
///
/// Mutations are rate limited; reading the cart is not.
pub fn cart_routes() -> Router<AppState> {
    let mutations = Router::new()
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
        .layer(cart_rate_limiter());

    Router::new().route("/", get(cart::show)).merge(mutations)
}

/// Create all API routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/api/products", product_routes())
        .nest("/api/cart", cart_routes())
        .route(
            "/api/checkout",
            post(checkout::place).layer(checkout_rate_limiter()),
        )
        .route("/api/orders/{number}", get(orders::show))
}
