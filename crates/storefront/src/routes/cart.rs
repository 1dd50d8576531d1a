//! Cart route handlers.
//!
//! The cart lives in the session as product IDs and quantities. Every
//! response prices it against the cached catalog, so shoppers see current
//! prices and any line that now exceeds stock.

use std::collections::HashMap;

use axum::{Json, extract::State};
use laptop_shop_core::ProductId;
use laptop_shop_core::cart::{Cart, MAX_LINE_QUANTITY, PricedCart};
use laptop_shop_core::checkout::ProductSnapshot;
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, Result, add_breadcrumb};
use crate::models::session_keys;
use crate::state::AppState;

/// Cart response.
#[derive(Debug, Serialize)]
pub struct CartView {
    #[serde(flatten)]
    pub priced: PricedCart,
    pub subtotal_display: String,
    /// Some line asks for more than is in stock; checkout will fail.
    pub has_stock_problems: bool,
}

/// Add to cart request.
#[derive(Debug, Deserialize)]
pub struct AddToCart {
    pub product_id: ProductId,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

const fn default_quantity() -> u32 {
    1
}

/// Set quantity request. Zero removes the line.
#[derive(Debug, Deserialize)]
pub struct UpdateCart {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Remove line request.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCart {
    pub product_id: ProductId,
}

// =============================================================================
// Session Helpers
// =============================================================================

/// Load the cart from the session (empty if none).
pub(crate) async fn load_cart(session: &Session) -> Result<Cart> {
    Ok(session
        .get::<Cart>(session_keys::CART)
        .await?
        .unwrap_or_default())
}

/// Store the cart in the session.
pub(crate) async fn save_cart(session: &Session, cart: &Cart) -> Result<()> {
    session.insert(session_keys::CART, cart).await?;
    Ok(())
}

/// Price `cart` against the cached catalog.
async fn view(state: &AppState, cart: &Cart) -> Result<CartView> {
    let products = state.catalog().await?;
    let snapshots: HashMap<ProductId, ProductSnapshot> =
        products.iter().map(|p| (p.id, p.snapshot())).collect();

    let priced = cart.price(|id| snapshots.get(&id), state.config().store.currency);
    Ok(CartView {
        subtotal_display: priced.subtotal.display(),
        has_stock_problems: priced.lines.iter().any(|l| l.exceeds_stock)
            || !priced.unavailable.is_empty(),
        priced,
    })
}

// =============================================================================
// Handlers
// =============================================================================

/// Show the priced cart.
#[instrument(skip(state, session))]
pub async fn show(State(state): State<AppState>, session: Session) -> Result<Json<CartView>> {
    let cart = load_cart(&session).await?;
    Ok(Json(view(&state, &cart).await?))
}

/// Add a product to the cart.
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Json(req): Json<AddToCart>,
) -> Result<Json<CartView>> {
    if req.quantity == 0 || req.quantity > MAX_LINE_QUANTITY {
        return Err(AppError::BadRequest(format!(
            "quantity must be between 1 and {MAX_LINE_QUANTITY}"
        )));
    }

    let products = state.catalog().await?;
    if !products.iter().any(|p| p.id == req.product_id) {
        return Err(AppError::NotFound(format!("product {}", req.product_id)));
    }

    let mut cart = load_cart(&session).await?;
    cart.add(req.product_id, req.quantity);
    save_cart(&session, &cart).await?;

    add_breadcrumb(
        "cart",
        "Added to cart",
        &[
            ("product_id", req.product_id.to_string()),
            ("quantity", req.quantity.to_string()),
        ],
    );

    Ok(Json(view(&state, &cart).await?))
}

/// Set the quantity of a line already in the cart.
#[instrument(skip(state, session))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    Json(req): Json<UpdateCart>,
) -> Result<Json<CartView>> {
    if req.quantity > MAX_LINE_QUANTITY {
        return Err(AppError::BadRequest(format!(
            "quantity must be at most {MAX_LINE_QUANTITY}"
        )));
    }

    let mut cart = load_cart(&session).await?;
    if !cart.set_quantity(req.product_id, req.quantity) {
        return Err(AppError::NotFound(format!(
            "product {} is not in the cart",
            req.product_id
        )));
    }
    save_cart(&session, &cart).await?;

    Ok(Json(view(&state, &cart).await?))
}

/// Remove a line from the cart. Removing a missing line is not an error.
#[instrument(skip(state, session))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    Json(req): Json<RemoveFromCart>,
) -> Result<Json<CartView>> {
    let mut cart = load_cart(&session).await?;
    if cart.remove(req.product_id) {
        save_cart(&session, &cart).await?;
    }
    Ok(Json(view(&state, &cart).await?))
}

/// Empty the cart.
#[instrument(skip(state, session))]
pub async fn clear(State(state): State<AppState>, session: Session) -> Result<Json<CartView>> {
    let cart = Cart::new();
    save_cart(&session, &cart).await?;
    Ok(Json(view(&state, &cart).await?))
}
