//! Checkout route handler.
//!
//! Checkout takes the cart from the session, validates the contact and
//! delivery details, and places the order in one transaction that
//! re-checks and decrements stock. The cart is cleared only after the
//! order commits; any failure leaves it untouched.

use axum::{Json, extract::State, http::StatusCode};
use chrono::{DateTime, Utc};
use laptop_shop_core::OrderKind;
use laptop_shop_core::cart::Cart;
use laptop_shop_core::checkout::{CheckoutRequest, ShippingAddress, validate_request};
use laptop_shop_core::db::{NewOrder, Order, OrderRepository, PlaceOrderError};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::{error, info, instrument, warn};

use super::cart::{load_cart, save_cart};
use crate::error::{AppError, Result, add_breadcrumb};
use crate::middleware::RequestLocale;
use crate::models::session_keys;
use crate::services::whatsapp::{self, WhatsAppHandoff};
use crate::state::AppState;

/// How many order numbers a session remembers for tracking without a phone.
const RECENT_ORDERS_LIMIT: usize = 10;

/// Checkout form. Lines come from the session cart.
#[derive(Debug, Deserialize)]
pub struct CheckoutForm {
    pub customer_name: String,
    pub phone: String,
    pub kind: OrderKind,
    #[serde(default)]
    pub shipping_address: Option<ShippingAddress>,
    #[serde(default)]
    pub reservation_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub note: Option<String>,
}

/// Successful checkout response.
#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub order: Order,
    /// Absent only if the message could not be rendered; the order stands.
    pub whatsapp: Option<WhatsAppHandoff>,
}

/// Place an order from the session cart.
#[instrument(skip(state, session, form), fields(kind = ?form.kind))]
pub async fn place(
    State(state): State<AppState>,
    RequestLocale(locale): RequestLocale,
    session: Session,
    Json(form): Json<CheckoutForm>,
) -> Result<(StatusCode, Json<CheckoutResponse>)> {
    let cart = load_cart(&session).await?;

    let request = CheckoutRequest {
        customer_name: form.customer_name,
        phone: form.phone,
        kind: form.kind,
        shipping_address: form.shipping_address,
        reservation_at: form.reservation_at,
        note: form.note,
        lines: cart.lines().to_vec(),
    };
    let validated =
        validate_request(request, Utc::now()).map_err(|error| AppError::Checkout {
            error,
            locale,
        })?;

    let order = OrderRepository::new(state.pool())
        .place_order(&NewOrder::from(validated))
        .await
        .map_err(|e| {
            if let PlaceOrderError::Checkout(reason) = &e {
                warn!(reason = %reason, "Checkout rejected");
            }
            AppError::from_place_order(e, locale)
        })?;

    // The order is committed; from here on nothing may fail the request.
    state.invalidate_catalog().await;
    if let Err(e) = save_cart(&session, &Cart::new()).await {
        warn!(error = %e, order_number = %order.number, "Failed to clear cart after checkout");
    }
    remember_order(&session, &order.number).await;

    add_breadcrumb("checkout", "Order placed", &[("order_number", order.number.clone())]);
    info!(
        order_number = %order.number,
        total = %order.total,
        items = order.item_count(),
        "Checkout completed"
    );

    let whatsapp = whatsapp::handoff(&order, &state.config().store, locale)
        .inspect_err(|e| {
            error!(
                error = %e,
                order_number = %order.number,
                "Failed to render WhatsApp handoff"
            );
        })
        .ok();

    Ok((StatusCode::CREATED, Json(CheckoutResponse { order, whatsapp })))
}

async fn remember_order(session: &Session, number: &str) {
    let mut recent: Vec<String> = session
        .get(session_keys::RECENT_ORDERS)
        .await
        .ok()
        .flatten()
        .unwrap_or_default();
    recent.push(number.to_owned());
    if recent.len() > RECENT_ORDERS_LIMIT {
        recent.drain(..recent.len() - RECENT_ORDERS_LIMIT);
    }
    if let Err(e) = session.insert(session_keys::RECENT_ORDERS, recent).await {
        warn!(error = %e, "Failed to remember order in session");
    }
}
