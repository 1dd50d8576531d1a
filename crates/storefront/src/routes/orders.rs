//! Order tracking.
//!
//! Anyone holding an order number could guess at it, so the lookup also
//! needs the phone number used at checkout, unless the order was placed in
//! the current session. Mismatches answer 404, the same as unknown numbers.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use chrono::{DateTime, Utc};
use laptop_shop_core::db::{Order, OrderLine, OrderRepository};
use laptop_shop_core::{OrderKind, OrderStatus, PhoneNumber, Price};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::middleware::RequestLocale;
use crate::models::session_keys;
use crate::services::whatsapp::{self, WhatsAppHandoff};
use crate::state::AppState;

/// Tracking query.
#[derive(Debug, Deserialize)]
pub struct TrackQuery {
    pub phone: Option<String>,
}

/// What a shopper sees about their order.
#[derive(Debug, Serialize)]
pub struct OrderStatusView {
    pub number: String,
    pub kind: OrderKind,
    pub status: OrderStatus,
    pub customer_name: String,
    pub reservation_at: Option<DateTime<Utc>>,
    pub total: Price,
    pub total_display: String,
    pub lines: Vec<OrderLine>,
    pub created_at: DateTime<Utc>,
    /// Handoff link, re-offered while the order still awaits confirmation.
    pub whatsapp: Option<WhatsAppHandoff>,
}

/// Look up an order by number.
#[instrument(skip(state, session, query))]
pub async fn show(
    State(state): State<AppState>,
    RequestLocale(locale): RequestLocale,
    session: Session,
    Path(number): Path<String>,
    Query(query): Query<TrackQuery>,
) -> Result<Json<OrderStatusView>> {
    let order = OrderRepository::new(state.pool())
        .find_by_number(&number)
        .await?
        .ok_or(AppError::OrderNotFound(locale))?;

    let placed_here = session
        .get::<Vec<String>>(session_keys::RECENT_ORDERS)
        .await?
        .is_some_and(|recent| recent.contains(&order.number));

    if !placed_here && !phone_matches(&order, query.phone.as_deref()) {
        return Err(AppError::OrderNotFound(locale));
    }

    let store = &state.config().store;
    let whatsapp = (order.status == OrderStatus::Pending)
        .then(|| whatsapp::handoff(&order, store, locale).ok())
        .flatten();
    let total = Price::new(order.total, store.currency);

    Ok(Json(OrderStatusView {
        number: order.number,
        kind: order.kind,
        status: order.status,
        customer_name: order.customer_name,
        reservation_at: order.reservation_at,
        total_display: total.display(),
        total,
        lines: order.lines,
        created_at: order.created_at,
        whatsapp,
    }))
}

fn phone_matches(order: &Order, given: Option<&str>) -> bool {
    let (Some(stored), Some(given)) = (order.phone.as_ref(), given) else {
        return false;
    };
    PhoneNumber::parse(given).is_ok_and(|given| stored.same_subscriber(&given))
}
