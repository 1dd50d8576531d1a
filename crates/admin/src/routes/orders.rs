//! Order listing, detail, status changes and receipts.
//!
//! Status changes and cancellation go through the shared order repository,
//! which validates the lifecycle and restocks on cancel in one transaction.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, patch, post},
};
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::{info, instrument};

use laptop_shop_core::db::{Order, OrderFilter, OrderSummary};
use laptop_shop_core::{OrderId, OrderKind, OrderStatus};

use crate::db::{AdminUserRepository, OrderRepository};
use crate::error::{AppError, Result};
use crate::middleware::{RequireAdminAuth, RequireRole, StoreAdmin};
use crate::services::receipt::ReceiptTemplate;
use crate::state::AppState;

const DEFAULT_PAGE_SIZE: i64 = 50;
const MAX_PAGE_SIZE: i64 = 200;

/// Query for the order list.
#[derive(Debug, Default, Deserialize)]
pub struct OrderListQuery {
    pub status: Option<OrderStatus>,
    pub kind: Option<OrderKind>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub q: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl OrderListQuery {
    fn into_filter(self) -> OrderFilter {
        OrderFilter {
            status: self.status,
            kind: self.kind,
            from: self.from,
            to: self.to,
            search: self.q.map(|q| q.trim().to_owned()).filter(|q| !q.is_empty()),
            limit: self
                .limit
                .unwrap_or(DEFAULT_PAGE_SIZE)
                .clamp(1, MAX_PAGE_SIZE),
            offset: self.offset.unwrap_or(0).max(0),
        }
    }
}

/// Requested status.
#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: OrderStatus,
}

/// Build the orders router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/orders", get(index))
        .route("/api/orders/{id}", get(show))
        .route("/api/orders/{id}/status", patch(update_status))
        .route("/api/orders/{id}/cancel", post(cancel))
        .route("/api/orders/{id}/receipt", get(receipt))
}

/// GET /api/orders
#[instrument(skip_all)]
async fn index(
    _: RequireAdminAuth,
    State(state): State<AppState>,
    Query(query): Query<OrderListQuery>,
) -> Result<Json<Vec<OrderSummary>>> {
    let orders = OrderRepository::new(state.pool())
        .list(&query.into_filter())
        .await?;
    Ok(Json(orders))
}

/// GET /api/orders/{id}
#[instrument(skip_all, fields(order_id = %id))]
async fn show(
    _: RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
) -> Result<Json<Order>> {
    load(&state, id).await.map(Json)
}

/// PATCH /api/orders/{id}/status
#[instrument(skip(admin, state, update), fields(order_id = %id, status = ?update.status))]
async fn update_status(
    RequireRole(admin, _): RequireRole<StoreAdmin>,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
    Json(update): Json<StatusUpdate>,
) -> Result<Json<Order>> {
    let order = OrderRepository::new(state.pool())
        .update_status(id, update.status)
        .await?;
    info!(
        admin_id = %admin.id,
        order_number = %order.number,
        status = order.status.as_str(),
        "Order status changed"
    );
    Ok(Json(order))
}

/// POST /api/orders/{id}/cancel
#[instrument(skip(admin, state), fields(order_id = %id))]
async fn cancel(
    RequireRole(admin, _): RequireRole<StoreAdmin>,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
) -> Result<Json<Order>> {
    let order = OrderRepository::new(state.pool()).cancel_order(id).await?;
    info!(admin_id = %admin.id, order_number = %order.number, "Order cancelled");
    Ok(Json(order))
}

/// GET /api/orders/{id}/receipt
///
/// Printable HTML receipt.
#[instrument(skip_all, fields(order_id = %id))]
async fn receipt(
    _: RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
) -> Result<ReceiptTemplate> {
    let order = load(&state, id).await?;

    let cashier = match order.created_by {
        Some(admin_id) => AdminUserRepository::new(state.pool())
            .get_by_id(admin_id)
            .await?
            .map(|user| user.name),
        None => None,
    };

    Ok(ReceiptTemplate::new(&order, &state.config().shop, cashier))
}

async fn load(state: &AppState, id: OrderId) -> Result<Order> {
    OrderRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("order".to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_query_clamps_paging() {
        let filter = OrderListQuery {
            limit: Some(10_000),
            offset: Some(-5),
            q: Some("   ".to_owned()),
            ..OrderListQuery::default()
        }
        .into_filter();
        assert_eq!(filter.limit, MAX_PAGE_SIZE);
        assert_eq!(filter.offset, 0);
        assert_eq!(filter.search, None);

        let filter = OrderListQuery::default().into_filter();
        assert_eq!(filter.limit, DEFAULT_PAGE_SIZE);
    }
}
