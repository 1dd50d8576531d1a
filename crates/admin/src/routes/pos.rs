//! Point-of-sale: register sales.
//!
//! A sale is an in-store order placed through the same atomic path as the
//! storefront checkout, created directly as completed and paid. The
//! matching income entry is written in the same transaction.

use axum::{Json, Router, extract::State, http::StatusCode, routing::post};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use laptop_shop_core::cart::CartLine;
use laptop_shop_core::checkout::merge_lines;
use laptop_shop_core::db::{NewOrder, Order, PaymentDetails, SaleIncome};
use laptop_shop_core::{AdminUserId, OrderKind, OrderStatus, PaymentMethod, PhoneNumber};

use crate::db::OrderRepository;
use crate::db::cashflow::POS_SALE_CATEGORY;
use crate::error::{AppError, Result};
use crate::middleware::RequireAdminAuth;
use crate::state::AppState;

/// Name recorded when the cashier does not ask for one.
const WALK_IN_CUSTOMER: &str = "Walk-in customer";

/// A register sale.
#[derive(Debug, Deserialize)]
pub struct SaleRequest {
    pub lines: Vec<CartLine>,
    pub payment_method: PaymentMethod,
    pub amount_tendered: Decimal,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub phone: Option<PhoneNumber>,
    #[serde(default)]
    pub note: Option<String>,
}

/// A completed sale.
#[derive(Debug, Serialize)]
pub struct SaleResponse {
    pub order: Order,
    pub change: Decimal,
    pub receipt_url: String,
}

/// Build the POS router.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/pos/sales", post(create_sale))
}

/// Turn a register request into an order that books its own income.
fn sale_order(req: SaleRequest, cashier: AdminUserId, today: NaiveDate) -> Result<NewOrder> {
    let lines = merge_lines(&req.lines).map_err(|e| AppError::Validation(e.to_string()))?;
    if req.amount_tendered.is_sign_negative() {
        return Err(AppError::Validation(
            "amount tendered cannot be negative".to_owned(),
        ));
    }

    let customer_name = req
        .customer_name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or(WALK_IN_CUSTOMER)
        .to_owned();

    Ok(NewOrder {
        kind: OrderKind::InStore,
        status: OrderStatus::Completed,
        customer_name,
        phone: req.phone,
        shipping_address: None,
        reservation_at: None,
        note: req.note.map(|n| n.trim().to_owned()).filter(|n| !n.is_empty()),
        lines,
        payment: Some(PaymentDetails {
            method: req.payment_method,
            tendered: req.amount_tendered,
        }),
        income: Some(SaleIncome {
            category: POS_SALE_CATEGORY.to_owned(),
            entry_date: today,
            label: "POS".to_owned(),
        }),
        created_by: Some(cashier),
    })
}

/// POST /api/pos/sales
#[instrument(skip(admin, state, req), fields(admin_id = %admin.id, method = ?req.payment_method))]
async fn create_sale(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Json(req): Json<SaleRequest>,
) -> Result<(StatusCode, Json<SaleResponse>)> {
    let today = state.config().shop.local_date(Utc::now());
    let new_order = sale_order(req, admin.id, today)?;

    let order = OrderRepository::new(state.pool())
        .place_order(&new_order)
        .await?;

    let change = order.change_due.unwrap_or_default();
    info!(
        order_number = %order.number,
        total = %order.total,
        change = %change,
        items = order.item_count(),
        "POS sale completed"
    );

    let receipt_url = format!("/api/orders/{}/receipt", order.id);
    Ok((
        StatusCode::CREATED,
        Json(SaleResponse {
            order,
            change,
            receipt_url,
        }),
    ))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use laptop_shop_core::ProductId;

    use super::*;

    fn request(lines: Vec<CartLine>) -> SaleRequest {
        SaleRequest {
            lines,
            payment_method: PaymentMethod::Cash,
            amount_tendered: Decimal::from(3_000_000),
            customer_name: Some("  ".to_owned()),
            phone: None,
            note: None,
        }
    }

    fn line(id: i32, quantity: u32) -> CartLine {
        CartLine {
            product_id: ProductId::new(id),
            quantity,
        }
    }

    #[test]
    fn test_sale_order_books_income_in_placement() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
        let order = sale_order(
            request(vec![line(3, 1), line(1, 1), line(3, 1)]),
            AdminUserId::new(9),
            today,
        )
        .unwrap();

        assert_eq!(order.kind, OrderKind::InStore);
        assert_eq!(order.status, OrderStatus::Completed);
        assert_eq!(order.customer_name, WALK_IN_CUSTOMER);
        assert_eq!(order.lines, vec![line(1, 1), line(3, 2)]);
        assert_eq!(order.created_by, Some(AdminUserId::new(9)));

        let income = order.income.unwrap();
        assert_eq!(income.category, POS_SALE_CATEGORY);
        assert_eq!(income.entry_date, today);
    }

    #[test]
    fn test_sale_order_rejects_bad_input() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
        assert!(matches!(
            sale_order(request(Vec::new()), AdminUserId::new(1), today),
            Err(AppError::Validation(_))
        ));

        let mut negative = request(vec![line(1, 1)]);
        negative.amount_tendered = Decimal::from(-1);
        assert!(matches!(
            sale_order(negative, AdminUserId::new(1), today),
            Err(AppError::Validation(_))
        ));
    }
}
