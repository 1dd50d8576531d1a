//! Dashboard overview.

use axum::{Json, Router, extract::State, routing::get};
use chrono::{Datelike, Days, NaiveDate, Utc};
use serde::Serialize;
use tracing::instrument;

use laptop_shop_core::product::Product;

use crate::db::dashboard::{SalesTotal, StatusCount, TopProduct};
use crate::db::debts::OpenBalances;
use crate::db::{DashboardRepository, DebtRepository, ProductRepository};
use crate::error::{AppError, Result};
use crate::middleware::RequireAdminAuth;
use crate::state::AppState;

/// Everything on the dashboard.
#[derive(Debug, Serialize)]
pub struct DashboardOverview {
    pub today: NaiveDate,
    pub sales_today: SalesTotal,
    pub sales_this_month: SalesTotal,
    pub orders_by_status: Vec<StatusCount>,
    /// Best sellers of the current month.
    pub top_products: Vec<TopProduct>,
    pub low_stock_threshold: i32,
    pub low_stock: Vec<Product>,
    pub open_debts: OpenBalances,
}

/// Build the dashboard router.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/dashboard", get(overview))
}

/// GET /api/dashboard
#[instrument(skip_all)]
async fn overview(
    _: RequireAdminAuth,
    State(state): State<AppState>,
) -> Result<Json<DashboardOverview>> {
    let shop = &state.config().shop;
    let today = shop.local_date(Utc::now());
    let tomorrow = today
        .checked_add_days(Days::new(1))
        .ok_or_else(|| AppError::Internal("date out of range".to_owned()))?;
    let month_start = today.with_day(1).unwrap_or(today);

    let end = shop.day_start(tomorrow);
    let today_start = shop.day_start(today);
    let month_start = shop.day_start(month_start);

    let dashboard = DashboardRepository::new(state.pool());
    let (sales_today, sales_this_month, orders_by_status, top_products) = tokio::try_join!(
        dashboard.sales_between(today_start, end),
        dashboard.sales_between(month_start, end),
        dashboard.status_counts(),
        dashboard.top_products(month_start),
    )?;

    let low_stock = ProductRepository::new(state.pool())
        .low_stock(shop.low_stock_threshold)
        .await?;
    let open_debts = DebtRepository::new(state.pool()).open_balances().await?;

    Ok(Json(DashboardOverview {
        today,
        sales_today,
        sales_this_month,
        orders_by_status,
        top_products,
        low_stock_threshold: shop.low_stock_threshold,
        low_stock,
        open_debts,
    }))
}
