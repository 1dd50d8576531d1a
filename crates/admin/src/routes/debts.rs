//! Receivables and payables.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use chrono::Utc;
use serde::Deserialize;
use tracing::instrument;

use laptop_shop_core::{DebtId, DebtKind, DebtStatus};

use crate::db::DebtRepository;
use crate::db::debts::{DebtDetail, NewDebt, NewDebtPayment};
use crate::error::{AppError, Result};
use crate::middleware::{RequireRole, StoreAdmin};
use crate::models::Debt;
use crate::state::AppState;

/// Query for the debt list.
#[derive(Debug, Default, Deserialize)]
pub struct DebtListQuery {
    pub kind: Option<DebtKind>,
    pub status: Option<DebtStatus>,
}

/// Build the debts router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/debts", get(index).post(create))
        .route("/api/debts/overdue", get(overdue))
        .route("/api/debts/{id}", get(show))
        .route("/api/debts/{id}/payments", post(record_payment))
}

/// GET /api/debts
#[instrument(skip_all)]
async fn index(
    _: RequireRole<StoreAdmin>,
    State(state): State<AppState>,
    Query(query): Query<DebtListQuery>,
) -> Result<Json<Vec<Debt>>> {
    let debts = DebtRepository::new(state.pool())
        .list(query.kind, query.status)
        .await?;
    Ok(Json(debts))
}

/// GET /api/debts/overdue
///
/// Open debts past their due date in shop-local time.
#[instrument(skip_all)]
async fn overdue(
    _: RequireRole<StoreAdmin>,
    State(state): State<AppState>,
) -> Result<Json<Vec<Debt>>> {
    let today = state.config().shop.local_date(Utc::now());
    let debts = DebtRepository::new(state.pool()).overdue(today).await?;
    Ok(Json(debts))
}

/// POST /api/debts
#[instrument(skip(admin, state, debt), fields(admin_id = %admin.id, kind = ?debt.kind))]
async fn create(
    RequireRole(admin, _): RequireRole<StoreAdmin>,
    State(state): State<AppState>,
    Json(debt): Json<NewDebt>,
) -> Result<(StatusCode, Json<Debt>)> {
    debt.validate().map_err(AppError::Validation)?;
    let created = DebtRepository::new(state.pool()).create(&debt).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /api/debts/{id}
#[instrument(skip_all, fields(debt_id = %id))]
async fn show(
    _: RequireRole<StoreAdmin>,
    State(state): State<AppState>,
    Path(id): Path<DebtId>,
) -> Result<Json<DebtDetail>> {
    DebtRepository::new(state.pool())
        .get(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("debt".to_owned()))
}

/// POST /api/debts/{id}/payments
#[instrument(skip(admin, state, payment), fields(debt_id = %id, amount = %payment.amount))]
async fn record_payment(
    RequireRole(admin, _): RequireRole<StoreAdmin>,
    State(state): State<AppState>,
    Path(id): Path<DebtId>,
    Json(payment): Json<NewDebtPayment>,
) -> Result<(StatusCode, Json<DebtDetail>)> {
    let detail = DebtRepository::new(state.pool())
        .record_payment(id, &payment, Some(admin.id))
        .await?;
    Ok((StatusCode::CREATED, Json(detail)))
}
