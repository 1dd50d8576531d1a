//! Cashflow ledger: income and expense entries and range summaries.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get},
};
use chrono::Utc;
use serde::Deserialize;
use tracing::{info, instrument};

use laptop_shop_core::{CashflowDirection, CashflowEntryId};

use super::DateRange;
use crate::db::CashflowRepository;
use crate::db::cashflow::NewCashflowEntry;
use crate::error::{AppError, Result};
use crate::middleware::{RequireRole, StoreAdmin};
use crate::models::{CashflowEntry, CashflowSummary};
use crate::state::AppState;

/// Query for the entry list.
#[derive(Debug, Default, Deserialize)]
pub struct CashflowListQuery {
    #[serde(flatten)]
    pub range: DateRange,
    pub direction: Option<CashflowDirection>,
}

/// Build the cashflow router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/cashflow", get(index).post(create))
        .route("/api/cashflow/summary", get(summary))
        .route("/api/cashflow/{id}", delete(remove))
}

/// GET /api/cashflow
#[instrument(skip_all)]
async fn index(
    _: RequireRole<StoreAdmin>,
    State(state): State<AppState>,
    Query(query): Query<CashflowListQuery>,
) -> Result<Json<Vec<CashflowEntry>>> {
    let (from, to) = query
        .range
        .resolve(state.config().shop.local_date(Utc::now()))?;
    let entries = CashflowRepository::new(state.pool())
        .list(from, to, query.direction)
        .await?;
    Ok(Json(entries))
}

/// POST /api/cashflow
#[instrument(
    skip(admin, state, entry),
    fields(direction = ?entry.direction, amount = %entry.amount)
)]
async fn create(
    RequireRole(admin, _): RequireRole<StoreAdmin>,
    State(state): State<AppState>,
    Json(mut entry): Json<NewCashflowEntry>,
) -> Result<(StatusCode, Json<CashflowEntry>)> {
    entry.validate().map_err(AppError::Validation)?;
    entry.created_by = Some(admin.id);

    let created = CashflowRepository::new(state.pool()).create(&entry).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// DELETE /api/cashflow/{id}
#[instrument(skip(admin, state), fields(entry_id = %id))]
async fn remove(
    RequireRole(admin, _): RequireRole<StoreAdmin>,
    State(state): State<AppState>,
    Path(id): Path<CashflowEntryId>,
) -> Result<StatusCode> {
    CashflowRepository::new(state.pool()).delete(id).await?;
    info!(admin_id = %admin.id, entry_id = %id, "Cashflow entry removed");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/cashflow/summary
#[instrument(skip_all)]
async fn summary(
    _: RequireRole<StoreAdmin>,
    State(state): State<AppState>,
    Query(range): Query<DateRange>,
) -> Result<Json<CashflowSummary>> {
    let (from, to) = range.resolve(state.config().shop.local_date(Utc::now()))?;
    let summary = CashflowRepository::new(state.pool())
        .summary(from, to)
        .await?;
    Ok(Json(summary))
}
