//! Catalog management and stock adjustment.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use serde::Deserialize;
use tracing::{info, instrument};

use laptop_shop_core::ProductId;
use laptop_shop_core::product::{Product, ProductInput};

use crate::db::ProductRepository;
use crate::error::{AppError, Result};
use crate::middleware::{RequireAdminAuth, RequireRole, StoreAdmin};
use crate::state::AppState;

/// Query for the product list.
#[derive(Debug, Default, Deserialize)]
pub struct ProductListQuery {
    /// Include deactivated products.
    #[serde(default)]
    pub all: bool,
}

/// Largest stock change accepted in one request, either way.
const MAX_STOCK_DELTA: i32 = 1_000_000;

/// Signed stock change.
#[derive(Debug, Deserialize)]
pub struct StockAdjustment {
    pub delta: i32,
    #[serde(default)]
    pub reason: Option<String>,
}

/// Build the products router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/products", get(index).post(create))
        .route("/api/products/{id}", get(show).put(update))
        .route("/api/products/{id}/activate", post(activate))
        .route("/api/products/{id}/deactivate", post(deactivate))
        .route("/api/products/{id}/stock", post(adjust_stock))
}

/// GET /api/products
///
/// Cashiers see the list too; the POS picks products from it.
#[instrument(skip_all, fields(all = query.all))]
async fn index(
    _: RequireAdminAuth,
    State(state): State<AppState>,
    Query(query): Query<ProductListQuery>,
) -> Result<Json<Vec<Product>>> {
    let products = ProductRepository::new(state.pool()).list(!query.all).await?;
    Ok(Json(products))
}

/// GET /api/products/{id}
#[instrument(skip_all, fields(product_id = %id))]
async fn show(
    _: RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<Product>> {
    ProductRepository::new(state.pool())
        .get(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("product".to_owned()))
}

/// POST /api/products
#[instrument(skip_all, fields(name = %input.name))]
async fn create(
    _: RequireRole<StoreAdmin>,
    State(state): State<AppState>,
    Json(input): Json<ProductInput>,
) -> Result<(StatusCode, Json<Product>)> {
    input.validate()?;
    let product = ProductRepository::new(state.pool()).create(&input).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// PUT /api/products/{id}
#[instrument(skip_all, fields(product_id = %id))]
async fn update(
    _: RequireRole<StoreAdmin>,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
    Json(input): Json<ProductInput>,
) -> Result<Json<Product>> {
    input.validate()?;
    let product = ProductRepository::new(state.pool()).update(id, &input).await?;
    Ok(Json(product))
}

/// POST /api/products/{id}/activate
#[instrument(skip_all, fields(product_id = %id))]
async fn activate(
    _: RequireRole<StoreAdmin>,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<Product>> {
    let product = ProductRepository::new(state.pool()).set_active(id, true).await?;
    Ok(Json(product))
}

/// POST /api/products/{id}/deactivate
///
/// Products are never deleted; order lines keep pointing at them.
#[instrument(skip_all, fields(product_id = %id))]
async fn deactivate(
    _: RequireRole<StoreAdmin>,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<Product>> {
    let product = ProductRepository::new(state.pool()).set_active(id, false).await?;
    Ok(Json(product))
}

/// POST /api/products/{id}/stock
#[instrument(skip(admin, state, adjustment), fields(product_id = %id, delta = adjustment.delta))]
async fn adjust_stock(
    RequireRole(admin, _): RequireRole<StoreAdmin>,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
    Json(adjustment): Json<StockAdjustment>,
) -> Result<Json<Product>> {
    check_delta(adjustment.delta)?;

    let product = ProductRepository::new(state.pool())
        .adjust_stock(id, adjustment.delta)
        .await?;
    info!(
        admin_id = %admin.id,
        product_id = %id,
        reason = adjustment.reason.as_deref().unwrap_or(""),
        "Manual stock adjustment"
    );
    Ok(Json(product))
}

fn check_delta(delta: i32) -> Result<()> {
    if delta == 0 {
        return Err(AppError::Validation("delta must not be zero".to_owned()));
    }
    if delta.unsigned_abs() > MAX_STOCK_DELTA.unsigned_abs() {
        return Err(AppError::Validation(format!(
            "delta must be between -{MAX_STOCK_DELTA} and {MAX_STOCK_DELTA}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_delta_bounds() {
        assert!(check_delta(5).is_ok());
        assert!(check_delta(-3).is_ok());
        assert!(check_delta(MAX_STOCK_DELTA).is_ok());
        assert!(check_delta(-MAX_STOCK_DELTA).is_ok());

        assert!(matches!(check_delta(0), Err(AppError::Validation(_))));
        assert!(matches!(
            check_delta(MAX_STOCK_DELTA + 1),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(check_delta(i32::MAX), Err(AppError::Validation(_))));
        assert!(matches!(check_delta(i32::MIN), Err(AppError::Validation(_))));
    }
}
