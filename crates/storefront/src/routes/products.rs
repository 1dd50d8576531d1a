//! Catalog route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Serialize;
use tracing::instrument;

use crate::catalog::{self, CatalogPage, CatalogQuery, ProductCard};
use crate::error::{AppError, Result};
use crate::state::AppState;

/// Related products shown on a detail page.
const RELATED_LIMIT: usize = 4;

/// Product detail response.
#[derive(Debug, Serialize)]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: ProductCard,
    pub description: String,
    /// In-stock products of the same category, same brand first.
    pub related: Vec<ProductCard>,
}

/// List products with facet counts.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<CatalogQuery>,
) -> Result<Json<CatalogPage>> {
    let products = state.catalog().await?;
    Ok(Json(catalog::browse(
        &products,
        &query,
        state.config().store.currency,
    )))
}

/// Show one product by slug.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<ProductDetail>> {
    let products = state.catalog().await?;
    let currency = state.config().store.currency;

    let product = products
        .iter()
        .find(|p| p.slug == slug)
        .ok_or_else(|| AppError::NotFound(format!("product {slug}")))?;

    let mut related: Vec<_> = products
        .iter()
        .filter(|p| p.id != product.id && p.category == product.category && p.in_stock())
        .collect();
    related.sort_by_key(|p| (p.brand != product.brand, (p.price - product.price).abs()));

    Ok(Json(ProductDetail {
        product: ProductCard::new(product, currency),
        description: product.description.clone(),
        related: related
            .into_iter()
            .take(RELATED_LIMIT)
            .map(|p| ProductCard::new(p, currency))
            .collect(),
    }))
}
