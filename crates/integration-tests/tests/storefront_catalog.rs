//! Integration tests for the storefront catalog.
//!
//! These tests require:
//! - A migrated `PostgreSQL` database (`DATABASE_URL`)
//! - The storefront running with `CATALOG_CACHE_TTL=0`
//!
//! Run with: cargo test -p laptop-shop-integration-tests -- --ignored

use laptop_shop_integration_tests::{pool, seed_product, storefront_url};
use reqwest::{Client, StatusCode};
use serde_json::Value;

#[tokio::test]
#[ignore = "Requires running storefront and database"]
async fn test_health() {
    let resp = Client::new()
        .get(format!("{}/health", storefront_url()))
        .send()
        .await
        .expect("Failed to reach storefront");
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = Client::new()
        .get(format!("{}/health/ready", storefront_url()))
        .send()
        .await
        .expect("Failed to reach storefront");
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "Requires running storefront and database"]
async fn test_listing_includes_facets_and_price_bounds() {
    let pool = pool().await;
    seed_product(&pool, "ITestBrand", 5_000_000, 2).await;

    let body: Value = Client::new()
        .get(format!("{}/api/products", storefront_url()))
        .send()
        .await
        .expect("Failed to list products")
        .json()
        .await
        .expect("Listing is not JSON");

    assert!(body["products"].is_array());
    assert!(body["total"].as_u64().unwrap_or(0) >= 1);
    assert!(body["price_bounds"].is_object());

    let facets = body["facets"].as_array().expect("facets array");
    assert!(!facets.is_empty());
}

#[tokio::test]
#[ignore = "Requires running storefront and database"]
async fn test_brand_filter_narrows_results() {
    let pool = pool().await;
    let product = seed_product(&pool, "ITestFilterBrand", 4_250_000, 1).await;

    let body: Value = Client::new()
        .get(format!("{}/api/products", storefront_url()))
        .query(&[("brand", "itestfilterbrand")])
        .send()
        .await
        .expect("Failed to list products")
        .json()
        .await
        .expect("Listing is not JSON");

    let products = body["products"].as_array().expect("products array");
    assert!(!products.is_empty());
    assert!(
        products
            .iter()
            .all(|p| p["brand"].as_str() == Some("ITestFilterBrand"))
    );
    assert!(
        products
            .iter()
            .any(|p| p["slug"].as_str() == Some(product.slug.as_str()))
    );
}

#[tokio::test]
#[ignore = "Requires running storefront and database"]
async fn test_product_detail_and_unknown_slug() {
    let pool = pool().await;
    let product = seed_product(&pool, "ITestBrand", 6_000_000, 3).await;
    let client = Client::new();

    let resp = client
        .get(format!("{}/api/products/{}", storefront_url(), product.slug))
        .send()
        .await
        .expect("Failed to get product");
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("Detail is not JSON");
    assert_eq!(body["product"]["name"].as_str(), Some(product.name.as_str()));

    let resp = client
        .get(format!("{}/api/products/no-such-laptop-xyz", storefront_url()))
        .send()
        .await
        .expect("Failed to get product");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
