//! Integration tests for the laptop shop.
//!
//! The tests talk to running servers over HTTP and seed products directly
//! in the database, so they are all `#[ignore]`d by default.
//!
//! # Running Tests
//!
//! ```bash
//! shop-cli migrate
//! SHOP_ADMIN_PASSWORD=test-password-123 shop-cli admin create -u itest -n "Integration" -r owner
//!
//! # The storefront caches the catalog; disable that so seeded products show up
//! CATALOG_CACHE_TTL=0 cargo run -p laptop-shop-storefront &
//! cargo run -p laptop-shop-admin &
//!
//! cargo test -p laptop-shop-integration-tests -- --ignored
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` - Same database the servers use
//! - `STOREFRONT_URL` - Default `http://localhost:3000`
//! - `ADMIN_URL` - Default `http://localhost:3001`
//! - `SHOP_TEST_ADMIN_USERNAME` / `SHOP_TEST_ADMIN_PASSWORD` - An owner
//!   account (default `itest` / `test-password-123`)

use laptop_shop_core::db::ProductRepository;
use laptop_shop_core::product::{Product, ProductCondition, ProductInput};
use reqwest::Client;
use rust_decimal::Decimal;
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

/// Base URL of the storefront.
#[must_use]
pub fn storefront_url() -> String {
    std::env::var("STOREFRONT_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// Base URL of the admin console.
#[must_use]
pub fn admin_url() -> String {
    std::env::var("ADMIN_URL").unwrap_or_else(|_| "http://localhost:3001".to_string())
}

/// A client that keeps session cookies, like a browser tab.
///
/// # Panics
///
/// Panics if the client cannot be built.
#[must_use]
pub fn session_client() -> Client {
    Client::builder()
        .cookie_store(true)
        .build()
        .expect("Failed to create HTTP client")
}

/// Connect to the shop database.
///
/// # Panics
///
/// Panics if `DATABASE_URL` is unset or unreachable.
pub async fn pool() -> PgPool {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    PgPool::connect(&url)
        .await
        .expect("Failed to connect to database")
}

/// Insert a uniquely named laptop with `stock` units.
///
/// # Panics
///
/// Panics if the insert fails.
pub async fn seed_product(pool: &PgPool, brand: &str, price: i64, stock: i32) -> Product {
    let suffix = Uuid::new_v4().simple().to_string();
    let input = ProductInput {
        slug: Some(format!("itest-{suffix}")),
        name: format!("{brand} Test Laptop {}", suffix.get(..8).unwrap_or(&suffix)),
        brand: brand.to_owned(),
        category: "laptop".to_owned(),
        color: Some("Black".to_owned()),
        processor: Some("Intel Core i5-1235U".to_owned()),
        ram_gb: Some(8),
        storage_gb: Some(512),
        condition: ProductCondition::New,
        price: Decimal::from(price),
        stock,
        is_active: true,
        description: "Integration test unit".to_owned(),
        image_url: None,
    };
    ProductRepository::new(pool)
        .create(&input)
        .await
        .expect("Failed to seed product")
}

/// Current stock of a product.
///
/// # Panics
///
/// Panics if the product does not exist.
pub async fn stock_of(pool: &PgPool, product: &Product) -> i32 {
    ProductRepository::new(pool)
        .get(product.id)
        .await
        .expect("Failed to load product")
        .expect("Product disappeared")
        .stock
}

/// Log `client` in to the admin console as the test owner.
///
/// # Panics
///
/// Panics if the login is rejected.
pub async fn admin_login(client: &Client) {
    let username =
        std::env::var("SHOP_TEST_ADMIN_USERNAME").unwrap_or_else(|_| "itest".to_string());
    let password = std::env::var("SHOP_TEST_ADMIN_PASSWORD")
        .unwrap_or_else(|_| "test-password-123".to_string());

    let resp = client
        .post(format!("{}/api/auth/login", admin_url()))
        .json(&json!({ "username": username, "password": password }))
        .send()
        .await
        .expect("Failed to send login request");
    assert!(
        resp.status().is_success(),
        "Admin login failed with {}",
        resp.status()
    );
}
