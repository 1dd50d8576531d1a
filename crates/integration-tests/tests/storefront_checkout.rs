//! Integration tests for cart, checkout and order tracking.
//!
//! These tests require:
//! - A migrated `PostgreSQL` database (`DATABASE_URL`)
//! - The storefront running with `CATALOG_CACHE_TTL=0`
//!
//! Run with: cargo test -p laptop-shop-integration-tests -- --ignored

use chrono::{Duration, Utc};
use laptop_shop_core::product::Product;
use laptop_shop_integration_tests::{pool, seed_product, session_client, stock_of, storefront_url};
use reqwest::{Client, StatusCode};
use serde_json::{Value, json};

const PHONE: &str = "0812-3456-7890";

async fn add_to_cart(client: &Client, product: &Product, quantity: u32) -> StatusCode {
    client
        .post(format!("{}/api/cart/add", storefront_url()))
        .json(&json!({ "product_id": product.id, "quantity": quantity }))
        .send()
        .await
        .expect("Failed to add to cart")
        .status()
}

async fn checkout_reservation(client: &Client) -> reqwest::Response {
    let tomorrow = Utc::now() + Duration::days(1);
    client
        .post(format!("{}/api/checkout", storefront_url()))
        .json(&json!({
            "customer_name": "Budi Santoso",
            "phone": PHONE,
            "kind": "reservation",
            "reservation_at": tomorrow,
            "note": "integration test",
        }))
        .send()
        .await
        .expect("Failed to send checkout")
}

#[tokio::test]
#[ignore = "Requires running storefront and database"]
async fn test_cart_add_update_remove() {
    let pool = pool().await;
    let product = seed_product(&pool, "ITestBrand", 3_000_000, 5).await;
    let client = session_client();

    assert_eq!(add_to_cart(&client, &product, 2).await, StatusCode::OK);
    assert_eq!(add_to_cart(&client, &product, 1).await, StatusCode::OK);

    let cart: Value = client
        .get(format!("{}/api/cart", storefront_url()))
        .send()
        .await
        .expect("Failed to get cart")
        .json()
        .await
        .expect("Cart is not JSON");
    let lines = cart["lines"].as_array().expect("lines array");
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["quantity"].as_u64(), Some(3));

    let resp = client
        .post(format!("{}/api/cart/remove", storefront_url()))
        .json(&json!({ "product_id": product.id }))
        .send()
        .await
        .expect("Failed to remove from cart");
    assert_eq!(resp.status(), StatusCode::OK);
    let cart: Value = resp.json().await.expect("Cart is not JSON");
    assert_eq!(cart["lines"].as_array().map(Vec::len), Some(0));
}

#[tokio::test]
#[ignore = "Requires running storefront and database"]
async fn test_checkout_decrements_stock_and_hands_off() {
    let pool = pool().await;
    let product = seed_product(&pool, "ITestBrand", 7_500_000, 3).await;
    let client = session_client();

    assert_eq!(add_to_cart(&client, &product, 2).await, StatusCode::OK);
    let resp = checkout_reservation(&client).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body: Value = resp.json().await.expect("Checkout is not JSON");
    let number = body["order"]["number"].as_str().expect("order number");
    assert!(number.starts_with("INV"));
    assert_eq!(body["order"]["status"].as_str(), Some("pending"));
    assert!(
        body["whatsapp"]["url"]
            .as_str()
            .is_some_and(|url| url.starts_with("https://wa.me/"))
    );

    assert_eq!(stock_of(&pool, &product).await, 1);

    // The cart is emptied after a successful checkout
    let cart: Value = client
        .get(format!("{}/api/cart", storefront_url()))
        .send()
        .await
        .expect("Failed to get cart")
        .json()
        .await
        .expect("Cart is not JSON");
    assert_eq!(cart["lines"].as_array().map(Vec::len), Some(0));
}

#[tokio::test]
#[ignore = "Requires running storefront and database"]
async fn test_checkout_rejects_oversell_and_keeps_cart() {
    let pool = pool().await;
    let product = seed_product(&pool, "ITestBrand", 9_000_000, 1).await;

    let first = session_client();
    let second = session_client();
    assert_eq!(add_to_cart(&first, &product, 1).await, StatusCode::OK);
    assert_eq!(add_to_cart(&second, &product, 1).await, StatusCode::OK);

    assert_eq!(checkout_reservation(&first).await.status(), StatusCode::CREATED);

    let resp = checkout_reservation(&second).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    assert_eq!(stock_of(&pool, &product).await, 0);

    // The losing shopper's cart is untouched
    let cart: Value = second
        .get(format!("{}/api/cart", storefront_url()))
        .send()
        .await
        .expect("Failed to get cart")
        .json()
        .await
        .expect("Cart is not JSON");
    assert_eq!(cart["lines"].as_array().map(Vec::len), Some(1));
}

#[tokio::test]
#[ignore = "Requires running storefront and database"]
async fn test_concurrent_checkouts_never_oversell() {
    let pool = pool().await;
    let product = seed_product(&pool, "ITestBrand", 8_000_000, 2).await;

    let mut clients = Vec::new();
    for _ in 0..6 {
        let client = session_client();
        assert_eq!(add_to_cart(&client, &product, 1).await, StatusCode::OK);
        clients.push(client);
    }

    let mut handles = Vec::new();
    for client in clients {
        handles.push(tokio::spawn(async move {
            checkout_reservation(&client).await.status()
        }));
    }

    let mut created = 0;
    for handle in handles {
        match handle.await.expect("Checkout task panicked") {
            StatusCode::CREATED => created += 1,
            StatusCode::CONFLICT | StatusCode::TOO_MANY_REQUESTS => {}
            other => panic!("Unexpected checkout status {other}"),
        }
    }

    assert!(created <= 2);
    assert_eq!(stock_of(&pool, &product).await, 2 - created);
}

#[tokio::test]
#[ignore = "Requires running storefront and database"]
async fn test_order_tracking_requires_session_or_phone() {
    let pool = pool().await;
    let product = seed_product(&pool, "ITestBrand", 4_000_000, 2).await;
    let client = session_client();

    assert_eq!(add_to_cart(&client, &product, 1).await, StatusCode::OK);
    let body: Value = checkout_reservation(&client)
        .await
        .json()
        .await
        .expect("Checkout is not JSON");
    let number = body["order"]["number"].as_str().expect("order number").to_owned();
    let url = format!("{}/api/orders/{number}", storefront_url());

    // Same session
    let resp = client.get(&url).send().await.expect("Failed to track");
    assert_eq!(resp.status(), StatusCode::OK);

    // Another browser with the right phone, in another format
    let stranger = Client::new();
    let resp = stranger
        .get(&url)
        .query(&[("phone", "+6281234567890")])
        .send()
        .await
        .expect("Failed to track");
    assert_eq!(resp.status(), StatusCode::OK);

    // Wrong phone looks like an unknown order
    let resp = stranger
        .get(&url)
        .query(&[("phone", "081299999999")])
        .send()
        .await
        .expect("Failed to track");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
