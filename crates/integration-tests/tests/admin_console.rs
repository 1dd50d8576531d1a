//! Integration tests for the admin console API.
//!
//! These tests require:
//! - A migrated `PostgreSQL` database (`DATABASE_URL`)
//! - The admin console and storefront running
//! - An admin or owner account (`SHOP_TEST_ADMIN_USERNAME` / `SHOP_TEST_ADMIN_PASSWORD`),
//!   e.g. `shop-cli admin create -u itest -n "Integration" -r admin -p test-password-123`
//!
//! Run with: cargo test -p laptop-shop-integration-tests -- --ignored

use chrono::{Duration, Utc};
use laptop_shop_integration_tests::{
    admin_login, admin_url, pool, seed_product, session_client, stock_of, storefront_url,
};
use reqwest::StatusCode;
use rust_decimal::Decimal;
use serde_json::{Value, json};

fn decimal(value: &Value) -> Decimal {
    value
        .as_str()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| panic!("{value} is not a decimal string"))
}

#[tokio::test]
#[ignore = "Requires running admin console"]
async fn test_console_requires_login() {
    let client = session_client();

    let resp = client
        .get(format!("{}/api/auth/me", admin_url()))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = client
        .get(format!("{}/api/dashboard", admin_url()))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "Requires running admin console"]
async fn test_login_rejects_bad_password() {
    let client = session_client();
    let resp = client
        .post(format!("{}/api/auth/login", admin_url()))
        .json(&json!({ "username": "itest", "password": "definitely-wrong" }))
        .send()
        .await
        .expect("Failed to send login request");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "Requires running admin console and database"]
async fn test_pos_sale_records_change_receipt_and_income() {
    let pool = pool().await;
    let product = seed_product(&pool, "ITestBrand", 1_250_000, 4).await;
    let client = session_client();
    admin_login(&client).await;

    let resp = client
        .post(format!("{}/api/pos/sales", admin_url()))
        .json(&json!({
            "lines": [{ "product_id": product.id, "quantity": 2 }],
            "payment_method": "cash",
            "amount_tendered": "3000000",
        }))
        .send()
        .await
        .expect("Failed to send sale");
    assert_eq!(resp.status(), StatusCode::CREATED);

    let sale: Value = resp.json().await.expect("Sale is not JSON");
    assert_eq!(decimal(&sale["change"]), Decimal::from(500_000));
    assert_eq!(sale["order"]["status"].as_str(), Some("completed"));
    assert_eq!(sale["order"]["kind"].as_str(), Some("in_store"));
    assert_eq!(stock_of(&pool, &product).await, 2);

    let order_id = sale["order"]["id"].as_i64().expect("order id");
    let number = sale["order"]["number"].as_str().expect("order number");

    // Printable receipt
    let receipt_url = sale["receipt_url"].as_str().expect("receipt url");
    let resp = client
        .get(format!("{}{receipt_url}", admin_url()))
        .send()
        .await
        .expect("Failed to fetch receipt");
    assert_eq!(resp.status(), StatusCode::OK);
    let html = resp.text().await.expect("Receipt body");
    assert!(html.contains(number));

    // The sale is booked as income
    let entries: Vec<Value> = client
        .get(format!("{}/api/cashflow", admin_url()))
        .query(&[("direction", "income")])
        .send()
        .await
        .expect("Failed to list cashflow")
        .json()
        .await
        .expect("Cashflow is not JSON");
    let booked: Vec<&Value> = entries
        .iter()
        .filter(|e| e["order_id"].as_i64() == Some(order_id))
        .collect();
    assert_eq!(booked.len(), 1, "POS sale {number} should book one income entry");
    assert_eq!(decimal(&booked[0]["amount"]), decimal(&sale["order"]["total"]));
    assert_eq!(booked[0]["category"].as_str(), Some("pos_sale"));
}

#[tokio::test]
#[ignore = "Requires running admin console and database"]
async fn test_stock_adjustment_bounds() {
    let pool = pool().await;
    let product = seed_product(&pool, "ITestBrand", 500_000, 3).await;
    let client = session_client();
    admin_login(&client).await;
    let url = format!("{}/api/products/{}/stock", admin_url(), product.id);

    let resp = client
        .post(&url)
        .json(&json!({ "delta": i32::MAX, "reason": "typo" }))
        .send()
        .await
        .expect("Failed to adjust stock");
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let resp = client
        .post(&url)
        .json(&json!({ "delta": -4 }))
        .send()
        .await
        .expect("Failed to adjust stock");
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let resp = client
        .post(&url)
        .json(&json!({ "delta": 7, "reason": "restock" }))
        .send()
        .await
        .expect("Failed to adjust stock");
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(stock_of(&pool, &product).await, 10);
}

#[tokio::test]
#[ignore = "Requires running admin console and database"]
async fn test_pos_sale_rejects_short_payment() {
    let pool = pool().await;
    let product = seed_product(&pool, "ITestBrand", 2_000_000, 1).await;
    let client = session_client();
    admin_login(&client).await;

    let resp = client
        .post(format!("{}/api/pos/sales", admin_url()))
        .json(&json!({
            "lines": [{ "product_id": product.id, "quantity": 1 }],
            "payment_method": "cash",
            "amount_tendered": "1500000",
        }))
        .send()
        .await
        .expect("Failed to send sale");
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    // Nothing was sold
    assert_eq!(stock_of(&pool, &product).await, 1);
}

#[tokio::test]
#[ignore = "Requires running admin console, storefront and database"]
async fn test_cancelling_web_order_restocks() {
    let pool = pool().await;
    let product = seed_product(&pool, "ITestBrand", 6_000_000, 2).await;

    let shopper = session_client();
    let resp = shopper
        .post(format!("{}/api/cart/add", storefront_url()))
        .json(&json!({ "product_id": product.id, "quantity": 2 }))
        .send()
        .await
        .expect("Failed to add to cart");
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = shopper
        .post(format!("{}/api/checkout", storefront_url()))
        .json(&json!({
            "customer_name": "Rina",
            "phone": "081234567890",
            "kind": "reservation",
            "reservation_at": Utc::now() + Duration::days(2),
        }))
        .send()
        .await
        .expect("Failed to check out")
        .json()
        .await
        .expect("Checkout is not JSON");
    let order_id = body["order"]["id"].as_i64().expect("order id");
    assert_eq!(stock_of(&pool, &product).await, 0);

    let client = session_client();
    admin_login(&client).await;

    let resp = client
        .post(format!("{}/api/orders/{order_id}/cancel", admin_url()))
        .send()
        .await
        .expect("Failed to cancel");
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(stock_of(&pool, &product).await, 2);

    // A cancelled order cannot be cancelled again
    let resp = client
        .post(format!("{}/api/orders/{order_id}/cancel", admin_url()))
        .send()
        .await
        .expect("Failed to cancel");
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    assert_eq!(stock_of(&pool, &product).await, 2);
}

#[tokio::test]
#[ignore = "Requires running admin console and database"]
async fn test_debt_payments_settle_and_refuse_overpayment() {
    let client = session_client();
    admin_login(&client).await;
    let today = Utc::now().date_naive();

    let resp = client
        .post(format!("{}/api/debts", admin_url()))
        .json(&json!({
            "kind": "receivable",
            "counterparty": "PT Integrasi",
            "amount": "1000000",
            "due_date": today + Duration::days(14),
        }))
        .send()
        .await
        .expect("Failed to create debt");
    assert_eq!(resp.status(), StatusCode::CREATED);
    let debt: Value = resp.json().await.expect("Debt is not JSON");
    let debt_id = debt["id"].as_i64().expect("debt id");
    let payments_url = format!("{}/api/debts/{debt_id}/payments", admin_url());

    let resp = client
        .post(&payments_url)
        .json(&json!({ "amount": "400000", "paid_on": today }))
        .send()
        .await
        .expect("Failed to pay");
    assert_eq!(resp.status(), StatusCode::CREATED);
    let detail: Value = resp.json().await.expect("Detail is not JSON");
    assert_eq!(decimal(&detail["outstanding"]), Decimal::from(600_000));

    let resp = client
        .post(&payments_url)
        .json(&json!({ "amount": "700000", "paid_on": today }))
        .send()
        .await
        .expect("Failed to pay");
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let resp = client
        .post(&payments_url)
        .json(&json!({ "amount": "600000", "paid_on": today }))
        .send()
        .await
        .expect("Failed to pay");
    assert_eq!(resp.status(), StatusCode::CREATED);
    let detail: Value = resp.json().await.expect("Detail is not JSON");
    assert_eq!(decimal(&detail["outstanding"]), Decimal::ZERO);
    assert_eq!(detail["payments"].as_array().map(Vec::len), Some(2));
}

#[tokio::test]
#[ignore = "Requires running admin console and database"]
async fn test_dashboard_overview() {
    let client = session_client();
    admin_login(&client).await;

    let resp = client
        .get(format!("{}/api/dashboard", admin_url()))
        .send()
        .await
        .expect("Failed to load dashboard");
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = resp.json().await.expect("Dashboard is not JSON");
    assert!(body["sales_today"]["revenue"].is_string());
    assert!(body["orders_by_status"].is_array());
    assert!(body["low_stock"].is_array());
}
