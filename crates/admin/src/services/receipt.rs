//! Printable HTML receipts for orders.

use askama::Template;
use askama_web::WebTemplate;
use laptop_shop_core::db::Order;
use laptop_shop_core::{PaymentMethod, Price};

use crate::config::ShopConfig;

/// A receipt line.
#[derive(Debug, Clone)]
pub struct ReceiptLine {
    pub name: String,
    pub quantity: i32,
    pub unit_price: String,
    pub total: String,
}

/// Payment block, present for register sales.
#[derive(Debug, Clone)]
pub struct ReceiptPayment {
    pub method: &'static str,
    pub tendered: String,
    pub change: String,
}

/// Receipt page sized for a 58 mm thermal printer.
#[derive(Template, WebTemplate)]
#[template(path = "orders/receipt.html")]
pub struct ReceiptTemplate {
    pub store_name: String,
    pub number: String,
    pub created_at: String,
    pub customer_name: String,
    pub phone: Option<String>,
    pub cashier: Option<String>,
    pub status: &'static str,
    pub lines: Vec<ReceiptLine>,
    pub total: String,
    pub payment: Option<ReceiptPayment>,
}

impl ReceiptTemplate {
    /// Build the receipt for `order`. Times are shown in shop-local time.
    #[must_use]
    pub fn new(order: &Order, shop: &ShopConfig, cashier: Option<String>) -> Self {
        let money = |amount| Price::new(amount, shop.currency).display();

        let payment = match (order.payment_method, order.amount_tendered) {
            (Some(method), Some(tendered)) => Some(ReceiptPayment {
                method: payment_label(method),
                tendered: money(tendered),
                change: money(order.change_due.unwrap_or_default()),
            }),
            _ => None,
        };

        Self {
            store_name: shop.name.clone(),
            number: order.number.clone(),
            created_at: order
                .created_at
                .with_timezone(&shop.utc_offset)
                .format("%d/%m/%Y %H:%M")
                .to_string(),
            customer_name: order.customer_name.clone(),
            phone: order.phone.as_ref().map(ToString::to_string),
            cashier,
            status: order.status.as_str(),
            lines: order
                .lines
                .iter()
                .map(|line| ReceiptLine {
                    name: line.product_name.clone(),
                    quantity: line.quantity,
                    unit_price: money(line.unit_price),
                    total: money(line.line_total),
                })
                .collect(),
            total: money(order.total),
            payment,
        }
    }
}

const fn payment_label(method: PaymentMethod) -> &'static str {
    match method {
        PaymentMethod::Transfer => "Transfer",
        PaymentMethod::Cash => "Tunai",
        PaymentMethod::Qris => "QRIS",
        PaymentMethod::Debit => "Debit",
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{FixedOffset, NaiveTime, TimeZone, Utc};
    use laptop_shop_core::db::OrderLine;
    use laptop_shop_core::{
        CurrencyCode, OrderId, OrderKind, OrderLineId, OrderStatus, ProductId,
    };
    use rust_decimal::Decimal;

    use super::*;

    fn shop() -> ShopConfig {
        ShopConfig {
            name: "Toko Laptop".to_owned(),
            currency: CurrencyCode::IDR,
            utc_offset: FixedOffset::east_opt(7 * 3600).unwrap(),
            opens_at: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            low_stock_threshold: 3,
        }
    }

    fn sale() -> Order {
        let at = Utc.with_ymd_and_hms(2025, 6, 2, 5, 15, 0).unwrap();
        Order {
            id: OrderId::new(9),
            number: "INV-20250602-Q7Z2KD".to_owned(),
            kind: OrderKind::InStore,
            status: OrderStatus::Completed,
            customer_name: "Walk-in".to_owned(),
            phone: None,
            shipping_address: None,
            reservation_at: None,
            note: None,
            total: Decimal::from(7_500_000),
            payment_method: Some(PaymentMethod::Cash),
            amount_tendered: Some(Decimal::from(8_000_000)),
            change_due: Some(Decimal::from(500_000)),
            created_by: None,
            created_at: at,
            updated_at: at,
            lines: vec![OrderLine {
                id: OrderLineId::new(1),
                product_id: ProductId::new(3),
                product_name: "Acer Aspire 5 <i7>".to_owned(),
                unit_price: Decimal::from(7_500_000),
                quantity: 1,
                line_total: Decimal::from(7_500_000),
            }],
        }
    }

    #[test]
    fn test_receipt_renders_payment_and_local_time() {
        let html = ReceiptTemplate::new(&sale(), &shop(), Some("Sari".to_owned()))
            .render()
            .unwrap();
        assert!(html.contains("INV-20250602-Q7Z2KD"));
        assert!(html.contains("02/06/2025 12:15"));
        assert!(html.contains("Rp 7.500.000"));
        assert!(html.contains("Tunai"));
        assert!(html.contains("Rp 500.000"));
        assert!(html.contains("Kasir: Sari"));
    }

    #[test]
    fn test_receipt_escapes_product_names() {
        let html = ReceiptTemplate::new(&sale(), &shop(), None).render().unwrap();
        assert!(!html.contains("<i7>"));
        assert!(!html.contains("Kasir:"));
    }

    #[test]
    fn test_online_order_has_no_payment_block() {
        let mut order = sale();
        order.payment_method = None;
        order.amount_tendered = None;
        order.change_due = None;
        let html = ReceiptTemplate::new(&order, &shop(), None).render().unwrap();
        assert!(!html.contains("Kembali"));
    }
}
