//! WhatsApp handoff for placed orders.
//!
//! Payment is confirmed by hand: the shopper sends a pre-filled message
//! (and, for online orders, a transfer screenshot) to the shop's number.
//! The message is rendered from a per-locale Askama text template and
//! wrapped in a `https://wa.me/{number}?text=...` link.

use askama::Template;
use laptop_shop_core::db::Order;
use laptop_shop_core::{Locale, OrderKind, Price};
use serde::Serialize;
use thiserror::Error;

use crate::config::StoreConfig;

/// A line as shown in the message.
struct MessageLine {
    name: String,
    quantity: i32,
    unit_price: String,
    total: String,
}

/// Values rendered into the handoff templates.
struct MessageFields<'a> {
    store_name: &'a str,
    number: &'a str,
    customer_name: &'a str,
    phone: String,
    is_online: bool,
    lines: Vec<MessageLine>,
    total: String,
    shipping_address: Option<String>,
    reservation_slot: Option<String>,
    note: Option<&'a str>,
    bank_account: Option<&'a str>,
}

/// Indonesian handoff message.
#[derive(Template)]
#[template(path = "whatsapp/order_id.txt")]
struct OrderMessageId<'a> {
    m: MessageFields<'a>,
}

/// English handoff message.
#[derive(Template)]
#[template(path = "whatsapp/order_en.txt")]
struct OrderMessageEn<'a> {
    m: MessageFields<'a>,
}

/// Errors building a handoff.
#[derive(Debug, Error)]
pub enum HandoffError {
    /// Template rendering error.
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),
}

/// The rendered message and the link that opens it in WhatsApp.
#[derive(Debug, Clone, Serialize)]
pub struct WhatsAppHandoff {
    pub message: String,
    pub url: String,
}

/// Render the handoff message for `order` in `locale`.
///
/// # Errors
///
/// Returns `HandoffError::Template` if rendering fails.
pub fn handoff(
    order: &Order,
    store: &StoreConfig,
    locale: Locale,
) -> Result<WhatsAppHandoff, HandoffError> {
    let message = render_message(order, store, locale)?;
    let url = format!(
        "https://wa.me/{}?text={}",
        store.whatsapp_number.whatsapp_digits(),
        urlencoding::encode(&message)
    );
    Ok(WhatsAppHandoff { message, url })
}

fn render_message(
    order: &Order,
    store: &StoreConfig,
    locale: Locale,
) -> Result<String, askama::Error> {
    let money = |amount| Price::new(amount, store.currency).display();

    let fields = MessageFields {
        store_name: &store.name,
        number: &order.number,
        customer_name: &order.customer_name,
        phone: order
            .phone
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default(),
        is_online: order.kind == OrderKind::Online,
        lines: order
            .lines
            .iter()
            .map(|line| MessageLine {
                name: line.product_name.clone(),
                quantity: line.quantity,
                unit_price: money(line.unit_price),
                total: money(line.line_total),
            })
            .collect(),
        total: money(order.total),
        shipping_address: order.shipping_address.as_ref().map(|a| a.one_line()),
        reservation_slot: order.reservation_at.map(|at| {
            at.with_timezone(&store.utc_offset)
                .format(match locale {
                    Locale::Id => "%d/%m/%Y pukul %H:%M",
                    Locale::En => "%d %b %Y at %H:%M",
                })
                .to_string()
        }),
        note: order.note.as_deref(),
        bank_account: store.bank_account.as_deref(),
    };

    match locale {
        Locale::Id => OrderMessageId { m: fields }.render(),
        Locale::En => OrderMessageEn { m: fields }.render(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{FixedOffset, TimeZone, Utc};
    use laptop_shop_core::checkout::ShippingAddress;
    use laptop_shop_core::db::OrderLine;
    use laptop_shop_core::{CurrencyCode, OrderId, OrderLineId, OrderStatus, PhoneNumber, ProductId};
    use rust_decimal::Decimal;

    use super::*;

    fn store() -> StoreConfig {
        StoreConfig {
            name: "Toko Laptop".to_owned(),
            whatsapp_number: PhoneNumber::parse("081234567890").unwrap(),
            bank_account: Some("BCA 1234567890 a.n. Toko Laptop".to_owned()),
            currency: CurrencyCode::IDR,
            default_locale: Locale::Id,
            utc_offset: FixedOffset::east_opt(7 * 3600).unwrap(),
        }
    }

    fn order(kind: OrderKind) -> Order {
        let now = Utc::now();
        Order {
            id: OrderId::new(1),
            number: "INV-20250601-AB12CD".to_owned(),
            kind,
            status: OrderStatus::Pending,
            customer_name: "Budi".to_owned(),
            phone: Some(PhoneNumber::parse("0811111111").unwrap()),
            shipping_address: (kind == OrderKind::Online).then(|| ShippingAddress {
                street: "Jl. Merdeka 1".to_owned(),
                city: "Bandung".to_owned(),
                province: None,
                postal_code: None,
            }),
            reservation_at: (kind == OrderKind::Reservation)
                .then(|| Utc.with_ymd_and_hms(2025, 6, 2, 3, 30, 0).unwrap()),
            note: None,
            total: Decimal::from(24_000_000),
            payment_method: None,
            amount_tendered: None,
            change_due: None,
            created_by: None,
            created_at: now,
            updated_at: now,
            lines: vec![OrderLine {
                id: OrderLineId::new(1),
                product_id: ProductId::new(7),
                product_name: "ThinkPad X1 Carbon".to_owned(),
                unit_price: Decimal::from(12_000_000),
                quantity: 2,
                line_total: Decimal::from(24_000_000),
            }],
        }
    }

    #[test]
    fn test_online_message_has_transfer_instructions() {
        let text = render_message(&order(OrderKind::Online), &store(), Locale::Id).unwrap();
        assert!(text.contains("INV-20250601-AB12CD"));
        assert!(text.contains("ThinkPad X1 Carbon x2"));
        assert!(text.contains("Total: Rp 24.000.000"));
        assert!(text.contains("Jl. Merdeka 1"));
        assert!(text.contains("BCA 1234567890"));
        assert!(text.contains("screenshot"));
        assert!(!text.contains("Jadwal pengambilan"));
    }

    #[test]
    fn test_reservation_message_uses_shop_time() {
        let text = render_message(&order(OrderKind::Reservation), &store(), Locale::En).unwrap();
        assert!(text.contains("Pickup time: 02 Jun 2025 at 10:30"));
        assert!(text.contains("pay in store"));
        assert!(!text.contains("Shipping address"));
    }

    #[test]
    fn test_link_targets_store_number() {
        let handoff = handoff(&order(OrderKind::Online), &store(), Locale::En).unwrap();
        assert!(handoff.url.starts_with("https://wa.me/6281234567890?text="));
        assert!(!handoff.url.contains(' '));
        assert!(handoff.url.contains("INV-20250601-AB12CD"));
    }
}
