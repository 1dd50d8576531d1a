//! Checkout validation and stock checks.
//!
//! Everything here is pure. [`validate_request`] runs before the database is
//! touched; [`check_stock`] runs twice: once on the cached catalog for a fast
//! answer, and again inside the placement transaction on the locked rows,
//! which is the check that actually guards against overselling.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cart::{CartLine, MAX_LINE_QUANTITY};
use crate::types::{Message, OrderKind, PhoneError, PhoneNumber, ProductId};

/// Maximum length of free-text fields (name, note, address lines).
pub const MAX_TEXT_LENGTH: usize = 500;

/// The fields of a product that checkout needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSnapshot {
    pub id: ProductId,
    pub name: String,
    pub unit_price: Decimal,
    pub stock: i32,
    pub is_active: bool,
}

/// Delivery address for online orders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingAddress {
    pub street: String,
    pub city: String,
    #[serde(default)]
    pub province: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
}

impl ShippingAddress {
    /// Single-line rendering used in messages and receipts.
    #[must_use]
    pub fn one_line(&self) -> String {
        let mut parts = vec![self.street.trim(), self.city.trim()];
        if let Some(province) = self.province.as_deref() {
            parts.push(province.trim());
        }
        if let Some(postal) = self.postal_code.as_deref() {
            parts.push(postal.trim());
        }
        parts.retain(|p| !p.is_empty());
        parts.join(", ")
    }

    fn is_complete(&self) -> bool {
        !self.street.trim().is_empty() && !self.city.trim().is_empty()
    }
}

/// A checkout as submitted by the storefront.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutRequest {
    pub customer_name: String,
    pub phone: String,
    pub kind: OrderKind,
    #[serde(default)]
    pub shipping_address: Option<ShippingAddress>,
    #[serde(default)]
    pub reservation_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub note: Option<String>,
    pub lines: Vec<CartLine>,
}

/// A checkout that passed [`validate_request`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedCheckout {
    pub customer_name: String,
    pub phone: PhoneNumber,
    pub kind: OrderKind,
    pub shipping_address: Option<ShippingAddress>,
    pub reservation_at: Option<DateTime<Utc>>,
    pub note: Option<String>,
    /// Merged lines, one per product, ordered by product ID.
    pub lines: Vec<CartLine>,
}

/// One line that cannot be fulfilled from current stock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StockShortage {
    pub product_id: ProductId,
    pub name: String,
    pub requested: u32,
    pub available: i32,
}

/// Reasons a checkout is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckoutError {
    #[error("cart is empty")]
    EmptyCart,

    #[error("invalid quantity for product {0}")]
    InvalidQuantity(ProductId),

    #[error("customer name is required")]
    MissingCustomerName,

    #[error("invalid phone number: {0}")]
    InvalidPhone(#[from] PhoneError),

    #[error("shipping address is required for online orders")]
    MissingShippingAddress,

    #[error("reservation time is required for reservations")]
    MissingReservationSlot,

    #[error("reservation time is in the past")]
    ReservationInPast,

    #[error("order kind {0:?} cannot be placed from the storefront")]
    UnsupportedKind(OrderKind),

    #[error("product {product_id} is unavailable")]
    ProductUnavailable {
        product_id: ProductId,
        name: Option<String>,
    },

    #[error("insufficient stock for {} product(s)", .0.len())]
    InsufficientStock(Vec<StockShortage>),
}

impl CheckoutError {
    /// Shopper-facing messages for this error, one per problem.
    #[must_use]
    pub fn messages(&self) -> Vec<Message> {
        match self {
            Self::EmptyCart => vec![Message::CartEmpty],
            Self::InvalidQuantity(_) => vec![Message::InvalidQuantity],
            Self::MissingCustomerName => vec![Message::MissingCustomerName],
            Self::InvalidPhone(_) => vec![Message::InvalidPhone],
            Self::MissingShippingAddress => vec![Message::MissingShippingAddress],
            Self::MissingReservationSlot | Self::UnsupportedKind(_) => {
                vec![Message::MissingReservationSlot]
            }
            Self::ReservationInPast => vec![Message::ReservationInPast],
            Self::ProductUnavailable { product_id, name } => vec![Message::ProductUnavailable {
                product: name.clone().unwrap_or_else(|| format!("#{product_id}")),
            }],
            Self::InsufficientStock(shortages) => shortages
                .iter()
                .map(|s| Message::InsufficientStock {
                    product: s.name.clone(),
                    available: s.available.max(0),
                })
                .collect(),
        }
    }
}

/// Validate a storefront checkout.
///
/// Only `Online` and `Reservation` orders come from the storefront; in-store
/// orders are created by the POS.
///
/// # Errors
///
/// Returns the first problem found, checking lines first so an empty cart
/// is reported before missing contact details.
pub fn validate_request(
    request: CheckoutRequest,
    now: DateTime<Utc>,
) -> Result<ValidatedCheckout, CheckoutError> {
    let lines = merge_lines(&request.lines)?;

    let customer_name = clamp_text(&request.customer_name);
    if customer_name.is_empty() {
        return Err(CheckoutError::MissingCustomerName);
    }
    let phone = PhoneNumber::parse(&request.phone)?;

    let (shipping_address, reservation_at) = match request.kind {
        OrderKind::Online => {
            let address = request
                .shipping_address
                .filter(ShippingAddress::is_complete)
                .ok_or(CheckoutError::MissingShippingAddress)?;
            (Some(address), None)
        }
        OrderKind::Reservation => {
            let at = request
                .reservation_at
                .ok_or(CheckoutError::MissingReservationSlot)?;
            if at <= now {
                return Err(CheckoutError::ReservationInPast);
            }
            (None, Some(at))
        }
        OrderKind::InStore => return Err(CheckoutError::UnsupportedKind(OrderKind::InStore)),
    };

    let note = request
        .note
        .as_deref()
        .map(clamp_text)
        .filter(|n| !n.is_empty());

    Ok(ValidatedCheckout {
        customer_name,
        phone,
        kind: request.kind,
        shipping_address,
        reservation_at,
        note,
        lines,
    })
}

/// Merge duplicate product lines and reject zero quantities.
///
/// The result is ordered by product ID, which is also the order rows are
/// locked in during placement.
///
/// # Errors
///
/// Returns `EmptyCart` for no lines and `InvalidQuantity` for a zero
/// quantity or a merged quantity above [`MAX_LINE_QUANTITY`].
pub fn merge_lines(lines: &[CartLine]) -> Result<Vec<CartLine>, CheckoutError> {
    if lines.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }

    let mut merged: BTreeMap<ProductId, u32> = BTreeMap::new();
    for line in lines {
        if line.quantity == 0 {
            return Err(CheckoutError::InvalidQuantity(line.product_id));
        }
        let entry = merged.entry(line.product_id).or_insert(0);
        *entry = entry.saturating_add(line.quantity);
        if *entry > MAX_LINE_QUANTITY {
            return Err(CheckoutError::InvalidQuantity(line.product_id));
        }
    }

    Ok(merged
        .into_iter()
        .map(|(product_id, quantity)| CartLine {
            product_id,
            quantity,
        })
        .collect())
}

/// Verify that every line can be served from `snapshot`.
///
/// # Errors
///
/// Returns `ProductUnavailable` for the first missing or inactive product,
/// otherwise `InsufficientStock` listing every short line.
pub fn check_stock(lines: &[CartLine], snapshot: &[ProductSnapshot]) -> Result<(), CheckoutError> {
    let mut shortages = Vec::new();

    for line in lines {
        let product = snapshot
            .iter()
            .find(|p| p.id == line.product_id)
            .ok_or(CheckoutError::ProductUnavailable {
                product_id: line.product_id,
                name: None,
            })?;

        if !product.is_active {
            return Err(CheckoutError::ProductUnavailable {
                product_id: product.id,
                name: Some(product.name.clone()),
            });
        }

        if i64::from(line.quantity) > i64::from(product.stock) {
            shortages.push(StockShortage {
                product_id: product.id,
                name: product.name.clone(),
                requested: line.quantity,
                available: product.stock,
            });
        }
    }

    if shortages.is_empty() {
        Ok(())
    } else {
        Err(CheckoutError::InsufficientStock(shortages))
    }
}

fn clamp_text(s: &str) -> String {
    s.trim().chars().take(MAX_TEXT_LENGTH).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn line(id: i32, quantity: u32) -> CartLine {
        CartLine {
            product_id: ProductId::new(id),
            quantity,
        }
    }

    fn snapshot(id: i32, stock: i32) -> ProductSnapshot {
        ProductSnapshot {
            id: ProductId::new(id),
            name: format!("Laptop {id}"),
            unit_price: Decimal::from(5_000_000),
            stock,
            is_active: true,
        }
    }

    fn request(kind: OrderKind) -> CheckoutRequest {
        CheckoutRequest {
            customer_name: "  Budi Santoso ".to_owned(),
            phone: "0812-3456-7890".to_owned(),
            kind,
            shipping_address: Some(ShippingAddress {
                street: "Jl. Merdeka 10".to_owned(),
                city: "Bandung".to_owned(),
                province: None,
                postal_code: Some("40111".to_owned()),
            }),
            reservation_at: None,
            note: Some("   ".to_owned()),
            lines: vec![line(2, 1), line(1, 1), line(2, 2)],
        }
    }

    #[test]
    fn test_merge_lines_sums_and_sorts() {
        let merged = merge_lines(&[line(3, 1), line(1, 2), line(3, 4)]).unwrap();
        assert_eq!(merged, vec![line(1, 2), line(3, 5)]);
    }

    #[test]
    fn test_merge_lines_rejects_empty_and_zero() {
        assert_eq!(merge_lines(&[]), Err(CheckoutError::EmptyCart));
        assert_eq!(
            merge_lines(&[line(1, 1), line(2, 0)]),
            Err(CheckoutError::InvalidQuantity(ProductId::new(2)))
        );
        assert_eq!(
            merge_lines(&[line(1, 60), line(1, 60)]),
            Err(CheckoutError::InvalidQuantity(ProductId::new(1)))
        );
    }

    #[test]
    fn test_validate_online_order() {
        let validated = validate_request(request(OrderKind::Online), Utc::now()).unwrap();
        assert_eq!(validated.customer_name, "Budi Santoso");
        assert_eq!(validated.phone.as_str(), "081234567890");
        assert_eq!(validated.lines, vec![line(1, 1), line(2, 3)]);
        assert!(validated.note.is_none());
        assert_eq!(
            validated.shipping_address.unwrap().one_line(),
            "Jl. Merdeka 10, Bandung, 40111"
        );
    }

    #[test]
    fn test_validate_online_requires_address() {
        let mut req = request(OrderKind::Online);
        req.shipping_address = Some(ShippingAddress {
            street: " ".to_owned(),
            city: "Bandung".to_owned(),
            province: None,
            postal_code: None,
        });
        assert_eq!(
            validate_request(req, Utc::now()),
            Err(CheckoutError::MissingShippingAddress)
        );
    }

    #[test]
    fn test_validate_reservation_slot() {
        let now = Utc::now();

        let mut req = request(OrderKind::Reservation);
        assert_eq!(
            validate_request(req.clone(), now),
            Err(CheckoutError::MissingReservationSlot)
        );

        req.reservation_at = Some(now - Duration::hours(1));
        assert_eq!(
            validate_request(req.clone(), now),
            Err(CheckoutError::ReservationInPast)
        );

        req.reservation_at = Some(now + Duration::days(1));
        let validated = validate_request(req, now).unwrap();
        assert!(validated.shipping_address.is_none());
        assert!(validated.reservation_at.is_some());
    }

    #[test]
    fn test_validate_rejects_in_store_and_bad_contact() {
        assert_eq!(
            validate_request(request(OrderKind::InStore), Utc::now()),
            Err(CheckoutError::UnsupportedKind(OrderKind::InStore))
        );

        let mut req = request(OrderKind::Online);
        req.customer_name = "   ".to_owned();
        assert_eq!(
            validate_request(req, Utc::now()),
            Err(CheckoutError::MissingCustomerName)
        );

        let mut req = request(OrderKind::Online);
        req.phone = "not a phone".to_owned();
        assert!(matches!(
            validate_request(req, Utc::now()),
            Err(CheckoutError::InvalidPhone(_))
        ));
    }

    #[test]
    fn test_check_stock_reports_every_shortage() {
        let snapshot = [snapshot(1, 1), snapshot(2, 0), snapshot(3, 10)];
        let err = check_stock(&[line(1, 2), line(2, 1), line(3, 10)], &snapshot).unwrap_err();

        let CheckoutError::InsufficientStock(shortages) = err else {
            panic!("expected insufficient stock");
        };
        assert_eq!(shortages.len(), 2);
        assert_eq!(shortages[0].product_id, ProductId::new(1));
        assert_eq!(shortages[0].requested, 2);
        assert_eq!(shortages[0].available, 1);
        assert_eq!(shortages[1].product_id, ProductId::new(2));
    }

    #[test]
    fn test_check_stock_exact_quantity_passes() {
        let snapshot = [snapshot(1, 3)];
        assert!(check_stock(&[line(1, 3)], &snapshot).is_ok());
    }

    #[test]
    fn test_check_stock_unknown_or_inactive_product() {
        let mut inactive = snapshot(2, 10);
        inactive.is_active = false;
        let snapshot = [snapshot(1, 10), inactive];

        assert_eq!(
            check_stock(&[line(9, 1)], &snapshot),
            Err(CheckoutError::ProductUnavailable {
                product_id: ProductId::new(9),
                name: None
            })
        );
        assert!(matches!(
            check_stock(&[line(2, 1)], &snapshot),
            Err(CheckoutError::ProductUnavailable { name: Some(_), .. })
        ));
    }

    #[test]
    fn test_messages_one_per_shortage() {
        let err = CheckoutError::InsufficientStock(vec![
            StockShortage {
                product_id: ProductId::new(1),
                name: "A".to_owned(),
                requested: 2,
                available: 1,
            },
            StockShortage {
                product_id: ProductId::new(2),
                name: "B".to_owned(),
                requested: 1,
                available: 0,
            },
        ]);
        assert_eq!(err.messages().len(), 2);
    }
}
