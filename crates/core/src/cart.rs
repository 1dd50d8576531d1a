//! Session cart.
//!
//! The cart holds only product IDs and quantities; names, prices and stock
//! are looked up fresh every time the cart is priced, so a cart that sat in a
//! session for a week never shows a stale price.

use serde::{Deserialize, Serialize};

use crate::checkout::ProductSnapshot;
use crate::types::{CurrencyCode, Price, ProductId};

/// Upper bound on the quantity of a single line.
pub const MAX_LINE_QUANTITY: u32 = 99;

/// One product in the cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// A shopper's cart, serialized into the session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Add `quantity` units of a product, merging with an existing line.
    ///
    /// Returns the line's new quantity (capped at [`MAX_LINE_QUANTITY`]).
    pub fn add(&mut self, product_id: ProductId, quantity: u32) -> u32 {
        if let Some(line) = self.lines.iter_mut().find(|l| l.product_id == product_id) {
            line.quantity = line.quantity.saturating_add(quantity).min(MAX_LINE_QUANTITY);
            return line.quantity;
        }
        if quantity == 0 {
            return 0;
        }
        let quantity = quantity.min(MAX_LINE_QUANTITY);
        self.lines.push(CartLine {
            product_id,
            quantity,
        });
        quantity
    }

    /// Set a line's quantity; zero removes the line.
    ///
    /// Returns `false` if the product was not in the cart and nothing was added.
    pub fn set_quantity(&mut self, product_id: ProductId, quantity: u32) -> bool {
        if quantity == 0 {
            return self.remove(product_id);
        }
        let quantity = quantity.min(MAX_LINE_QUANTITY);
        match self.lines.iter_mut().find(|l| l.product_id == product_id) {
            Some(line) => {
                line.quantity = quantity;
                true
            }
            None => false,
        }
    }

    /// Remove a product. Returns whether it was present.
    pub fn remove(&mut self, product_id: ProductId) -> bool {
        let before = self.lines.len();
        self.lines.retain(|l| l.product_id != product_id);
        self.lines.len() != before
    }

    /// Empty the cart.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Lines in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn total_quantity(&self) -> u32 {
        self.lines
            .iter()
            .fold(0_u32, |acc, l| acc.saturating_add(l.quantity))
    }

    /// Price the cart against current product data.
    ///
    /// `lookup` returns the current snapshot of a product. Products that are
    /// missing or inactive end up in [`PricedCart::unavailable`] and do not
    /// count toward the subtotal.
    pub fn price<'a, F>(&self, lookup: F, currency: CurrencyCode) -> PricedCart
    where
        F: Fn(ProductId) -> Option<&'a ProductSnapshot>,
    {
        let mut lines = Vec::with_capacity(self.lines.len());
        let mut unavailable = Vec::new();
        let mut subtotal = Price::zero(currency);
        let mut item_count = 0_u32;

        for line in &self.lines {
            match lookup(line.product_id).filter(|p| p.is_active) {
                Some(product) => {
                    let unit_price = Price::new(product.unit_price, currency);
                    let line_total = unit_price.times(line.quantity);
                    subtotal = subtotal.checked_add(&line_total).unwrap_or(subtotal);
                    item_count = item_count.saturating_add(line.quantity);
                    lines.push(PricedLine {
                        product_id: line.product_id,
                        name: product.name.clone(),
                        quantity: line.quantity,
                        unit_price,
                        line_total,
                        available: product.stock,
                        exceeds_stock: i64::from(line.quantity) > i64::from(product.stock),
                    });
                }
                None => unavailable.push(line.product_id),
            }
        }

        PricedCart {
            lines,
            unavailable,
            subtotal,
            item_count,
        }
    }
}

/// A cart line with current product data attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PricedLine {
    pub product_id: ProductId,
    pub name: String,
    pub quantity: u32,
    pub unit_price: Price,
    pub line_total: Price,
    /// Units currently in stock.
    pub available: i32,
    /// The requested quantity is more than what is in stock right now.
    pub exceeds_stock: bool,
}

/// Result of pricing a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PricedCart {
    pub lines: Vec<PricedLine>,
    /// Products that are gone or deactivated since they were added.
    pub unavailable: Vec<ProductId>,
    pub subtotal: Price,
    pub item_count: u32,
}
