//! Order repository: atomic placement, cancellation and lookups.
//!
//! Placement locks the referenced product rows with `SELECT ... FOR UPDATE`
//! in ascending ID order, re-checks stock against the locked rows, writes the
//! order and its lines, and decrements stock, all in one transaction. Two
//! concurrent checkouts for the last unit serialize on the row lock; the
//! second one sees the decremented stock and fails its check.

use chrono::{DateTime, NaiveDate, Utc};
use rand::seq::IndexedRandom;
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder, Transaction};
use thiserror::Error;
use tracing::{info, instrument, warn};

use super::{MAX_TRANSACTION_ATTEMPTS, RepositoryError, is_transient, is_unique_violation};
use crate::cart::CartLine;
use crate::checkout::{
    CheckoutError, ProductSnapshot, ShippingAddress, ValidatedCheckout, check_stock, merge_lines,
};
use crate::types::{
    AdminUserId, OrderId, OrderKind, OrderLineId, OrderStatus, PaymentMethod, PhoneNumber,
    ProductId,
};

const ORDER_NUMBER_PREFIX: &str = "INV";
const ORDER_NUMBER_SUFFIX_LEN: usize = 6;
const ORDER_NUMBER_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const ORDER_NUMBER_CONSTRAINT: &str = "customer_order_number_key";

// =============================================================================
// Models
// =============================================================================

/// Payment captured at the register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaymentDetails {
    pub method: PaymentMethod,
    pub tendered: Decimal,
}

/// Income to book for a sale, written in the placement transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaleIncome {
    pub category: String,
    pub entry_date: NaiveDate,
    /// Prefixed to the order number in the entry description.
    pub label: String,
}

/// An order ready to be placed. Duplicate product lines are merged during
/// placement.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub kind: OrderKind,
    pub status: OrderStatus,
    pub customer_name: String,
    pub phone: Option<PhoneNumber>,
    pub shipping_address: Option<ShippingAddress>,
    pub reservation_at: Option<DateTime<Utc>>,
    pub note: Option<String>,
    pub lines: Vec<CartLine>,
    pub payment: Option<PaymentDetails>,
    /// Booked as an income cashflow entry when the total is positive.
    pub income: Option<SaleIncome>,
    pub created_by: Option<AdminUserId>,
}

impl From<ValidatedCheckout> for NewOrder {
    fn from(checkout: ValidatedCheckout) -> Self {
        Self {
            kind: checkout.kind,
            status: OrderStatus::Pending,
            customer_name: checkout.customer_name,
            phone: Some(checkout.phone),
            shipping_address: checkout.shipping_address,
            reservation_at: checkout.reservation_at,
            note: checkout.note,
            lines: checkout.lines,
            payment: None,
            income: None,
            created_by: None,
        }
    }
}

/// A stored order line. Name and price are as they were at purchase time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderLine {
    pub id: OrderLineId,
    pub product_id: ProductId,
    pub product_name: String,
    pub unit_price: Decimal,
    pub quantity: i32,
    pub line_total: Decimal,
}

/// A stored order with its lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Order {
    pub id: OrderId,
    pub number: String,
    pub kind: OrderKind,
    pub status: OrderStatus,
    pub customer_name: String,
    pub phone: Option<PhoneNumber>,
    pub shipping_address: Option<ShippingAddress>,
    pub reservation_at: Option<DateTime<Utc>>,
    pub note: Option<String>,
    pub total: Decimal,
    pub payment_method: Option<PaymentMethod>,
    pub amount_tendered: Option<Decimal>,
    pub change_due: Option<Decimal>,
    pub created_by: Option<AdminUserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub lines: Vec<OrderLine>,
}

impl Order {
    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> i64 {
        self.lines.iter().map(|l| i64::from(l.quantity)).sum()
    }
}

/// An order header as shown in listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct OrderSummary {
    pub id: OrderId,
    pub number: String,
    pub kind: OrderKind,
    pub status: OrderStatus,
    pub customer_name: String,
    pub phone: Option<PhoneNumber>,
    pub total: Decimal,
    pub item_count: i64,
    pub created_at: DateTime<Utc>,
}

/// Filters for [`OrderRepository::list`]. Unset fields do not constrain.
#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    pub kind: Option<OrderKind>,
    /// Inclusive, compared against the order's creation date (UTC).
    pub from: Option<NaiveDate>,
    /// Inclusive.
    pub to: Option<NaiveDate>,
    /// Case-insensitive match on order number or customer name.
    pub search: Option<String>,
    pub limit: i64,
    pub offset: i64,
}

// =============================================================================
// Errors
// =============================================================================

/// Errors from [`OrderRepository::place_order`].
#[derive(Debug, Error)]
pub enum PlaceOrderError {
    /// Stock or availability check failed on the locked rows.
    #[error(transparent)]
    Checkout(#[from] CheckoutError),

    /// The tendered amount does not cover the total.
    #[error("amount tendered {tendered} is less than total {total}")]
    InsufficientPayment { total: Decimal, tendered: Decimal },

    /// Database error, including transient conflicts after the last attempt.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Errors from [`OrderRepository::update_status`].
#[derive(Debug, Error)]
pub enum StatusChangeError {
    #[error("order not found")]
    NotFound,

    #[error("cannot move order from {from:?} to {to:?}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct LockedProductRow {
    id: ProductId,
    name: String,
    price: Decimal,
    stock: i32,
    is_active: bool,
}

impl From<LockedProductRow> for ProductSnapshot {
    fn from(row: LockedProductRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            unit_price: row.price,
            stock: row.stock,
            is_active: row.is_active,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: OrderId,
    number: String,
    kind: OrderKind,
    status: OrderStatus,
    customer_name: String,
    phone: Option<PhoneNumber>,
    shipping_address: Option<Json<ShippingAddress>>,
    reservation_at: Option<DateTime<Utc>>,
    note: Option<String>,
    total: Decimal,
    payment_method: Option<PaymentMethod>,
    amount_tendered: Option<Decimal>,
    change_due: Option<Decimal>,
    created_by: Option<AdminUserId>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl OrderRow {
    fn with_lines(self, lines: Vec<OrderLine>) -> Order {
        Order {
            id: self.id,
            number: self.number,
            kind: self.kind,
            status: self.status,
            customer_name: self.customer_name,
            phone: self.phone,
            shipping_address: self.shipping_address.map(|Json(a)| a),
            reservation_at: self.reservation_at,
            note: self.note,
            total: self.total,
            payment_method: self.payment_method,
            amount_tendered: self.amount_tendered,
            change_due: self.change_due,
            created_by: self.created_by,
            created_at: self.created_at,
            updated_at: self.updated_at,
            lines,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct OrderLineRow {
    id: OrderLineId,
    product_id: ProductId,
    product_name: String,
    unit_price: Decimal,
    quantity: i32,
    line_total: Decimal,
}

impl From<OrderLineRow> for OrderLine {
    fn from(row: OrderLineRow) -> Self {
        Self {
            id: row.id,
            product_id: row.product_id,
            product_name: row.product_name,
            unit_price: row.unit_price,
            quantity: row.quantity,
            line_total: row.line_total,
        }
    }
}

const ORDER_COLUMNS: &str = r"
    id, number, kind, status, customer_name, phone, shipping_address,
    reservation_at, note, total, payment_method, amount_tendered, change_due,
    created_by, created_at, updated_at
";

// =============================================================================
// Repository
// =============================================================================

/// Repository for order placement and lookups.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Place an order and decrement stock atomically.
    ///
    /// The whole transaction is restarted on a serialization failure,
    /// deadlock or order-number collision, up to
    /// [`MAX_TRANSACTION_ATTEMPTS`] times.
    ///
    /// # Errors
    ///
    /// Returns `PlaceOrderError::Checkout` when a product is unavailable or
    /// short on stock, `InsufficientPayment` when a POS payment does not
    /// cover the total, and `Database` for anything else. Nothing is written
    /// in any error case.
    #[instrument(skip(self, order), fields(kind = ?order.kind, lines = order.lines.len()))]
    pub async fn place_order(&self, order: &NewOrder) -> Result<Order, PlaceOrderError> {
        let mut attempt = 1;
        loop {
            match self.try_place(order).await {
                Err(PlaceOrderError::Database(err))
                    if attempt < MAX_TRANSACTION_ATTEMPTS && should_restart(&err) =>
                {
                    warn!(attempt, error = %err, "Order placement conflict, retrying");
                    attempt += 1;
                }
                Ok(placed) => {
                    info!(
                        order_id = %placed.id,
                        order_number = %placed.number,
                        total = %placed.total,
                        attempt,
                        "Order placed"
                    );
                    return Ok(placed);
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn try_place(&self, order: &NewOrder) -> Result<Order, PlaceOrderError> {
        let mut tx = self.pool.begin().await?;

        let snapshot = lock_products(&mut tx, &order.lines).await?;
        let priced = prepare_lines(&order.lines, &snapshot)?;
        let total: Decimal = priced.iter().map(|l| l.line_total).sum();

        let change_due = match order.payment {
            Some(payment) if payment.tendered < total => {
                return Err(PlaceOrderError::InsufficientPayment {
                    total,
                    tendered: payment.tendered,
                });
            }
            Some(payment) => Some(payment.tendered - total),
            None => None,
        };

        let number = generate_order_number(Utc::now());
        let header = sqlx::query_as::<_, OrderRow>(&format!(
            r"
            INSERT INTO shop.customer_order
                (number, kind, status, customer_name, phone, shipping_address,
                 reservation_at, note, total, payment_method, amount_tendered,
                 change_due, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING {ORDER_COLUMNS}
            "
        ))
        .bind(&number)
        .bind(order.kind)
        .bind(order.status)
        .bind(&order.customer_name)
        .bind(order.phone.as_ref())
        .bind(order.shipping_address.as_ref().map(Json))
        .bind(order.reservation_at)
        .bind(order.note.as_deref())
        .bind(total)
        .bind(order.payment.map(|p| p.method))
        .bind(order.payment.map(|p| p.tendered))
        .bind(change_due)
        .bind(order.created_by)
        .fetch_one(&mut *tx)
        .await?;

        let mut lines = Vec::with_capacity(priced.len());
        for line in &priced {
            let row = sqlx::query_as::<_, OrderLineRow>(
                r"
                INSERT INTO shop.order_line
                    (order_id, product_id, product_name, unit_price, quantity, line_total)
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING id, product_id, product_name, unit_price, quantity, line_total
                ",
            )
            .bind(header.id)
            .bind(line.product_id)
            .bind(&line.name)
            .bind(line.unit_price)
            .bind(line.quantity)
            .bind(line.line_total)
            .fetch_one(&mut *tx)
            .await?;
            lines.push(row.into());

            sqlx::query(
                "UPDATE shop.product SET stock = stock - $1, updated_at = NOW() WHERE id = $2",
            )
            .bind(line.quantity)
            .bind(line.product_id)
            .execute(&mut *tx)
            .await?;
        }

        if let Some(income) = order.income.as_ref().filter(|_| total > Decimal::ZERO) {
            sqlx::query(
                r"
                INSERT INTO shop.cashflow_entry
                    (direction, category, amount, entry_date, description, order_id, created_by)
                VALUES ('income', $1, $2, $3, $4, $5, $6)
                ",
            )
            .bind(income.category.trim().to_lowercase())
            .bind(total)
            .bind(income.entry_date)
            .bind(format!("{} {}", income.label.trim(), header.number))
            .bind(header.id)
            .bind(order.created_by)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(header.with_lines(lines))
    }

    /// Move an order to `next`, restoring stock when cancelling.
    ///
    /// # Errors
    ///
    /// Returns `StatusChangeError::NotFound` for an unknown order and
    /// `InvalidTransition` when the lifecycle does not allow the move
    /// (including cancelling a completed or already cancelled order).
    #[instrument(skip(self), fields(order_id = %id, next = ?next))]
    pub async fn update_status(
        &self,
        id: OrderId,
        next: OrderStatus,
    ) -> Result<Order, StatusChangeError> {
        let mut attempt = 1;
        loop {
            match self.try_update_status(id, next).await {
                Err(StatusChangeError::Database(err))
                    if attempt < MAX_TRANSACTION_ATTEMPTS && is_transient(&err) =>
                {
                    warn!(attempt, error = %err, "Order status conflict, retrying");
                    attempt += 1;
                }
                other => return other,
            }
        }
    }

    /// Cancel an order and put its stock back.
    ///
    /// # Errors
    ///
    /// See [`Self::update_status`].
    pub async fn cancel_order(&self, id: OrderId) -> Result<Order, StatusChangeError> {
        self.update_status(id, OrderStatus::Cancelled).await
    }

    async fn try_update_status(
        &self,
        id: OrderId,
        next: OrderStatus,
    ) -> Result<Order, StatusChangeError> {
        let mut tx = self.pool.begin().await?;

        let current: OrderStatus = sqlx::query_scalar(
            "SELECT status FROM shop.customer_order WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(StatusChangeError::NotFound)?;

        if !current.can_transition_to(next) {
            return Err(StatusChangeError::InvalidTransition {
                from: current,
                to: next,
            });
        }

        if next == OrderStatus::Cancelled {
            // Lock in ID order, same as placement.
            sqlx::query(
                r"
                SELECT id FROM shop.product
                WHERE id IN (SELECT product_id FROM shop.order_line WHERE order_id = $1)
                ORDER BY id
                FOR UPDATE
                ",
            )
            .bind(id)
            .execute(&mut *tx)
            .await?;

            let restocked = sqlx::query(
                r"
                UPDATE shop.product p
                SET stock = p.stock + l.quantity, updated_at = NOW()
                FROM (
                    SELECT product_id, SUM(quantity)::INTEGER AS quantity
                    FROM shop.order_line
                    WHERE order_id = $1
                    GROUP BY product_id
                ) l
                WHERE p.id = l.product_id
                ",
            )
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
            info!(order_id = %id, restocked, "Stock restored for cancelled order");
        }

        let header = sqlx::query_as::<_, OrderRow>(&format!(
            r"
            UPDATE shop.customer_order
            SET status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {ORDER_COLUMNS}
            "
        ))
        .bind(id)
        .bind(next)
        .fetch_one(&mut *tx)
        .await?;

        let lines = fetch_lines(&mut *tx, id).await?;
        tx.commit().await?;

        info!(order_id = %id, from = ?current, to = ?next, "Order status changed");
        Ok(header.with_lines(lines))
    }

    /// Get an order with its lines.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let header = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM shop.customer_order WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        match header {
            Some(header) => {
                let lines = fetch_lines(self.pool, header.id).await?;
                Ok(Some(header.with_lines(lines)))
            }
            None => Ok(None),
        }
    }

    /// Get an order by its public number (e.g. `INV-20250101-AB12CD`).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_by_number(&self, number: &str) -> Result<Option<Order>, RepositoryError> {
        let header = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM shop.customer_order WHERE number = $1"
        ))
        .bind(number.trim().to_ascii_uppercase())
        .fetch_optional(self.pool)
        .await?;

        match header {
            Some(header) => {
                let lines = fetch_lines(self.pool, header.id).await?;
                Ok(Some(header.with_lines(lines)))
            }
            None => Ok(None),
        }
    }

    /// List order headers, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, filter: &OrderFilter) -> Result<Vec<OrderSummary>, RepositoryError> {
        let mut query = QueryBuilder::<Postgres>::new(
            r"
            SELECT o.id, o.number, o.kind, o.status, o.customer_name, o.phone, o.total,
                   COALESCE((SELECT SUM(l.quantity) FROM shop.order_line l
                             WHERE l.order_id = o.id), 0)::BIGINT AS item_count,
                   o.created_at
            FROM shop.customer_order o
            WHERE TRUE
            ",
        );

        if let Some(status) = filter.status {
            query.push(" AND o.status = ").push_bind(status);
        }
        if let Some(kind) = filter.kind {
            query.push(" AND o.kind = ").push_bind(kind);
        }
        if let Some(from) = filter.from {
            query
                .push(" AND (o.created_at AT TIME ZONE 'UTC')::DATE >= ")
                .push_bind(from);
        }
        if let Some(to) = filter.to {
            query
                .push(" AND (o.created_at AT TIME ZONE 'UTC')::DATE <= ")
                .push_bind(to);
        }
        if let Some(search) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            let pattern = format!("%{}%", escape_like(search));
            query
                .push(" AND (o.number ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR o.customer_name ILIKE ")
                .push_bind(pattern)
                .push(")");
        }

        query
            .push(" ORDER BY o.created_at DESC, o.id DESC LIMIT ")
            .push_bind(filter.limit.clamp(1, 500))
            .push(" OFFSET ")
            .push_bind(filter.offset.max(0));

        let rows = query
            .build_query_as::<OrderSummary>()
            .fetch_all(self.pool)
            .await?;
        Ok(rows)
    }
}

// =============================================================================
// Helpers
// =============================================================================

async fn lock_products(
    tx: &mut Transaction<'_, Postgres>,
    lines: &[CartLine],
) -> Result<Vec<ProductSnapshot>, sqlx::Error> {
    let mut ids: Vec<ProductId> = lines.iter().map(|l| l.product_id).collect();
    ids.sort_unstable();
    ids.dedup();

    let rows = sqlx::query_as::<_, LockedProductRow>(
        r"
        SELECT id, name, price, stock, is_active
        FROM shop.product
        WHERE id = ANY($1)
        ORDER BY id
        FOR UPDATE
        ",
    )
    .bind(ids)
    .fetch_all(&mut **tx)
    .await?;

    Ok(rows.into_iter().map(Into::into).collect())
}

async fn fetch_lines<'e, E>(executor: E, order_id: OrderId) -> Result<Vec<OrderLine>, sqlx::Error>
where
    E: sqlx::PgExecutor<'e>,
{
    let rows = sqlx::query_as::<_, OrderLineRow>(
        r"
        SELECT id, product_id, product_name, unit_price, quantity, line_total
        FROM shop.order_line
        WHERE order_id = $1
        ORDER BY id
        ",
    )
    .bind(order_id)
    .fetch_all(executor)
    .await?;

    Ok(rows.into_iter().map(Into::into).collect())
}

fn should_restart(err: &sqlx::Error) -> bool {
    is_transient(err) || is_unique_violation(err, Some(ORDER_NUMBER_CONSTRAINT))
}

/// A line with the locked product's current name and price.
#[derive(Debug, Clone, PartialEq, Eq)]
struct PricedOrderLine {
    product_id: ProductId,
    name: String,
    unit_price: Decimal,
    quantity: i32,
    line_total: Decimal,
}

/// Merge duplicate lines, check them against the locked rows and price them.
fn prepare_lines(
    lines: &[CartLine],
    snapshot: &[ProductSnapshot],
) -> Result<Vec<PricedOrderLine>, CheckoutError> {
    let merged = merge_lines(lines)?;
    check_stock(&merged, snapshot)?;
    Ok(price_lines(&merged, snapshot))
}

/// Attach snapshot prices to lines. Lines without a snapshot are skipped;
/// callers run [`check_stock`] first so that never happens.
fn price_lines(lines: &[CartLine], snapshot: &[ProductSnapshot]) -> Vec<PricedOrderLine> {
    lines
        .iter()
        .filter_map(|line| {
            let product = snapshot.iter().find(|p| p.id == line.product_id)?;
            let quantity = i32::try_from(line.quantity).ok()?;
            Some(PricedOrderLine {
                product_id: product.id,
                name: product.name.clone(),
                unit_price: product.unit_price,
                quantity,
                line_total: product.unit_price * Decimal::from(quantity),
            })
        })
        .collect()
}

/// Generate an order number like `INV-20250314-7KQ2ZD`.
#[must_use]
pub fn generate_order_number(now: DateTime<Utc>) -> String {
    let mut rng = rand::rng();
    let suffix: String = (0..ORDER_NUMBER_SUFFIX_LEN)
        .filter_map(|_| ORDER_NUMBER_CHARSET.choose(&mut rng).copied().map(char::from))
        .collect();
    format!("{ORDER_NUMBER_PREFIX}-{}-{suffix}", now.format("%Y%m%d"))
}

fn escape_like(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_order_number_format() {
        let now = Utc.with_ymd_and_hms(2025, 3, 14, 10, 0, 0).unwrap();
        let number = generate_order_number(now);

        assert_eq!(number.len(), "INV-20250314-".len() + ORDER_NUMBER_SUFFIX_LEN);
        assert!(number.starts_with("INV-20250314-"));
        let suffix = &number["INV-20250314-".len()..];
        assert!(
            suffix
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
        );
    }

    #[test]
    fn test_price_lines_uses_snapshot_prices() {
        let snapshot = [
            ProductSnapshot {
                id: ProductId::new(1),
                name: "ThinkPad T14".to_owned(),
                unit_price: Decimal::from(12_000_000),
                stock: 4,
                is_active: true,
            },
            ProductSnapshot {
                id: ProductId::new(2),
                name: "Mouse".to_owned(),
                unit_price: Decimal::from(150_000),
                stock: 50,
                is_active: true,
            },
        ];
        let lines = [
            CartLine {
                product_id: ProductId::new(1),
                quantity: 2,
            },
            CartLine {
                product_id: ProductId::new(2),
                quantity: 3,
            },
        ];

        let priced = price_lines(&lines, &snapshot);
        assert_eq!(priced.len(), 2);
        assert_eq!(priced[0].line_total, Decimal::from(24_000_000));
        assert_eq!(priced[1].name, "Mouse");
        assert_eq!(priced[1].line_total, Decimal::from(450_000));
    }

    fn laptop(stock: i32) -> ProductSnapshot {
        ProductSnapshot {
            id: ProductId::new(7),
            name: "IdeaPad Slim 3".to_owned(),
            unit_price: Decimal::from(7_500_000),
            stock,
            is_active: true,
        }
    }

    #[test]
    fn test_prepare_lines_merges_duplicates_before_stock_check() {
        let line = CartLine {
            product_id: ProductId::new(7),
            quantity: 1,
        };

        match prepare_lines(&[line, line], &[laptop(1)]) {
            Err(CheckoutError::InsufficientStock(shortages)) => {
                assert_eq!(shortages.len(), 1);
                assert_eq!(shortages[0].requested, 2);
                assert_eq!(shortages[0].available, 1);
            }
            other => panic!("expected a stock shortage, got {other:?}"),
        }

        let priced = prepare_lines(&[line, line], &[laptop(2)]).unwrap();
        assert_eq!(priced.len(), 1);
        assert_eq!(priced[0].quantity, 2);
        assert_eq!(priced[0].line_total, Decimal::from(15_000_000));
    }

    #[test]
    fn test_new_order_from_checkout_is_pending() {
        let checkout = ValidatedCheckout {
            customer_name: "Sari".to_owned(),
            phone: PhoneNumber::parse("081234567890").unwrap(),
            kind: OrderKind::Reservation,
            shipping_address: None,
            reservation_at: Some(Utc::now()),
            note: None,
            lines: vec![CartLine {
                product_id: ProductId::new(1),
                quantity: 1,
            }],
        };
        let order = NewOrder::from(checkout);
        assert_eq!(order.status, OrderStatus::Pending);
        assert!(order.payment.is_none());
        assert!(order.income.is_none());
        assert!(order.phone.is_some());
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
    }
}
