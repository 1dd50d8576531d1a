//! Status enums for various entities.
//!
//! All enums map to `PostgreSQL` enum types in the `shop` schema when the
//! `postgres` feature is enabled.

use serde::{Deserialize, Serialize};

/// How an order reaches the customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "shop.order_kind", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum OrderKind {
    /// Paid by transfer and shipped to the customer.
    Online,
    /// Picked up and paid in store at a reserved time.
    Reservation,
    /// Rung up at the cashier.
    InStore,
}

impl OrderKind {
    /// Stable identifier used in templates and query strings.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Online => "online",
            Self::Reservation => "reservation",
            Self::InStore => "in_store",
        }
    }
}

/// Order lifecycle status.
///
/// ```text
/// Pending ──► Confirmed ──► Completed
///    │            │
///    └────────────┴──► Cancelled
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "shop.order_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Placed, waiting for payment proof or pickup.
    #[default]
    Pending,
    /// Payment verified or reservation confirmed.
    Confirmed,
    /// Handed over to the customer.
    Completed,
    /// Cancelled; stock has been returned.
    Cancelled,
}

impl OrderStatus {
    /// Whether moving from `self` to `next` is allowed.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Confirmed | Self::Cancelled)
                | (Self::Confirmed, Self::Completed | Self::Cancelled)
        )
    }

    /// Completed and cancelled orders never change again.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Stable identifier used in templates and query strings.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(format!("invalid order status: {s}")),
        }
    }
}

/// How an order was paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "shop.payment_method", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Transfer,
    Cash,
    Qris,
    Debit,
}

/// Admin role with different permission levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "shop.admin_role", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum AdminRole {
    /// Full access including staff accounts and payroll.
    Owner,
    /// Store management: catalog, orders, cashflow, debts.
    Admin,
    /// POS, order lookup and attendance only.
    Cashier,
}

impl AdminRole {
    /// Whether this role includes everything `required` can do.
    #[must_use]
    pub const fn satisfies(self, required: Self) -> bool {
        self.rank() >= required.rank()
    }

    const fn rank(self) -> u8 {
        match self {
            Self::Owner => 2,
            Self::Admin => 1,
            Self::Cashier => 0,
        }
    }
}

impl std::fmt::Display for AdminRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Owner => write!(f, "owner"),
            Self::Admin => write!(f, "admin"),
            Self::Cashier => write!(f, "cashier"),
        }
    }
}

impl std::str::FromStr for AdminRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "owner" => Ok(Self::Owner),
            "admin" => Ok(Self::Admin),
            "cashier" => Ok(Self::Cashier),
            _ => Err(format!("invalid admin role: {s}")),
        }
    }
}

/// Direction of a cashflow entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "shop.cashflow_direction", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum CashflowDirection {
    Income,
    Expense,
}

/// Who owes whom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "shop.debt_kind", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum DebtKind {
    /// A customer owes the shop.
    Receivable,
    /// The shop owes a supplier.
    Payable,
}

impl DebtKind {
    /// Cashflow direction produced by a payment on a debt of this kind.
    #[must_use]
    pub const fn payment_direction(self) -> CashflowDirection {
        match self {
            Self::Receivable => CashflowDirection::Income,
            Self::Payable => CashflowDirection::Expense,
        }
    }
}

/// Whether a debt still has an outstanding balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "shop.debt_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum DebtStatus {
    #[default]
    Open,
    Settled,
}

/// Attendance outcome for one employee on one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "shop.attendance_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    Present,
    Late,
    Absent,
    Leave,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_status_transitions() {
        use OrderStatus::{Cancelled, Completed, Confirmed, Pending};

        assert!(Pending.can_transition_to(Confirmed));
        assert!(Pending.can_transition_to(Cancelled));
        assert!(Confirmed.can_transition_to(Completed));
        assert!(Confirmed.can_transition_to(Cancelled));

        assert!(!Pending.can_transition_to(Completed));
        assert!(!Completed.can_transition_to(Cancelled));
        assert!(!Cancelled.can_transition_to(Pending));
        assert!(!Pending.can_transition_to(Pending));
    }

    #[test]
    fn test_order_status_round_trip_str() {
        for status in [
            OrderStatus::Pending,
            OrderStatus::Confirmed,
            OrderStatus::Completed,
            OrderStatus::Cancelled,
        ] {
            assert_eq!(status.as_str().parse::<OrderStatus>(), Ok(status));
        }
    }

    #[test]
    fn test_admin_role_hierarchy() {
        assert!(AdminRole::Owner.satisfies(AdminRole::Admin));
        assert!(AdminRole::Admin.satisfies(AdminRole::Cashier));
        assert!(!AdminRole::Cashier.satisfies(AdminRole::Admin));
        assert!(!AdminRole::Admin.satisfies(AdminRole::Owner));
    }

    #[test]
    fn test_debt_payment_direction() {
        assert_eq!(
            DebtKind::Receivable.payment_direction(),
            CashflowDirection::Income
        );
        assert_eq!(
            DebtKind::Payable.payment_direction(),
            CashflowDirection::Expense
        );
    }

    #[test]
    fn test_serde_snake_case() {
        let json = serde_json::to_string(&OrderKind::InStore).unwrap_or_default();
        assert_eq!(json, "\"in_store\"");
    }
}
