//! Employee and attendance domain types.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use laptop_shop_core::{AttendanceId, AttendanceStatus, EmployeeId, PhoneNumber};

/// A shop employee (not necessarily a console user).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Employee {
    pub id: EmployeeId,
    pub name: String,
    pub phone: Option<PhoneNumber>,
    pub daily_wage: Decimal,
    /// Subtracted from the daily wage for a late day.
    pub late_deduction: Decimal,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One employee's attendance for one local day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttendanceRecord {
    pub id: AttendanceId,
    pub employee_id: EmployeeId,
    pub work_date: NaiveDate,
    pub status: AttendanceStatus,
    pub clock_in: Option<DateTime<Utc>>,
    pub clock_out: Option<DateTime<Utc>>,
    /// Only meaningful for `Leave`.
    pub paid_leave: bool,
    pub note: Option<String>,
}
