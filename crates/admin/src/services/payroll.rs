//! Payroll over a period's attendance.
//!
//! Pure computation; the route loads employees and attendance and hands
//! them over.
//!
//! | Day              | Pay                                   |
//! |------------------|---------------------------------------|
//! | Present          | daily wage                            |
//! | Late             | daily wage - late deduction, min 0    |
//! | Leave (paid)     | daily wage                            |
//! | Leave (unpaid)   | 0                                     |
//! | Absent           | 0                                     |

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use laptop_shop_core::{AttendanceStatus, EmployeeId};

use crate::models::{AttendanceRecord, Employee};

/// One employee's pay for the period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PayrollLine {
    pub employee_id: EmployeeId,
    pub name: String,
    pub daily_wage: Decimal,
    pub present_days: u32,
    pub late_days: u32,
    pub paid_leave_days: u32,
    pub unpaid_leave_days: u32,
    pub absent_days: u32,
    /// From complete clock-in/clock-out pairs, two decimal places.
    pub worked_hours: Decimal,
    /// Total taken off for late days.
    pub late_deductions: Decimal,
    pub pay: Decimal,
}

/// Payroll for every employee over `from..=to`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PayrollReport {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub lines: Vec<PayrollLine>,
    pub total: Decimal,
}

/// Pay for a single day.
#[must_use]
pub fn day_pay(employee: &Employee, record: &AttendanceRecord) -> Decimal {
    match record.status {
        AttendanceStatus::Present => employee.daily_wage,
        AttendanceStatus::Late => {
            (employee.daily_wage - employee.late_deduction).max(Decimal::ZERO)
        }
        AttendanceStatus::Leave if record.paid_leave => employee.daily_wage,
        AttendanceStatus::Leave | AttendanceStatus::Absent => Decimal::ZERO,
    }
}

/// Compute one employee's line from their records.
///
/// Records belonging to other employees are ignored.
#[must_use]
pub fn compute_line(employee: &Employee, records: &[AttendanceRecord]) -> PayrollLine {
    let mut line = PayrollLine {
        employee_id: employee.id,
        name: employee.name.clone(),
        daily_wage: employee.daily_wage,
        present_days: 0,
        late_days: 0,
        paid_leave_days: 0,
        unpaid_leave_days: 0,
        absent_days: 0,
        worked_hours: Decimal::ZERO,
        late_deductions: Decimal::ZERO,
        pay: Decimal::ZERO,
    };
    let mut worked_minutes: i64 = 0;

    for record in records.iter().filter(|r| r.employee_id == employee.id) {
        match record.status {
            AttendanceStatus::Present => line.present_days += 1,
            AttendanceStatus::Late => {
                line.late_days += 1;
                line.late_deductions += employee.daily_wage - day_pay(employee, record);
            }
            AttendanceStatus::Leave if record.paid_leave => line.paid_leave_days += 1,
            AttendanceStatus::Leave => line.unpaid_leave_days += 1,
            AttendanceStatus::Absent => line.absent_days += 1,
        }
        line.pay += day_pay(employee, record);

        if let (Some(start), Some(end)) = (record.clock_in, record.clock_out) {
            worked_minutes += (end - start).num_minutes().max(0);
        }
    }

    line.worked_hours = (Decimal::from(worked_minutes) / Decimal::from(60)).round_dp(2);
    line
}

/// Compute the report for `employees` over `from..=to`.
///
/// Inactive employees are included only when they have attendance in the
/// period.
#[must_use]
pub fn compute(
    from: NaiveDate,
    to: NaiveDate,
    employees: &[Employee],
    records: &[AttendanceRecord],
) -> PayrollReport {
    let in_period: Vec<AttendanceRecord> = records
        .iter()
        .filter(|r| r.work_date >= from && r.work_date <= to)
        .cloned()
        .collect();

    let lines: Vec<PayrollLine> = employees
        .iter()
        .filter(|e| e.is_active || in_period.iter().any(|r| r.employee_id == e.id))
        .map(|e| compute_line(e, &in_period))
        .collect();

    let total = lines.iter().map(|l| l.pay).sum();
    PayrollReport {
        from,
        to,
        lines,
        total,
    }
}
