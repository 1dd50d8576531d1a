//! Attendance repository: one row per employee per local day.
//!
//! The `(employee_id, work_date)` unique key makes clock-in idempotent per
//! day; a second clock-in is a conflict, not a second row.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::{info, instrument};

use laptop_shop_core::{AttendanceId, AttendanceStatus, EmployeeId};

use super::RepositoryError;
use crate::models::AttendanceRecord;

/// A manually recorded day (absent or leave).
#[derive(Debug, Clone, Deserialize)]
pub struct ManualAttendance {
    pub employee_id: EmployeeId,
    pub work_date: NaiveDate,
    pub status: AttendanceStatus,
    #[serde(default)]
    pub paid_leave: bool,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, sqlx::FromRow)]
struct AttendanceRow {
    id: AttendanceId,
    employee_id: EmployeeId,
    work_date: NaiveDate,
    status: AttendanceStatus,
    clock_in: Option<DateTime<Utc>>,
    clock_out: Option<DateTime<Utc>>,
    paid_leave: bool,
    note: Option<String>,
}

impl From<AttendanceRow> for AttendanceRecord {
    fn from(row: AttendanceRow) -> Self {
        Self {
            id: row.id,
            employee_id: row.employee_id,
            work_date: row.work_date,
            status: row.status,
            clock_in: row.clock_in,
            clock_out: row.clock_out,
            paid_leave: row.paid_leave,
            note: row.note,
        }
    }
}

const ATTENDANCE_COLUMNS: &str =
    "id, employee_id, work_date, status, clock_in, clock_out, paid_leave, note";

/// Repository for attendance records.
pub struct AttendanceRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AttendanceRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Records within `from..=to`, optionally for one employee.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        employee_id: Option<EmployeeId>,
    ) -> Result<Vec<AttendanceRecord>, RepositoryError> {
        let mut query = QueryBuilder::<Postgres>::new(format!(
            "SELECT {ATTENDANCE_COLUMNS} FROM shop.attendance WHERE work_date BETWEEN "
        ));
        query.push_bind(from).push(" AND ").push_bind(to);
        if let Some(employee_id) = employee_id {
            query.push(" AND employee_id = ").push_bind(employee_id);
        }
        query.push(" ORDER BY work_date, employee_id");

        let rows = query
            .build_query_as::<AttendanceRow>()
            .fetch_all(self.pool)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Record a clock-in for `work_date` with an already classified status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` for an unknown or inactive
    /// employee and `RepositoryError::Conflict` if the day is already
    /// recorded.
    #[instrument(skip(self), fields(employee_id = %employee_id))]
    pub async fn clock_in(
        &self,
        employee_id: EmployeeId,
        work_date: NaiveDate,
        status: AttendanceStatus,
        at: DateTime<Utc>,
    ) -> Result<AttendanceRecord, RepositoryError> {
        self.require_active(employee_id).await?;

        let row = sqlx::query_as::<_, AttendanceRow>(&format!(
            r"
            INSERT INTO shop.attendance (employee_id, work_date, status, clock_in)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (employee_id, work_date) DO NOTHING
            RETURNING {ATTENDANCE_COLUMNS}
            "
        ))
        .bind(employee_id)
        .bind(work_date)
        .bind(status)
        .bind(at)
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| {
            RepositoryError::Conflict(format!("attendance for {work_date} is already recorded"))
        })?;

        info!(employee_id = %employee_id, %work_date, status = ?status, "Clocked in");
        Ok(row.into())
    }

    /// Record the clock-out for `work_date`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the employee has not clocked in
    /// that day or already clocked out.
    #[instrument(skip(self), fields(employee_id = %employee_id))]
    pub async fn clock_out(
        &self,
        employee_id: EmployeeId,
        work_date: NaiveDate,
        at: DateTime<Utc>,
    ) -> Result<AttendanceRecord, RepositoryError> {
        let row = sqlx::query_as::<_, AttendanceRow>(&format!(
            r"
            UPDATE shop.attendance SET clock_out = $3
            WHERE employee_id = $1 AND work_date = $2
              AND clock_in IS NOT NULL AND clock_out IS NULL AND clock_in <= $3
            RETURNING {ATTENDANCE_COLUMNS}
            "
        ))
        .bind(employee_id)
        .bind(work_date)
        .bind(at)
        .fetch_optional(self.pool)
        .await?;

        match row {
            Some(row) => {
                info!(employee_id = %employee_id, %work_date, "Clocked out");
                Ok(row.into())
            }
            None => Err(RepositoryError::Conflict(format!(
                "no open clock-in for {work_date}"
            ))),
        }
    }

    /// Record an absent or leave day. Replaces an earlier manual record for
    /// the same day but never one with a clock-in.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` for an unknown employee and
    /// `RepositoryError::Conflict` if the employee clocked in that day.
    pub async fn record_manual(
        &self,
        entry: &ManualAttendance,
    ) -> Result<AttendanceRecord, RepositoryError> {
        self.require_exists(entry.employee_id).await?;

        let paid_leave = entry.status == AttendanceStatus::Leave && entry.paid_leave;
        let row = sqlx::query_as::<_, AttendanceRow>(&format!(
            r"
            INSERT INTO shop.attendance (employee_id, work_date, status, paid_leave, note)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (employee_id, work_date) DO UPDATE
            SET status = EXCLUDED.status, paid_leave = EXCLUDED.paid_leave, note = EXCLUDED.note
            WHERE shop.attendance.clock_in IS NULL
            RETURNING {ATTENDANCE_COLUMNS}
            "
        ))
        .bind(entry.employee_id)
        .bind(entry.work_date)
        .bind(entry.status)
        .bind(paid_leave)
        .bind(entry.note.as_deref())
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| {
            RepositoryError::Conflict(format!(
                "employee clocked in on {}",
                entry.work_date
            ))
        })?;

        info!(
            employee_id = %entry.employee_id,
            work_date = %entry.work_date,
            status = ?entry.status,
            paid_leave,
            "Attendance recorded manually"
        );
        Ok(row.into())
    }

    async fn require_exists(&self, id: EmployeeId) -> Result<bool, RepositoryError> {
        let active: Option<bool> =
            sqlx::query_scalar("SELECT is_active FROM shop.employee WHERE id = $1")
                .bind(id)
                .fetch_optional(self.pool)
                .await?;
        active.ok_or(RepositoryError::NotFound)
    }

    async fn require_active(&self, id: EmployeeId) -> Result<(), RepositoryError> {
        if self.require_exists(id).await? {
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }
}
