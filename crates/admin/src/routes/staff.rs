//! Employees, attendance and payroll.
//!
//! Employees are not staff accounts: a cashier logs in once on the shop PC
//! and clocks colleagues in and out by employee ID.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
};
use chrono::Utc;
use serde::Deserialize;
use tracing::instrument;

use laptop_shop_core::EmployeeId;

use super::DateRange;
use crate::db::attendance::ManualAttendance;
use crate::db::employees::EmployeeInput;
use crate::db::{AttendanceRepository, EmployeeRepository};
use crate::error::{AppError, Result};
use crate::middleware::{Owner, RequireAdminAuth, RequireRole, StoreAdmin};
use crate::models::{AttendanceRecord, Employee};
use crate::services::attendance::{classify_clock_in, is_manual_status};
use crate::services::payroll::{self, PayrollReport};
use crate::state::AppState;

/// Query for the employee list.
#[derive(Debug, Default, Deserialize)]
pub struct EmployeeListQuery {
    #[serde(default)]
    pub all: bool,
}

/// Query for the attendance list.
#[derive(Debug, Default, Deserialize)]
pub struct AttendanceListQuery {
    #[serde(flatten)]
    pub range: DateRange,
    pub employee_id: Option<EmployeeId>,
}

/// Build the staff router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/employees", get(list_employees).post(create_employee))
        .route("/api/employees/{id}", put(update_employee))
        .route("/api/employees/{id}/deactivate", post(deactivate_employee))
        .route("/api/employees/{id}/clock-in", post(clock_in))
        .route("/api/employees/{id}/clock-out", post(clock_out))
        .route("/api/attendance", get(list_attendance).post(record_manual))
        .route("/api/payroll", get(payroll_report))
}

/// GET /api/employees
#[instrument(skip_all)]
async fn list_employees(
    _: RequireAdminAuth,
    State(state): State<AppState>,
    Query(query): Query<EmployeeListQuery>,
) -> Result<Json<Vec<Employee>>> {
    let employees = EmployeeRepository::new(state.pool())
        .list(!query.all)
        .await?;
    Ok(Json(employees))
}

/// POST /api/employees
#[instrument(skip_all, fields(name = %input.name))]
async fn create_employee(
    _: RequireRole<StoreAdmin>,
    State(state): State<AppState>,
    Json(input): Json<EmployeeInput>,
) -> Result<(StatusCode, Json<Employee>)> {
    input.validate().map_err(AppError::Validation)?;
    let employee = EmployeeRepository::new(state.pool()).create(&input).await?;
    Ok((StatusCode::CREATED, Json(employee)))
}

/// PUT /api/employees/{id}
#[instrument(skip_all, fields(employee_id = %id))]
async fn update_employee(
    _: RequireRole<StoreAdmin>,
    State(state): State<AppState>,
    Path(id): Path<EmployeeId>,
    Json(input): Json<EmployeeInput>,
) -> Result<Json<Employee>> {
    input.validate().map_err(AppError::Validation)?;
    let employee = EmployeeRepository::new(state.pool())
        .update(id, &input)
        .await?;
    Ok(Json(employee))
}

/// POST /api/employees/{id}/deactivate
#[instrument(skip_all, fields(employee_id = %id))]
async fn deactivate_employee(
    _: RequireRole<StoreAdmin>,
    State(state): State<AppState>,
    Path(id): Path<EmployeeId>,
) -> Result<Json<Employee>> {
    let employee = EmployeeRepository::new(state.pool())
        .set_active(id, false)
        .await?;
    Ok(Json(employee))
}

/// POST /api/employees/{id}/clock-in
#[instrument(skip(admin, state), fields(admin_id = %admin.id, employee_id = %id))]
async fn clock_in(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<EmployeeId>,
) -> Result<(StatusCode, Json<AttendanceRecord>)> {
    let shop = &state.config().shop;
    let now = Utc::now();
    let (work_date, status) = classify_clock_in(now, shop.utc_offset, shop.opens_at);

    let record = AttendanceRepository::new(state.pool())
        .clock_in(id, work_date, status, now)
        .await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// POST /api/employees/{id}/clock-out
#[instrument(skip(admin, state), fields(admin_id = %admin.id, employee_id = %id))]
async fn clock_out(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<EmployeeId>,
) -> Result<Json<AttendanceRecord>> {
    let now = Utc::now();
    let work_date = state.config().shop.local_date(now);

    let record = AttendanceRepository::new(state.pool())
        .clock_out(id, work_date, now)
        .await?;
    Ok(Json(record))
}

/// GET /api/attendance
#[instrument(skip_all)]
async fn list_attendance(
    _: RequireAdminAuth,
    State(state): State<AppState>,
    Query(query): Query<AttendanceListQuery>,
) -> Result<Json<Vec<AttendanceRecord>>> {
    let (from, to) = query
        .range
        .resolve(state.config().shop.local_date(Utc::now()))?;
    let records = AttendanceRepository::new(state.pool())
        .list(from, to, query.employee_id)
        .await?;
    Ok(Json(records))
}

/// POST /api/attendance
///
/// Records an absent or leave day.
#[instrument(
    skip(admin, state, entry),
    fields(admin_id = %admin.id, employee_id = %entry.employee_id)
)]
async fn record_manual(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Json(entry): Json<ManualAttendance>,
) -> Result<(StatusCode, Json<AttendanceRecord>)> {
    if !is_manual_status(entry.status) {
        return Err(AppError::Validation(
            "only absent and leave days are recorded manually".to_owned(),
        ));
    }

    let record = AttendanceRepository::new(state.pool())
        .record_manual(&entry)
        .await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// GET /api/payroll
#[instrument(skip_all)]
async fn payroll_report(
    _: RequireRole<Owner>,
    State(state): State<AppState>,
    Query(range): Query<DateRange>,
) -> Result<Json<PayrollReport>> {
    let (from, to) = range.resolve(state.config().shop.local_date(Utc::now()))?;

    let employees = EmployeeRepository::new(state.pool()).list(false).await?;
    let records = AttendanceRepository::new(state.pool())
        .list(from, to, None)
        .await?;

    Ok(Json(payroll::compute(from, to, &employees, &records)))
}
