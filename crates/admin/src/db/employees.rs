//! Employee repository.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;
use tracing::info;

use laptop_shop_core::{EmployeeId, PhoneNumber};

use super::RepositoryError;
use crate::models::Employee;

/// Fields for creating or replacing an employee.
#[derive(Debug, Clone, Deserialize)]
pub struct EmployeeInput {
    pub name: String,
    #[serde(default)]
    pub phone: Option<PhoneNumber>,
    pub daily_wage: Decimal,
    #[serde(default)]
    pub late_deduction: Decimal,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

const fn default_active() -> bool {
    true
}

impl EmployeeInput {
    /// Check name and amounts.
    ///
    /// # Errors
    ///
    /// Returns a message describing the first invalid field.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("name is required".to_owned());
        }
        if self.daily_wage.is_sign_negative() {
            return Err("daily wage cannot be negative".to_owned());
        }
        if self.late_deduction.is_sign_negative() {
            return Err("late deduction cannot be negative".to_owned());
        }
        Ok(())
    }
}

#[derive(Debug, sqlx::FromRow)]
struct EmployeeRow {
    id: EmployeeId,
    name: String,
    phone: Option<PhoneNumber>,
    daily_wage: Decimal,
    late_deduction: Decimal,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<EmployeeRow> for Employee {
    fn from(row: EmployeeRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            phone: row.phone,
            daily_wage: row.daily_wage,
            late_deduction: row.late_deduction,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const EMPLOYEE_COLUMNS: &str =
    "id, name, phone, daily_wage, late_deduction, is_active, created_at, updated_at";

/// Repository for employees.
pub struct EmployeeRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> EmployeeRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List employees by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, active_only: bool) -> Result<Vec<Employee>, RepositoryError> {
        let rows = sqlx::query_as::<_, EmployeeRow>(&format!(
            r"
            SELECT {EMPLOYEE_COLUMNS} FROM shop.employee
            WHERE is_active OR NOT $1
            ORDER BY name, id
            "
        ))
        .bind(active_only)
        .fetch_all(self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Get an employee.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: EmployeeId) -> Result<Option<Employee>, RepositoryError> {
        let row = sqlx::query_as::<_, EmployeeRow>(&format!(
            "SELECT {EMPLOYEE_COLUMNS} FROM shop.employee WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(row.map(Into::into))
    }

    /// Add an employee.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, input: &EmployeeInput) -> Result<Employee, RepositoryError> {
        let row = sqlx::query_as::<_, EmployeeRow>(&format!(
            r"
            INSERT INTO shop.employee (name, phone, daily_wage, late_deduction, is_active)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {EMPLOYEE_COLUMNS}
            "
        ))
        .bind(input.name.trim())
        .bind(input.phone.as_ref())
        .bind(input.daily_wage)
        .bind(input.late_deduction)
        .bind(input.is_active)
        .fetch_one(self.pool)
        .await?;

        let employee: Employee = row.into();
        info!(employee_id = %employee.id, "Employee created");
        Ok(employee)
    }

    /// Replace an employee's details.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` for an unknown employee.
    pub async fn update(
        &self,
        id: EmployeeId,
        input: &EmployeeInput,
    ) -> Result<Employee, RepositoryError> {
        let row = sqlx::query_as::<_, EmployeeRow>(&format!(
            r"
            UPDATE shop.employee
            SET name = $2, phone = $3, daily_wage = $4, late_deduction = $5,
                is_active = $6, updated_at = NOW()
            WHERE id = $1
            RETURNING {EMPLOYEE_COLUMNS}
            "
        ))
        .bind(id)
        .bind(input.name.trim())
        .bind(input.phone.as_ref())
        .bind(input.daily_wage)
        .bind(input.late_deduction)
        .bind(input.is_active)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Ok(row.into())
    }

    /// Activate or deactivate an employee. Attendance history is kept.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` for an unknown employee.
    pub async fn set_active(
        &self,
        id: EmployeeId,
        active: bool,
    ) -> Result<Employee, RepositoryError> {
        let row = sqlx::query_as::<_, EmployeeRow>(&format!(
            r"
            UPDATE shop.employee SET is_active = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {EMPLOYEE_COLUMNS}
            "
        ))
        .bind(id)
        .bind(active)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        info!(employee_id = %id, active, "Employee active flag changed");
        Ok(row.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_validation() {
        let mut input = EmployeeInput {
            name: "Sari".to_owned(),
            phone: None,
            daily_wage: Decimal::from(120_000),
            late_deduction: Decimal::from(20_000),
            is_active: true,
        };
        assert!(input.validate().is_ok());

        input.late_deduction = Decimal::from(-1);
        assert!(input.validate().is_err());

        input.late_deduction = Decimal::ZERO;
        input.name = String::new();
        assert!(input.validate().is_err());
    }
}
