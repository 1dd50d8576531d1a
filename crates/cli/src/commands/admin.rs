//! Staff account commands.
//!
//! # Usage
//!
//! ```bash
//! SHOP_ADMIN_PASSWORD='...' shop-cli admin create -u owner -n "Shop Owner" -r owner
//! shop-cli admin create -u kasir1 -n "Kasir Satu" -r cashier -p 'temporary-pass'
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` - `PostgreSQL` connection string
//! - `SHOP_ADMIN_PASSWORD` - Password when `-p` is not given

use laptop_shop_admin::db;
use laptop_shop_admin::services::{AdminAuthError, AdminAuthService};
use laptop_shop_core::{AdminRole, AdminUserId};
use thiserror::Error;

use super::{MissingEnvVar, database_url};

/// Environment variable holding the password when `-p` is omitted.
const PASSWORD_ENV: &str = "SHOP_ADMIN_PASSWORD";

/// Errors that can occur during admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    #[error(transparent)]
    Config(#[from] MissingEnvVar),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    /// Invalid role.
    #[error("Invalid role: {0}. Valid roles: owner, admin, cashier")]
    InvalidRole(String),

    /// Rejected by the account rules (username, password, duplicate).
    #[error(transparent)]
    Auth(#[from] AdminAuthError),
}

/// Create a new staff account.
///
/// # Errors
///
/// Returns `AdminError` for an unknown role, a missing password, an
/// invalid username or password, or a taken username.
pub async fn create_user(
    username: &str,
    name: &str,
    role: &str,
    password: Option<String>,
) -> Result<AdminUserId, AdminError> {
    let role: AdminRole = role
        .parse()
        .map_err(|_| AdminError::InvalidRole(role.to_owned()))?;

    let database_url = database_url()?;
    let password = match password {
        Some(password) => password,
        None => std::env::var(PASSWORD_ENV).map_err(|_| MissingEnvVar(PASSWORD_ENV))?,
    };

    tracing::info!("Connecting to database...");
    let pool = db::create_pool(&database_url).await?;

    tracing::info!("Creating staff account: {} ({})", username, role);
    let user = AdminAuthService::new(&pool)
        .create_user(username, name, role, &password)
        .await?;

    tracing::info!(
        "Staff account created! ID: {}, Username: {}, Role: {}",
        user.id,
        user.username,
        user.role
    );
    Ok(user.id)
}
