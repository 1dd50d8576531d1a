//! Admin authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors that can occur during admin authentication operations.
#[derive(Debug, Error)]
pub enum AdminAuthError {
    /// Username outside the allowed shape.
    #[error("username must be 3-32 characters of a-z, 0-9, '.', '_' or '-'")]
    InvalidUsername,

    /// Password shorter than the minimum.
    #[error("password must be at least {0} characters")]
    WeakPassword(usize),

    /// Unknown username, wrong password or disabled account.
    #[error("invalid username or password")]
    InvalidCredentials,

    /// Admin user already exists.
    #[error("admin user already exists: {0}")]
    UserAlreadyExists(String),

    /// Hashing or parsing a stored hash failed.
    #[error("password hash error: {0}")]
    Hash(String),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}
