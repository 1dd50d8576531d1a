//! Unified error handling for admin.
//!
//! Every error body is JSON: `{"error": "..."}`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use laptop_shop_core::db::{PlaceOrderError, StatusChangeError};
use laptop_shop_core::product::ProductInputError;
use serde_json::json;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::db::debts::DebtPaymentError;
use crate::services::auth::AdminAuthError;

/// Application-level error type for the admin console.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Session store failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// User is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// User lacks permission.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Well-formed request with invalid field values.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Request conflicts with current state (stock, lifecycle, duplicates).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Database(RepositoryError::NotFound) | Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Database(RepositoryError::Conflict(_)) | Self::Conflict(_) => {
                StatusCode::CONFLICT
            }
            Self::Database(_) | Self::Session(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }

    fn message(&self) -> String {
        match self {
            Self::Database(RepositoryError::NotFound) => "Not found".to_owned(),
            Self::Database(RepositoryError::Conflict(detail)) => detail.clone(),
            // Don't expose internal error details to clients
            Self::Database(_) | Self::Session(_) | Self::Internal(_) => {
                "Internal server error".to_owned()
            }
            Self::NotFound(_)
            | Self::Unauthorized(_)
            | Self::Forbidden(_)
            | Self::BadRequest(_)
            | Self::Validation(_)
            | Self::Conflict(_) => self.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Log server errors with Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Admin request error"
            );
        }

        (status, Json(json!({ "error": self.message() }))).into_response()
    }
}

impl From<PlaceOrderError> for AppError {
    fn from(err: PlaceOrderError) -> Self {
        match err {
            PlaceOrderError::Checkout(e) => Self::Conflict(e.to_string()),
            PlaceOrderError::InsufficientPayment { total, tendered } => Self::Validation(format!(
                "amount tendered {tendered} does not cover total {total}"
            )),
            PlaceOrderError::Database(e) => Self::Database(RepositoryError::Database(e)),
        }
    }
}

impl From<StatusChangeError> for AppError {
    fn from(err: StatusChangeError) -> Self {
        match err {
            StatusChangeError::NotFound => Self::NotFound("order".to_owned()),
            StatusChangeError::InvalidTransition { from, to } => Self::Conflict(format!(
                "cannot move order from {} to {}",
                from.as_str(),
                to.as_str()
            )),
            StatusChangeError::Database(e) => Self::Database(RepositoryError::Database(e)),
        }
    }
}

impl From<DebtPaymentError> for AppError {
    fn from(err: DebtPaymentError) -> Self {
        match err {
            DebtPaymentError::NotFound => Self::NotFound("debt".to_owned()),
            DebtPaymentError::InvalidAmount => {
                Self::Validation("payment amount must be positive".to_owned())
            }
            DebtPaymentError::AlreadySettled | DebtPaymentError::Overpayment { .. } => {
                Self::Conflict(err.to_string())
            }
            DebtPaymentError::Database(e) => Self::Database(RepositoryError::Database(e)),
        }
    }
}

impl From<ProductInputError> for AppError {
    fn from(err: ProductInputError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<AdminAuthError> for AppError {
    fn from(err: AdminAuthError) -> Self {
        match err {
            AdminAuthError::InvalidCredentials => Self::Unauthorized(err.to_string()),
            AdminAuthError::InvalidUsername | AdminAuthError::WeakPassword(_) => {
                Self::Validation(err.to_string())
            }
            AdminAuthError::UserAlreadyExists(_) => Self::Conflict(err.to_string()),
            AdminAuthError::Hash(_) => Self::Internal(err.to_string()),
            AdminAuthError::Repository(e) => Self::Database(e),
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from an admin user ID.
pub fn set_sentry_user(admin_user_id: i32, username: &str) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(admin_user_id.to_string()),
            username: Some(username.to_owned()),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}
