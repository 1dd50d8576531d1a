//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers should return `Result<T, AppError>`.
//!
//! Every error body is JSON: `{"error": "...", "messages": [...]}`, with a
//! `shortages` array added when checkout ran out of stock.

use std::sync::Arc;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use laptop_shop_core::checkout::{CheckoutError, StockShortage};
use laptop_shop_core::db::{PlaceOrderError, RepositoryError};
use laptop_shop_core::{Locale, Message};
use serde::Serialize;
use thiserror::Error;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Loading the catalog snapshot failed.
    #[error("Catalog error: {0}")]
    Catalog(#[from] Arc<RepositoryError>),

    /// Session store failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// The checkout was rejected: validation (422) or stock (409).
    #[error("Checkout rejected: {error}")]
    Checkout { error: CheckoutError, locale: Locale },

    /// The checkout transaction failed after all retries.
    #[error("Checkout failed: {source}")]
    CheckoutFailed {
        #[source]
        source: sqlx::Error,
        locale: Locale,
    },

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Order lookup failed (unknown number or phone mismatch).
    #[error("Order not found")]
    OrderNotFound(Locale),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Rate limited.
    #[error("Rate limited")]
    RateLimited,

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Map a placement failure to a localized response.
    #[must_use]
    pub fn from_place_order(err: PlaceOrderError, locale: Locale) -> Self {
        match err {
            PlaceOrderError::Checkout(error) => Self::Checkout { error, locale },
            PlaceOrderError::Database(source) => Self::CheckoutFailed { source, locale },
            PlaceOrderError::InsufficientPayment { .. } => {
                Self::Internal("storefront orders carry no payment".to_owned())
            }
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::Database(_)
            | Self::Catalog(_)
            | Self::Session(_)
            | Self::CheckoutFailed { .. }
            | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Checkout {
                error:
                    CheckoutError::InsufficientStock(_) | CheckoutError::ProductUnavailable { .. },
                ..
            } => StatusCode::CONFLICT,
            Self::Checkout { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Self::NotFound(_) | Self::OrderNotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
        }
    }

    const fn is_server_error(&self) -> bool {
        matches!(
            self,
            Self::Database(_)
                | Self::Catalog(_)
                | Self::Session(_)
                | Self::CheckoutFailed { .. }
                | Self::Internal(_)
        )
    }

    fn body(&self) -> ErrorBody {
        match self {
            Self::Checkout { error, locale } => {
                let messages: Vec<String> = error
                    .messages()
                    .iter()
                    .map(|m| m.localized(*locale))
                    .collect();
                let shortages = match error {
                    CheckoutError::InsufficientStock(shortages) => Some(shortages.clone()),
                    _ => None,
                };
                ErrorBody {
                    error: messages.first().cloned().unwrap_or_default(),
                    messages,
                    shortages,
                }
            }
            Self::CheckoutFailed { locale, .. } => {
                ErrorBody::single(Message::CheckoutFailed.localized(*locale))
            }
            Self::OrderNotFound(locale) => {
                ErrorBody::single(Message::OrderNotFound.localized(*locale))
            }
            // Don't expose internal error details to clients
            Self::Database(_) | Self::Catalog(_) | Self::Session(_) | Self::Internal(_) => {
                ErrorBody::single("Internal server error".to_owned())
            }
            Self::NotFound(_) | Self::BadRequest(_) | Self::RateLimited => {
                ErrorBody::single(self.to_string())
            }
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    messages: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    shortages: Option<Vec<StockShortage>>,
}

impl ErrorBody {
    fn single(message: String) -> Self {
        Self {
            messages: vec![message.clone()],
            error: message,
            shortages: None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        (self.status(), Json(self.body())).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Add a breadcrumb for shopper actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of actions
/// leading up to an error.
pub fn add_breadcrumb(category: &str, message: &str, data: &[(&str, String)]) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_owned()),
        message: Some(message.to_owned()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    for (key, value) in data {
        breadcrumb
            .data
            .insert((*key).to_owned(), serde_json::Value::String(value.clone()));
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use laptop_shop_core::ProductId;

    use super::*;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("product-123".to_owned());
        assert_eq!(err.to_string(), "Not found: product-123");

        let err = AppError::BadRequest("invalid input".to_owned());
        assert_eq!(err.to_string(), "Bad request: invalid input");
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            get_status(AppError::NotFound("test".to_owned())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::OrderNotFound(Locale::En)),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::BadRequest("test".to_owned())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::RateLimited),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            get_status(AppError::Internal("test".to_owned())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_checkout_status_codes() {
        let validation = AppError::Checkout {
            error: CheckoutError::MissingCustomerName,
            locale: Locale::Id,
        };
        assert_eq!(get_status(validation), StatusCode::UNPROCESSABLE_ENTITY);

        let shortage = AppError::Checkout {
            error: CheckoutError::InsufficientStock(vec![StockShortage {
                product_id: ProductId::new(1),
                name: "ThinkPad X1".to_owned(),
                requested: 3,
                available: 1,
            }]),
            locale: Locale::Id,
        };
        assert_eq!(get_status(shortage), StatusCode::CONFLICT);

        let gone = AppError::Checkout {
            error: CheckoutError::ProductUnavailable {
                product_id: ProductId::new(2),
                name: None,
            },
            locale: Locale::En,
        };
        assert_eq!(get_status(gone), StatusCode::CONFLICT);
    }

    #[test]
    fn test_checkout_body_is_localized_with_shortages() {
        let err = AppError::Checkout {
            error: CheckoutError::InsufficientStock(vec![StockShortage {
                product_id: ProductId::new(1),
                name: "ThinkPad X1".to_owned(),
                requested: 3,
                available: 1,
            }]),
            locale: Locale::En,
        };
        let body = serde_json::to_value(err.body()).unwrap();
        assert_eq!(body["error"], "Not enough stock for ThinkPad X1 (1 left).");
        assert_eq!(body["shortages"][0]["requested"], 3);
    }

    #[test]
    fn test_internal_details_hidden() {
        let err = AppError::Internal("connection string leaked".to_owned());
        let body = serde_json::to_value(err.body()).unwrap();
        assert_eq!(body["error"], "Internal server error");
        assert!(body.get("shortages").is_none());
    }
}
