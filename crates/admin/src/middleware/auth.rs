//! Authentication and authorization extractors for admin.
//!
//! Every console endpoint takes one of these extractors; there is no
//! blanket auth layer.
//!
//! | Extractor                  | Allows                 |
//! |----------------------------|------------------------|
//! | `RequireAdminAuth`         | any logged-in staff    |
//! | `RequireRole<StoreAdmin>`  | admin, owner           |
//! | `RequireRole<Owner>`       | owner                  |

use std::marker::PhantomData;

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use serde_json::json;
use tower_sessions::Session;

use crate::models::{AdminRole, CurrentAdmin, session_keys};

/// Extractor that requires a logged-in admin.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAdminAuth(admin): RequireAdminAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", admin.name)
/// }
/// ```
pub struct RequireAdminAuth(pub CurrentAdmin);

/// Error returned when the request lacks the required login or role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminAuthRejection {
    /// Not logged in.
    Unauthorized,
    /// Logged in with a role below the requirement.
    Forbidden(AdminRole),
}

impl IntoResponse for AdminAuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "Login required" })),
            )
                .into_response(),
            Self::Forbidden(required) => (
                StatusCode::FORBIDDEN,
                Json(json!({ "error": format!("Requires the {required} role") })),
            )
                .into_response(),
        }
    }
}

async fn current_admin(parts: &Parts) -> Result<CurrentAdmin, AdminAuthRejection> {
    // Set by SessionManagerLayer
    let session = parts
        .extensions
        .get::<Session>()
        .ok_or(AdminAuthRejection::Unauthorized)?;

    session
        .get::<CurrentAdmin>(session_keys::CURRENT_ADMIN)
        .await
        .ok()
        .flatten()
        .ok_or(AdminAuthRejection::Unauthorized)
}

impl<S> FromRequestParts<S> for RequireAdminAuth
where
    S: Send + Sync,
{
    type Rejection = AdminAuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        current_admin(parts).await.map(Self)
    }
}

/// The lowest role an endpoint accepts.
pub trait RoleRequirement {
    const ROLE: AdminRole;
}

/// Owner-only endpoints: staff accounts and payroll.
pub struct Owner;

impl RoleRequirement for Owner {
    const ROLE: AdminRole = AdminRole::Owner;
}

/// Store management endpoints: catalog, order changes, books, employees.
pub struct StoreAdmin;

impl RoleRequirement for StoreAdmin {
    const ROLE: AdminRole = AdminRole::Admin;
}

/// Extractor that requires a logged-in admin with at least role `R`.
///
/// # Example
///
/// ```rust,ignore
/// async fn payroll(
///     RequireRole(owner, _): RequireRole<Owner>,
/// ) -> impl IntoResponse {
///     format!("Hello {}!", owner.name)
/// }
/// ```
pub struct RequireRole<R>(pub CurrentAdmin, pub PhantomData<R>);

impl<S, R> FromRequestParts<S> for RequireRole<R>
where
    S: Send + Sync,
    R: RoleRequirement,
{
    type Rejection = AdminAuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let admin = current_admin(parts).await?;
        check_role(&admin, R::ROLE)?;
        Ok(Self(admin, PhantomData))
    }
}

fn check_role(admin: &CurrentAdmin, required: AdminRole) -> Result<(), AdminAuthRejection> {
    if admin.role.satisfies(required) {
        Ok(())
    } else {
        tracing::warn!(
            admin_id = %admin.id,
            role = %admin.role,
            required = %required,
            "Role check failed"
        );
        Err(AdminAuthRejection::Forbidden(required))
    }
}

/// Helper to set the current admin in the session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_admin(
    session: &Session,
    admin: &CurrentAdmin,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::CURRENT_ADMIN, admin).await
}

/// Helper to clear the current admin from the session (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_admin(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session
        .remove::<CurrentAdmin>(session_keys::CURRENT_ADMIN)
        .await?;
    Ok(())
}
