//! Authentication route handlers for admin.
//!
//! Username and password login. The session ID is cycled on login so a
//! pre-login session cookie cannot be reused.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{Result, clear_sentry_user, set_sentry_user};
use crate::middleware::{RequireAdminAuth, clear_current_admin, set_current_admin};
use crate::models::CurrentAdmin;
use crate::services::AdminAuthService;
use crate::state::AppState;

/// Login form.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Build the auth router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/logout", post(logout))
        .route("/api/auth/me", get(me))
}

/// Log in with username and password.
///
/// POST /api/auth/login
#[instrument(skip(state, session, req), fields(username = %req.username))]
async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(req): Json<LoginRequest>,
) -> Result<Json<CurrentAdmin>> {
    let user = AdminAuthService::new(state.pool())
        .authenticate(&req.username, &req.password)
        .await?;

    let current_admin = CurrentAdmin::from(&user);
    session.cycle_id().await?;
    set_current_admin(&session, &current_admin).await?;
    set_sentry_user(current_admin.id.as_i32(), &current_admin.username);
    Ok(Json(current_admin))
}

/// Logout and clear session.
///
/// POST /api/auth/logout
async fn logout(session: Session) -> StatusCode {
    let _ = clear_current_admin(&session).await;
    clear_sentry_user();
    StatusCode::NO_CONTENT
}

/// The logged-in admin.
///
/// GET /api/auth/me
async fn me(RequireAdminAuth(admin): RequireAdminAuth) -> Json<CurrentAdmin> {
    Json(admin)
}
