//! Staff account management (owner only).

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, patch, put},
};
use serde::Deserialize;
use tracing::{info, instrument};

use laptop_shop_core::{AdminRole, AdminUserId};

use crate::db::AdminUserRepository;
use crate::error::{AppError, Result};
use crate::middleware::{Owner, RequireRole};
use crate::models::AdminUser;
use crate::services::AdminAuthService;
use crate::state::AppState;

/// New staff account.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub name: String,
    pub role: AdminRole,
    pub password: String,
}

/// Role and active flag change.
#[derive(Debug, Deserialize)]
pub struct UpdateAccessRequest {
    pub role: AdminRole,
    pub is_active: bool,
}

/// Password reset by the owner.
#[derive(Debug, Deserialize)]
pub struct SetPasswordRequest {
    pub password: String,
}

/// Build the admin users router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/users", get(index).post(create))
        .route("/api/users/{id}/access", patch(update_access))
        .route("/api/users/{id}/password", put(set_password))
}

/// GET /api/users
#[instrument(skip_all)]
async fn index(
    _: RequireRole<Owner>,
    State(state): State<AppState>,
) -> Result<Json<Vec<AdminUser>>> {
    let users = AdminUserRepository::new(state.pool()).list_all().await?;
    Ok(Json(users))
}

/// POST /api/users
#[instrument(skip(_owner, state, req), fields(username = %req.username, role = %req.role))]
async fn create(
    _owner: RequireRole<Owner>,
    State(state): State<AppState>,
    Json(req): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<AdminUser>)> {
    if req.name.trim().is_empty() {
        return Err(AppError::Validation("name is required".to_owned()));
    }

    let user = AdminAuthService::new(state.pool())
        .create_user(&req.username, req.name.trim(), req.role, &req.password)
        .await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// PATCH /api/users/{id}/access
///
/// The last active owner cannot be demoted or deactivated.
#[instrument(skip(owner, state, req), fields(admin_id = %id))]
async fn update_access(
    RequireRole(owner, _): RequireRole<Owner>,
    State(state): State<AppState>,
    Path(id): Path<AdminUserId>,
    Json(req): Json<UpdateAccessRequest>,
) -> Result<Json<AdminUser>> {
    let repo = AdminUserRepository::new(state.pool());
    let current = repo
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("admin user".to_owned()))?;

    let loses_owner = current.role == AdminRole::Owner
        && current.is_active
        && (req.role != AdminRole::Owner || !req.is_active);
    if loses_owner && repo.count_active_owners().await? <= 1 {
        return Err(AppError::Conflict(
            "the shop must keep at least one active owner".to_owned(),
        ));
    }

    let user = repo.update_access(id, req.role, req.is_active).await?;
    info!(
        changed_by = %owner.id,
        admin_id = %id,
        role = %user.role,
        is_active = user.is_active,
        "Admin access changed"
    );
    Ok(Json(user))
}

/// PUT /api/users/{id}/password
#[instrument(skip(owner, state, req), fields(admin_id = %id))]
async fn set_password(
    RequireRole(owner, _): RequireRole<Owner>,
    State(state): State<AppState>,
    Path(id): Path<AdminUserId>,
    Json(req): Json<SetPasswordRequest>,
) -> Result<StatusCode> {
    AdminAuthService::new(state.pool())
        .set_password(id, &req.password)
        .await?;
    info!(changed_by = %owner.id, admin_id = %id, "Admin password reset");
    Ok(StatusCode::NO_CONTENT)
}
