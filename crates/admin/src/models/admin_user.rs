//! Admin user domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use laptop_shop_core::AdminUserId;

// Re-export AdminRole from core for convenience
pub use laptop_shop_core::AdminRole;

/// A staff account for the back office.
#[derive(Debug, Clone, Serialize)]
pub struct AdminUser {
    /// Unique admin user ID.
    pub id: AdminUserId,
    /// Login name, stored lowercase.
    pub username: String,
    /// Admin's display name.
    pub name: String,
    /// Admin's role/permission level.
    pub role: AdminRole,
    /// Inactive accounts cannot log in.
    pub is_active: bool,
    /// When the admin was created.
    pub created_at: DateTime<Utc>,
    /// When the admin was last updated.
    pub updated_at: DateTime<Utc>,
}
