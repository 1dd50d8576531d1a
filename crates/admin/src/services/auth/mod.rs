//! Admin authentication service.
//!
//! Staff share the shop PC, so accounts are username + password (Argon2id)
//! with no email flow. Accounts are created by the owner or the CLI.

mod error;
pub mod password;

pub use error::AdminAuthError;
pub use password::{MIN_PASSWORD_LENGTH, hash_password, normalize_username, verify_password};

use sqlx::PgPool;
use tracing::{info, instrument, warn};

use laptop_shop_core::AdminUserId;

use crate::db::RepositoryError;
use crate::db::admin_users::AdminUserRepository;
use crate::models::admin_user::{AdminRole, AdminUser};

/// Admin authentication service.
pub struct AdminAuthService<'a> {
    users: AdminUserRepository<'a>,
}

impl<'a> AdminAuthService<'a> {
    /// Create a new admin authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            users: AdminUserRepository::new(pool),
        }
    }

    /// Check a username and password.
    ///
    /// Unknown users, wrong passwords and disabled accounts all produce
    /// the same error.
    ///
    /// # Errors
    ///
    /// Returns `AdminAuthError::InvalidCredentials` on any mismatch.
    #[instrument(skip(self, password))]
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<AdminUser, AdminAuthError> {
        let Ok(username) = normalize_username(username) else {
            return Err(AdminAuthError::InvalidCredentials);
        };

        let Some((user, hash)) = self.users.get_with_hash(&username).await? else {
            warn!(username = %username, "Login for unknown username");
            return Err(AdminAuthError::InvalidCredentials);
        };

        if !verify_password(password, &hash)? {
            warn!(admin_id = %user.id, "Login with wrong password");
            return Err(AdminAuthError::InvalidCredentials);
        }

        if !user.is_active {
            warn!(admin_id = %user.id, "Login to disabled account");
            return Err(AdminAuthError::InvalidCredentials);
        }

        info!(admin_id = %user.id, role = %user.role, "Admin logged in");
        Ok(user)
    }

    /// Create a staff account.
    ///
    /// # Errors
    ///
    /// Returns `InvalidUsername` or `WeakPassword` for bad input and
    /// `UserAlreadyExists` if the username is taken.
    pub async fn create_user(
        &self,
        username: &str,
        name: &str,
        role: AdminRole,
        password: &str,
    ) -> Result<AdminUser, AdminAuthError> {
        let username = normalize_username(username)?;
        let hash = hash_password(password)?;

        match self.users.create(&username, name.trim(), role, &hash).await {
            Ok(user) => {
                info!(
                    admin_id = %user.id,
                    username = %user.username,
                    role = %role,
                    "Admin user created"
                );
                Ok(user)
            }
            Err(RepositoryError::Conflict(_)) => Err(AdminAuthError::UserAlreadyExists(username)),
            Err(e) => Err(e.into()),
        }
    }

    /// Replace a user's password.
    ///
    /// # Errors
    ///
    /// Returns `WeakPassword` for a short password and `Repository(NotFound)`
    /// for an unknown user.
    pub async fn set_password(
        &self,
        id: AdminUserId,
        password: &str,
    ) -> Result<(), AdminAuthError> {
        let hash = hash_password(password)?;
        self.users.set_password_hash(id, &hash).await?;
        info!(admin_id = %id, "Admin password changed");
        Ok(())
    }
}
