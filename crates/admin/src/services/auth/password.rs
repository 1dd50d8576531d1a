//! Password hashing and username rules.

use argon2::password_hash::SaltString;
use argon2::password_hash::rand_core::OsRng;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};

use super::AdminAuthError;

/// Shortest accepted password.
pub const MIN_PASSWORD_LENGTH: usize = 8;

const USERNAME_LENGTH: std::ops::RangeInclusive<usize> = 3..=32;

/// Hash a password with Argon2id and a random salt (PHC string format).
///
/// # Errors
///
/// Returns `AdminAuthError::WeakPassword` if the password is too short and
/// `AdminAuthError::Hash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AdminAuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AdminAuthError::WeakPassword(MIN_PASSWORD_LENGTH));
    }
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AdminAuthError::Hash(e.to_string()))
}

/// Check `password` against a stored PHC hash.
///
/// # Errors
///
/// Returns `AdminAuthError::Hash` if the stored hash cannot be parsed.
pub fn verify_password(password: &str, stored: &str) -> Result<bool, AdminAuthError> {
    let parsed = PasswordHash::new(stored).map_err(|e| AdminAuthError::Hash(e.to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// Trim and lowercase a username, rejecting anything outside the allowed shape.
///
/// # Errors
///
/// Returns `AdminAuthError::InvalidUsername`.
pub fn normalize_username(raw: &str) -> Result<String, AdminAuthError> {
    let username = raw.trim().to_lowercase();
    let valid = USERNAME_LENGTH.contains(&username.len())
        && username
            .bytes()
            .all(|b| {
                b.is_ascii_lowercase() || b.is_ascii_digit() || matches!(b, b'.' | b'_' | b'-')
            });
    if valid {
        Ok(username)
    } else {
        Err(AdminAuthError::InvalidUsername)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("kasir-rahasia-9").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("kasir-rahasia-9", &hash).unwrap());
        assert!(!verify_password("kasir-rahasia-8", &hash).unwrap());
    }

    #[test]
    fn test_salts_differ() {
        let a = hash_password("same-password").unwrap();
        let b = hash_password("same-password").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_short_password_rejected() {
        assert!(matches!(
            hash_password("short"),
            Err(AdminAuthError::WeakPassword(MIN_PASSWORD_LENGTH))
        ));
    }

    #[test]
    fn test_malformed_hash_is_error() {
        assert!(matches!(
            verify_password("anything", "not-a-phc-string"),
            Err(AdminAuthError::Hash(_))
        ));
    }

    #[test]
    fn test_username_rules() {
        assert_eq!(normalize_username("  Sari.K ").unwrap(), "sari.k");
        assert_eq!(normalize_username("kasir_01").unwrap(), "kasir_01");
        assert!(normalize_username("ab").is_err());
        assert!(normalize_username("has space").is_err());
        assert!(normalize_username("sari@shop").is_err());
        assert!(normalize_username(&"a".repeat(33)).is_err());
    }
}
