//! Customer phone number type.
//!
//! Customers are reached over WhatsApp, so the phone number is the one
//! piece of contact data every order carries.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Country calling code assumed for numbers written in local `0…` form.
pub const DEFAULT_COUNTRY_CODE: &str = "62";

/// Errors that can occur when parsing a [`PhoneNumber`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PhoneError {
    /// The input string is empty.
    #[error("phone number cannot be empty")]
    Empty,
    /// The input contains something other than digits and separators.
    #[error("phone number may only contain digits, spaces, dashes, parentheses and a leading +")]
    InvalidCharacter,
    /// Too few or too many digits.
    #[error("phone number must have between {min} and {max} digits")]
    InvalidLength {
        /// Minimum digit count.
        min: usize,
        /// Maximum digit count.
        max: usize,
    },
}

/// A customer phone number, stored as the digits the customer typed
/// (with an optional leading `+`).
///
/// ## Examples
///
/// ```
/// use laptop_shop_core::PhoneNumber;
///
/// let phone = PhoneNumber::parse("0812-3456-7890").unwrap();
/// assert_eq!(phone.as_str(), "081234567890");
/// assert_eq!(phone.whatsapp_digits(), "6281234567890");
///
/// assert!(PhoneNumber::parse("12ab").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Minimum number of digits (E.164 numbers are at least this long in practice).
    pub const MIN_DIGITS: usize = 8;
    /// Maximum number of digits allowed by E.164.
    pub const MAX_DIGITS: usize = 15;

    /// Parse a `PhoneNumber`, stripping spaces, dashes, dots and parentheses.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, contains letters or other
    /// symbols, or has a digit count outside 8-15.
    pub fn parse(s: &str) -> Result<Self, PhoneError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(PhoneError::Empty);
        }

        let (plus, rest) = trimmed
            .strip_prefix('+')
            .map_or((false, trimmed), |rest| (true, rest));

        let mut digits = String::with_capacity(rest.len());
        for c in rest.chars() {
            match c {
                '0'..='9' => digits.push(c),
                ' ' | '-' | '.' | '(' | ')' => {}
                _ => return Err(PhoneError::InvalidCharacter),
            }
        }

        if !(Self::MIN_DIGITS..=Self::MAX_DIGITS).contains(&digits.len()) {
            return Err(PhoneError::InvalidLength {
                min: Self::MIN_DIGITS,
                max: Self::MAX_DIGITS,
            });
        }

        if plus {
            digits.insert(0, '+');
        }
        Ok(Self(digits))
    }

    /// Returns the normalized number as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Digits in international form without `+`, as `wa.me` links expect.
    ///
    /// A local number (`08…`) gets [`DEFAULT_COUNTRY_CODE`] in place of its
    /// leading zero.
    #[must_use]
    pub fn whatsapp_digits(&self) -> String {
        if let Some(international) = self.0.strip_prefix('+') {
            return international.to_owned();
        }
        self.0.strip_prefix('0').map_or_else(
            || self.0.clone(),
            |local| format!("{DEFAULT_COUNTRY_CODE}{local}"),
        )
    }

    /// Whether two numbers refer to the same subscriber, ignoring local vs.
    /// international notation.
    #[must_use]
    pub fn same_subscriber(&self, other: &Self) -> bool {
        self.whatsapp_digits() == other.whatsapp_digits()
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for PhoneNumber {
    type Err = PhoneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for PhoneNumber {
    type Error = PhoneError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<PhoneNumber> for String {
    fn from(phone: PhoneNumber) -> Self {
        phone.0
    }
}

// SQLx support (with postgres feature)
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for PhoneNumber {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for PhoneNumber {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        // Only validated numbers are ever written
        Ok(Self(s))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for PhoneNumber {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_strips_separators() {
        let phone = PhoneNumber::parse(" (0812) 3456-7890 ").unwrap();
        assert_eq!(phone.as_str(), "081234567890");
    }

    #[test]
    fn test_parse_keeps_plus() {
        let phone = PhoneNumber::parse("+62 812 3456 7890").unwrap();
        assert_eq!(phone.as_str(), "+6281234567890");
        assert_eq!(phone.whatsapp_digits(), "6281234567890");
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(PhoneNumber::parse("   "), Err(PhoneError::Empty));
        assert_eq!(
            PhoneNumber::parse("0812abc4567"),
            Err(PhoneError::InvalidCharacter)
        );
        assert!(matches!(
            PhoneNumber::parse("12345"),
            Err(PhoneError::InvalidLength { .. })
        ));
        assert!(matches!(
            PhoneNumber::parse("1234567890123456"),
            Err(PhoneError::InvalidLength { .. })
        ));
    }

    #[test]
    fn test_whatsapp_digits_local_number() {
        let phone = PhoneNumber::parse("081234567890").unwrap();
        assert_eq!(phone.whatsapp_digits(), "6281234567890");
    }

    #[test]
    fn test_same_subscriber() {
        let local = PhoneNumber::parse("081234567890").unwrap();
        let intl = PhoneNumber::parse("+6281234567890").unwrap();
        let other = PhoneNumber::parse("081299999999").unwrap();
        assert!(local.same_subscriber(&intl));
        assert!(!local.same_subscriber(&other));
    }

    #[test]
    fn test_serde_validates() {
        let phone: PhoneNumber = serde_json::from_str("\"0812 3456 7890\"").unwrap();
        assert_eq!(phone.as_str(), "081234567890");
        assert!(serde_json::from_str::<PhoneNumber>("\"call me\"").is_err());
    }
}
