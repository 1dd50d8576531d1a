//! Type-safe price representation using decimal arithmetic.
//!
//! The database stores bare `NUMERIC` amounts; the shop runs in a single
//! currency chosen at configuration time, so a [`Price`] is assembled from
//! the amount column and the configured [`CurrencyCode`].

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// A price with currency information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit (e.g., rupiah, dollars).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// A zero amount in the given currency.
    #[must_use]
    pub const fn zero(currency_code: CurrencyCode) -> Self {
        Self::new(Decimal::ZERO, currency_code)
    }

    /// Line total for `quantity` units at this price.
    #[must_use]
    pub fn times(&self, quantity: u32) -> Self {
        Self::new(self.amount * Decimal::from(quantity), self.currency_code)
    }

    /// Add two prices of the same currency.
    ///
    /// Returns `None` on currency mismatch or decimal overflow.
    #[must_use]
    pub fn checked_add(&self, other: &Self) -> Option<Self> {
        if self.currency_code != other.currency_code {
            return None;
        }
        self.amount
            .checked_add(other.amount)
            .map(|amount| Self::new(amount, self.currency_code))
    }

    /// Format for display, e.g. `Rp 12.500.000` or `$1,234.50`.
    #[must_use]
    pub fn display(&self) -> String {
        let code = self.currency_code;
        let rounded = self.amount.abs().round_dp_with_strategy(
            code.minor_units(),
            RoundingStrategy::MidpointAwayFromZero,
        );
        let text = format!("{rounded:.prec$}", prec = code.minor_units() as usize);
        let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), ""));

        let mut out = String::new();
        if self.amount.is_sign_negative() && !self.amount.is_zero() {
            out.push('-');
        }
        out.push_str(code.symbol());
        out.push_str(&group_thousands(int_part, code.thousands_separator()));
        if !frac_part.is_empty() {
            out.push(code.decimal_separator());
            out.push_str(frac_part);
        }
        out
    }
}

impl std::fmt::Display for Price {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.display())
    }
}

/// Insert `sep` between every group of three digits, counting from the right.
fn group_thousands(digits: &str, sep: char) -> String {
    let len = digits.chars().count();
    let mut out = String::with_capacity(len + len / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(sep);
        }
        out.push(c);
    }
    out
}

/// ISO 4217 currency codes the shop can run in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    IDR,
    USD,
}

impl CurrencyCode {
    /// Prefix used when displaying amounts.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::IDR => "Rp ",
            Self::USD => "$",
        }
    }

    /// Number of decimal places shown.
    #[must_use]
    pub const fn minor_units(self) -> u32 {
        match self {
            Self::IDR => 0,
            Self::USD => 2,
        }
    }

    const fn thousands_separator(self) -> char {
        match self {
            Self::IDR => '.',
            Self::USD => ',',
        }
    }

    const fn decimal_separator(self) -> char {
        match self {
            Self::IDR => ',',
            Self::USD => '.',
        }
    }

    /// The ISO code as a string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::IDR => "IDR",
            Self::USD => "USD",
        }
    }
}

impl std::str::FromStr for CurrencyCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "IDR" => Ok(Self::IDR),
            "USD" => Ok(Self::USD),
            other => Err(format!("unsupported currency: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn idr(amount: i64) -> Price {
        Price::new(Decimal::from(amount), CurrencyCode::IDR)
    }

    #[test]
    fn test_display_idr_groups_with_dots() {
        assert_eq!(idr(12_500_000).display(), "Rp 12.500.000");
        assert_eq!(idr(999).display(), "Rp 999");
        assert_eq!(idr(1_000).display(), "Rp 1.000");
        assert_eq!(idr(0).display(), "Rp 0");
    }

    #[test]
    fn test_display_usd_two_decimals() {
        let price = Price::new(Decimal::new(123_450, 2), CurrencyCode::USD);
        assert_eq!(price.display(), "$1,234.50");
    }

    #[test]
    fn test_display_negative() {
        assert_eq!(idr(-15_000).display(), "-Rp 15.000");
    }

    #[test]
    fn test_times_and_checked_add() {
        let line = idr(7_250_000).times(2);
        assert_eq!(line.amount, Decimal::from(14_500_000));

        let total = line.checked_add(&idr(500_000));
        assert_eq!(total, Some(idr(15_000_000)));

        let usd = Price::zero(CurrencyCode::USD);
        assert_eq!(line.checked_add(&usd), None);
    }

    #[test]
    fn test_currency_from_str() {
        assert_eq!("idr".parse::<CurrencyCode>(), Ok(CurrencyCode::IDR));
        assert!("EUR".parse::<CurrencyCode>().is_err());
    }
}
