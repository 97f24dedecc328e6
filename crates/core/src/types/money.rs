//! Monetary amounts stored as integer minor units.
//!
//! Prices live in the database as `price_in_cents` integers. Arithmetic is
//! always done on the integer cents with overflow checks; [`rust_decimal`]
//! is only used to expose a major-unit amount (e.g. `129.99`).

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Quantity;

/// Errors produced by money arithmetic and parsing.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MoneyError {
    /// The result does not fit in 64-bit cents.
    #[error("monetary amount overflowed")]
    Overflow,
    /// Two amounts in different currencies were combined.
    #[error("currency mismatch: {0} vs {1}")]
    CurrencyMismatch(CurrencyCode, CurrencyCode),
    /// Unknown ISO 4217 code.
    #[error("unsupported currency code: {0}")]
    UnsupportedCurrency(String),
}

/// ISO 4217 currency codes accepted by the storefront.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    USD,
    BRL,
    EUR,
    GBP,
    CAD,
}

impl CurrencyCode {
    /// The three-letter ISO code.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::USD => "USD",
            Self::BRL => "BRL",
            Self::EUR => "EUR",
            Self::GBP => "GBP",
            Self::CAD => "CAD",
        }
    }

    /// Symbol used when formatting for the `en-US` locale.
    #[must_use]
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::USD => "$",
            Self::BRL => "R$",
            Self::EUR => "€",
            Self::GBP => "£",
            Self::CAD => "CA$",
        }
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CurrencyCode {
    type Err = MoneyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "USD" => Ok(Self::USD),
            "BRL" => Ok(Self::BRL),
            "EUR" => Ok(Self::EUR),
            "GBP" => Ok(Self::GBP),
            "CAD" => Ok(Self::CAD),
            other => Err(MoneyError::UnsupportedCurrency(other.to_owned())),
        }
    }
}

/// An amount of money in minor units (cents) with its currency.
///
/// ```
/// use bewear_core::{CurrencyCode, Money, Quantity};
///
/// let unit = Money::from_cents(12_999, CurrencyCode::USD);
/// let line = unit.times(Quantity::new(2).unwrap()).unwrap();
/// assert_eq!(line.to_string(), "$259.98");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Money {
    /// Amount in the smallest currency unit.
    pub cents: i64,
    /// ISO 4217 currency code.
    pub currency: CurrencyCode,
}

impl Money {
    /// Create an amount from minor units.
    #[must_use]
    pub const fn from_cents(cents: i64, currency: CurrencyCode) -> Self {
        Self { cents, currency }
    }

    /// A zero amount in the given currency.
    #[must_use]
    pub const fn zero(currency: CurrencyCode) -> Self {
        Self { cents: 0, currency }
    }

    /// The amount in major units (e.g. dollars) as a decimal.
    #[must_use]
    pub fn amount(&self) -> Decimal {
        Decimal::new(self.cents, 2)
    }

    /// Multiply a unit price by a quantity.
    ///
    /// # Errors
    ///
    /// Returns `MoneyError::Overflow` if the product does not fit in `i64`.
    pub fn times(self, quantity: Quantity) -> Result<Self, MoneyError> {
        let cents = self
            .cents
            .checked_mul(i64::from(quantity.get()))
            .ok_or(MoneyError::Overflow)?;
        Ok(Self { cents, ..self })
    }

    /// Add two amounts of the same currency.
    ///
    /// # Errors
    ///
    /// Returns `MoneyError::CurrencyMismatch` for different currencies and
    /// `MoneyError::Overflow` if the sum does not fit in `i64`.
    pub fn checked_add(self, other: Self) -> Result<Self, MoneyError> {
        if self.currency != other.currency {
            return Err(MoneyError::CurrencyMismatch(self.currency, other.currency));
        }
        let cents = self
            .cents
            .checked_add(other.cents)
            .ok_or(MoneyError::Overflow)?;
        Ok(Self { cents, ..self })
    }

    /// Sum amounts, starting from zero in `currency`.
    ///
    /// # Errors
    ///
    /// Propagates the first error from [`Money::checked_add`].
    pub fn sum<I>(currency: CurrencyCode, amounts: I) -> Result<Self, MoneyError>
    where
        I: IntoIterator<Item = Self>,
    {
        amounts
            .into_iter()
            .try_fold(Self::zero(currency), Self::checked_add)
    }
}

impl fmt::Display for Money {
    /// Formats like the `en-US` locale: `$1,299.99`, `-R$5.00`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.cents < 0 { "-" } else { "" };
        let abs = self.cents.unsigned_abs();
        let whole = (abs / 100).to_string();
        let fraction = abs % 100;

        let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
        for (i, ch) in whole.chars().enumerate() {
            if i > 0 && (whole.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(ch);
        }

        write!(
            f,
            "{sign}{}{grouped}.{fraction:02}",
            self.currency.symbol()
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn usd(cents: i64) -> Money {
        Money::from_cents(cents, CurrencyCode::USD)
    }

    #[test]
    fn test_display_formats_like_en_us() {
        assert_eq!(usd(0).to_string(), "$0.00");
        assert_eq!(usd(5).to_string(), "$0.05");
        assert_eq!(usd(1999).to_string(), "$19.99");
        assert_eq!(usd(79_999).to_string(), "$799.99");
        assert_eq!(usd(129_999).to_string(), "$1,299.99");
        assert_eq!(usd(123_456_789).to_string(), "$1,234,567.89");
        assert_eq!(usd(-500).to_string(), "-$5.00");
        assert_eq!(
            Money::from_cents(8999, CurrencyCode::BRL).to_string(),
            "R$89.99"
        );
    }

    #[test]
    fn test_amount_is_major_units() {
        assert_eq!(usd(12_999).amount(), Decimal::new(12_999, 2));
        assert_eq!(usd(12_999).amount().to_string(), "129.99");
    }

    #[test]
    fn test_times_and_sum() {
        let lines = [
            usd(12_999).times(Quantity::new(2).unwrap()).unwrap(),
            usd(1999).times(Quantity::new(3).unwrap()).unwrap(),
        ];
        let total = Money::sum(CurrencyCode::USD, lines).unwrap();
        assert_eq!(total.cents, 2 * 12_999 + 3 * 1999);
    }

    #[test]
    fn test_sum_of_nothing_is_zero() {
        let total = Money::sum(CurrencyCode::USD, []).unwrap();
        assert_eq!(total, usd(0));
    }

    #[test]
    fn test_overflow_is_reported() {
        let huge = usd(i64::MAX);
        assert_eq!(
            huge.times(Quantity::new(2).unwrap()),
            Err(MoneyError::Overflow)
        );
        assert_eq!(huge.checked_add(usd(1)), Err(MoneyError::Overflow));
    }

    #[test]
    fn test_currency_mismatch() {
        let brl = Money::from_cents(100, CurrencyCode::BRL);
        assert_eq!(
            usd(100).checked_add(brl),
            Err(MoneyError::CurrencyMismatch(
                CurrencyCode::USD,
                CurrencyCode::BRL
            ))
        );
    }

    #[test]
    fn test_currency_from_str() {
        assert_eq!("usd".parse::<CurrencyCode>().unwrap(), CurrencyCode::USD);
        assert_eq!(" BRL ".parse::<CurrencyCode>().unwrap(), CurrencyCode::BRL);
        assert!("XYZ".parse::<CurrencyCode>().is_err());
    }
}
