//! Strictly positive item quantities.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Error returned when a quantity is zero or negative.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("quantity must be at least 1 (got {0})")]
pub struct QuantityError(pub i64);

/// Number of units of a variant in a cart or order line.
///
/// Rows never hold a zero quantity: decreasing the last unit deletes the
/// cart line instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i32")]
pub struct Quantity(i32);

impl Quantity {
    /// A single unit.
    pub const ONE: Self = Self(1);

    /// Create a quantity, rejecting values below 1.
    ///
    /// # Errors
    ///
    /// Returns `QuantityError` if `value < 1`.
    pub fn new(value: i32) -> Result<Self, QuantityError> {
        if value < 1 {
            return Err(QuantityError(i64::from(value)));
        }
        Ok(Self(value))
    }

    /// The raw value.
    #[must_use]
    pub const fn get(self) -> i32 {
        self.0
    }

    /// `self - 1`, or `None` when this is the last unit.
    #[must_use]
    pub const fn decremented(self) -> Option<Self> {
        if self.0 > 1 { Some(Self(self.0 - 1)) } else { None }
    }
}

impl TryFrom<i64> for Quantity {
    type Error = QuantityError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        let narrowed = i32::try_from(value).map_err(|_| QuantityError(value))?;
        Self::new(narrowed)
    }
}

impl TryFrom<i32> for Quantity {
    type Error = QuantityError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Quantity> for i32 {
    fn from(q: Quantity) -> Self {
        q.0
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_non_positive() {
        assert_eq!(Quantity::new(0), Err(QuantityError(0)));
        assert_eq!(Quantity::new(-3), Err(QuantityError(-3)));
        assert!(Quantity::try_from(i64::from(i32::MAX) + 1).is_err());
    }

    #[test]
    fn test_decremented() {
        assert_eq!(Quantity::new(3).unwrap().decremented(), Quantity::new(2).ok());
        assert_eq!(Quantity::ONE.decremented(), None);
    }

    #[test]
    fn test_deserialize_validates() {
        let q: Quantity = serde_json::from_str("4").unwrap();
        assert_eq!(q.get(), 4);
        assert!(serde_json::from_str::<Quantity>("0").is_err());
    }
}
