//! Amount - Non-negative decimal wrapper for monetary values
//!
//! Wallet balances and transaction magnitudes enter the system through this
//! type. Two invariants are enforced at construction: the value is never
//! negative, and it never carries more than two decimal places.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Maximum number of decimal places a monetary value may carry.
pub const MAX_SCALE: u32 = 2;

/// Errors that can occur when constructing an amount
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AmountError {
    #[error("Amount cannot be negative: {0}")]
    Negative(Decimal),

    #[error("Amount cannot have more than 2 decimal places: {0}")]
    TooPrecise(Decimal),
}

/// A non-negative decimal amount with at most two decimal places.
///
/// # Invariant
/// The inner value is always >= 0 and has scale <= 2. This is enforced by
/// the constructor.
///
/// # Example
/// ```
/// use purse_core::Amount;
/// use rust_decimal::Decimal;
///
/// let amount = Amount::new(Decimal::new(10050, 2)).unwrap(); // 100.50
/// assert_eq!(amount.value(), Decimal::new(10050, 2));
///
/// // Negative amounts are rejected
/// assert!(Amount::new(Decimal::new(-100, 0)).is_err());
///
/// // Sub-cent precision is rejected
/// assert!(Amount::new(Decimal::new(100005, 3)).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Amount(Decimal);

impl Amount {
    /// Zero amount constant
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a new Amount from a Decimal.
    ///
    /// Returns an error if the value is negative or carries more than two
    /// decimal places.
    pub fn new(value: Decimal) -> Result<Self, AmountError> {
        if value < Decimal::ZERO {
            return Err(AmountError::Negative(value));
        }
        if value.normalize().scale() > MAX_SCALE {
            return Err(AmountError::TooPrecise(value));
        }
        Ok(Self(value))
    }

    /// Create an Amount without validation.
    ///
    /// # Safety
    /// The caller MUST ensure the value is non-negative with scale <= 2.
    /// Use only for trusted sources (e.g., values read back from storage).
    #[inline]
    pub const fn new_unchecked(value: Decimal) -> Self {
        Self(value)
    }

    /// Get the inner Decimal value
    #[inline]
    pub const fn value(&self) -> Decimal {
        self.0
    }

    /// Check if the amount is zero
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// The value negated, for storing outgoing transactions.
    #[inline]
    pub fn negated(&self) -> Decimal {
        -self.0
    }

    /// Checked addition
    pub fn checked_add(&self, other: &Amount) -> Option<Amount> {
        self.0.checked_add(other.0).map(Amount)
    }

    /// Checked subtraction - returns None if the result would be negative
    pub fn checked_sub(&self, other: &Amount) -> Option<Amount> {
        let result = self.0.checked_sub(other.0)?;
        if result < Decimal::ZERO {
            None
        } else {
            Some(Amount(result))
        }
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = AmountError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl Default for Amount {
    fn default() -> Self {
        Self::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_amount_positive() {
        let amount = Amount::new(dec!(100)).unwrap();
        assert_eq!(amount.value(), dec!(100));
    }

    #[test]
    fn test_amount_zero() {
        let amount = Amount::new(Decimal::ZERO).unwrap();
        assert!(amount.is_zero());
    }

    #[test]
    fn test_amount_negative_rejected() {
        let result = Amount::new(dec!(-100));
        assert!(matches!(result, Err(AmountError::Negative(_))));
    }

    #[test]
    fn test_amount_two_decimal_places_accepted() {
        let amount = Amount::new(dec!(123.45)).unwrap();
        assert_eq!(amount.value(), dec!(123.45));
    }

    #[test]
    fn test_amount_three_decimal_places_rejected() {
        let result = Amount::new(dec!(100.005));
        assert!(matches!(result, Err(AmountError::TooPrecise(_))));
    }

    #[test]
    fn test_trailing_zeros_do_not_count_as_precision() {
        // 1.200 normalizes to 1.2
        let amount = Amount::new(dec!(1.200)).unwrap();
        assert_eq!(amount.value(), dec!(1.200));
    }

    #[test]
    fn test_negated() {
        let amount = Amount::new(dec!(50.25)).unwrap();
        assert_eq!(amount.negated(), dec!(-50.25));
    }

    #[test]
    fn test_checked_sub_prevents_negative() {
        let a = Amount::new(dec!(50)).unwrap();
        let b = Amount::new(dec!(100)).unwrap();
        assert!(a.checked_sub(&b).is_none());
    }

    #[test]
    fn test_serde_roundtrip() {
        let amount = Amount::new(dec!(123.45)).unwrap();
        let json = serde_json::to_string(&amount).unwrap();
        let parsed: Amount = serde_json::from_str(&json).unwrap();
        assert_eq!(amount, parsed);
    }

    #[test]
    fn test_serde_rejects_invalid() {
        assert!(serde_json::from_str::<Amount>("-10").is_err());
        assert!(serde_json::from_str::<Amount>("10.999").is_err());
    }
}
