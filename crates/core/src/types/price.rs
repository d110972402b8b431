//! Variant price using decimal arithmetic.
//!
//! Prices are stored as `NUMERIC(12, 2)` and shown in Philippine pesos, the
//! shop's only currency. Anything the column cannot hold exactly is rejected
//! here rather than rounded or refused by Postgres.

use rust_decimal::Decimal;

/// Why an amount is not a sellable price.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceError {
    /// The amount is below [`Price::MIN`].
    #[error("Price must be at least 0.01")]
    BelowMinimum,
    /// The amount is above [`Price::MAX`].
    #[error("Price must be at most 9999999999.99")]
    AboveMaximum,
    /// The amount has more than two decimal places.
    #[error("Price can have at most two decimal places")]
    TooPrecise,
}

/// A sellable variant price, between [`Price::MIN`] and [`Price::MAX`] with
/// at most two decimal places.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Price(Decimal);

impl Price {
    /// Smallest accepted price (one centavo).
    pub const MIN: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

    /// Largest amount `NUMERIC(12, 2)` holds: 9,999,999,999.99.
    pub const MAX: Decimal = Decimal::from_parts(3_567_587_327, 232, 0, false, 2);

    /// Currency symbol used when displaying prices.
    pub const SYMBOL: &'static str = "₱";

    /// Check an amount against the price rules.
    ///
    /// Trailing zeros do not count towards the precision, so `19.990` is
    /// accepted as `19.99`.
    ///
    /// # Errors
    ///
    /// Returns the first rule the amount breaks: the minimum, then the
    /// maximum, then the two-decimal precision.
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount < Self::MIN {
            return Err(PriceError::BelowMinimum);
        }
        if amount > Self::MAX {
            return Err(PriceError::AboveMaximum);
        }
        let amount = amount.normalize();
        if amount.scale() > 2 {
            return Err(PriceError::TooPrecise);
        }
        Ok(Self(amount))
    }

    /// The amount without trailing zeros.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Format an amount for display, e.g. `₱29.99`.
    ///
    /// Takes a raw decimal so stored rows can be displayed without
    /// re-validating them.
    #[must_use]
    pub fn display(amount: Decimal) -> String {
        format!("{}{:.2}", Self::SYMBOL, amount.round_dp(2))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_minimum_is_one_centavo() {
        assert_eq!(Price::MIN, Decimal::new(1, 2));
        assert!(Price::new(Decimal::new(1, 2)).is_ok());
    }

    #[test]
    fn test_rejects_zero_and_negative() {
        assert_eq!(Price::new(Decimal::ZERO), Err(PriceError::BelowMinimum));
        assert_eq!(Price::new(Decimal::new(-5, 0)), Err(PriceError::BelowMinimum));
        assert_eq!(Price::new(Decimal::new(9, 3)), Err(PriceError::BelowMinimum));
    }

    #[test]
    fn test_maximum_fits_the_column() {
        assert_eq!(Price::MAX, Decimal::new(999_999_999_999, 2));
        assert!(Price::new(Price::MAX).is_ok());
        assert_eq!(
            Price::new(Decimal::new(1_000_000_000_000, 2)),
            Err(PriceError::AboveMaximum)
        );
        assert_eq!(
            Price::new(Decimal::new(100_000_000_000, 0)),
            Err(PriceError::AboveMaximum)
        );
    }

    #[test]
    fn test_sub_centavo_digits_rejected() {
        assert_eq!(Price::new(Decimal::new(14, 3)), Err(PriceError::TooPrecise));
        assert_eq!(Price::new(Decimal::new(19_995, 3)), Err(PriceError::TooPrecise));
        // Trailing zeros are not extra precision.
        let price = Price::new(Decimal::new(19_990, 3)).unwrap();
        assert_eq!(price.amount(), Decimal::new(1999, 2));
    }

    #[test]
    fn test_display() {
        assert_eq!(Price::display(Decimal::new(2999, 0)), "₱2999.00");
        assert_eq!(Price::display(Decimal::new(4995, 3)), "₱5.00");
    }
}
