//! Discount utilities
//!
//! Percentage and minor-unit arithmetic shared by every promotion type and by
//! the checkout totals.

use decimal_percentage::Percentage;
use rust_decimal::{
    Decimal, RoundingStrategy,
    prelude::{FromPrimitive, ToPrimitive},
};
use rusty_money::{Money, MoneyError, iso::Currency};
use thiserror::Error;

/// Errors specific to discount calculations.
#[derive(Debug, Error, PartialEq)]
pub enum DiscountError {
    /// Percentage calculation could not be safely converted.
    #[error("percentage conversion overflowed or was not finite")]
    PercentConversion,

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// Calculate the discount amount in minor units based on a percentage and a minor unit amount.
///
/// # Errors
///
/// Returns [`DiscountError::PercentConversion`] if the multiplication overflows or the
/// result cannot be represented as an `i64`.
pub fn percent_of_minor(percent: &Percentage, minor: i64) -> Result<i64, DiscountError> {
    let minor = Decimal::from_i64(minor).ok_or(DiscountError::PercentConversion)?;

    ((*percent) * Decimal::ONE) // decimal_percentage doesn't expose the underlying Decimal
        .checked_mul(minor)
        .ok_or(DiscountError::PercentConversion)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or(DiscountError::PercentConversion)
}

/// Apply a percentage to a money amount, rounding to whole minor units.
///
/// # Errors
///
/// Returns [`DiscountError::PercentConversion`] if the calculation overflows.
pub fn percent_of<'a>(
    percent: &Percentage,
    amount: Money<'a, Currency>,
) -> Result<Money<'a, Currency>, DiscountError> {
    let minor = percent_of_minor(percent, amount.to_minor_units())?;

    Ok(Money::from_minor(minor, amount.currency()))
}

/// Converts a fractional percentage to percent points (0.15 -> 15).
pub fn percent_points(percent: &Percentage) -> Decimal {
    ((*percent) * Decimal::ONE * Decimal::ONE_HUNDRED)
        .round_dp(2)
        .normalize()
}

/// Returns `true` when the percentage lies within 0% and 100% inclusive.
pub fn is_valid_fraction(percent: &Percentage) -> bool {
    let value = (*percent) * Decimal::ONE;

    value >= Decimal::ZERO && value <= Decimal::ONE
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::INR;
    use testresult::TestResult;

    use super::*;

    #[test]
    fn percent_of_minor_calculates_correctly() -> TestResult {
        let percent = Percentage::from(0.25);

        assert_eq!(percent_of_minor(&percent, 200)?, 50);

        Ok(())
    }

    #[test]
    fn percent_of_minor_rounds_half_away_from_zero() -> TestResult {
        let percent = Percentage::from(0.5);

        assert_eq!(percent_of_minor(&percent, 3)?, 2);

        Ok(())
    }

    #[test]
    fn percent_of_minor_overflow_returns_error() {
        let percent = Percentage::from(2.0);
        let result = percent_of_minor(&percent, i64::MAX);

        assert!(matches!(result, Err(DiscountError::PercentConversion)));
    }

    #[test]
    fn percent_of_keeps_currency() -> TestResult {
        let amount = Money::from_minor(240_000, INR);
        let discount = percent_of(&Percentage::from(0.10), amount)?;

        assert_eq!(discount, Money::from_minor(24_000, INR));

        Ok(())
    }

    #[test]
    fn percent_points_renders_whole_numbers() {
        assert_eq!(percent_points(&Percentage::from(0.15)), Decimal::from(15));
        assert_eq!(percent_points(&Percentage::from(0.125)), Decimal::new(125, 1));
    }

    #[test]
    fn fraction_bounds() {
        assert!(is_valid_fraction(&Percentage::from(0.0)));
        assert!(is_valid_fraction(&Percentage::from(1.0)));
        assert!(!is_valid_fraction(&Percentage::from(1.5)));
    }
}
