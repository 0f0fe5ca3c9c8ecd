//! Pricing
//!
//! Line and cart totals, plus the whole-unit money display used in customer-facing
//! messages.

use rusty_money::{Money, MoneyError, iso::Currency};
use thiserror::Error;

/// Errors that can occur while calculating total price.
#[derive(Debug, Error, PartialEq)]
pub enum TotalPriceError {
    /// A line total did not fit in minor units.
    #[error("line total overflowed: {0} x {1} minor units")]
    Overflow(u32, i64),

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// Calculates `unit_price × quantity`.
///
/// # Errors
///
/// - [`TotalPriceError::Overflow`]: the product does not fit in `i64` minor units.
pub fn line_total<'a>(
    unit_price: &Money<'a, Currency>,
    quantity: u32,
) -> Result<Money<'a, Currency>, TotalPriceError> {
    let minor = unit_price
        .to_minor_units()
        .checked_mul(i64::from(quantity))
        .ok_or(TotalPriceError::Overflow(quantity, unit_price.to_minor_units()))?;

    Ok(Money::from_minor(minor, unit_price.currency()))
}

/// Calculates the total of a list of `(unit_price, quantity)` pairs.
///
/// An empty list totals zero in `currency`.
///
/// # Errors
///
/// - [`TotalPriceError::Overflow`]: a line total does not fit in minor units.
/// - [`TotalPriceError::Money`]: Wrapped money arithmetic or currency mismatch error.
pub fn total_price<'a, I>(
    lines: I,
    currency: &'a Currency,
) -> Result<Money<'a, Currency>, TotalPriceError>
where
    I: IntoIterator<Item = (Money<'a, Currency>, u32)>,
{
    lines
        .into_iter()
        .try_fold(Money::from_minor(0, currency), |acc, (price, quantity)| {
            Ok(acc.add(line_total(&price, quantity)?)?)
        })
}

/// Formats `amount` in whole currency units with its symbol, e.g. `₹2,500`.
///
/// Fractional amounts round half away from zero.
pub fn display_whole(amount: &Money<'_, Currency>) -> String {
    let minor = amount.to_minor_units();
    let scale = 10_u64.checked_pow(amount.currency().exponent).unwrap_or(1);
    let whole = minor.unsigned_abs().saturating_add(scale / 2) / scale;

    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if minor < 0 { "-" } else { "" };

    format!("{sign}{}{grouped}", amount.currency().symbol)
}
