//! Product Fixtures

use decimal_percentage::Percentage;
use rust_decimal::{Decimal, prelude::ToPrimitive};
use rustc_hash::FxHashMap;
use rusty_money::{
    Money,
    iso::{Currency, EUR, GBP, INR, USD},
};
use serde::Deserialize;

use crate::{fixtures::FixtureError, products::Product};

/// Wrapper for products in YAML
#[derive(Debug, Deserialize)]
pub struct ProductsFixture {
    /// Map of product key -> product fixture
    pub products: FxHashMap<String, ProductFixture>,
}

/// Product Fixture
#[derive(Debug, Deserialize)]
pub struct ProductFixture {
    /// Product name
    pub name: String,

    /// Product price (e.g., "1000 INR")
    pub price: String,
}

impl TryFrom<ProductFixture> for Product<'static> {
    type Error = FixtureError;

    fn try_from(fixture: ProductFixture) -> Result<Self, Self::Error> {
        Ok(Product::new(fixture.name, parse_money(&fixture.price)?))
    }
}

/// Parse price string (e.g., "1000 INR" or "2.99 GBP") into minor units and currency
///
/// # Errors
///
/// Returns an error if the string is not in the format "AMOUNT CURRENCY",
/// if the amount cannot be parsed as a decimal, or if the currency code
/// is not recognized.
pub fn parse_price(s: &str) -> Result<(i64, &'static Currency), FixtureError> {
    let parts: Vec<&str> = s.split_whitespace().collect();

    if parts.len() != 2 {
        return Err(FixtureError::InvalidPrice(format!(
            "Expected format 'AMOUNT CURRENCY', got: {s}"
        )));
    }

    let currency_code = parts
        .get(1)
        .ok_or_else(|| FixtureError::InvalidPrice(s.to_string()))?;

    let currency = match *currency_code {
        "INR" => INR,
        "GBP" => GBP,
        "USD" => USD,
        "EUR" => EUR,
        other => return Err(FixtureError::UnknownCurrency(other.to_string())),
    };

    let amount = parts
        .first()
        .ok_or_else(|| FixtureError::InvalidPrice(s.to_string()))?
        .replace(',', "")
        .parse::<Decimal>()
        .map_err(|_err| FixtureError::InvalidPrice(s.to_string()))?;

    let minor_units = 10_i64
        .checked_pow(currency.exponent)
        .and_then(|scale| amount.checked_mul(Decimal::from(scale)))
        .and_then(|value| value.round_dp(0).to_i64())
        .ok_or_else(|| FixtureError::InvalidPrice(s.to_string()))?;

    Ok((minor_units, currency))
}

/// Parse a price string straight into [`Money`].
///
/// # Errors
///
/// See [`parse_price`].
pub fn parse_money(s: &str) -> Result<Money<'static, Currency>, FixtureError> {
    let (minor_units, currency) = parse_price(s)?;

    Ok(Money::from_minor(minor_units, currency))
}

/// Parse percentage string (e.g., "15%" or "0.15") into a `Percentage`
///
/// Accepts two formats:
/// - Percentage format: "15%" for 15%
/// - Decimal format: "0.15" for 15%
///
/// # Errors
///
/// Returns an error if the string cannot be parsed.
pub fn parse_percentage(s: &str) -> Result<Percentage, FixtureError> {
    let trimmed = s.trim();

    if let Some(percent_str) = trimmed.strip_suffix('%') {
        let value = percent_str
            .trim()
            .parse::<f64>()
            .map_err(|_err| FixtureError::InvalidPercentage(s.to_string()))?;

        Ok(Percentage::from(value / 100.0))
    } else {
        let value = trimmed
            .parse::<f64>()
            .map_err(|_err| FixtureError::InvalidPercentage(s.to_string()))?;

        Ok(Percentage::from(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_price_rejects_invalid_format() {
        let result = parse_price("1000");

        assert!(matches!(result, Err(FixtureError::InvalidPrice(_))));
    }

    #[test]
    fn parse_price_rejects_unknown_currency() {
        let result = parse_price("1000 XYZ");

        assert!(matches!(result, Err(FixtureError::UnknownCurrency(code)) if code == "XYZ"));
    }

    #[test]
    fn parse_price_accepts_rupees() -> Result<(), FixtureError> {
        let (minor, currency) = parse_price("2,500 INR")?;

        assert_eq!(minor, 250_000);
        assert_eq!(currency, INR);

        Ok(())
    }

    #[test]
    fn parse_price_accepts_fractional_amounts() -> Result<(), FixtureError> {
        let (minor, currency) = parse_price("2.99 GBP")?;

        assert_eq!(minor, 299);
        assert_eq!(currency, GBP);

        Ok(())
    }

    #[test]
    fn parse_percentage_accepts_percentage_format() -> Result<(), FixtureError> {
        assert_eq!(parse_percentage("15%")?, Percentage::from(0.15));

        Ok(())
    }

    #[test]
    fn parse_percentage_accepts_decimal_format() -> Result<(), FixtureError> {
        assert_eq!(parse_percentage("0.12")?, Percentage::from(0.12));

        Ok(())
    }

    #[test]
    fn parse_percentage_rejects_invalid_format() {
        assert!(matches!(
            parse_percentage("ten percent"),
            Err(FixtureError::InvalidPercentage(_))
        ));
    }

    #[test]
    fn product_fixture_converts() -> Result<(), FixtureError> {
        let product = Product::try_from(ProductFixture {
            name: "Royal Oud".to_string(),
            price: "1000 INR".to_string(),
        })?;

        assert_eq!(product.name, "Royal Oud");
        assert_eq!(product.price.to_minor_units(), 100_000);

        Ok(())
    }
}
