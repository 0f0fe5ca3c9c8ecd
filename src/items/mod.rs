//! Items
//!
//! A cart line of quantity `n` expands into `n` single units. Unit-level views are
//! what buy-X-get-Y promotions price against.

use rusty_money::{Money, iso::Currency};

/// A single priced unit taken from a cart line.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Unit<'a> {
    line: usize,
    product_id: &'a str,
    price: Money<'a, Currency>,
}

impl<'a> Unit<'a> {
    /// Creates a new unit for the cart line at `line`.
    #[must_use]
    pub fn new(line: usize, product_id: &'a str, price: Money<'a, Currency>) -> Self {
        Self {
            line,
            product_id,
            price,
        }
    }

    /// Index of the cart line this unit came from.
    pub fn line(&self) -> usize {
        self.line
    }

    /// Product the unit belongs to.
    pub fn product_id(&self) -> &'a str {
        self.product_id
    }

    /// Returns the price of the unit
    pub fn price(&self) -> &Money<'a, Currency> {
        &self.price
    }
}

/// Returns the `n` cheapest units, cheapest first.
///
/// Sorts a copy, so the caller's ordering is untouched. Equal prices keep their
/// original relative order, which keeps the selection reproducible.
pub fn cheapest_units<'a>(units: &[Unit<'a>], n: usize) -> Vec<Unit<'a>> {
    let mut sorted = units.to_vec();

    sorted.sort_by_key(|unit| unit.price().to_minor_units());
    sorted.truncate(n);

    sorted
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::INR;

    use super::*;

    fn units<'a>() -> [Unit<'a>; 3] {
        [
            Unit::new(0, "oud", Money::from_minor(100_000, INR)),
            Unit::new(1, "citrus", Money::from_minor(50_000, INR)),
            Unit::new(2, "amber", Money::from_minor(80_000, INR)),
        ]
    }

    #[test]
    fn cheapest_units_picks_lowest_prices() {
        let units = units();
        let cheapest = cheapest_units(&units, 2);

        let ids: Vec<&str> = cheapest.iter().map(Unit::product_id).collect();

        assert_eq!(ids, vec!["citrus", "amber"]);
    }

    #[test]
    fn cheapest_units_leaves_input_order_alone() {
        let units = units();
        let _cheapest = cheapest_units(&units, 1);

        assert_eq!(units.first().map(Unit::product_id), Some("oud"));
    }

    #[test]
    fn cheapest_units_caps_at_available_units() {
        let units = units();

        assert_eq!(cheapest_units(&units, 10).len(), 3);
    }

    #[test]
    fn ties_keep_cart_order() {
        let units = [
            Unit::new(0, "first", Money::from_minor(500, INR)),
            Unit::new(1, "second", Money::from_minor(500, INR)),
        ];

        let cheapest = cheapest_units(&units, 1);

        assert_eq!(cheapest.first().map(Unit::line), Some(0));
    }
}
