//! Promotion Applications
//!
//! What a promotion grants when it applies to a cart.

use decimal_percentage::Percentage;
use rust_decimal::{Decimal, prelude::FromPrimitive};
use rusty_money::{Money, iso::Currency};
use smallvec::SmallVec;

use crate::promotions::PromotionMeta;

/// A non-monetary gift added to the order at no cost.
#[derive(Debug, Clone, PartialEq)]
pub struct FreeItem<'a> {
    /// What the customer receives
    pub label: String,

    /// Nominal value of the gift
    pub value: Money<'a, Currency>,
}

/// A cart unit made free by a promotion.
#[derive(Debug, Clone, PartialEq)]
pub struct GrantedUnit<'a> {
    /// Product the unit belongs to
    pub product_id: String,

    /// Price of the unit, which is the amount saved
    pub price: Money<'a, Currency>,
}

/// Result of a promotion applying to a cart.
#[derive(Debug, Clone, PartialEq)]
pub struct OfferResult<'a> {
    /// Id of the promotion that applied
    pub promotion_id: String,

    /// Name of the promotion that applied
    pub promotion_name: String,

    /// Money taken off the order
    pub monetary_discount: Money<'a, Currency>,

    /// Gifts granted alongside (or instead of) a monetary discount
    pub free_items: SmallVec<[FreeItem<'a>; 3]>,

    /// Cart units given away, cheapest first
    pub granted_units: Vec<GrantedUnit<'a>>,

    /// Informational perks that come with a tier
    pub perks: Vec<String>,

    /// Name of the tier that matched, for tiered promotions
    pub tier: Option<String>,

    /// Human-readable summary
    pub description: String,
}

impl<'a> OfferResult<'a> {
    /// Create a result carrying only a monetary discount.
    pub fn new(
        meta: &PromotionMeta,
        monetary_discount: Money<'a, Currency>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            promotion_id: meta.id.clone(),
            promotion_name: meta.name.clone(),
            monetary_discount,
            free_items: SmallVec::new(),
            granted_units: Vec::new(),
            perks: Vec::new(),
            tier: None,
            description: description.into(),
        }
    }

    /// Whether the result takes money off the order.
    pub fn has_monetary_discount(&self) -> bool {
        self.monetary_discount.to_minor_units() > 0
    }

    /// Combined nominal value of the free items.
    pub fn free_items_value(&self) -> Money<'a, Currency> {
        let minor = self
            .free_items
            .iter()
            .map(|item| item.value.to_minor_units())
            .sum();

        Money::from_minor(minor, self.monetary_discount.currency())
    }

    /// The monetary discount as a fraction of `subtotal`.
    pub fn savings_percent(&self, subtotal: &Money<'a, Currency>) -> Percentage {
        let subtotal_minor = subtotal.to_minor_units();

        if subtotal_minor == 0 {
            return Percentage::from(0.0);
        }

        let savings_dec =
            Decimal::from_i64(self.monetary_discount.to_minor_units()).unwrap_or(Decimal::ZERO);
        let subtotal_dec = Decimal::from_i64(subtotal_minor).unwrap_or(Decimal::ZERO);

        Percentage::from(savings_dec / subtotal_dec)
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::INR;
    use smallvec::smallvec;

    use crate::discounts::percent_points;

    use super::*;

    fn meta() -> PromotionMeta {
        PromotionMeta::new("free-samples", "Free Sample Set")
    }

    #[test]
    fn new_result_copies_meta() {
        let result = OfferResult::new(&meta(), Money::from_minor(0, INR), "nothing");

        assert_eq!(result.promotion_id, "free-samples");
        assert_eq!(result.promotion_name, "Free Sample Set");
        assert!(!result.has_monetary_discount());
    }

    #[test]
    fn free_items_value_sums_gifts() {
        let mut result = OfferResult::new(&meta(), Money::from_minor(0, INR), "gifts");
        result.free_items = smallvec![
            FreeItem {
                label: "Sample 1".to_string(),
                value: Money::from_minor(5_000, INR),
            },
            FreeItem {
                label: "Sample 2".to_string(),
                value: Money::from_minor(5_000, INR),
            },
        ];

        assert_eq!(result.free_items_value(), Money::from_minor(10_000, INR));
    }

    #[test]
    fn savings_percent_is_relative_to_subtotal() {
        let result = OfferResult::new(&meta(), Money::from_minor(50_000, INR), "");
        let subtotal = Money::from_minor(200_000, INR);

        assert_eq!(
            percent_points(&result.savings_percent(&subtotal)),
            Decimal::from(25)
        );
    }

    #[test]
    fn savings_percent_of_empty_subtotal_is_zero() {
        let result = OfferResult::new(&meta(), Money::from_minor(0, INR), "");

        assert_eq!(
            percent_points(&result.savings_percent(&Money::from_minor(0, INR))),
            Decimal::ZERO
        );
    }
}
