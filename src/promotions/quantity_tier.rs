//! Quantity Tier Promotion
//!
//! A percentage off the whole subtotal, chosen by how many units are in the cart.
//! Tiers are inclusive quantity ranges; the last tier is usually open-ended.

use std::fmt;

use decimal_percentage::Percentage;
use rusty_money::Money;
use tracing::warn;

use crate::{
    discounts::{DiscountError, is_valid_fraction, percent_of, percent_points},
    promotions::{PricingContext, PromotionError, PromotionMeta, applications::OfferResult},
};

/// An inclusive range of total quantities mapped to a discount.
#[derive(Debug, Clone, Copy)]
pub struct QuantityTier {
    min: u32,
    max: Option<u32>,
    percent: Percentage,
}

impl QuantityTier {
    /// Create a tier covering `min..=max`, or `min..` when `max` is `None`.
    pub fn new(min: u32, max: Option<u32>, percent: Percentage) -> Self {
        Self { min, max, percent }
    }

    /// Smallest quantity in the tier.
    pub fn min(&self) -> u32 {
        self.min
    }

    /// Largest quantity in the tier, if bounded.
    pub fn max(&self) -> Option<u32> {
        self.max
    }

    /// Discount applied to the subtotal.
    pub fn percent(&self) -> &Percentage {
        &self.percent
    }

    /// Whether `quantity` falls in the tier.
    pub fn contains(&self, quantity: u32) -> bool {
        quantity >= self.min && self.max.is_none_or(|max| quantity <= max)
    }

    fn overlaps(&self, other: &QuantityTier) -> bool {
        let self_max = self.max.unwrap_or(u32::MAX);
        let other_max = other.max.unwrap_or(u32::MAX);

        self.min <= other_max && other.min <= self_max
    }
}

impl fmt::Display for QuantityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.max {
            Some(max) => write!(f, "{}-{max}", self.min),
            None => write!(f, "{}+", self.min),
        }
    }
}

/// Percentage off by total cart quantity.
#[derive(Debug, Clone)]
pub struct QuantityTierPromotion {
    meta: PromotionMeta,
    tiers: Vec<QuantityTier>,
}

impl QuantityTierPromotion {
    /// Create a new quantity tier promotion.
    ///
    /// Overlapping tiers are accepted; when several match, the one with the largest
    /// discount wins.
    ///
    /// # Errors
    ///
    /// - [`PromotionError::NoTiers`] if `tiers` is empty.
    /// - [`PromotionError::EmptyTier`] if a tier's upper bound is below its lower bound.
    /// - [`PromotionError::PercentOutOfRange`] if a percentage is outside 0%..=100%.
    pub fn new(meta: PromotionMeta, tiers: Vec<QuantityTier>) -> Result<Self, PromotionError> {
        if tiers.is_empty() {
            return Err(PromotionError::NoTiers(meta.id));
        }

        for tier in &tiers {
            if let Some(max) = tier.max.filter(|max| *max < tier.min) {
                return Err(PromotionError::EmptyTier {
                    id: meta.id,
                    min: tier.min,
                    max,
                });
            }

            if !is_valid_fraction(&tier.percent) {
                return Err(PromotionError::PercentOutOfRange(meta.id));
            }
        }

        for (i, tier) in tiers.iter().enumerate() {
            for other in tiers.iter().skip(i + 1) {
                if tier.overlaps(other) {
                    warn!(
                        promotion = %meta.id,
                        first = %tier,
                        second = %other,
                        "quantity tiers overlap; the larger discount will win"
                    );
                }
            }
        }

        Ok(Self { meta, tiers })
    }

    /// Return the promotion metadata.
    pub fn meta(&self) -> &PromotionMeta {
        &self.meta
    }

    /// Return the tiers.
    pub fn tiers(&self) -> &[QuantityTier] {
        &self.tiers
    }

    /// The tier with the smallest minimum quantity.
    pub fn lowest_tier(&self) -> Option<&QuantityTier> {
        self.tiers.iter().min_by_key(|tier| tier.min)
    }

    /// Evaluate the promotion against the cart.
    ///
    /// # Errors
    ///
    /// Returns a [`DiscountError`] if a percentage of the subtotal cannot be computed.
    pub fn evaluate<'a>(
        &self,
        context: &PricingContext<'_, 'a>,
    ) -> Result<Option<OfferResult<'a>>, DiscountError> {
        let quantity = context.total_quantity();
        let mut best: Option<(&QuantityTier, i64)> = None;

        for tier in self.tiers.iter().filter(|tier| tier.contains(quantity)) {
            let discount = percent_of(&tier.percent, context.subtotal())?.to_minor_units();

            if best.is_none_or(|(_, best_discount)| discount > best_discount) {
                best = Some((tier, discount));
            }
        }

        let Some((tier, discount)) = best else {
            return Ok(None);
        };

        let mut offer = OfferResult::new(
            &self.meta,
            Money::from_minor(discount, context.subtotal().currency()),
            format!(
                "{}% bulk discount on {quantity} items",
                percent_points(&tier.percent)
            ),
        );
        offer.tier = Some(tier.to_string());

        Ok(Some(offer))
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::INR;
    use testresult::TestResult;

    use crate::cart::{Cart, CartError, CartLine};

    use super::*;

    fn bulk() -> Result<QuantityTierPromotion, PromotionError> {
        QuantityTierPromotion::new(
            PromotionMeta::new("bulkDiscount", "Bulk Discount"),
            vec![
                QuantityTier::new(5, Some(7), Percentage::from(0.10)),
                QuantityTier::new(8, Some(11), Percentage::from(0.15)),
                QuantityTier::new(12, None, Percentage::from(0.20)),
            ],
        )
    }

    fn cart_of(quantity: u32) -> Result<Cart<'static>, CartError> {
        Cart::with_lines(
            vec![CartLine::new("attar", Money::from_minor(100_000, INR), quantity)?],
            INR,
        )
    }

    fn evaluate(
        promotion: &QuantityTierPromotion,
        quantity: u32,
    ) -> Result<Option<OfferResult<'static>>, Box<dyn std::error::Error>> {
        let cart = cart_of(quantity)?;
        let context = PricingContext::new(&cart, Money::from_minor(0, INR))?;

        Ok(promotion.evaluate(&context)?)
    }

    #[test]
    fn below_first_tier_does_not_apply() -> TestResult {
        assert!(evaluate(&bulk()?, 4)?.is_none());

        Ok(())
    }

    #[test]
    fn tier_boundaries() -> TestResult {
        let promotion = bulk()?;

        for (quantity, percent, tier) in [
            (5, 10, "5-7"),
            (7, 10, "5-7"),
            (8, 15, "8-11"),
            (11, 15, "8-11"),
            (12, 20, "12+"),
            (40, 20, "12+"),
        ] {
            let offer = evaluate(&promotion, quantity)?.ok_or("expected offer")?;
            let subtotal = 100_000 * i64::from(quantity);

            assert_eq!(
                offer.monetary_discount,
                Money::from_minor(subtotal * percent / 100, INR)
            );
            assert_eq!(offer.tier.as_deref(), Some(tier));
        }

        Ok(())
    }

    #[test]
    fn description_names_percent_and_quantity() -> TestResult {
        let offer = evaluate(&bulk()?, 8)?.ok_or("expected offer")?;

        assert_eq!(offer.description, "15% bulk discount on 8 items");

        Ok(())
    }

    #[test]
    fn overlapping_tiers_pick_largest_discount() -> TestResult {
        let promotion = QuantityTierPromotion::new(
            PromotionMeta::new("overlap", "Overlap"),
            vec![
                QuantityTier::new(5, None, Percentage::from(0.25)),
                QuantityTier::new(5, Some(10), Percentage::from(0.10)),
            ],
        )?;

        let offer = evaluate(&promotion, 6)?.ok_or("expected offer")?;

        assert_eq!(offer.monetary_discount, Money::from_minor(150_000, INR));
        assert_eq!(offer.tier.as_deref(), Some("5+"));

        Ok(())
    }

    #[test]
    fn lowest_tier_ignores_declaration_order() -> TestResult {
        let promotion = QuantityTierPromotion::new(
            PromotionMeta::new("bulk", "Bulk"),
            vec![
                QuantityTier::new(12, None, Percentage::from(0.20)),
                QuantityTier::new(5, Some(11), Percentage::from(0.10)),
            ],
        )?;

        assert_eq!(promotion.lowest_tier().map(QuantityTier::min), Some(5));

        Ok(())
    }

    #[test]
    fn invalid_configuration_rejected() {
        let meta = PromotionMeta::new("bad", "Bad");

        assert_eq!(
            QuantityTierPromotion::new(meta.clone(), vec![]).err(),
            Some(PromotionError::NoTiers("bad".to_string()))
        );

        assert_eq!(
            QuantityTierPromotion::new(
                meta.clone(),
                vec![QuantityTier::new(8, Some(5), Percentage::from(0.10))]
            )
            .err(),
            Some(PromotionError::EmptyTier {
                id: "bad".to_string(),
                min: 8,
                max: 5
            })
        );

        assert_eq!(
            QuantityTierPromotion::new(
                meta,
                vec![QuantityTier::new(5, None, Percentage::from(1.5))]
            )
            .err(),
            Some(PromotionError::PercentOutOfRange("bad".to_string()))
        );
    }
}
