//! Spend Tier Promotion
//!
//! Loyalty tiers keyed by cumulative spend. The spend that counts is the customer's
//! spend before this order plus the current subtotal, so an order can lift the
//! customer into a tier and be discounted by it straight away. Each tier carries a
//! list of perks that are reported but not enforced here.

use decimal_percentage::Percentage;
use rusty_money::{Money, iso::Currency};

use crate::{
    discounts::{DiscountError, is_valid_fraction, percent_of, percent_points},
    promotions::{PricingContext, PromotionError, PromotionMeta, applications::OfferResult},
};

/// A named loyalty tier.
#[derive(Debug, Clone)]
pub struct SpendTier<'a> {
    name: String,
    threshold: Money<'a, Currency>,
    percent: Percentage,
    perks: Vec<String>,
}

impl<'a> SpendTier<'a> {
    /// Create a tier reached at `threshold` cumulative spend.
    pub fn new(
        name: impl Into<String>,
        threshold: Money<'a, Currency>,
        percent: Percentage,
        perks: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            name: name.into(),
            threshold,
            percent,
            perks: perks.into_iter().map(Into::into).collect(),
        }
    }

    /// Tier name, e.g. "Gold".
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Cumulative spend needed to reach the tier.
    pub fn threshold(&self) -> &Money<'a, Currency> {
        &self.threshold
    }

    /// Discount applied to the subtotal.
    pub fn percent(&self) -> &Percentage {
        &self.percent
    }

    /// Informational perks.
    pub fn perks(&self) -> &[String] {
        &self.perks
    }
}

/// Percentage off by cumulative customer spend.
#[derive(Debug, Clone)]
pub struct SpendTierPromotion<'a> {
    meta: PromotionMeta,
    tiers: Vec<SpendTier<'a>>,
}

impl<'a> SpendTierPromotion<'a> {
    /// Create a new spend tier promotion. Tiers are listed lowest threshold first.
    ///
    /// # Errors
    ///
    /// - [`PromotionError::NoTiers`] if `tiers` is empty.
    /// - [`PromotionError::NegativeAmount`] if a threshold is negative.
    /// - [`PromotionError::UnorderedThresholds`] if thresholds are not strictly increasing.
    /// - [`PromotionError::PercentOutOfRange`] if a percentage is outside 0%..=100%.
    pub fn new(meta: PromotionMeta, tiers: Vec<SpendTier<'a>>) -> Result<Self, PromotionError> {
        if tiers.is_empty() {
            return Err(PromotionError::NoTiers(meta.id));
        }

        if tiers.iter().any(|tier| tier.threshold.to_minor_units() < 0) {
            return Err(PromotionError::NegativeAmount(meta.id));
        }

        let increasing = tiers.windows(2).all(|pair| match pair {
            [lower, upper] => upper.threshold.to_minor_units() > lower.threshold.to_minor_units(),
            _ => true,
        });

        if !increasing {
            return Err(PromotionError::UnorderedThresholds(meta.id));
        }

        if tiers.iter().any(|tier| !is_valid_fraction(&tier.percent)) {
            return Err(PromotionError::PercentOutOfRange(meta.id));
        }

        Ok(Self { meta, tiers })
    }

    /// Return the promotion metadata.
    pub fn meta(&self) -> &PromotionMeta {
        &self.meta
    }

    /// Return the tiers, lowest threshold first.
    pub fn tiers(&self) -> &[SpendTier<'a>] {
        &self.tiers
    }

    /// The highest tier whose threshold does not exceed `spend`.
    pub fn tier_for(&self, spend: &Money<'_, Currency>) -> Option<&SpendTier<'a>> {
        self.tiers
            .iter()
            .rev()
            .find(|tier| tier.threshold.to_minor_units() <= spend.to_minor_units())
    }

    /// Evaluate the promotion against the cart.
    ///
    /// # Errors
    ///
    /// Returns a [`DiscountError`] if the projected spend or the discount cannot be
    /// computed.
    pub fn evaluate(
        &self,
        context: &PricingContext<'_, 'a>,
    ) -> Result<Option<OfferResult<'a>>, DiscountError> {
        let projected = context.projected_spend()?;

        let Some(tier) = self.tier_for(&projected) else {
            return Ok(None);
        };

        let discount = percent_of(&tier.percent, context.subtotal())?;

        let mut offer = OfferResult::new(
            &self.meta,
            discount,
            format!(
                "{} VIP {}% discount",
                tier.name,
                percent_points(&tier.percent)
            ),
        );
        offer.tier = Some(tier.name.clone());
        offer.perks.clone_from(&tier.perks);

        Ok(Some(offer))
    }
}
