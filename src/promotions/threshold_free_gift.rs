//! Threshold Free Gift Promotion
//!
//! Once the cart subtotal reaches a minimum order amount, a fixed set of gifts is
//! added to the order. The set does not scale with the order size and carries no
//! monetary discount.

use rusty_money::{Money, iso::Currency};
use smallvec::SmallVec;

use crate::{
    pricing::display_whole,
    promotions::{
        PricingContext, PromotionError, PromotionMeta,
        applications::{FreeItem, OfferResult},
    },
};

/// A fixed gift set granted above a minimum order amount.
#[derive(Debug, Clone)]
pub struct ThresholdFreeGiftPromotion<'a> {
    meta: PromotionMeta,
    min_order_amount: Money<'a, Currency>,
    gift_label: String,
    gifts: SmallVec<[FreeItem<'a>; 3]>,
}

impl<'a> ThresholdFreeGiftPromotion<'a> {
    /// Create a new threshold free gift promotion.
    ///
    /// `gift_label` names the set as a whole in descriptions, e.g. "premium sample set".
    ///
    /// # Errors
    ///
    /// Returns [`PromotionError::NegativeAmount`] if the minimum order amount or any
    /// gift value is negative.
    pub fn new(
        meta: PromotionMeta,
        min_order_amount: Money<'a, Currency>,
        gift_label: impl Into<String>,
        gifts: impl IntoIterator<Item = FreeItem<'a>>,
    ) -> Result<Self, PromotionError> {
        let gifts: SmallVec<[FreeItem<'a>; 3]> = gifts.into_iter().collect();

        if min_order_amount.to_minor_units() < 0
            || gifts.iter().any(|gift| gift.value.to_minor_units() < 0)
        {
            return Err(PromotionError::NegativeAmount(meta.id));
        }

        Ok(Self {
            meta,
            min_order_amount,
            gift_label: gift_label.into(),
            gifts,
        })
    }

    /// Return the promotion metadata.
    pub fn meta(&self) -> &PromotionMeta {
        &self.meta
    }

    /// Subtotal at which the gifts are granted.
    pub fn min_order_amount(&self) -> &Money<'a, Currency> {
        &self.min_order_amount
    }

    /// Name of the gift set as a whole.
    pub fn gift_label(&self) -> &str {
        &self.gift_label
    }

    /// The gifts granted.
    pub fn gifts(&self) -> &[FreeItem<'a>] {
        &self.gifts
    }

    /// Combined nominal value of the gift set.
    pub fn gift_value(&self) -> Money<'a, Currency> {
        let minor = self.gifts.iter().map(|gift| gift.value.to_minor_units()).sum();

        Money::from_minor(minor, self.min_order_amount.currency())
    }

    /// Evaluate the promotion against the cart. Never fails: there is no arithmetic
    /// beyond a comparison.
    pub fn evaluate(&self, context: &PricingContext<'_, 'a>) -> Option<OfferResult<'a>> {
        if context.subtotal().to_minor_units() < self.min_order_amount.to_minor_units() {
            return None;
        }

        let description = format!(
            "Free {} ({} value)",
            self.gift_label,
            display_whole(&self.gift_value())
        );

        let mut offer = OfferResult::new(
            &self.meta,
            Money::from_minor(0, context.subtotal().currency()),
            description,
        );
        offer.free_items = self.gifts.clone();

        Some(offer)
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::INR;
    use testresult::TestResult;

    use crate::cart::{Cart, CartLine};

    use super::*;

    fn samples() -> Result<ThresholdFreeGiftPromotion<'static>, PromotionError> {
        ThresholdFreeGiftPromotion::new(
            PromotionMeta::new("freeSamples", "Free Sample Set"),
            Money::from_minor(250_000, INR),
            "premium sample set",
            (1..=3).map(|n| FreeItem {
                label: format!("Sample {n}"),
                value: Money::from_minor(5_000, INR),
            }),
        )
    }

    fn cart_of(rupees: i64) -> Result<Cart<'static>, crate::cart::CartError> {
        Cart::with_lines(
            vec![CartLine::new("oud", Money::from_minor(rupees * 100, INR), 1)?],
            INR,
        )
    }

    #[test]
    fn below_threshold_does_not_apply() -> TestResult {
        let promotion = samples()?;
        let cart = cart_of(2_400)?;
        let context = PricingContext::new(&cart, Money::from_minor(0, INR))?;

        assert!(promotion.evaluate(&context).is_none());

        Ok(())
    }

    #[test]
    fn threshold_is_inclusive() -> TestResult {
        let promotion = samples()?;
        let cart = cart_of(2_500)?;
        let context = PricingContext::new(&cart, Money::from_minor(0, INR))?;

        let offer = promotion.evaluate(&context).ok_or("expected offer")?;

        assert!(!offer.has_monetary_discount());
        assert_eq!(offer.free_items.len(), 3);
        assert_eq!(offer.description, "Free premium sample set (₹150 value)");

        Ok(())
    }

    #[test]
    fn gift_set_does_not_scale() -> TestResult {
        let promotion = samples()?;
        let cart = cart_of(50_000)?;
        let context = PricingContext::new(&cart, Money::from_minor(0, INR))?;

        let offer = promotion.evaluate(&context).ok_or("expected offer")?;

        assert_eq!(offer.free_items.len(), 3);
        assert_eq!(offer.free_items_value(), Money::from_minor(15_000, INR));

        Ok(())
    }

    #[test]
    fn negative_amounts_rejected() {
        let result = ThresholdFreeGiftPromotion::new(
            PromotionMeta::new("bad", "Bad"),
            Money::from_minor(-1, INR),
            "nothing",
            Vec::<FreeItem<'_>>::new(),
        );

        assert_eq!(
            result.err(),
            Some(PromotionError::NegativeAmount("bad".to_string()))
        );
    }
}
