//! Storefront Promotions
//!
//! The rule book the perfume storefront ships with.

use decimal_percentage::Percentage;
use rusty_money::{
    Money,
    iso::{self, Currency},
};

use crate::promotions::{
    Promotion, PromotionError, PromotionMeta, RuleBook,
    applications::FreeItem,
    buy_x_get_y::BuyXGetYPromotion,
    quantity_tier::{QuantityTier, QuantityTierPromotion},
    spend_tier::{SpendTier, SpendTierPromotion},
    threshold_free_gift::ThresholdFreeGiftPromotion,
};

fn rupees(amount: i64) -> Money<'static, Currency> {
    Money::from_minor(amount.saturating_mul(100), iso::INR)
}

impl RuleBook<'static> {
    /// The built-in storefront configuration, in evaluation order:
    ///
    /// 1. Buy 2 get 1 free, cheapest unit free.
    /// 2. Three ₹50 premium samples on orders of ₹2,500 or more.
    /// 3. Bulk discount: 5-7 items 10%, 8-11 items 15%, 12+ items 20%.
    /// 4. VIP tiers on cumulative spend: Gold ₹5,000 5%, Platinum ₹10,000 8%,
    ///    Diamond ₹25,000 12%.
    ///
    /// # Errors
    ///
    /// Returns a [`PromotionError`] only if the built-in configuration is invalid.
    pub fn storefront() -> Result<Self, PromotionError> {
        let buy_2_get_1 =
            BuyXGetYPromotion::new(PromotionMeta::new("buy2get1", "Buy 2 Get 1 Free"), 2, 1)?;

        let free_samples = ThresholdFreeGiftPromotion::new(
            PromotionMeta::new("freeSamples", "Free Premium Samples"),
            rupees(2_500),
            "premium sample set",
            (1..=3).map(|n| FreeItem {
                label: format!("Premium Sample {n}"),
                value: rupees(50),
            }),
        )?;

        let bulk = QuantityTierPromotion::new(
            PromotionMeta::new("bulkDiscount", "Bulk Discount"),
            vec![
                QuantityTier::new(5, Some(7), Percentage::from(0.10)),
                QuantityTier::new(8, Some(11), Percentage::from(0.15)),
                QuantityTier::new(12, None, Percentage::from(0.20)),
            ],
        )?;

        let vip = SpendTierPromotion::new(
            PromotionMeta::new("vipTier", "VIP Rewards"),
            vec![
                SpendTier::new(
                    "Gold",
                    rupees(5_000),
                    Percentage::from(0.05),
                    ["Free express shipping", "Early access to sales"],
                ),
                SpendTier::new(
                    "Platinum",
                    rupees(10_000),
                    Percentage::from(0.08),
                    [
                        "Free express shipping",
                        "Exclusive products",
                        "Birthday surprise",
                    ],
                ),
                SpendTier::new(
                    "Diamond",
                    rupees(25_000),
                    Percentage::from(0.12),
                    [
                        "VIP customer service",
                        "Free premium samples",
                        "Invitation-only events",
                    ],
                ),
            ],
        )?;

        RuleBook::new(vec![
            Promotion::BuyXGetY(buy_2_get_1),
            Promotion::ThresholdFreeGift(free_samples),
            Promotion::QuantityTier(bulk),
            Promotion::SpendTier(vip),
        ])
    }
}
