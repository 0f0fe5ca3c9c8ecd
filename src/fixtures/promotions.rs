//! Promotion Fixtures

use serde::Deserialize;

use crate::{
    fixtures::{
        FixtureError,
        products::{parse_money, parse_percentage},
    },
    promotions::{
        Promotion, PromotionMeta,
        applications::FreeItem,
        buy_x_get_y::BuyXGetYPromotion,
        quantity_tier::{QuantityTier, QuantityTierPromotion},
        spend_tier::{SpendTier, SpendTierPromotion},
        threshold_free_gift::ThresholdFreeGiftPromotion,
    },
};

/// Wrapper for promotions in YAML, in evaluation order
#[derive(Debug, Deserialize)]
pub struct PromotionsFixture {
    /// Promotion fixtures
    pub promotions: Vec<PromotionFixture>,
}

/// Promotion fixture from YAML
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PromotionFixture {
    /// Buy X get Y free
    BuyXGetY {
        /// Promotion id
        id: String,

        /// Promotion name
        name: String,

        /// Units to buy
        buy: u32,

        /// Units given free
        get: u32,
    },

    /// Gift set above an order amount
    ThresholdFreeGift {
        /// Promotion id
        id: String,

        /// Promotion name
        name: String,

        /// Minimum order amount (e.g., "2500 INR")
        min_order_amount: String,

        /// Name of the gift set
        gift_label: String,

        /// The gifts
        gifts: Vec<GiftFixture>,
    },

    /// Percentage off by total quantity
    QuantityTier {
        /// Promotion id
        id: String,

        /// Promotion name
        name: String,

        /// Quantity bands
        tiers: Vec<QuantityTierFixture>,
    },

    /// Percentage off by cumulative spend
    SpendTier {
        /// Promotion id
        id: String,

        /// Promotion name
        name: String,

        /// Spend tiers, lowest first
        tiers: Vec<SpendTierFixture>,
    },
}

/// A gift in a gift set
#[derive(Debug, Deserialize)]
pub struct GiftFixture {
    /// What the customer receives
    pub label: String,

    /// Nominal value (e.g., "50 INR")
    pub value: String,
}

/// A quantity band
#[derive(Debug, Deserialize)]
pub struct QuantityTierFixture {
    /// Lowest quantity in the band
    pub min: u32,

    /// Highest quantity in the band, open-ended when absent
    #[serde(default)]
    pub max: Option<u32>,

    /// Discount (e.g., "10%")
    pub discount: String,
}

/// A spend tier
#[derive(Debug, Deserialize)]
pub struct SpendTierFixture {
    /// Tier name
    pub name: String,

    /// Cumulative spend that reaches the tier (e.g., "5000 INR")
    pub threshold: String,

    /// Discount (e.g., "5%")
    pub discount: String,

    /// Perks listed with the tier
    #[serde(default)]
    pub perks: Vec<String>,
}

impl TryFrom<PromotionFixture> for Promotion<'static> {
    type Error = FixtureError;

    fn try_from(fixture: PromotionFixture) -> Result<Self, Self::Error> {
        let promotion = match fixture {
            PromotionFixture::BuyXGetY { id, name, buy, get } => Promotion::BuyXGetY(
                BuyXGetYPromotion::new(PromotionMeta::new(id, name), buy, get)?,
            ),
            PromotionFixture::ThresholdFreeGift {
                id,
                name,
                min_order_amount,
                gift_label,
                gifts,
            } => {
                let gifts = gifts
                    .into_iter()
                    .map(|gift| {
                        Ok(FreeItem {
                            label: gift.label,
                            value: parse_money(&gift.value)?,
                        })
                    })
                    .collect::<Result<Vec<_>, FixtureError>>()?;

                Promotion::ThresholdFreeGift(ThresholdFreeGiftPromotion::new(
                    PromotionMeta::new(id, name),
                    parse_money(&min_order_amount)?,
                    gift_label,
                    gifts,
                )?)
            }
            PromotionFixture::QuantityTier { id, name, tiers } => {
                let tiers = tiers
                    .into_iter()
                    .map(|tier| {
                        Ok(QuantityTier::new(
                            tier.min,
                            tier.max,
                            parse_percentage(&tier.discount)?,
                        ))
                    })
                    .collect::<Result<Vec<_>, FixtureError>>()?;

                Promotion::QuantityTier(QuantityTierPromotion::new(
                    PromotionMeta::new(id, name),
                    tiers,
                )?)
            }
            PromotionFixture::SpendTier { id, name, tiers } => {
                let tiers = tiers
                    .into_iter()
                    .map(|tier| {
                        Ok(SpendTier::new(
                            tier.name,
                            parse_money(&tier.threshold)?,
                            parse_percentage(&tier.discount)?,
                            tier.perks,
                        ))
                    })
                    .collect::<Result<Vec<_>, FixtureError>>()?;

                Promotion::SpendTier(SpendTierPromotion::new(
                    PromotionMeta::new(id, name),
                    tiers,
                )?)
            }
        };

        Ok(promotion)
    }
}
