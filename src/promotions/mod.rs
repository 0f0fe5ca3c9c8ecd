//! Promotions
//!
//! The closed set of promotion rules a storefront can run. Each variant lives in its
//! own module and knows how to evaluate itself against a [`PricingContext`]; the
//! [`Promotion`] enum dispatches exhaustively, so adding a rule type is a compile
//! error until every caller handles it.

use rusty_money::{Money, MoneyError, iso::Currency};
use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    cart::Cart,
    discounts::DiscountError,
    pricing::TotalPriceError,
    promotions::{
        applications::OfferResult, buy_x_get_y::BuyXGetYPromotion,
        quantity_tier::QuantityTierPromotion, spend_tier::SpendTierPromotion,
        threshold_free_gift::ThresholdFreeGiftPromotion,
    },
};

pub mod applications;
pub mod buy_x_get_y;
pub mod quantity_tier;
pub mod spend_tier;
pub mod storefront;
pub mod threshold_free_gift;

/// Errors raised while building promotion configuration.
#[derive(Debug, Error, PartialEq)]
pub enum PromotionError {
    /// Buy or get quantity of zero.
    #[error("{0}: buy and get quantities must both be at least 1")]
    ZeroQuantity(String),

    /// A tiered promotion was configured without tiers.
    #[error("{0}: at least one tier is required")]
    NoTiers(String),

    /// A quantity tier whose upper bound is below its lower bound.
    #[error("{id}: tier {min}..{max} is empty")]
    EmptyTier {
        /// Promotion id
        id: String,
        /// Lower bound
        min: u32,
        /// Upper bound
        max: u32,
    },

    /// A percentage outside 0%..=100%.
    #[error("{0}: percentage must be between 0% and 100%")]
    PercentOutOfRange(String),

    /// Spend thresholds that are not strictly increasing.
    #[error("{0}: spend thresholds must be strictly increasing")]
    UnorderedThresholds(String),

    /// A negative amount where only non-negative amounts make sense.
    #[error("{0}: amounts must not be negative")]
    NegativeAmount(String),

    /// Two promotions share an id.
    #[error("duplicate promotion id {0}")]
    DuplicateId(String),
}

/// Errors raised while evaluating promotions against a cart.
#[derive(Debug, Error, PartialEq)]
pub enum EvaluationError {
    /// Cart totals could not be computed.
    #[error(transparent)]
    TotalPrice(#[from] TotalPriceError),

    /// Percentage or money arithmetic failed.
    #[error(transparent)]
    Discount(#[from] DiscountError),

    /// Money arithmetic failed.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// Promotion metadata
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromotionMeta {
    /// Stable promotion identifier
    pub id: String,

    /// Promotion name
    pub name: String,
}

impl PromotionMeta {
    /// Create promotion metadata.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Cart figures every promotion evaluates against, computed once per evaluation.
#[derive(Debug, Clone, Copy)]
pub struct PricingContext<'c, 'a> {
    cart: &'c Cart<'a>,
    subtotal: Money<'a, Currency>,
    total_quantity: u32,
    lifetime_spend: Money<'a, Currency>,
}

impl<'c, 'a> PricingContext<'c, 'a> {
    /// Build the context for `cart`, given the customer's spend before this order.
    ///
    /// # Errors
    ///
    /// Returns a [`TotalPriceError`] if the cart subtotal cannot be calculated.
    pub fn new(
        cart: &'c Cart<'a>,
        lifetime_spend: Money<'a, Currency>,
    ) -> Result<Self, TotalPriceError> {
        Ok(Self {
            cart,
            subtotal: cart.subtotal()?,
            total_quantity: cart.total_quantity(),
            lifetime_spend,
        })
    }

    /// The cart being priced.
    pub fn cart(&self) -> &'c Cart<'a> {
        self.cart
    }

    /// Sum of line totals.
    pub fn subtotal(&self) -> Money<'a, Currency> {
        self.subtotal
    }

    /// Sum of quantities.
    pub fn total_quantity(&self) -> u32 {
        self.total_quantity
    }

    /// Spend before this order.
    pub fn lifetime_spend(&self) -> Money<'a, Currency> {
        self.lifetime_spend
    }

    /// Spend including this order.
    ///
    /// # Errors
    ///
    /// Returns a [`MoneyError`] if the currencies differ.
    pub fn projected_spend(&self) -> Result<Money<'a, Currency>, MoneyError> {
        self.lifetime_spend.add(self.subtotal)
    }
}

/// Promotion enum
#[derive(Debug, Clone)]
pub enum Promotion<'a> {
    /// Buy some units, get more free.
    BuyXGetY(BuyXGetYPromotion),

    /// Fixed gift set above an order amount.
    ThresholdFreeGift(ThresholdFreeGiftPromotion<'a>),

    /// Percentage off by total quantity.
    QuantityTier(QuantityTierPromotion),

    /// Percentage off by cumulative customer spend.
    SpendTier(SpendTierPromotion<'a>),
}

impl<'a> Promotion<'a> {
    /// Return the promotion metadata.
    pub fn meta(&self) -> &PromotionMeta {
        match self {
            Promotion::BuyXGetY(promotion) => promotion.meta(),
            Promotion::ThresholdFreeGift(promotion) => promotion.meta(),
            Promotion::QuantityTier(promotion) => promotion.meta(),
            Promotion::SpendTier(promotion) => promotion.meta(),
        }
    }

    /// Return the promotion id.
    pub fn id(&self) -> &str {
        &self.meta().id
    }

    /// Evaluate the promotion, returning `None` when it does not apply.
    ///
    /// # Errors
    ///
    /// Returns an [`EvaluationError`] if money arithmetic overflows.
    pub fn evaluate(
        &self,
        context: &PricingContext<'_, 'a>,
    ) -> Result<Option<OfferResult<'a>>, EvaluationError> {
        let result = match self {
            Promotion::BuyXGetY(promotion) => promotion.evaluate(context)?,
            Promotion::ThresholdFreeGift(promotion) => promotion.evaluate(context),
            Promotion::QuantityTier(promotion) => promotion.evaluate(context)?,
            Promotion::SpendTier(promotion) => promotion.evaluate(context)?,
        };

        debug!(
            promotion = self.id(),
            applies = result.is_some(),
            discount_minor = result
                .as_ref()
                .map_or(0, |offer| offer.monetary_discount.to_minor_units()),
            "evaluated promotion"
        );

        Ok(result)
    }
}

/// An ordered, immutable set of promotions with unique ids.
#[derive(Debug, Clone, Default)]
pub struct RuleBook<'a> {
    promotions: Vec<Promotion<'a>>,
}

impl<'a> RuleBook<'a> {
    /// Create a rule book.
    ///
    /// # Errors
    ///
    /// Returns [`PromotionError::DuplicateId`] if two promotions share an id.
    pub fn new(promotions: impl Into<Vec<Promotion<'a>>>) -> Result<Self, PromotionError> {
        let promotions = promotions.into();

        for (i, promotion) in promotions.iter().enumerate() {
            if promotions.iter().take(i).any(|p| p.id() == promotion.id()) {
                return Err(PromotionError::DuplicateId(promotion.id().to_string()));
            }
        }

        if promotions.is_empty() {
            warn!("rule book has no promotions");
        }

        Ok(Self { promotions })
    }

    /// Look up a promotion by id.
    pub fn get(&self, id: &str) -> Option<&Promotion<'a>> {
        self.promotions.iter().find(|p| p.id() == id)
    }

    /// Iterate over the promotions in evaluation order.
    pub fn iter(&self) -> impl Iterator<Item = &Promotion<'a>> {
        self.promotions.iter()
    }

    /// Number of promotions.
    pub fn len(&self) -> usize {
        self.promotions.len()
    }

    /// Whether there are no promotions.
    pub fn is_empty(&self) -> bool {
        self.promotions.is_empty()
    }
}
