//! Eligibility
//!
//! Near-miss upsell suggestions for carts that *almost* qualify for a promotion.
//! The checks are deliberately narrow: one unit short of a buy-X-get-Y set, one
//! unit short of the lowest quantity tier, or a subtotal inside a fixed gap below a
//! free-gift threshold. Nothing further away is suggested.

use rusty_money::{Money, iso::Currency};

use crate::{
    discounts::percent_points,
    items::cheapest_units,
    pricing::display_whole,
    promotions::{
        PricingContext, Promotion, RuleBook, buy_x_get_y::BuyXGetYPromotion,
        quantity_tier::QuantityTierPromotion, threshold_free_gift::ThresholdFreeGiftPromotion,
    },
};

/// How far below a free-gift threshold, in minor units, a subtotal still earns a
/// suggestion.
pub const DEFAULT_GIFT_GAP_MINOR: i64 = 50_000;

/// An upsell suggestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    /// Promotion the suggestion leads to
    pub promotion_id: String,

    /// What the customer should do
    pub message: String,

    /// Call to action
    pub action_label: String,

    /// What the customer stands to gain
    pub savings_hint: String,
}

/// Produces near-miss suggestions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EligibilityAdvisor {
    gift_gap_minor: i64,
}

impl Default for EligibilityAdvisor {
    fn default() -> Self {
        Self {
            gift_gap_minor: DEFAULT_GIFT_GAP_MINOR,
        }
    }
}

impl EligibilityAdvisor {
    /// Create an advisor with a custom free-gift gap.
    pub fn with_gift_gap(gap: &Money<'_, Currency>) -> Self {
        Self {
            gift_gap_minor: gap.to_minor_units(),
        }
    }

    /// Suggestions for the cart in `context`, in rule order.
    pub fn suggest(
        &self,
        rules: &RuleBook<'_>,
        context: &PricingContext<'_, '_>,
    ) -> Vec<Suggestion> {
        rules
            .iter()
            .filter_map(|promotion| match promotion {
                Promotion::BuyXGetY(promotion) => one_short_of_set(promotion, context),
                Promotion::ThresholdFreeGift(promotion) => {
                    self.just_below_gift(promotion, context)
                }
                Promotion::QuantityTier(promotion) => one_short_of_tier(promotion, context),
                Promotion::SpendTier(_) => None,
            })
            .collect()
    }

    fn just_below_gift(
        &self,
        promotion: &ThresholdFreeGiftPromotion<'_>,
        context: &PricingContext<'_, '_>,
    ) -> Option<Suggestion> {
        let subtotal = context.subtotal().to_minor_units();
        let min = promotion.min_order_amount().to_minor_units();

        if subtotal >= min || subtotal <= min.saturating_sub(self.gift_gap_minor) {
            return None;
        }

        let remaining = Money::from_minor(
            min.saturating_sub(subtotal),
            context.subtotal().currency(),
        );

        Some(Suggestion {
            promotion_id: promotion.meta().id.clone(),
            message: format!(
                "Add {} more for FREE {}!",
                display_whole(&remaining),
                promotion.gift_label()
            ),
            action_label: "Continue shopping".to_string(),
            savings_hint: format!("Worth {}", display_whole(&promotion.gift_value())),
        })
    }
}

fn one_short_of_set(
    promotion: &BuyXGetYPromotion,
    context: &PricingContext<'_, '_>,
) -> Option<Suggestion> {
    if context.total_quantity() != promotion.set_size().checked_sub(1)? {
        return None;
    }

    let units = context.cart().units();
    let free = usize::try_from(promotion.get_quantity()).unwrap_or(usize::MAX);
    let best_case = cheapest_units(&units, free)
        .iter()
        .map(|unit| unit.price().to_minor_units())
        .sum();

    Some(Suggestion {
        promotion_id: promotion.meta().id.clone(),
        message: format!("Add 1 more item to get {} FREE!", promotion.get_quantity()),
        action_label: "Add to cart".to_string(),
        savings_hint: format!(
            "Save up to {}",
            display_whole(&Money::from_minor(best_case, context.subtotal().currency()))
        ),
    })
}

fn one_short_of_tier(
    promotion: &QuantityTierPromotion,
    context: &PricingContext<'_, '_>,
) -> Option<Suggestion> {
    let tier = promotion.lowest_tier()?;

    if context.total_quantity() != tier.min().checked_sub(1)? {
        return None;
    }

    let percent = percent_points(tier.percent());

    Some(Suggestion {
        promotion_id: promotion.meta().id.clone(),
        message: format!("Add 1 more item for {percent}% bulk discount!"),
        action_label: "Add to cart".to_string(),
        savings_hint: format!("{percent}% OFF entire order"),
    })
}
