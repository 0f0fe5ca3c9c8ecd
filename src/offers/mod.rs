//! Offers
//!
//! Runs every rule in a [`RuleBook`] against a cart and condenses the results into an
//! [`OfferSummary`]. Only one monetary discount is ever applied, the largest; free
//! gifts from every applicable rule are granted regardless.

use rusty_money::{Money, iso::Currency};

use crate::{
    cart::Cart,
    eligibility::{EligibilityAdvisor, Suggestion},
    promotions::{
        EvaluationError, PricingContext, RuleBook,
        applications::{FreeItem, OfferResult},
    },
};

pub mod notification;

/// Everything the promotion rules have to say about a cart.
#[derive(Debug, Clone, PartialEq)]
pub struct OfferSummary<'a> {
    /// Subtotal of the evaluated cart
    pub subtotal: Money<'a, Currency>,

    /// Every rule that applied, in rule order
    pub applicable_offers: Vec<OfferResult<'a>>,

    /// The largest monetary discount among the applicable offers, or zero
    pub best_monetary_discount: Money<'a, Currency>,

    /// Gifts from every applicable offer
    pub all_free_items: Vec<FreeItem<'a>>,

    /// Near-miss upsell suggestions
    pub eligibility_suggestions: Vec<Suggestion>,
}

impl<'a> OfferSummary<'a> {
    /// Evaluate `rules` against `cart`, given the customer's spend before this order.
    ///
    /// Pure: the same inputs always produce the same summary.
    ///
    /// # Errors
    ///
    /// Returns an [`EvaluationError`] if money arithmetic overflows.
    pub fn compute(
        rules: &RuleBook<'a>,
        cart: &Cart<'a>,
        lifetime_spend: Money<'a, Currency>,
    ) -> Result<Self, EvaluationError> {
        Self::compute_with(rules, cart, lifetime_spend, &EligibilityAdvisor::default())
    }

    /// As [`OfferSummary::compute`], with a custom eligibility advisor.
    ///
    /// # Errors
    ///
    /// Returns an [`EvaluationError`] if money arithmetic overflows.
    pub fn compute_with(
        rules: &RuleBook<'a>,
        cart: &Cart<'a>,
        lifetime_spend: Money<'a, Currency>,
        advisor: &EligibilityAdvisor,
    ) -> Result<Self, EvaluationError> {
        let context = PricingContext::new(cart, lifetime_spend)?;

        let applicable_offers = rules
            .iter()
            .filter_map(|promotion| promotion.evaluate(&context).transpose())
            .collect::<Result<Vec<_>, _>>()?;

        let best_minor = applicable_offers
            .iter()
            .map(|offer| offer.monetary_discount.to_minor_units())
            .max()
            .unwrap_or(0)
            .max(0);

        let all_free_items = applicable_offers
            .iter()
            .flat_map(|offer| offer.free_items.iter().cloned())
            .collect();

        Ok(Self {
            subtotal: context.subtotal(),
            best_monetary_discount: Money::from_minor(best_minor, cart.currency()),
            applicable_offers,
            all_free_items,
            eligibility_suggestions: advisor.suggest(rules, &context),
        })
    }

    /// The offer carrying the best monetary discount, earliest in rule order on a tie.
    ///
    /// Offers that only grant gifts never win.
    pub fn best_offer(&self) -> Option<&OfferResult<'a>> {
        self.applicable_offers
            .iter()
            .filter(|offer| offer.has_monetary_discount())
            .fold(None, |best: Option<&OfferResult<'a>>, offer| match best {
                Some(current)
                    if current.monetary_discount.to_minor_units()
                        >= offer.monetary_discount.to_minor_units() =>
                {
                    Some(current)
                }
                _ => Some(offer),
            })
    }

    /// Whether any rule applied.
    pub fn is_empty(&self) -> bool {
        self.applicable_offers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::INR;
    use testresult::TestResult;

    use crate::cart::{CartError, CartLine};

    use super::*;

    fn rupees(amount: i64) -> Money<'static, Currency> {
        Money::from_minor(amount * 100, INR)
    }

    fn cart(lines: &[(&str, i64, u32)]) -> Result<Cart<'static>, CartError> {
        let lines = lines
            .iter()
            .map(|(id, amount, quantity)| CartLine::new(*id, rupees(*amount), *quantity))
            .collect::<Result<Vec<_>, _>>()?;

        Cart::with_lines(lines, INR)
    }

    #[test]
    fn empty_cart_has_zero_discount() -> TestResult {
        let rules = RuleBook::storefront()?;
        let summary = OfferSummary::compute(&rules, &Cart::new(INR), rupees(0))?;

        assert!(summary.is_empty());
        assert_eq!(summary.best_monetary_discount, rupees(0));
        assert!(summary.all_free_items.is_empty());
        assert!(summary.eligibility_suggestions.is_empty());
        assert!(summary.best_offer().is_none());

        Ok(())
    }

    #[test]
    fn best_discount_is_the_maximum() -> TestResult {
        let rules = RuleBook::storefront()?;
        // 6 units: buy 2 get 1 frees two ₹100 units, bulk takes 10% of ₹3,000
        let cart = cart(&[("oud", 900, 2), ("citrus", 100, 2), ("amber", 500, 2)])?;

        let summary = OfferSummary::compute(&rules, &cart, rupees(0))?;

        assert_eq!(summary.applicable_offers.len(), 3);
        assert_eq!(summary.best_monetary_discount, rupees(300));
        assert_eq!(
            summary.best_offer().map(|o| o.promotion_id.as_str()),
            Some("bulkDiscount")
        );

        Ok(())
    }

    #[test]
    fn gifts_are_granted_alongside_the_best_discount() -> TestResult {
        let rules = RuleBook::storefront()?;
        let cart = cart(&[("oud", 1000, 3)])?;

        let summary = OfferSummary::compute(&rules, &cart, rupees(0))?;

        assert_eq!(summary.best_monetary_discount, rupees(1000));
        assert_eq!(summary.all_free_items.len(), 3);

        Ok(())
    }

    #[test]
    fn ties_go_to_the_earlier_rule() -> TestResult {
        let rules = RuleBook::storefront()?;
        // buy 2 get 1 frees the ₹400 unit; bulk takes 10% of ₹4,000
        let cart = cart(&[("oud", 900, 4), ("citrus", 400, 1)])?;

        let summary = OfferSummary::compute(&rules, &cart, rupees(0))?;

        assert_eq!(summary.best_monetary_discount, rupees(400));
        assert_eq!(
            summary.best_offer().map(|o| o.promotion_id.as_str()),
            Some("buy2get1")
        );

        Ok(())
    }

    #[test]
    fn compute_is_idempotent() -> TestResult {
        let rules = RuleBook::storefront()?;
        let cart = cart(&[("oud", 1000, 1), ("amber", 800, 1), ("citrus", 500, 1)])?;

        let first = OfferSummary::compute(&rules, &cart, rupees(4_000))?;
        let second = OfferSummary::compute(&rules, &cart, rupees(4_000))?;

        assert_eq!(first, second);

        Ok(())
    }
}
