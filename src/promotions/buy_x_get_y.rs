//! Buy X Get Y Promotion
//!
//! For every complete set of `buy + get` units in the cart, `get` units are free.
//! The free units are always the cheapest ones in the cart, which keeps the result
//! reproducible for a given cart.

use rusty_money::Money;

use crate::{
    discounts::DiscountError,
    items::cheapest_units,
    promotions::{
        PricingContext, PromotionError, PromotionMeta,
        applications::{GrantedUnit, OfferResult},
    },
};

/// A buy-X-get-Y promotion, e.g. "buy 2 get 1 free".
#[derive(Debug, Clone)]
pub struct BuyXGetYPromotion {
    meta: PromotionMeta,
    buy_quantity: u32,
    get_quantity: u32,
}

impl BuyXGetYPromotion {
    /// Create a new buy-X-get-Y promotion.
    ///
    /// # Errors
    ///
    /// Returns [`PromotionError::ZeroQuantity`] if either quantity is zero.
    pub fn new(
        meta: PromotionMeta,
        buy_quantity: u32,
        get_quantity: u32,
    ) -> Result<Self, PromotionError> {
        if buy_quantity == 0 || get_quantity == 0 {
            return Err(PromotionError::ZeroQuantity(meta.id));
        }

        Ok(Self {
            meta,
            buy_quantity,
            get_quantity,
        })
    }

    /// Return the promotion metadata.
    pub fn meta(&self) -> &PromotionMeta {
        &self.meta
    }

    /// Units the customer pays for in each set.
    pub fn buy_quantity(&self) -> u32 {
        self.buy_quantity
    }

    /// Units given free in each set.
    pub fn get_quantity(&self) -> u32 {
        self.get_quantity
    }

    /// Units needed to complete one set.
    pub fn set_size(&self) -> u32 {
        self.buy_quantity.saturating_add(self.get_quantity)
    }

    /// Number of free units earned by `total_quantity` units.
    pub fn free_units_for(&self, total_quantity: u32) -> u32 {
        (total_quantity / self.set_size()).saturating_mul(self.get_quantity)
    }

    /// Evaluate the promotion against the cart.
    ///
    /// # Errors
    ///
    /// Returns a [`DiscountError`] if summing the free units fails.
    pub fn evaluate<'a>(
        &self,
        context: &PricingContext<'_, 'a>,
    ) -> Result<Option<OfferResult<'a>>, DiscountError> {
        let total_quantity = context.total_quantity();

        if total_quantity < self.set_size() {
            return Ok(None);
        }

        let free_count = self.free_units_for(total_quantity);
        let currency = context.subtotal().currency();

        let units = context.cart().units();
        let free_units = cheapest_units(&units, usize::try_from(free_count).unwrap_or(usize::MAX));

        let discount = free_units.iter().try_fold(
            Money::from_minor(0, currency),
            |acc, unit| acc.add(Money::from_minor(unit.price().to_minor_units(), currency)),
        )?;

        let mut offer = OfferResult::new(
            &self.meta,
            discount,
            format!("{free_count} item(s) FREE"),
        );

        offer.granted_units = free_units
            .iter()
            .map(|unit| GrantedUnit {
                product_id: unit.product_id().to_string(),
                price: Money::from_minor(unit.price().to_minor_units(), currency),
            })
            .collect();

        Ok(Some(offer))
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::INR;
    use testresult::TestResult;

    use crate::cart::{Cart, CartError, CartLine};

    use super::*;

    fn buy_2_get_1() -> Result<BuyXGetYPromotion, PromotionError> {
        BuyXGetYPromotion::new(PromotionMeta::new("buy2get1", "Buy 2 Get 1 Free"), 2, 1)
    }

    fn cart(lines: &[(&str, i64, u32)]) -> Result<Cart<'static>, CartError> {
        let lines = lines
            .iter()
            .map(|(id, rupees, quantity)| {
                CartLine::new(*id, Money::from_minor(rupees * 100, INR), *quantity)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Cart::with_lines(lines, INR)
    }

    fn evaluate<'a>(
        promotion: &BuyXGetYPromotion,
        cart: &Cart<'a>,
    ) -> Result<Option<OfferResult<'a>>, Box<dyn std::error::Error>> {
        let context = PricingContext::new(cart, Money::from_minor(0, INR))?;

        Ok(promotion.evaluate(&context)?)
    }

    #[test]
    fn zero_quantities_rejected() {
        let result = BuyXGetYPromotion::new(PromotionMeta::new("bad", "Bad"), 0, 1);

        assert_eq!(
            result.err(),
            Some(PromotionError::ZeroQuantity("bad".to_string()))
        );
    }

    #[test]
    fn below_set_size_does_not_apply() -> TestResult {
        let promotion = buy_2_get_1()?;

        assert!(evaluate(&promotion, &cart(&[("oud", 1000, 2)])?)?.is_none());
        assert!(evaluate(&promotion, &Cart::new(INR))?.is_none());

        Ok(())
    }

    #[test]
    fn cheapest_unit_is_free() -> TestResult {
        let promotion = buy_2_get_1()?;
        let cart = cart(&[("oud", 1000, 1), ("amber", 800, 1), ("citrus", 500, 1)])?;

        let offer = evaluate(&promotion, &cart)?.ok_or("expected offer")?;

        assert_eq!(offer.monetary_discount, Money::from_minor(50_000, INR));
        assert_eq!(offer.description, "1 item(s) FREE");
        assert_eq!(
            offer
                .granted_units
                .iter()
                .map(|u| u.product_id.as_str())
                .collect::<Vec<_>>(),
            vec!["citrus"]
        );

        Ok(())
    }

    #[test]
    fn remainder_units_earn_nothing_extra() -> TestResult {
        let promotion = buy_2_get_1()?;
        let cart = cart(&[("oud", 1000, 5)])?;

        let offer = evaluate(&promotion, &cart)?.ok_or("expected offer")?;

        assert_eq!(offer.granted_units.len(), 1);
        assert_eq!(offer.monetary_discount, Money::from_minor(100_000, INR));

        Ok(())
    }

    #[test]
    fn exact_multiples_grant_full_count() -> TestResult {
        let promotion = buy_2_get_1()?;
        let cart = cart(&[
            ("a", 100, 1),
            ("b", 200, 1),
            ("c", 300, 1),
            ("d", 400, 1),
            ("e", 500, 1),
            ("f", 600, 1),
        ])?;

        let offer = evaluate(&promotion, &cart)?.ok_or("expected offer")?;

        assert_eq!(offer.granted_units.len(), 2);
        assert_eq!(offer.monetary_discount, Money::from_minor(30_000, INR));

        Ok(())
    }

    #[test]
    fn quantity_on_a_single_line_counts_per_unit() -> TestResult {
        let promotion = buy_2_get_1()?;
        let cart = cart(&[("oud", 1000, 1), ("citrus", 500, 2)])?;

        let offer = evaluate(&promotion, &cart)?.ok_or("expected offer")?;

        assert_eq!(offer.monetary_discount, Money::from_minor(50_000, INR));

        Ok(())
    }

    #[test]
    fn evaluation_leaves_cart_order_alone() -> TestResult {
        let promotion = buy_2_get_1()?;
        let cart = cart(&[("oud", 1000, 1), ("amber", 800, 1), ("citrus", 500, 1)])?;

        evaluate(&promotion, &cart)?;

        let ids: Vec<&str> = cart.iter().map(CartLine::product_id).collect();
        assert_eq!(ids, vec!["oud", "amber", "citrus"]);

        Ok(())
    }

    #[test]
    fn larger_sets() -> TestResult {
        let promotion =
            BuyXGetYPromotion::new(PromotionMeta::new("buy3get2", "Buy 3 Get 2"), 3, 2)?;

        assert_eq!(promotion.set_size(), 5);
        assert_eq!(promotion.free_units_for(4), 0);
        assert_eq!(promotion.free_units_for(10), 4);
        assert_eq!(promotion.free_units_for(14), 4);

        Ok(())
    }
}
