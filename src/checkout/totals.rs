//! Order Totals
//!
//! Turns a priced cart into the amount the customer pays:
//!
//! ```text
//! discounted subtotal = max(0, subtotal - best discount)
//! shipping            = 0 from the free-shipping threshold, otherwise the flat fee
//! tax                 = discounted subtotal x tax rate for the shipping state
//! grand total         = max(0, discounted subtotal + shipping + tax + sample - online rebate)
//! ```

use decimal_percentage::Percentage;
use rusty_money::{
    Money, MoneyError,
    iso::{self, Currency},
};
use thiserror::Error;
use tracing::debug;

use crate::{
    cart::Cart,
    checkout::payment::PaymentMethod,
    discounts::{DiscountError, percent_of},
    offers::OfferSummary,
    pricing::TotalPriceError,
};

/// Errors raised while computing order totals.
#[derive(Debug, Error, PartialEq)]
pub enum TotalsError {
    /// The cart subtotal could not be computed.
    #[error(transparent)]
    TotalPrice(#[from] TotalPriceError),

    /// Tax could not be computed.
    #[error(transparent)]
    Discount(#[from] DiscountError),

    /// Money arithmetic failed.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// Shipping, tax and rebate configuration.
#[derive(Debug, Clone)]
pub struct CheckoutSettings<'a> {
    free_shipping_threshold: Money<'a, Currency>,
    flat_shipping_fee: Money<'a, Currency>,
    tax_rate: Percentage,
    regional_tax_rates: Vec<(String, Percentage)>,
    online_rebate: Money<'a, Currency>,
}

impl<'a> CheckoutSettings<'a> {
    /// Create settings with a single tax rate.
    pub fn new(
        free_shipping_threshold: Money<'a, Currency>,
        flat_shipping_fee: Money<'a, Currency>,
        tax_rate: Percentage,
        online_rebate: Money<'a, Currency>,
    ) -> Self {
        Self {
            free_shipping_threshold,
            flat_shipping_fee,
            tax_rate,
            regional_tax_rates: Vec::new(),
            online_rebate,
        }
    }

    /// The storefront settings: free shipping from ₹1,000, ₹50 otherwise, 12% tax
    /// (18% in Delhi) and ₹20 off for paying online.
    pub fn storefront() -> CheckoutSettings<'static> {
        CheckoutSettings::new(
            Money::from_minor(100_000, iso::INR),
            Money::from_minor(5_000, iso::INR),
            Percentage::from(0.12),
            Money::from_minor(2_000, iso::INR),
        )
        .with_regional_tax("Delhi", Percentage::from(0.18))
    }

    /// Override the tax rate for orders shipped to `state`.
    #[must_use]
    pub fn with_regional_tax(mut self, state: impl Into<String>, rate: Percentage) -> Self {
        self.regional_tax_rates.push((state.into(), rate));
        self
    }

    /// Discounted subtotal from which shipping is free.
    pub fn free_shipping_threshold(&self) -> &Money<'a, Currency> {
        &self.free_shipping_threshold
    }

    /// Shipping fee below the threshold.
    pub fn flat_shipping_fee(&self) -> &Money<'a, Currency> {
        &self.flat_shipping_fee
    }

    /// Rebate for paying online.
    pub fn online_rebate(&self) -> &Money<'a, Currency> {
        &self.online_rebate
    }

    /// Tax rate for orders shipped to `state`, or the default rate.
    pub fn tax_rate_for(&self, state: Option<&str>) -> &Percentage {
        state
            .and_then(|state| {
                self.regional_tax_rates
                    .iter()
                    .find(|(region, _)| region.eq_ignore_ascii_case(state.trim()))
                    .map(|(_, rate)| rate)
            })
            .unwrap_or(&self.tax_rate)
    }

    /// Compute totals at the default tax rate.
    ///
    /// # Errors
    ///
    /// Returns a [`TotalsError`] if money arithmetic fails.
    pub fn compute_totals(
        &self,
        cart: &Cart<'a>,
        summary: &OfferSummary<'a>,
        sample_price: Money<'a, Currency>,
        payment_method: PaymentMethod,
    ) -> Result<OrderTotals<'a>, TotalsError> {
        self.compute(cart, summary, sample_price, payment_method, None)
    }

    /// Compute totals for an order shipped to `state`.
    ///
    /// # Errors
    ///
    /// Returns a [`TotalsError`] if money arithmetic fails.
    pub fn compute_totals_for_region(
        &self,
        cart: &Cart<'a>,
        summary: &OfferSummary<'a>,
        sample_price: Money<'a, Currency>,
        payment_method: PaymentMethod,
        state: &str,
    ) -> Result<OrderTotals<'a>, TotalsError> {
        self.compute(cart, summary, sample_price, payment_method, Some(state))
    }

    fn compute(
        &self,
        cart: &Cart<'a>,
        summary: &OfferSummary<'a>,
        sample_price: Money<'a, Currency>,
        payment_method: PaymentMethod,
        state: Option<&str>,
    ) -> Result<OrderTotals<'a>, TotalsError> {
        let currency = cart.currency();
        let zero = Money::from_minor(0, currency);

        let subtotal = cart.subtotal()?;
        let discount = summary.best_monetary_discount;

        let discounted_subtotal = Money::from_minor(
            subtotal
                .to_minor_units()
                .saturating_sub(discount.to_minor_units())
                .max(0),
            currency,
        );

        let shipping_fee = if discounted_subtotal.to_minor_units()
            >= self.free_shipping_threshold.to_minor_units()
        {
            zero
        } else {
            self.flat_shipping_fee
        };

        let tax = percent_of(self.tax_rate_for(state), discounted_subtotal)?;

        let online_payment_rebate = if payment_method.is_cash_on_delivery() {
            zero
        } else {
            self.online_rebate
        };

        let gross = discounted_subtotal
            .add(shipping_fee)?
            .add(tax)?
            .add(sample_price)?;

        let grand_total = Money::from_minor(
            gross
                .to_minor_units()
                .saturating_sub(online_payment_rebate.to_minor_units())
                .max(0),
            currency,
        );

        debug!(
            subtotal_minor = subtotal.to_minor_units(),
            discount_minor = discount.to_minor_units(),
            shipping_minor = shipping_fee.to_minor_units(),
            tax_minor = tax.to_minor_units(),
            grand_total_minor = grand_total.to_minor_units(),
            %payment_method,
            "computed order totals"
        );

        Ok(OrderTotals {
            subtotal,
            discount,
            discounted_subtotal,
            shipping_fee,
            tax,
            sample_price,
            online_payment_rebate,
            grand_total,
        })
    }
}

/// What the customer pays, line by line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrderTotals<'a> {
    /// Sum of line totals
    pub subtotal: Money<'a, Currency>,

    /// The best monetary discount
    pub discount: Money<'a, Currency>,

    /// Subtotal less discount, never negative
    pub discounted_subtotal: Money<'a, Currency>,

    /// Shipping charge
    pub shipping_fee: Money<'a, Currency>,

    /// Tax on the discounted subtotal
    pub tax: Money<'a, Currency>,

    /// Price of the chosen sample
    pub sample_price: Money<'a, Currency>,

    /// Taken off the grand total for online payment
    pub online_payment_rebate: Money<'a, Currency>,

    /// Amount payable, never negative
    pub grand_total: Money<'a, Currency>,
}

impl<'a> OrderTotals<'a> {
    /// Amount saved through the discount and the online rebate.
    ///
    /// # Errors
    ///
    /// Returns a [`MoneyError`] if the currencies differ.
    pub fn savings(&self) -> Result<Money<'a, Currency>, MoneyError> {
        self.discount.add(self.online_payment_rebate)
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::INR;
    use testresult::TestResult;

    use crate::{
        cart::{CartError, CartLine},
        checkout::payment::OnlineChannel,
        promotions::RuleBook,
    };

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

    fn summary_with_discount(
        cart: &Cart<'static>,
        discount: i64,
    ) -> Result<OfferSummary<'static>, Box<dyn std::error::Error>> {
        let mut summary = OfferSummary::compute(&RuleBook::default(), cart, rupees(0))?;
        summary.best_monetary_discount = rupees(discount);

        Ok(summary)
    }

    #[test]
    fn scenario_buy_2_get_1_cash_on_delivery() -> TestResult {
        let cart = cart(&[("oud", 1000, 1), ("amber", 800, 1), ("citrus", 500, 1)])?;
        let summary = OfferSummary::compute(&RuleBook::storefront()?, &cart, rupees(0))?;

        let totals = CheckoutSettings::storefront().compute_totals(
            &cart,
            &summary,
            rupees(0),
            PaymentMethod::CashOnDelivery,
        )?;

        assert_eq!(totals.subtotal, rupees(2300));
        assert_eq!(totals.discount, rupees(500));
        assert_eq!(totals.discounted_subtotal, rupees(1800));
        assert_eq!(totals.shipping_fee, rupees(0));
        assert_eq!(totals.tax, rupees(216));
        assert_eq!(totals.online_payment_rebate, rupees(0));
        assert_eq!(totals.grand_total, rupees(2016));

        Ok(())
    }

    #[test]
    fn online_rebate_only_touches_grand_total() -> TestResult {
        let cart = cart(&[("oud", 1000, 1), ("amber", 800, 1), ("citrus", 500, 1)])?;
        let summary = OfferSummary::compute(&RuleBook::storefront()?, &cart, rupees(0))?;
        let settings = CheckoutSettings::storefront();

        let cod = settings.compute_totals(
            &cart,
            &summary,
            rupees(0),
            PaymentMethod::CashOnDelivery,
        )?;
        let card = settings.compute_totals(
            &cart,
            &summary,
            rupees(0),
            PaymentMethod::Online(OnlineChannel::Card),
        )?;

        assert_eq!(card.online_payment_rebate, rupees(20));
        assert_eq!(card.discounted_subtotal, cod.discounted_subtotal);
        assert_eq!(card.tax, cod.tax);
        assert_eq!(card.grand_total, rupees(1996));

        Ok(())
    }

    #[test]
    fn shipping_below_threshold() -> TestResult {
        let cart = cart(&[("attar", 400, 1)])?;
        let summary = summary_with_discount(&cart, 0)?;

        let totals = CheckoutSettings::storefront().compute_totals(
            &cart,
            &summary,
            rupees(0),
            PaymentMethod::CashOnDelivery,
        )?;

        assert_eq!(totals.shipping_fee, rupees(50));
        assert_eq!(totals.tax, rupees(48));
        assert_eq!(totals.grand_total, rupees(498));

        Ok(())
    }

    #[test]
    fn shipping_threshold_is_inclusive() -> TestResult {
        let cart = cart(&[("attar", 1000, 1)])?;
        let summary = summary_with_discount(&cart, 0)?;

        let totals = CheckoutSettings::storefront().compute_totals(
            &cart,
            &summary,
            rupees(0),
            PaymentMethod::CashOnDelivery,
        )?;

        assert_eq!(totals.shipping_fee, rupees(0));

        Ok(())
    }

    #[test]
    fn regional_tax_rate() -> TestResult {
        let cart = cart(&[("attar", 1000, 1)])?;
        let summary = summary_with_discount(&cart, 0)?;
        let settings = CheckoutSettings::storefront();

        let delhi = settings.compute_totals_for_region(
            &cart,
            &summary,
            rupees(0),
            PaymentMethod::CashOnDelivery,
            "delhi",
        )?;
        let karnataka = settings.compute_totals_for_region(
            &cart,
            &summary,
            rupees(0),
            PaymentMethod::CashOnDelivery,
            "Karnataka",
        )?;

        assert_eq!(delhi.tax, rupees(180));
        assert_eq!(karnataka.tax, rupees(120));

        Ok(())
    }

    #[test]
    fn discount_larger_than_subtotal_clamps_to_zero() -> TestResult {
        let cart = cart(&[("attar", 10, 1)])?;
        let summary = summary_with_discount(&cart, 500)?;

        let totals = CheckoutSettings::storefront().compute_totals(
            &cart,
            &summary,
            rupees(0),
            PaymentMethod::Online(OnlineChannel::Upi),
        )?;

        assert_eq!(totals.discounted_subtotal, rupees(0));
        assert_eq!(totals.tax, rupees(0));
        // ₹50 shipping less the ₹20 rebate
        assert_eq!(totals.grand_total, rupees(30));

        Ok(())
    }

    #[test]
    fn grand_total_never_negative() -> TestResult {
        let cart = cart(&[("attar", 10, 1)])?;
        let summary = summary_with_discount(&cart, 500)?;
        let settings = CheckoutSettings::new(
            rupees(0),
            rupees(50),
            Percentage::from(0.12),
            rupees(100),
        );

        let totals = settings.compute_totals(
            &cart,
            &summary,
            rupees(0),
            PaymentMethod::Online(OnlineChannel::Wallet),
        )?;

        assert_eq!(totals.grand_total, rupees(0));

        Ok(())
    }

    #[test]
    fn sample_price_is_added() -> TestResult {
        let cart = cart(&[("attar", 1000, 1)])?;
        let summary = summary_with_discount(&cart, 0)?;

        let totals = CheckoutSettings::storefront().compute_totals(
            &cart,
            &summary,
            rupees(5),
            PaymentMethod::CashOnDelivery,
        )?;

        assert_eq!(totals.sample_price, rupees(5));
        assert_eq!(totals.grand_total, rupees(1125));

        Ok(())
    }
}
