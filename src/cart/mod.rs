//! Cart
//!
//! A [`Cart`] is an immutable snapshot of what the customer intends to buy. Every
//! mutation returns a fresh snapshot, so offers computed from an older snapshot can
//! never observe a half-applied change.

use rusty_money::{Money, iso::Currency};
use thiserror::Error;

use crate::{
    items::Unit,
    pricing::{TotalPriceError, total_price},
};

pub mod store;

/// Errors related to cart construction or mutation.
#[derive(Debug, Error, PartialEq)]
pub enum CartError {
    /// A line's currency differs from the cart currency (index, line currency, cart currency).
    #[error("Line {0} has currency {1}, but cart has currency {2}")]
    CurrencyMismatch(usize, &'static str, &'static str),

    /// A line was created with a quantity of zero.
    #[error("Line for {0} must have a quantity of at least 1")]
    ZeroQuantity(String),

    /// A line was created with a negative unit price.
    #[error("Line for {0} has a negative unit price")]
    NegativePrice(String),

    /// Two lines refer to the same product.
    #[error("Product {0} appears on more than one line")]
    DuplicateProduct(String),

    /// Totalling the cart failed.
    #[error(transparent)]
    TotalPrice(#[from] TotalPriceError),
}

/// A single product line in the cart.
#[derive(Clone, Debug, PartialEq)]
pub struct CartLine<'a> {
    product_id: String,
    name: Option<String>,
    unit_price: Money<'a, Currency>,
    quantity: u32,
}

impl<'a> CartLine<'a> {
    /// Create a new cart line.
    ///
    /// # Errors
    ///
    /// - [`CartError::ZeroQuantity`] if `quantity` is zero.
    /// - [`CartError::NegativePrice`] if `unit_price` is below zero.
    pub fn new(
        product_id: impl Into<String>,
        unit_price: Money<'a, Currency>,
        quantity: u32,
    ) -> Result<Self, CartError> {
        let product_id = product_id.into();

        if quantity == 0 {
            return Err(CartError::ZeroQuantity(product_id));
        }

        if unit_price.to_minor_units() < 0 {
            return Err(CartError::NegativePrice(product_id));
        }

        Ok(Self {
            product_id,
            name: None,
            unit_price,
            quantity,
        })
    }

    /// Attach a display name to the line.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Product identifier.
    pub fn product_id(&self) -> &str {
        &self.product_id
    }

    /// Display name, falling back to the product id.
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.product_id)
    }

    /// Price of a single unit.
    pub fn unit_price(&self) -> &Money<'a, Currency> {
        &self.unit_price
    }

    /// Number of units on the line.
    pub fn quantity(&self) -> u32 {
        self.quantity
    }
}

/// Cart snapshot
#[derive(Clone, Debug)]
pub struct Cart<'a> {
    lines: Vec<CartLine<'a>>,
    currency: &'static Currency,
}

impl<'a> Cart<'a> {
    /// Create an empty cart.
    #[must_use]
    pub fn new(currency: &'static Currency) -> Self {
        Cart {
            lines: Vec::new(),
            currency,
        }
    }

    /// Create a cart with the given lines.
    ///
    /// # Errors
    ///
    /// Returns a `CartError` on a currency mismatch or when a product appears twice.
    pub fn with_lines(
        lines: impl Into<Vec<CartLine<'a>>>,
        currency: &'static Currency,
    ) -> Result<Self, CartError> {
        let lines = lines.into();

        for (i, line) in lines.iter().enumerate() {
            let line_currency = line.unit_price.currency();

            if line_currency != currency {
                return Err(CartError::CurrencyMismatch(
                    i,
                    line_currency.iso_alpha_code,
                    currency.iso_alpha_code,
                ));
            }

            if lines.iter().take(i).any(|l| l.product_id == line.product_id) {
                return Err(CartError::DuplicateProduct(line.product_id.clone()));
            }
        }

        Ok(Cart { lines, currency })
    }

    /// Add a line, merging its quantity into an existing line for the same product.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::CurrencyMismatch`] if the line is priced in another currency.
    pub fn with_added(&self, line: CartLine<'a>) -> Result<Self, CartError> {
        if line.unit_price.currency() != self.currency {
            return Err(CartError::CurrencyMismatch(
                self.lines.len(),
                line.unit_price.currency().iso_alpha_code,
                self.currency.iso_alpha_code,
            ));
        }

        let mut lines = self.lines.clone();

        match lines.iter_mut().find(|l| l.product_id == line.product_id) {
            Some(existing) => existing.quantity = existing.quantity.saturating_add(line.quantity),
            None => lines.push(line),
        }

        Ok(Cart {
            lines,
            currency: self.currency,
        })
    }

    /// Remove the line for `product_id`. Unknown products leave the cart unchanged.
    #[must_use]
    pub fn without(&self, product_id: &str) -> Self {
        Cart {
            lines: self
                .lines
                .iter()
                .filter(|l| l.product_id != product_id)
                .cloned()
                .collect(),
            currency: self.currency,
        }
    }

    /// Change the quantity of the line for `product_id`, clamped to at least 1.
    ///
    /// Unknown products leave the cart unchanged.
    #[must_use]
    pub fn with_quantity(&self, product_id: &str, quantity: u32) -> Self {
        let mut lines = self.lines.clone();

        if let Some(line) = lines.iter_mut().find(|l| l.product_id == product_id) {
            line.quantity = quantity.max(1);
        }

        Cart {
            lines,
            currency: self.currency,
        }
    }

    /// An empty cart in the same currency.
    #[must_use]
    pub fn cleared(&self) -> Self {
        Self::new(self.currency)
    }

    /// Calculate the subtotal of the cart.
    ///
    /// # Errors
    ///
    /// Returns a `TotalPriceError` if a line total overflows.
    pub fn subtotal(&self) -> Result<Money<'a, Currency>, TotalPriceError> {
        total_price(
            self.lines.iter().map(|l| (l.unit_price, l.quantity)),
            self.currency,
        )
    }

    /// Sum of quantities across all lines.
    #[must_use]
    pub fn total_quantity(&self) -> u32 {
        self.lines
            .iter()
            .fold(0u32, |acc, l| acc.saturating_add(l.quantity))
    }

    /// Expand the cart into one entry per unit, in cart order.
    pub fn units(&self) -> Vec<Unit<'_>> {
        self.lines
            .iter()
            .enumerate()
            .flat_map(|(idx, line)| {
                (0..line.quantity).map(move |_| Unit::new(idx, &line.product_id, line.unit_price))
            })
            .collect()
    }

    /// Find the line for a product.
    pub fn line(&self, product_id: &str) -> Option<&CartLine<'a>> {
        self.lines.iter().find(|l| l.product_id == product_id)
    }

    /// Iterate over the lines in the cart.
    pub fn iter(&self) -> impl Iterator<Item = &CartLine<'a>> {
        self.lines.iter()
    }

    /// Get the number of lines in the cart.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Check if the cart is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Get the currency of the cart.
    #[must_use]
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }
}
