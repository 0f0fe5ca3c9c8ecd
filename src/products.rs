//! Products

use rusty_money::{Money, iso::Currency};

use crate::cart::{CartError, CartLine};

/// A catalog product
#[derive(Debug, Clone, PartialEq)]
pub struct Product<'a> {
    /// Product name
    pub name: String,

    /// Unit price
    pub price: Money<'a, Currency>,
}

impl<'a> Product<'a> {
    /// Create a product.
    pub fn new(name: impl Into<String>, price: Money<'a, Currency>) -> Self {
        Self {
            name: name.into(),
            price,
        }
    }

    /// A cart line of `quantity` units of this product, keyed by `id`.
    ///
    /// # Errors
    ///
    /// Returns a [`CartError`] if `quantity` is zero or the price is negative.
    pub fn line(&self, id: impl Into<String>, quantity: u32) -> Result<CartLine<'a>, CartError> {
        Ok(CartLine::new(id, self.price, quantity)?.with_name(self.name.clone()))
    }
}
