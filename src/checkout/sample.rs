//! Samples
//!
//! A customer may add one sample vial to an order. It is free once the cart holds
//! enough units; otherwise it costs its own list price, or a default price when the
//! SKU has none.

use rusty_money::{
    Money,
    iso::{self, Currency},
};
use serde::Serialize;

use crate::cart::Cart;

/// Units in the cart from which a sample is free.
pub const FREE_SAMPLE_MIN_UNITS: u32 = 2;

/// A sample SKU the customer can choose.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SampleSku<'a> {
    /// Product the sample is taken from
    pub id: String,

    /// Display name
    pub name: String,

    /// List price, if the SKU carries one
    #[serde(skip)]
    pub price: Option<Money<'a, Currency>>,

    /// Whether the SKU can be ordered
    pub available: bool,
}

/// Prices the chosen sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplePolicy<'a> {
    free_from_units: u32,
    default_price: Money<'a, Currency>,
}

impl<'a> SamplePolicy<'a> {
    /// Create a policy: free from `free_from_units` units, otherwise `default_price`
    /// for SKUs without a list price.
    pub fn new(free_from_units: u32, default_price: Money<'a, Currency>) -> Self {
        Self {
            free_from_units,
            default_price,
        }
    }

    /// The storefront policy: free from two units, ₹5 otherwise.
    pub fn storefront() -> SamplePolicy<'static> {
        SamplePolicy::new(FREE_SAMPLE_MIN_UNITS, Money::from_minor(500, iso::INR))
    }

    /// Units in the cart from which a sample is free.
    pub fn free_from_units(&self) -> u32 {
        self.free_from_units
    }

    /// What `sample` costs with `cart`. No sample costs nothing.
    pub fn price_for(
        &self,
        cart: &Cart<'a>,
        sample: Option<&SampleSku<'a>>,
    ) -> Money<'a, Currency> {
        let zero = Money::from_minor(0, cart.currency());

        match sample {
            None => zero,
            Some(_) if cart.total_quantity() >= self.free_from_units => zero,
            Some(sku) => sku.price.unwrap_or(self.default_price),
        }
    }
}

/// Where sample SKUs come from.
pub trait SampleCatalog<'a> {
    /// Samples on offer for a cart holding `total_quantity` units.
    fn samples_for(&self, total_quantity: u32) -> Vec<SampleSku<'a>>;
}

/// A fixed list of sample SKUs.
#[derive(Debug, Clone, Default)]
pub struct StaticSampleCatalog<'a> {
    skus: Vec<SampleSku<'a>>,
}

impl<'a> StaticSampleCatalog<'a> {
    /// Create a catalog from `skus`.
    pub fn new(skus: impl Into<Vec<SampleSku<'a>>>) -> Self {
        Self { skus: skus.into() }
    }

    /// Find a SKU by id, available or not.
    pub fn get(&self, id: &str) -> Option<&SampleSku<'a>> {
        self.skus.iter().find(|sku| sku.id == id)
    }
}

impl<'a> SampleCatalog<'a> for StaticSampleCatalog<'a> {
    fn samples_for(&self, total_quantity: u32) -> Vec<SampleSku<'a>> {
        if total_quantity == 0 {
            return Vec::new();
        }

        self.skus.iter().filter(|sku| sku.available).cloned().collect()
    }
}
