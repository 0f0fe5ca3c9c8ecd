//! Cart Fixtures

use rustc_hash::FxHashMap;
use serde::Deserialize;

/// Wrapper for carts in YAML
#[derive(Debug, Deserialize)]
pub struct CartsFixture {
    /// Map of cart name -> lines
    pub carts: FxHashMap<String, Vec<CartLineFixture>>,
}

/// A cart line referencing a product fixture
#[derive(Debug, Clone, Deserialize)]
pub struct CartLineFixture {
    /// Product key
    pub product: String,

    /// Units of the product
    #[serde(default = "one")]
    pub quantity: u32,
}

fn one() -> u32 {
    1
}
