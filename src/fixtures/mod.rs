//! Fixtures
//!
//! YAML fixture sets under `./fixtures/<kind>/<name>.yml`, where kind is one of
//! `products`, `promotions`, `carts` and `checkout`.

use std::{fs, path::PathBuf};

use rustc_hash::FxHashMap;
use rusty_money::iso::Currency;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::{
    cart::{Cart, CartError},
    checkout::{
        sample::{SamplePolicy, StaticSampleCatalog},
        totals::CheckoutSettings,
    },
    fixtures::{
        carts::{CartLineFixture, CartsFixture},
        checkout::{CheckoutFixture, SamplesFixture},
        products::ProductsFixture,
        promotions::PromotionsFixture,
    },
    products::Product,
    promotions::{Promotion, PromotionError, RuleBook},
};

pub mod carts;
pub mod checkout;
pub mod products;
pub mod promotions;

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format
    #[error("Invalid price format: {0}")]
    InvalidPrice(String),

    /// Invalid percentage format
    #[error("Invalid percentage format: {0}")]
    InvalidPercentage(String),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Product not found
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Cart not found
    #[error("Cart not found: {0}")]
    CartNotFound(String),

    /// Currency mismatch between products
    #[error("Currency mismatch: expected {0}, found {1}")]
    CurrencyMismatch(String, String),

    /// No products loaded yet
    #[error("No products loaded yet; currency unknown")]
    NoCurrency,

    /// No checkout configuration loaded
    #[error("No checkout configuration loaded")]
    NoCheckout,

    /// Invalid promotion data
    #[error(transparent)]
    Promotion(#[from] PromotionError),

    /// Cart creation error
    #[error("Failed to create cart: {0}")]
    Cart(#[from] CartError),
}

/// Fixture
#[derive(Debug)]
pub struct Fixture {
    /// Base path for fixture files
    base_path: PathBuf,

    /// Products by key
    products: FxHashMap<String, Product<'static>>,

    /// Promotions in evaluation order
    promotions: Vec<Promotion<'static>>,

    /// Named carts
    carts: FxHashMap<String, Vec<CartLineFixture>>,

    /// Checkout settings
    settings: Option<CheckoutSettings<'static>>,

    /// Sample policy and SKUs
    samples: Option<(SamplePolicy<'static>, StaticSampleCatalog<'static>)>,

    /// Currency for the fixture set
    currency: Option<&'static Currency>,
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}

impl Fixture {
    /// Create a new empty fixture with default base path
    pub fn new() -> Self {
        Self::with_base_path("./fixtures")
    }

    /// Create a new empty fixture with custom base path
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            products: FxHashMap::default(),
            promotions: Vec::new(),
            carts: FxHashMap::default(),
            settings: None,
            samples: None,
            currency: None,
        }
    }

    fn read<T: DeserializeOwned>(&self, kind: &str, name: &str) -> Result<T, FixtureError> {
        let file_path = self.base_path.join(kind).join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;

        Ok(serde_norway::from_str(&contents)?)
    }

    /// Load products from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or if there are currency mismatches.
    pub fn load_products(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let fixture: ProductsFixture = self.read("products", name)?;

        for (key, product_fixture) in fixture.products {
            let product = Product::try_from(product_fixture)?;
            let currency = product.price.currency();

            if let Some(existing) = self.currency {
                if existing != currency {
                    return Err(FixtureError::CurrencyMismatch(
                        existing.iso_alpha_code.to_string(),
                        currency.iso_alpha_code.to_string(),
                    ));
                }
            } else {
                self.currency = Some(currency);
            }

            self.products.insert(key, product);
        }

        Ok(self)
    }

    /// Load promotions from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or describes an invalid promotion.
    pub fn load_promotions(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let fixture: PromotionsFixture = self.read("promotions", name)?;

        for promotion_fixture in fixture.promotions {
            self.promotions.push(Promotion::try_from(promotion_fixture)?);
        }

        Ok(self)
    }

    /// Load named carts from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_carts(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let fixture: CartsFixture = self.read("carts", name)?;

        self.carts.extend(fixture.carts);

        Ok(self)
    }

    /// Load checkout settings and samples from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or holds an invalid amount.
    pub fn load_checkout(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let fixture: CheckoutFixture = self.read("checkout", name)?;

        self.settings = Some(CheckoutSettings::try_from(fixture.settings)?);
        self.samples = fixture
            .samples
            .map(SamplesFixture::try_into_parts)
            .transpose()?;

        Ok(self)
    }

    /// Load a complete fixture set (products, promotions, carts and checkout with the same name)
    ///
    /// # Errors
    ///
    /// Returns an error if any of the fixture files cannot be loaded.
    pub fn from_set(name: &str) -> Result<Self, FixtureError> {
        Self::from_set_in("./fixtures", name)
    }

    /// Load a complete fixture set from under `base_path`
    ///
    /// # Errors
    ///
    /// Returns an error if any of the fixture files cannot be loaded.
    pub fn from_set_in(base_path: impl Into<PathBuf>, name: &str) -> Result<Self, FixtureError> {
        let mut fixture = Self::with_base_path(base_path);

        fixture
            .load_products(name)?
            .load_promotions(name)?
            .load_carts(name)?
            .load_checkout(name)?;

        Ok(fixture)
    }

    /// Get a product by its string key
    ///
    /// # Errors
    ///
    /// Returns an error if the product is not found.
    pub fn product(&self, key: &str) -> Result<&Product<'static>, FixtureError> {
        self.products
            .get(key)
            .ok_or_else(|| FixtureError::ProductNotFound(key.to_string()))
    }

    /// Get all promotions
    pub fn promotions(&self) -> &[Promotion<'static>] {
        &self.promotions
    }

    /// Build a rule book from the loaded promotions
    ///
    /// # Errors
    ///
    /// Returns an error if two promotions share an id.
    pub fn rules(&self) -> Result<RuleBook<'static>, FixtureError> {
        Ok(RuleBook::new(self.promotions.clone())?)
    }

    /// Names of the loaded carts, sorted
    pub fn cart_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.carts.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Build a named cart from the loaded products
    ///
    /// # Errors
    ///
    /// Returns an error if the cart or one of its products is unknown.
    pub fn cart(&self, name: &str) -> Result<Cart<'static>, FixtureError> {
        let currency = self.currency()?;

        let lines = self
            .carts
            .get(name)
            .ok_or_else(|| FixtureError::CartNotFound(name.to_string()))?
            .iter()
            .map(|line| Ok(self.product(&line.product)?.line(&line.product, line.quantity)?))
            .collect::<Result<Vec<_>, FixtureError>>()?;

        Ok(Cart::with_lines(lines, currency)?)
    }

    /// Get the checkout settings
    ///
    /// # Errors
    ///
    /// Returns an error if no checkout fixture was loaded.
    pub fn checkout_settings(&self) -> Result<&CheckoutSettings<'static>, FixtureError> {
        self.settings.as_ref().ok_or(FixtureError::NoCheckout)
    }

    /// Get the sample policy, or the storefront policy if none was configured
    pub fn sample_policy(&self) -> SamplePolicy<'static> {
        self.samples
            .as_ref()
            .map_or_else(SamplePolicy::storefront, |(policy, _)| *policy)
    }

    /// Get the sample catalog, empty if none was configured
    pub fn sample_catalog(&self) -> StaticSampleCatalog<'static> {
        self.samples
            .as_ref()
            .map(|(_, catalog)| catalog.clone())
            .unwrap_or_default()
    }

    /// Get the currency of the loaded products
    ///
    /// # Errors
    ///
    /// Returns an error if no products have been loaded.
    pub fn currency(&self) -> Result<&'static Currency, FixtureError> {
        self.currency.ok_or(FixtureError::NoCurrency)
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use rusty_money::iso::INR;
    use testresult::TestResult;

    use super::*;

    fn manifest_fixtures() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures")
    }

    fn storefront() -> Result<Fixture, FixtureError> {
        let mut fixture = Fixture::with_base_path(manifest_fixtures());

        fixture
            .load_products("storefront")?
            .load_promotions("storefront")?
            .load_carts("storefront")?
            .load_checkout("storefront")?;

        Ok(fixture)
    }

    #[test]
    fn fixture_loads_storefront_set() -> TestResult {
        let fixture = storefront()?;

        assert_eq!(fixture.currency()?, INR);
        assert_eq!(fixture.product("oud")?.price.to_minor_units(), 100_000);
        assert_eq!(fixture.promotions().len(), 4);
        assert!(fixture.cart_names().contains(&"buy_2_get_1"));

        Ok(())
    }

    #[test]
    fn fixture_rules_match_built_in_storefront() -> TestResult {
        let fixture = storefront()?;
        let rules = fixture.rules()?;
        let built_in = RuleBook::storefront()?;

        let ids: Vec<&str> = rules.iter().map(Promotion::id).collect();
        let expected: Vec<&str> = built_in.iter().map(Promotion::id).collect();

        assert_eq!(ids, expected);

        Ok(())
    }

    #[test]
    fn fixture_builds_named_cart() -> TestResult {
        let fixture = storefront()?;
        let cart = fixture.cart("buy_2_get_1")?;

        assert_eq!(cart.len(), 3);
        assert_eq!(cart.subtotal()?.to_minor_units(), 230_000);

        Ok(())
    }

    #[test]
    fn fixture_checkout_settings_loaded() -> TestResult {
        let fixture = storefront()?;

        assert_eq!(
            fixture.checkout_settings()?.online_rebate().to_minor_units(),
            2_000
        );
        assert_eq!(fixture.sample_policy().free_from_units(), 2);

        Ok(())
    }

    #[test]
    fn fixture_unknown_cart_returns_error() -> TestResult {
        let fixture = storefront()?;

        assert!(matches!(
            fixture.cart("nonexistent"),
            Err(FixtureError::CartNotFound(_))
        ));

        Ok(())
    }

    #[test]
    fn fixture_product_not_found_returns_error() {
        let fixture = Fixture::new();

        assert!(matches!(
            fixture.product("nonexistent"),
            Err(FixtureError::ProductNotFound(_))
        ));
    }

    #[test]
    fn fixture_no_currency_returns_error() {
        assert!(matches!(
            Fixture::new().currency(),
            Err(FixtureError::NoCurrency)
        ));
    }

    #[test]
    fn fixture_missing_file_returns_io_error() {
        let mut fixture = Fixture::with_base_path(manifest_fixtures());

        assert!(matches!(
            fixture.load_products("does-not-exist"),
            Err(FixtureError::Io(_))
        ));
    }

    #[test]
    fn fixture_default_matches_new() {
        let fixture = Fixture::default();

        assert_eq!(fixture.base_path, PathBuf::from("./fixtures"));
        assert!(fixture.promotions.is_empty());
        assert!(fixture.settings.is_none());
    }
}
