//! Checkout Fixtures

use serde::Deserialize;

use crate::{
    checkout::{
        sample::{SamplePolicy, SampleSku, StaticSampleCatalog},
        totals::CheckoutSettings,
    },
    fixtures::{
        FixtureError,
        products::{parse_money, parse_percentage},
    },
};

/// Checkout configuration in YAML
#[derive(Debug, Deserialize)]
pub struct CheckoutFixture {
    /// Shipping, tax and rebate settings
    pub settings: SettingsFixture,

    /// Sample pricing and SKUs
    #[serde(default)]
    pub samples: Option<SamplesFixture>,
}

/// Shipping, tax and rebate settings
#[derive(Debug, Deserialize)]
pub struct SettingsFixture {
    /// Discounted subtotal from which shipping is free (e.g., "1000 INR")
    pub free_shipping_threshold: String,

    /// Shipping fee below the threshold (e.g., "50 INR")
    pub flat_shipping_fee: String,

    /// Default tax rate (e.g., "12%")
    pub tax_rate: String,

    /// Per-state tax overrides
    #[serde(default)]
    pub regional_tax_rates: Vec<RegionalTaxFixture>,

    /// Rebate for paying online (e.g., "20 INR")
    pub online_rebate: String,
}

/// A per-state tax override
#[derive(Debug, Deserialize)]
pub struct RegionalTaxFixture {
    /// State name
    pub state: String,

    /// Tax rate (e.g., "18%")
    pub rate: String,
}

/// Sample pricing and SKUs
#[derive(Debug, Deserialize)]
pub struct SamplesFixture {
    /// Units in the cart from which a sample is free
    pub free_from_units: u32,

    /// Price of a sample without its own price (e.g., "5 INR")
    pub default_price: String,

    /// Sample SKUs
    #[serde(default)]
    pub skus: Vec<SampleSkuFixture>,
}

/// A sample SKU
#[derive(Debug, Deserialize)]
pub struct SampleSkuFixture {
    /// Product the sample is taken from
    pub id: String,

    /// Display name
    pub name: String,

    /// List price (e.g., "199 INR")
    #[serde(default)]
    pub price: Option<String>,

    /// Whether the SKU can be ordered
    #[serde(default = "available")]
    pub available: bool,
}

fn available() -> bool {
    true
}

impl TryFrom<SettingsFixture> for CheckoutSettings<'static> {
    type Error = FixtureError;

    fn try_from(fixture: SettingsFixture) -> Result<Self, Self::Error> {
        let settings = CheckoutSettings::new(
            parse_money(&fixture.free_shipping_threshold)?,
            parse_money(&fixture.flat_shipping_fee)?,
            parse_percentage(&fixture.tax_rate)?,
            parse_money(&fixture.online_rebate)?,
        );

        fixture
            .regional_tax_rates
            .into_iter()
            .try_fold(settings, |settings, regional| {
                Ok(settings.with_regional_tax(regional.state, parse_percentage(&regional.rate)?))
            })
    }
}

impl SamplesFixture {
    /// Build the sample policy and catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if a price cannot be parsed.
    pub fn try_into_parts(
        self,
    ) -> Result<(SamplePolicy<'static>, StaticSampleCatalog<'static>), FixtureError> {
        let policy = SamplePolicy::new(self.free_from_units, parse_money(&self.default_price)?);

        let skus = self
            .skus
            .into_iter()
            .map(|sku| {
                Ok(SampleSku {
                    id: sku.id,
                    name: sku.name,
                    price: sku.price.as_deref().map(parse_money).transpose()?,
                    available: sku.available,
                })
            })
            .collect::<Result<Vec<_>, FixtureError>>()?;

        Ok((policy, StaticSampleCatalog::new(skus)))
    }
}
