//! Orders
//!
//! The payload sent to the order backend, and the gateway it is sent through.
//! Amounts on the wire are integer minor units (paise).

use std::fmt;

use rusty_money::{Money, iso::Currency};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::{
    cart::Cart,
    checkout::{
        address::Address,
        flow::{CheckoutError, CheckoutFlow},
        payment::PaymentMethod,
        totals::OrderTotals,
    },
    offers::OfferSummary,
};

/// Identifier the backend assigns to a created order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(String);

impl OrderId {
    /// Wrap a backend order id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Errors reported by the order backend.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GatewayError {
    /// The backend refused the request.
    #[error("order rejected: {0}")]
    Rejected(String),

    /// The backend could not be reached.
    #[error("order service unavailable: {0}")]
    Unavailable(String),
}

/// One ordered product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    /// Product identifier
    pub product_id: String,

    /// Units ordered
    pub quantity: u32,

    /// Unit price in minor units
    pub unit_price_minor: i64,
}

/// The sample added to the order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SampleSelection {
    /// Product the sample is taken from
    pub sample_id: String,

    /// Price charged in minor units
    pub price_minor: i64,
}

/// Which promotion discounted the order and what else it earned.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscountBreakdown {
    /// Promotion providing the monetary discount
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promotion_id: Option<String>,

    /// Its description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Discount in minor units
    pub amount_minor: i64,

    /// Labels of the free gifts granted
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub free_items: Vec<String>,
}

/// Order totals in minor units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TotalsPayload {
    /// Sum of line totals
    pub subtotal_minor: i64,

    /// Best monetary discount
    pub discount_minor: i64,

    /// Shipping charge
    pub shipping_minor: i64,

    /// Tax
    pub tax_minor: i64,

    /// Sample price
    pub sample_minor: i64,

    /// Online payment rebate
    pub rebate_minor: i64,

    /// Amount payable
    pub total_minor: i64,
}

impl From<&OrderTotals<'_>> for TotalsPayload {
    fn from(totals: &OrderTotals<'_>) -> Self {
        Self {
            subtotal_minor: totals.subtotal.to_minor_units(),
            discount_minor: totals.discount.to_minor_units(),
            shipping_minor: totals.shipping_fee.to_minor_units(),
            tax_minor: totals.tax.to_minor_units(),
            sample_minor: totals.sample_price.to_minor_units(),
            rebate_minor: totals.online_payment_rebate.to_minor_units(),
            total_minor: totals.grand_total.to_minor_units(),
        }
    }
}

impl TotalsPayload {
    /// The amount payable as money in `currency`.
    pub fn total<'a>(&self, currency: &'a Currency) -> Money<'a, Currency> {
        Money::from_minor(self.total_minor, currency)
    }
}

/// Everything the backend needs to create an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    /// Ordered products
    pub items: Vec<OrderItem>,

    /// Where to ship
    pub shipping_address: Address,

    /// Where to bill
    pub billing_address: Address,

    /// How the customer pays
    pub payment_method: PaymentMethod,

    /// The chosen sample
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample: Option<SampleSelection>,

    /// The applied discount
    pub discount: DiscountBreakdown,

    /// Totals as computed locally
    pub totals: TotalsPayload,
}

impl OrderRequest {
    /// Assemble the request from a checkout that has reached review.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::MissingDetails`] if the addresses or payment method
    /// have not been entered.
    pub fn from_checkout(
        cart: &Cart<'_>,
        flow: &CheckoutFlow<'_>,
        summary: &OfferSummary<'_>,
        totals: &OrderTotals<'_>,
    ) -> Result<Self, CheckoutError> {
        let shipping_address = flow
            .shipping_address()
            .cloned()
            .ok_or(CheckoutError::MissingDetails("shipping address"))?;
        let billing_address = flow
            .billing_address()
            .cloned()
            .ok_or(CheckoutError::MissingDetails("billing address"))?;
        let payment_method = flow
            .payment_method()
            .ok_or(CheckoutError::MissingDetails("payment method"))?;

        let items = cart
            .iter()
            .map(|line| OrderItem {
                product_id: line.product_id().to_string(),
                quantity: line.quantity(),
                unit_price_minor: line.unit_price().to_minor_units(),
            })
            .collect();

        let sample = flow.sample().map(|sku| SampleSelection {
            sample_id: sku.id.clone(),
            price_minor: totals.sample_price.to_minor_units(),
        });

        let best = summary.best_offer();
        let discount = DiscountBreakdown {
            promotion_id: best.map(|offer| offer.promotion_id.clone()),
            description: best.map(|offer| offer.description.clone()),
            amount_minor: summary.best_monetary_discount.to_minor_units(),
            free_items: summary
                .all_free_items
                .iter()
                .map(|item| item.label.clone())
                .collect(),
        };

        Ok(Self {
            items,
            shipping_address,
            billing_address,
            payment_method,
            sample,
            discount,
            totals: TotalsPayload::from(totals),
        })
    }

    /// The request as a JSON document.
    ///
    /// # Errors
    ///
    /// Returns a [`serde_json::Error`] if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// The order backend.
pub trait OrderGateway {
    /// Ask the backend to validate the order and compute its own totals.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] if the backend rejects the order or cannot be reached.
    fn review(&self, request: &OrderRequest) -> Result<TotalsPayload, GatewayError>;

    /// Create the order.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] if the backend rejects the order or cannot be reached.
    fn submit(&mut self, request: &OrderRequest) -> Result<OrderId, GatewayError>;
}

/// Where reviewed totals came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TotalsSource {
    /// Computed by the backend
    Backend,

    /// Computed locally because the backend review failed
    Local,
}

/// Totals to show at review.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReviewedTotals {
    /// The totals
    pub totals: TotalsPayload,

    /// Where they came from
    pub source: TotalsSource,
}

/// Review the order with the backend, falling back to the locally computed totals
/// when the backend review fails. Checkout is never blocked by a failed review.
pub fn review_totals<G: OrderGateway + ?Sized>(
    gateway: &G,
    request: &OrderRequest,
) -> ReviewedTotals {
    match gateway.review(request) {
        Ok(totals) => ReviewedTotals {
            totals,
            source: TotalsSource::Backend,
        },
        Err(err) => {
            warn!(error = %err, "order review failed; using locally computed totals");

            ReviewedTotals {
                totals: request.totals,
                source: TotalsSource::Local,
            }
        }
    }
}

/// An in-process order backend that accepts every order and echoes its totals.
#[derive(Debug, Default)]
pub struct InMemoryOrderGateway {
    orders: Vec<(OrderId, OrderRequest)>,
    unavailable: bool,
}

impl InMemoryOrderGateway {
    /// Create an empty gateway.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A gateway whose every call fails as unavailable.
    #[must_use]
    pub fn unavailable() -> Self {
        Self {
            orders: Vec::new(),
            unavailable: true,
        }
    }

    /// Orders submitted so far.
    pub fn orders(&self) -> &[(OrderId, OrderRequest)] {
        &self.orders
    }

    fn check_available(&self) -> Result<(), GatewayError> {
        if self.unavailable {
            Err(GatewayError::Unavailable("in-memory gateway is offline".to_string()))
        } else {
            Ok(())
        }
    }
}

impl OrderGateway for InMemoryOrderGateway {
    fn review(&self, request: &OrderRequest) -> Result<TotalsPayload, GatewayError> {
        self.check_available()?;

        if request.items.is_empty() {
            return Err(GatewayError::Rejected("Cart items are required".to_string()));
        }

        Ok(request.totals)
    }

    fn submit(&mut self, request: &OrderRequest) -> Result<OrderId, GatewayError> {
        self.review(request)?;

        let id = OrderId::new(format!("ORD-{:05}", self.orders.len().saturating_add(1)));
        self.orders.push((id.clone(), request.clone()));

        info!(order = %id, total_minor = request.totals.total_minor, "order submitted");

        Ok(id)
    }
}
