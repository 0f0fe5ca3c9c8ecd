//! Checkout Flow
//!
//! The checkout steps as a state machine:
//!
//! ```text
//! AddressEntry -> PaymentMethodSelection -> OrderReview -> PaymentProcessing -> Completed
//!      ^                  |      ^               |                 |
//!      +------ back ------+      +---- back -----+                 |
//!                                ^                                 |
//!                                +------ cancel payment -----------+
//! ```
//!
//! Any step before completion can also be abandoned, which returns the customer to
//! the cart. Entered addresses and the chosen sample survive going back and
//! cancelling a payment.

use std::fmt;

use thiserror::Error;
use tracing::debug;

use crate::checkout::{
    address::{Address, AddressError},
    order::OrderId,
    payment::PaymentMethod,
    sample::SampleSku,
};

/// A checkout step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CheckoutStep {
    /// Entering shipping and billing addresses
    AddressEntry,

    /// Choosing how to pay
    PaymentMethodSelection,

    /// Reviewing the order and its totals
    OrderReview,

    /// Waiting on the payment
    PaymentProcessing,

    /// Order submitted
    Completed,

    /// Abandoned, back to the cart
    Cancelled,
}

impl CheckoutStep {
    /// Whether no further transitions are possible.
    pub fn is_terminal(self) -> bool {
        matches!(self, CheckoutStep::Completed | CheckoutStep::Cancelled)
    }
}

impl fmt::Display for CheckoutStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CheckoutStep::AddressEntry => "address entry",
            CheckoutStep::PaymentMethodSelection => "payment method selection",
            CheckoutStep::OrderReview => "order review",
            CheckoutStep::PaymentProcessing => "payment processing",
            CheckoutStep::Completed => "completed",
            CheckoutStep::Cancelled => "cancelled",
        })
    }
}

/// Errors raised by the checkout flow.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CheckoutError {
    /// The action is not allowed at the current step.
    #[error("cannot {action} during {from}")]
    InvalidTransition {
        /// Current step
        from: CheckoutStep,
        /// What was attempted
        action: &'static str,
    },

    /// The shipping address is invalid.
    #[error("shipping address: {0}")]
    ShippingAddress(AddressError),

    /// The billing address is invalid.
    #[error("billing address: {0}")]
    BillingAddress(AddressError),

    /// The order cannot be placed until this detail is entered.
    #[error("missing {0}")]
    MissingDetails(&'static str),
}

/// A checkout in progress.
#[derive(Debug, Clone)]
pub struct CheckoutFlow<'a> {
    step: CheckoutStep,
    shipping_address: Option<Address>,
    billing_address: Option<Address>,
    payment_method: Option<PaymentMethod>,
    sample: Option<SampleSku<'a>>,
    order_id: Option<OrderId>,
}

impl Default for CheckoutFlow<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> CheckoutFlow<'a> {
    /// Start a checkout at address entry.
    pub fn new() -> Self {
        Self {
            step: CheckoutStep::AddressEntry,
            shipping_address: None,
            billing_address: None,
            payment_method: None,
            sample: None,
            order_id: None,
        }
    }

    /// Current step.
    pub fn step(&self) -> CheckoutStep {
        self.step
    }

    /// Shipping address, once entered.
    pub fn shipping_address(&self) -> Option<&Address> {
        self.shipping_address.as_ref()
    }

    /// Billing address, once entered.
    pub fn billing_address(&self) -> Option<&Address> {
        self.billing_address.as_ref()
    }

    /// Selected payment method.
    pub fn payment_method(&self) -> Option<PaymentMethod> {
        self.payment_method
    }

    /// Chosen sample.
    pub fn sample(&self) -> Option<&SampleSku<'a>> {
        self.sample.as_ref()
    }

    /// Id of the submitted order.
    pub fn order_id(&self) -> Option<&OrderId> {
        self.order_id.as_ref()
    }

    fn expect_step(&self, step: CheckoutStep, action: &'static str) -> Result<(), CheckoutError> {
        if self.step == step {
            Ok(())
        } else {
            Err(CheckoutError::InvalidTransition {
                from: self.step,
                action,
            })
        }
    }

    fn move_to(&mut self, step: CheckoutStep) {
        debug!(from = %self.step, to = %step, "checkout step");
        self.step = step;
    }

    /// Enter the addresses. Billing defaults to the shipping address.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::InvalidTransition`] outside address entry, or an
    /// address error if either address is invalid.
    pub fn submit_addresses(
        &mut self,
        shipping: Address,
        billing: Option<Address>,
    ) -> Result<(), CheckoutError> {
        self.expect_step(CheckoutStep::AddressEntry, "submit addresses")?;

        shipping
            .validate()
            .map_err(CheckoutError::ShippingAddress)?;

        if let Some(billing) = &billing {
            billing.validate().map_err(CheckoutError::BillingAddress)?;
        }

        self.billing_address = Some(billing.unwrap_or_else(|| shipping.clone()));
        self.shipping_address = Some(shipping);
        self.move_to(CheckoutStep::PaymentMethodSelection);

        Ok(())
    }

    /// Choose or clear the sample.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::InvalidTransition`] once payment has started.
    pub fn choose_sample(&mut self, sample: Option<SampleSku<'a>>) -> Result<(), CheckoutError> {
        match self.step {
            CheckoutStep::AddressEntry
            | CheckoutStep::PaymentMethodSelection
            | CheckoutStep::OrderReview => {
                self.sample = sample;
                Ok(())
            }
            from => Err(CheckoutError::InvalidTransition {
                from,
                action: "choose a sample",
            }),
        }
    }

    /// Select how to pay and move on to review.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::InvalidTransition`] outside payment method selection.
    pub fn select_payment(&mut self, method: PaymentMethod) -> Result<(), CheckoutError> {
        self.expect_step(CheckoutStep::PaymentMethodSelection, "select payment")?;

        self.payment_method = Some(method);
        self.move_to(CheckoutStep::OrderReview);

        Ok(())
    }

    /// Go back one step from review or payment method selection.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::InvalidTransition`] from any other step.
    pub fn back(&mut self) -> Result<(), CheckoutError> {
        let previous = match self.step {
            CheckoutStep::OrderReview => CheckoutStep::PaymentMethodSelection,
            CheckoutStep::PaymentMethodSelection => CheckoutStep::AddressEntry,
            from => {
                return Err(CheckoutError::InvalidTransition {
                    from,
                    action: "go back",
                });
            }
        };

        self.move_to(previous);

        Ok(())
    }

    /// Start paying for the reviewed order.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::InvalidTransition`] outside order review.
    pub fn begin_payment(&mut self) -> Result<(), CheckoutError> {
        self.expect_step(CheckoutStep::OrderReview, "begin payment")?;
        self.move_to(CheckoutStep::PaymentProcessing);

        Ok(())
    }

    /// Abandon the payment and return to review, keeping everything entered.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::InvalidTransition`] outside payment processing.
    pub fn cancel_payment(&mut self) -> Result<(), CheckoutError> {
        self.expect_step(CheckoutStep::PaymentProcessing, "cancel payment")?;
        self.move_to(CheckoutStep::OrderReview);

        Ok(())
    }

    /// Record the submitted order.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::InvalidTransition`] outside payment processing.
    pub fn complete(&mut self, order_id: OrderId) -> Result<(), CheckoutError> {
        self.expect_step(CheckoutStep::PaymentProcessing, "complete the order")?;

        self.order_id = Some(order_id);
        self.move_to(CheckoutStep::Completed);

        Ok(())
    }

    /// Abandon the checkout and return to the cart.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::InvalidTransition`] once the checkout has finished.
    pub fn cancel(&mut self) -> Result<(), CheckoutError> {
        if self.step.is_terminal() {
            return Err(CheckoutError::InvalidTransition {
                from: self.step,
                action: "cancel",
            });
        }

        self.move_to(CheckoutStep::Cancelled);

        Ok(())
    }
}
