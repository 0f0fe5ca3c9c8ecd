//! Checkout
//!
//! Everything between the priced cart and a submitted order: addresses, payment
//! method, the optional sample, order totals, the step-by-step checkout flow, and
//! the gateway the order is submitted through.

pub mod address;
pub mod flow;
pub mod order;
pub mod payment;
pub mod sample;
pub mod totals;
