//! Sillage
//!
//! Sillage is the pricing and checkout engine behind a perfume storefront: it evaluates
//! promotion rules against a cart, picks the single best monetary discount, grants free
//! gifts, suggests near-miss upsells, and turns the result into order totals that the
//! checkout flow submits as an order.

pub mod cart;
pub mod checkout;
pub mod discounts;
pub mod eligibility;
pub mod fixtures;
pub mod items;
pub mod logging;
pub mod offers;
pub mod prelude;
pub mod pricing;
pub mod products;
pub mod promotions;
pub mod receipt;
pub mod utils;
