//! Checkout Example
//!
//! Prices a fixture cart against the fixture promotions, prints the receipt, and
//! walks the order through checkout to submission.
//!
//! Use `-f` to load a fixture set by name
//! Use `-c` to pick a cart from the set
//! Use `-p` to choose the payment method
//! Use `-r` to ship to a state with its own tax rate
//! Use `-s` to add a sample to the order

use std::{io, time::Instant};

use anyhow::{Context, Result};
use clap::Parser;
use rusty_money::Money;
use sillage::{
    checkout::{
        address::Address,
        flow::CheckoutFlow,
        order::{InMemoryOrderGateway, OrderGateway, OrderRequest, TotalsSource, review_totals},
        sample::SampleCatalog,
    },
    fixtures::Fixture,
    logging::init_logging,
    offers::notification::{NotificationState, aggregate},
    pricing::display_whole,
    receipt::Receipt,
    utils::CheckoutArgs,
};
use tracing::info;

/// Checkout Example
#[expect(clippy::print_stdout, reason = "Example code")]
pub fn main() -> Result<()> {
    let args = CheckoutArgs::parse();

    init_logging(&args.logging)?;

    let fixture = Fixture::from_set_in(&args.fixtures_dir, &args.fixture)
        .with_context(|| format!("loading fixture set {}", args.fixture))?;

    let rules = fixture.rules()?;
    let cart = fixture.cart(&args.cart)?;
    let currency = fixture.currency()?;
    let lifetime_spend = Money::from_minor(
        i64::from(args.lifetime_spend).saturating_mul(100),
        currency,
    );

    let start = Instant::now();

    let aggregation = aggregate(&rules, &cart, lifetime_spend, NotificationState::default())?;
    let summary = aggregation.summary;

    let elapsed = start.elapsed().as_secs_f32();

    if let Some(notification) = &aggregation.notification {
        println!("\n{}", notification.message);
    }

    for suggestion in &summary.eligibility_suggestions {
        println!(
            "  > {} [{}] {}",
            suggestion.message, suggestion.action_label, suggestion.savings_hint
        );
    }

    let catalog = fixture.sample_catalog();
    let sample = args.sample.as_deref().and_then(|id| {
        catalog
            .samples_for(cart.total_quantity())
            .into_iter()
            .find(|sku| sku.id == id)
    });

    let shipping = Address {
        full_name: "Asha Rao".to_string(),
        address: "12 MG Road".to_string(),
        city: "Bengaluru".to_string(),
        state: args.region.clone().unwrap_or_else(|| "Karnataka".to_string()),
        pincode: "560001".to_string(),
        phone: None,
    };

    let mut flow = CheckoutFlow::new();
    flow.choose_sample(sample)?;
    flow.submit_addresses(shipping.clone(), None)?;
    flow.select_payment(args.payment)?;

    let sample_price = fixture.sample_policy().price_for(&cart, flow.sample());
    let totals = fixture.checkout_settings()?.compute_totals_for_region(
        &cart,
        &summary,
        sample_price,
        args.payment,
        &shipping.state,
    )?;

    let stdout = io::stdout();
    let mut handle = stdout.lock();

    Receipt::new(&cart, &summary, totals)?.write_to(&mut handle)?;

    let request = OrderRequest::from_checkout(&cart, &flow, &summary, &totals)?;
    let mut gateway = InMemoryOrderGateway::new();

    let reviewed = review_totals(&gateway, &request);
    if reviewed.source == TotalsSource::Local {
        println!("Order review unavailable; showing locally computed totals.");
    }

    flow.begin_payment()?;
    let order_id = gateway.submit(&request)?;
    flow.complete(order_id.clone())?;

    info!(order = %order_id, step = %flow.step(), "checkout finished");

    println!(
        "Order {order_id} placed: {} via {}",
        display_whole(&reviewed.totals.total(currency)),
        args.payment
    );
    println!("\nPriced in: {elapsed}s");

    Ok(())
}
