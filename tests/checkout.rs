//! Checkout from a stored cart through to a submitted order.

use rusty_money::{
    Money,
    iso::{Currency, INR},
};
use testresult::TestResult;

use sillage::{
    cart::store::{CartOwner, CartStore, MemoryCartStore, cart_from_stored},
    checkout::{
        address::Address,
        flow::{CheckoutFlow, CheckoutStep},
        order::{InMemoryOrderGateway, OrderGateway, OrderRequest, TotalsSource, review_totals},
        payment::{OnlineChannel, PaymentMethod},
        sample::SampleCatalog,
    },
    fixtures::Fixture,
    offers::notification::{NotificationState, aggregate},
};

fn rupees(amount: i64) -> Money<'static, Currency> {
    Money::from_minor(amount * 100, INR)
}

fn address(state: &str) -> Address {
    Address {
        full_name: "Meera Iyer".to_string(),
        address: "4 Residency Road".to_string(),
        city: "Chennai".to_string(),
        state: state.to_string(),
        pincode: "600006".to_string(),
        phone: Some("9876543210".to_string()),
    }
}

#[test]
fn stored_cart_checks_out() -> TestResult {
    let fixture = Fixture::from_set("storefront")?;
    let rules = fixture.rules()?;
    let owner = CartOwner::from_user_id(Some("u-42"));

    let mut store = MemoryCartStore::new();
    store.save(&owner, &fixture.cart("buy_2_get_1")?.to_stored())?;

    let cart = cart_from_stored(&store.load(&owner)?, INR)?;

    assert_eq!(cart.subtotal()?, rupees(2300));
    assert_eq!(cart.line("oud").map(|line| line.name()), Some("Royal Oud"));

    let aggregation = aggregate(&rules, &cart, rupees(0), NotificationState::default())?;
    let summary = aggregation.summary;

    assert_eq!(summary.best_monetary_discount, rupees(500));
    assert!(aggregation.notification.is_some());

    let sample = fixture
        .sample_catalog()
        .samples_for(cart.total_quantity())
        .into_iter()
        .find(|sku| sku.id == "amber");

    let mut flow = CheckoutFlow::new();
    flow.choose_sample(sample)?;
    flow.submit_addresses(address("Tamil Nadu"), None)?;
    flow.select_payment(PaymentMethod::Online(OnlineChannel::Card))?;

    assert_eq!(flow.step(), CheckoutStep::OrderReview);
    assert_eq!(flow.billing_address(), flow.shipping_address());

    let sample_price = fixture.sample_policy().price_for(&cart, flow.sample());
    let totals = fixture.checkout_settings()?.compute_totals_for_region(
        &cart,
        &summary,
        sample_price,
        PaymentMethod::Online(OnlineChannel::Card),
        "Tamil Nadu",
    )?;

    // 1,800 + 12% tax, less the ₹20 online rebate.
    assert_eq!(totals.sample_price, rupees(0));
    assert_eq!(totals.grand_total, rupees(1996));

    let request = OrderRequest::from_checkout(&cart, &flow, &summary, &totals)?;

    assert_eq!(
        request.sample.as_ref().map(|sample| sample.sample_id.as_str()),
        Some("amber")
    );

    let mut gateway = InMemoryOrderGateway::new();
    let reviewed = review_totals(&gateway, &request);

    assert_eq!(reviewed.source, TotalsSource::Backend);
    assert_eq!(reviewed.totals.total_minor, 199_600);

    flow.begin_payment()?;
    let order_id = gateway.submit(&request)?;
    flow.complete(order_id.clone())?;

    store.clear(&owner);

    assert_eq!(flow.step(), CheckoutStep::Completed);
    assert_eq!(flow.order_id(), Some(&order_id));
    assert_eq!(gateway.orders().len(), 1);
    assert!(store.load(&owner)?.is_empty());

    Ok(())
}

#[test]
fn delhi_orders_pay_the_regional_rate() -> TestResult {
    let fixture = Fixture::from_set("storefront")?;
    let cart = fixture.cart("buy_2_get_1")?;
    let summary = aggregate(&fixture.rules()?, &cart, rupees(0), NotificationState::default())?
        .summary;

    let totals = fixture.checkout_settings()?.compute_totals_for_region(
        &cart,
        &summary,
        rupees(0),
        PaymentMethod::CashOnDelivery,
        "delhi",
    )?;

    assert_eq!(totals.tax, rupees(324));
    assert_eq!(totals.grand_total, rupees(2124));

    Ok(())
}

#[test]
fn offline_backend_falls_back_to_local_totals() -> TestResult {
    let fixture = Fixture::from_set("storefront")?;
    let cart = fixture.cart("single")?;
    let summary = aggregate(&fixture.rules()?, &cart, rupees(0), NotificationState::default())?
        .summary;

    let mut flow = CheckoutFlow::new();
    flow.submit_addresses(address("Karnataka"), None)?;
    flow.select_payment(PaymentMethod::CashOnDelivery)?;

    let totals = fixture.checkout_settings()?.compute_totals(
        &cart,
        &summary,
        rupees(0),
        PaymentMethod::CashOnDelivery,
    )?;

    // ₹400 is under the free shipping threshold: 400 + 50 + 48.
    assert_eq!(totals.grand_total, rupees(498));

    let request = OrderRequest::from_checkout(&cart, &flow, &summary, &totals)?;
    let mut gateway = InMemoryOrderGateway::unavailable();

    let reviewed = review_totals(&gateway, &request);

    assert_eq!(reviewed.source, TotalsSource::Local);
    assert_eq!(reviewed.totals, request.totals);

    flow.begin_payment()?;
    assert!(gateway.submit(&request).is_err());

    flow.cancel_payment()?;
    assert_eq!(flow.step(), CheckoutStep::OrderReview);

    Ok(())
}

#[test]
fn guest_and_user_carts_are_kept_apart() -> TestResult {
    let fixture = Fixture::from_set("storefront")?;
    let mut store = MemoryCartStore::new();

    let guest = CartOwner::from_user_id(None);
    let user = CartOwner::from_user_id(Some("u-7"));

    store.save(&guest, &fixture.cart("single")?.to_stored())?;
    store.save(&user, &fixture.cart("bulk_12")?.to_stored())?;

    assert_eq!(cart_from_stored(&store.load(&guest)?, INR)?.total_quantity(), 1);
    assert_eq!(cart_from_stored(&store.load(&user)?, INR)?.total_quantity(), 12);

    store.put_raw(user.storage_key(), "{ not json");

    assert!(store.load(&user)?.is_empty());
    assert_eq!(store.load(&guest)?.len(), 1);

    Ok(())
}
