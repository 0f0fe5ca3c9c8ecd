//! Sillage prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    cart::{
        Cart, CartError, CartLine,
        store::{CartOwner, CartStore, MemoryCartStore, StoreError},
    },
    checkout::{
        address::{Address, AddressError, AddressField},
        flow::{CheckoutError, CheckoutFlow, CheckoutStep},
        order::{
            GatewayError, InMemoryOrderGateway, OrderGateway, OrderId, OrderRequest,
            ReviewedTotals, TotalsSource, review_totals,
        },
        payment::{OnlineChannel, PaymentMethod},
        sample::{SampleCatalog, SamplePolicy, SampleSku, StaticSampleCatalog},
        totals::{CheckoutSettings, OrderTotals, TotalsError},
    },
    discounts::DiscountError,
    eligibility::{EligibilityAdvisor, Suggestion},
    fixtures::{Fixture, FixtureError},
    offers::{
        OfferSummary,
        notification::{NotificationState, SavingsNotification, SavingsNotifier, aggregate},
    },
    pricing::{TotalPriceError, display_whole},
    products::Product,
    promotions::{
        EvaluationError, PricingContext, Promotion, PromotionError, PromotionMeta, RuleBook,
        applications::{FreeItem, GrantedUnit, OfferResult},
        buy_x_get_y::BuyXGetYPromotion,
        quantity_tier::{QuantityTier, QuantityTierPromotion},
        spend_tier::{SpendTier, SpendTierPromotion},
        threshold_free_gift::ThresholdFreeGiftPromotion,
    },
    receipt::{Receipt, ReceiptError},
};
