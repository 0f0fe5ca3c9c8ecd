//! Savings notifications
//!
//! The storefront tells the customer once when their savings become significant.
//! Summaries are recomputed on every cart change, so the last notified amount is
//! carried between calls in a [`NotificationState`] owned by the caller; a new
//! notification is only raised when the amount changes.

use rusty_money::{Money, iso::Currency};
use tracing::info;

use crate::{
    cart::Cart,
    offers::OfferSummary,
    pricing::display_whole,
    promotions::{EvaluationError, RuleBook},
};

/// Savings, in minor units, that must be exceeded before the customer is notified.
pub const DEFAULT_NOTIFY_THRESHOLD_MINOR: i64 = 10_000;

/// What was last notified, carried between aggregations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NotificationState {
    last_notified_minor: i64,
}

impl NotificationState {
    /// Discount, in minor units, at the time of the previous notification. Zero if
    /// there has been none.
    pub fn last_notified_minor(&self) -> i64 {
        self.last_notified_minor
    }
}

/// A one-off message telling the customer how much they save.
#[derive(Debug, Clone, PartialEq)]
pub struct SavingsNotification<'a> {
    /// The discount being announced
    pub amount: Money<'a, Currency>,

    /// The promotion providing it
    pub promotion_id: Option<String>,

    /// Customer-facing text
    pub message: String,
}

/// The result of an aggregation: the summary, an optional notification, and the
/// state to pass to the next aggregation.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregation<'a> {
    /// The computed summary
    pub summary: OfferSummary<'a>,

    /// Raised when savings cross the threshold at a new amount
    pub notification: Option<SavingsNotification<'a>>,

    /// State to carry into the next aggregation
    pub state: NotificationState,
}

/// Decides when savings are worth announcing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SavingsNotifier {
    threshold_minor: i64,
}

impl Default for SavingsNotifier {
    fn default() -> Self {
        Self {
            threshold_minor: DEFAULT_NOTIFY_THRESHOLD_MINOR,
        }
    }
}

impl SavingsNotifier {
    /// Notify when savings exceed `threshold`.
    pub fn new(threshold: &Money<'_, Currency>) -> Self {
        Self {
            threshold_minor: threshold.to_minor_units(),
        }
    }

    /// Check a summary against the previous state.
    pub fn check<'a>(
        &self,
        summary: &OfferSummary<'a>,
        state: NotificationState,
    ) -> (Option<SavingsNotification<'a>>, NotificationState) {
        let best = summary.best_monetary_discount;
        let best_minor = best.to_minor_units();

        if best_minor <= self.threshold_minor || best_minor == state.last_notified_minor {
            return (None, state);
        }

        let promotion_id = summary.best_offer().map(|offer| offer.promotion_id.clone());

        info!(
            discount_minor = best_minor,
            previous_minor = state.last_notified_minor,
            promotion = promotion_id.as_deref().unwrap_or_default(),
            "savings notification"
        );

        let notification = SavingsNotification {
            amount: best,
            promotion_id,
            message: format!("You're saving {} on this order!", display_whole(&best)),
        };

        (
            Some(notification),
            NotificationState {
                last_notified_minor: best_minor,
            },
        )
    }

    /// Compute the offer summary for `cart` and decide whether to notify.
    ///
    /// # Errors
    ///
    /// Returns an [`EvaluationError`] if the summary cannot be computed.
    pub fn aggregate<'a>(
        &self,
        rules: &RuleBook<'a>,
        cart: &Cart<'a>,
        lifetime_spend: Money<'a, Currency>,
        state: NotificationState,
    ) -> Result<Aggregation<'a>, EvaluationError> {
        let summary = OfferSummary::compute(rules, cart, lifetime_spend)?;
        let (notification, state) = self.check(&summary, state);

        Ok(Aggregation {
            summary,
            notification,
            state,
        })
    }
}

/// Aggregate with the default notifier.
///
/// # Errors
///
/// Returns an [`EvaluationError`] if the summary cannot be computed.
pub fn aggregate<'a>(
    rules: &RuleBook<'a>,
    cart: &Cart<'a>,
    lifetime_spend: Money<'a, Currency>,
    state: NotificationState,
) -> Result<Aggregation<'a>, EvaluationError> {
    SavingsNotifier::default().aggregate(rules, cart, lifetime_spend, state)
}
