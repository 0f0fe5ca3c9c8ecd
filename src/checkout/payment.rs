//! Payment methods

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Payment method names that could not be parsed.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown payment method {0:?}; expected cod, upi, card, netbanking or wallet")]
pub struct ParsePaymentMethodError(pub String);

/// How an online payment is made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OnlineChannel {
    /// Unified Payments Interface
    Upi,

    /// Credit or debit card
    Card,

    /// Net banking
    NetBanking,

    /// Digital wallet
    Wallet,
}

impl fmt::Display for OnlineChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OnlineChannel::Upi => "UPI",
            OnlineChannel::Card => "Card",
            OnlineChannel::NetBanking => "Net Banking",
            OnlineChannel::Wallet => "Wallet",
        })
    }
}

/// How the customer pays.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type", content = "channel")]
pub enum PaymentMethod {
    /// Paid in cash on delivery
    #[default]
    CashOnDelivery,

    /// Paid online up front
    Online(OnlineChannel),
}

impl PaymentMethod {
    /// Whether the order is paid in cash on delivery.
    pub fn is_cash_on_delivery(&self) -> bool {
        matches!(self, PaymentMethod::CashOnDelivery)
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentMethod::CashOnDelivery => f.write_str("Cash on Delivery"),
            PaymentMethod::Online(channel) => write!(f, "Online ({channel})"),
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = ParsePaymentMethodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cod" | "cash-on-delivery" | "cash_on_delivery" => Ok(PaymentMethod::CashOnDelivery),
            "upi" => Ok(PaymentMethod::Online(OnlineChannel::Upi)),
            "card" => Ok(PaymentMethod::Online(OnlineChannel::Card)),
            "netbanking" | "net-banking" | "net_banking" => {
                Ok(PaymentMethod::Online(OnlineChannel::NetBanking))
            }
            "wallet" => Ok(PaymentMethod::Online(OnlineChannel::Wallet)),
            _ => Err(ParsePaymentMethodError(s.to_string())),
        }
    }
}
