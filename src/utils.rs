//! Utils
//!
//! Command-line arguments shared by the demos.

use std::path::PathBuf;

use clap::{Args, Parser};

use crate::{checkout::payment::PaymentMethod, logging::LogFormat};

/// Logging settings.
#[derive(Debug, Clone, Args)]
pub struct LoggingArgs {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,

    /// Log format (compact, json)
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
}

/// Arguments for the checkout demo
#[derive(Debug, Parser)]
#[command(name = "checkout", about = "Price a fixture cart and walk it through checkout")]
pub struct CheckoutArgs {
    /// Fixture set to load products, promotions, carts and checkout settings from
    #[arg(short, long, default_value = "storefront")]
    pub fixture: String,

    /// Directory holding the fixture sets
    #[arg(long, env = "SILLAGE_FIXTURES", default_value = "./fixtures")]
    pub fixtures_dir: PathBuf,

    /// Named cart within the fixture set
    #[arg(short, long, default_value = "buy_2_get_1")]
    pub cart: String,

    /// Payment method (cod, upi, card, netbanking, wallet)
    #[arg(short, long, default_value = "cod")]
    pub payment: PaymentMethod,

    /// Shipping state, used to pick the tax rate
    #[arg(short, long)]
    pub region: Option<String>,

    /// Customer's spend before this order, in whole currency units
    #[arg(long, default_value_t = 0)]
    pub lifetime_spend: u32,

    /// Sample SKU to add to the order
    #[arg(short, long)]
    pub sample: Option<String>,

    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingArgs,
}
