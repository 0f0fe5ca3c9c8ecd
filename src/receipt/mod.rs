//! Receipt

use std::{fmt::Write, io, ops::Range};

use decimal_percentage::Percentage;
use rust_decimal::{Decimal, prelude::FromPrimitive};
use rusty_money::{Money, MoneyError, iso::Currency};
use smallvec::SmallVec;
use tabled::{
    builder::Builder,
    grid::config::HorizontalLine,
    settings::{
        Alignment, Color, Style, Theme,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{
    cart::Cart,
    checkout::totals::OrderTotals,
    discounts::percent_points,
    offers::OfferSummary,
    pricing::{TotalPriceError, line_total},
    promotions::applications::FreeItem,
};

/// Errors that can occur when building a receipt.
#[derive(Debug, Error)]
pub enum ReceiptError {
    /// Error calculating a line total.
    #[error(transparent)]
    TotalPrice(#[from] TotalPriceError),

    /// Wrapper for money errors.
    #[error(transparent)]
    Money(#[from] MoneyError),

    /// IO error
    #[error("IO error")]
    IO,
}

/// A cart line as printed on the receipt.
#[derive(Debug, Clone, PartialEq)]
pub struct ReceiptLine<'a> {
    /// Product name
    pub name: String,

    /// Units bought
    pub quantity: u32,

    /// Price of one unit
    pub unit_price: Money<'a, Currency>,

    /// Unit price times quantity
    pub line_total: Money<'a, Currency>,

    /// Units given free by the applied offer
    pub free_units: u32,
}

/// An applicable offer as printed on the receipt.
#[derive(Debug, Clone, PartialEq)]
pub struct ReceiptOffer<'a> {
    /// Promotion name
    pub name: String,

    /// What the offer grants
    pub description: String,

    /// Monetary discount the offer would give
    pub discount: Money<'a, Currency>,

    /// Whether this offer's discount was applied
    pub applied: bool,
}

/// Final receipt for a checked-out cart.
#[derive(Debug, Clone)]
pub struct Receipt<'a> {
    lines: Vec<ReceiptLine<'a>>,
    offers: Vec<ReceiptOffer<'a>>,
    free_items: Vec<FreeItem<'a>>,
    totals: OrderTotals<'a>,
}

impl<'a> Receipt<'a> {
    /// Build a receipt from a cart, its offer summary and the computed totals.
    ///
    /// # Errors
    ///
    /// Returns a [`ReceiptError`] if a line total overflows.
    pub fn new(
        cart: &Cart<'a>,
        summary: &OfferSummary<'a>,
        totals: OrderTotals<'a>,
    ) -> Result<Self, ReceiptError> {
        let best = summary.best_offer();

        let lines = cart
            .iter()
            .map(|line| {
                let free_units = best.map_or(0, |offer| {
                    let count = offer
                        .granted_units
                        .iter()
                        .filter(|unit| unit.product_id == line.product_id())
                        .count();

                    u32::try_from(count).unwrap_or(u32::MAX)
                });

                Ok(ReceiptLine {
                    name: line.name().to_string(),
                    quantity: line.quantity(),
                    unit_price: *line.unit_price(),
                    line_total: line_total(line.unit_price(), line.quantity())?,
                    free_units,
                })
            })
            .collect::<Result<Vec<_>, ReceiptError>>()?;

        let offers = summary
            .applicable_offers
            .iter()
            .map(|offer| ReceiptOffer {
                name: offer.promotion_name.clone(),
                description: offer.description.clone(),
                discount: offer.monetary_discount,
                applied: best.is_some_and(|best| best.promotion_id == offer.promotion_id),
            })
            .collect();

        Ok(Self {
            lines,
            offers,
            free_items: summary.all_free_items.clone(),
            totals,
        })
    }

    /// Printed cart lines.
    pub fn lines(&self) -> &[ReceiptLine<'a>] {
        &self.lines
    }

    /// Printed offers, in rule order.
    pub fn offers(&self) -> &[ReceiptOffer<'a>] {
        &self.offers
    }

    /// Gifts added to the order.
    pub fn free_items(&self) -> &[FreeItem<'a>] {
        &self.free_items
    }

    /// The order totals.
    pub fn totals(&self) -> &OrderTotals<'a> {
        &self.totals
    }

    /// Amount saved through the discount and the online rebate.
    ///
    /// # Errors
    ///
    /// Returns a [`MoneyError`] if the currencies differ.
    pub fn savings(&self) -> Result<Money<'a, Currency>, MoneyError> {
        self.totals.savings()
    }

    /// Savings as a fraction of the subtotal.
    ///
    /// # Errors
    ///
    /// Returns a [`MoneyError`] if the currencies differ.
    pub fn savings_percent(&self) -> Result<Percentage, MoneyError> {
        let savings_minor = self.savings()?.to_minor_units();
        let subtotal_minor = self.totals.subtotal.to_minor_units();

        if subtotal_minor == 0 {
            return Ok(Percentage::from(0.0));
        }

        let savings_dec = Decimal::from_i64(savings_minor).unwrap_or(Decimal::ZERO);
        let subtotal_dec = Decimal::from_i64(subtotal_minor).unwrap_or(Decimal::ZERO);

        Ok(Percentage::from(savings_dec / subtotal_dec))
    }

    /// Prints the receipt.
    ///
    /// # Errors
    ///
    /// Returns an error if the receipt cannot be written.
    pub fn write_to(&self, mut out: impl io::Write) -> Result<(), ReceiptError> {
        write_table(&mut out, self.lines_table(), Columns::new(2..5))?;

        if !self.offers.is_empty() {
            write_table(&mut out, self.offers_table(), Columns::new(3..4))?;
        }

        if !self.free_items.is_empty() {
            writeln!(out, " Free gifts:").map_err(|_err| ReceiptError::IO)?;

            for item in &self.free_items {
                writeln!(out, "   + {} ({})", item.label, item.value)
                    .map_err(|_err| ReceiptError::IO)?;
            }

            writeln!(out).map_err(|_err| ReceiptError::IO)?;
        }

        self.write_summary(&mut out)
    }

    fn lines_table(&self) -> (Builder, SmallVec<[(usize, usize, Color); 16]>) {
        let mut builder = Builder::default();
        let mut color_ops = SmallVec::new();

        builder.push_record(["", "Item", "Qty", "Unit Price", "Line Total", "Offer"]);

        for (idx, line) in self.lines.iter().enumerate() {
            let row = idx + 1;

            let offer = if line.free_units > 0 {
                color_ops.push((row, 5, Color::FG_GREEN));
                format!("{} free", line.free_units)
            } else {
                String::new()
            };

            builder.push_record([
                format!("#{:<3}", idx + 1),
                line.name.clone(),
                line.quantity.to_string(),
                format!("{}", line.unit_price),
                format!("{}", line.line_total),
                offer,
            ]);

            color_ops.push((row, 3, color_dark_grey()));
        }

        (builder, color_ops)
    }

    fn offers_table(&self) -> (Builder, SmallVec<[(usize, usize, Color); 16]>) {
        let mut builder = Builder::default();
        let mut color_ops = SmallVec::new();

        builder.push_record(["", "Offer", "Details", "Discount"]);

        for (idx, offer) in self.offers.iter().enumerate() {
            let row = idx + 1;

            let (marker, discount) = if offer.applied {
                color_ops.push((row, 3, Color::FG_GREEN));
                ("*", format!("-{}", offer.discount))
            } else if offer.discount.to_minor_units() > 0 {
                color_ops.push((row, 3, color_dark_grey()));
                ("", format!("-{}", offer.discount))
            } else {
                ("", String::new())
            };

            builder.push_record([
                marker.to_string(),
                offer.name.clone(),
                offer.description.clone(),
                discount,
            ]);
        }

        (builder, color_ops)
    }

    fn write_summary(&self, out: &mut impl io::Write) -> Result<(), ReceiptError> {
        let totals = &self.totals;
        let savings = self.savings()?;
        let savings_points = percent_points(&self.savings_percent()?);

        let mut rows: SmallVec<[(String, String); 8]> = SmallVec::new();

        rows.push((" Subtotal:".to_string(), format!("{}  ", totals.subtotal)));

        if totals.discount.to_minor_units() > 0 {
            rows.push((" Discount:".to_string(), format!("-{}  ", totals.discount)));
        }

        rows.push((" Shipping:".to_string(), format!("{}  ", totals.shipping_fee)));
        rows.push((" Tax:".to_string(), format!("{}  ", totals.tax)));

        if totals.sample_price.to_minor_units() > 0 {
            rows.push((" Sample:".to_string(), format!("{}  ", totals.sample_price)));
        }

        if totals.online_payment_rebate.to_minor_units() > 0 {
            rows.push((
                " Online payment:".to_string(),
                format!("-{}  ", totals.online_payment_rebate),
            ));
        }

        rows.push((
            " \x1b[1mTotal:\x1b[0m".to_string(),
            format!("\x1b[1m{}  \x1b[0m", totals.grand_total),
        ));
        rows.push((
            " Savings:".to_string(),
            format!("({savings_points:.2}%) {savings}  "),
        ));

        let label_width = rows
            .iter()
            .map(|(label, _)| visible_width(label))
            .max()
            .unwrap_or(0);
        let value_width = rows
            .iter()
            .map(|(_, value)| visible_width(value))
            .max()
            .unwrap_or(0);

        for (label, value) in &rows {
            write_summary_line(out, label, value, label_width, value_width)?;
        }

        writeln!(out).map_err(|_err| ReceiptError::IO)
    }
}

fn write_table(
    out: &mut impl io::Write,
    (builder, color_ops): (Builder, SmallVec<[(usize, usize, Color); 16]>),
    money_columns: Columns<Range<usize>>,
) -> Result<(), ReceiptError> {
    let mut table = builder.build();
    let mut theme = Theme::from(Style::modern_rounded());
    let separator = HorizontalLine::new(Some('─'), Some('┼'), Some('├'), Some('┤'));

    theme.remove_horizontal_lines();
    theme.insert_horizontal_line(1, separator);

    table.with(theme);
    table.modify(Rows::first(), Color::BOLD);
    table.modify(money_columns, Alignment::right());

    for (row, col, color) in color_ops {
        table.modify((row, col), color);
    }

    let table_str = colorize_borders(&table.to_string());

    writeln!(out, "\n{table_str}").map_err(|_err| ReceiptError::IO)
}

/// Wraps runs of UTF-8 box-drawing characters in ANSI dark-grey escape codes.
///
/// Box-drawing characters occupy the Unicode range U+2500..U+257F.
fn colorize_borders(table: &str) -> String {
    let mut out = String::with_capacity(table.len() + 256);
    let mut in_run = false;

    for ch in table.chars() {
        let box_char = ('\u{2500}'..='\u{257F}').contains(&ch);

        if box_char && !in_run {
            _ = out.write_str("\x1b[90m");
            in_run = true;
        } else if !box_char && in_run {
            _ = out.write_str("\x1b[0m");
            in_run = false;
        }

        out.push(ch);
    }

    if in_run {
        _ = out.write_str("\x1b[0m");
    }

    out
}

/// Returns the visible (non-ANSI) width of a string.
fn visible_width(s: &str) -> usize {
    let mut width = 0usize;
    let mut in_escape = false;

    for ch in s.chars() {
        if in_escape {
            if ch.is_ascii_alphabetic() {
                in_escape = false;
            }
        } else if ch == '\x1b' {
            in_escape = true;
        } else {
            width += 1;
        }
    }

    width
}

/// Writes a summary line with a right-aligned label and a fixed-width value column.
fn write_summary_line(
    out: &mut impl io::Write,
    label: &str,
    value: &str,
    label_col_width: usize,
    value_col_width: usize,
) -> Result<(), ReceiptError> {
    let label_pad = label_col_width.saturating_sub(visible_width(label));
    let value_pad = value_col_width.saturating_sub(visible_width(value));

    writeln!(
        out,
        "{:>label_pad$}{label}  {value_pad}{value}",
        "",
        value_pad = " ".repeat(value_pad)
    )
    .map_err(|_err| ReceiptError::IO)
}

/// ANSI dark grey foreground.
fn color_dark_grey() -> Color {
    Color::new("\x1b[90m", "\x1b[0m")
}
