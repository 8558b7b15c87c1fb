use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use super::{Customer, Quotation, Totals};
use crate::money::round_money;

/// A quotation line as handed to exporters. Amounts are rounded to two
/// decimal places.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SnapshotLine {
    pub index: usize,
    pub product_code: String,
    pub product_name: String,
    pub pack: String,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub discount_pct: Decimal,
    pub line_subtotal: Decimal,
    pub discount_amount: Decimal,
    pub line_net: Decimal,
}

/// Everything an exporter needs to render a quotation.
///
/// This is the one place amounts get rounded: each line amount and each total
/// is rounded independently from its full-precision value, so totals are not
/// sums of rounded line amounts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuoteSnapshot {
    pub currency: String,
    pub date: String,
    pub customer: Customer,
    pub vat_percent: Decimal,
    pub lines: Vec<SnapshotLine>,
    pub totals: Totals,
}

impl QuoteSnapshot {
    pub fn new(quote: &Quotation, currency: &str, date: NaiveDate) -> Self {
        let lines = quote
            .lines()
            .iter()
            .enumerate()
            .map(|(idx, line)| SnapshotLine {
                index: idx + 1,
                product_code: line.product_code().to_string(),
                product_name: line.product_name().to_string(),
                pack: line.pack_label().to_string(),
                quantity: line.quantity(),
                unit_price: round_money(line.unit_price()),
                discount_pct: line.discount_percent().normalize(),
                line_subtotal: round_money(line.line_subtotal()),
                discount_amount: round_money(line.discount_amount()),
                line_net: round_money(line.line_net()),
            })
            .collect();

        let totals = quote.compute_totals();
        Self {
            currency: currency.to_string(),
            date: date.format("%Y-%m-%d").to_string(),
            customer: quote.customer.clone(),
            vat_percent: quote.vat_rate().percent(),
            lines,
            totals: Totals {
                subtotal: round_money(totals.subtotal),
                total_discount: round_money(totals.total_discount),
                net_before_vat: round_money(totals.net_before_vat),
                vat_amount: round_money(totals.vat_amount),
                grand_total: round_money(totals.grand_total),
            },
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}
