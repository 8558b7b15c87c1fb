use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::line::QuoteLine;
use super::VatRate;
use crate::catalogue::Product;
use crate::error::{QuoteError, Result};

/// Customer details printed on the quotation. Not used in any calculation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteState {
    Empty,
    NonEmpty,
}

/// Quotation totals, at full precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Totals {
    pub subtotal: Decimal,
    pub total_discount: Decimal,
    pub net_before_vat: Decimal,
    pub vat_amount: Decimal,
    pub grand_total: Decimal,
}

impl Totals {
    pub const ZERO: Totals = Totals {
        subtotal: Decimal::ZERO,
        total_discount: Decimal::ZERO,
        net_before_vat: Decimal::ZERO,
        vat_amount: Decimal::ZERO,
        grand_total: Decimal::ZERO,
    };
}

/// An ordered list of quote lines for one customer session.
#[derive(Debug, Clone, Default)]
pub struct Quotation {
    pub customer: Customer,
    lines: Vec<QuoteLine>,
    vat_rate: VatRate,
}

impl Quotation {
    pub fn new(vat_rate: VatRate) -> Self {
        Self {
            customer: Customer::default(),
            lines: Vec::new(),
            vat_rate,
        }
    }

    /// Price and append a line. Returns the index of the new line.
    pub fn add_line(
        &mut self,
        product: &Product,
        pack_label: &str,
        quantity: i64,
        discount_percent: Decimal,
    ) -> Result<usize> {
        let line = QuoteLine::new(product, pack_label, quantity, discount_percent)?;
        Ok(self.push(line))
    }

    pub fn push(&mut self, line: QuoteLine) -> usize {
        debug!(
            product = line.product_code(),
            pack = line.pack_label(),
            quantity = line.quantity(),
            "line added"
        );
        self.lines.push(line);
        self.lines.len() - 1
    }

    pub fn remove_line(&mut self, index: usize) -> Result<QuoteLine> {
        self.check_index(index)?;
        let removed = self.lines.remove(index);
        debug!(index, product = removed.product_code(), "line removed");
        Ok(removed)
    }

    /// Change a line's quantity. Validation errors name the 1-based line.
    pub fn update_quantity(&mut self, index: usize, quantity: i64) -> Result<()> {
        self.check_index(index)?;
        self.lines[index]
            .set_quantity(quantity)
            .map_err(|e| e.with_line(index + 1))
    }

    /// Change a line's discount. Validation errors name the 1-based line.
    pub fn update_discount(&mut self, index: usize, discount_percent: Decimal) -> Result<()> {
        self.check_index(index)?;
        self.lines[index]
            .set_discount(discount_percent)
            .map_err(|e| e.with_line(index + 1))
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index >= self.lines.len() {
            return Err(QuoteError::IndexOutOfRange {
                index,
                len: self.lines.len(),
            });
        }
        Ok(())
    }

    pub fn lines(&self) -> &[QuoteLine] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn state(&self) -> QuoteState {
        if self.lines.is_empty() {
            QuoteState::Empty
        } else {
            QuoteState::NonEmpty
        }
    }

    pub fn vat_rate(&self) -> VatRate {
        self.vat_rate
    }

    /// Totals derived from the current lines. Nothing is cached.
    pub fn compute_totals(&self) -> Totals {
        let (subtotal, total_discount) = self
            .lines
            .iter()
            .fold((Decimal::ZERO, Decimal::ZERO), |(sub, disc), line| {
                (sub + line.line_subtotal(), disc + line.discount_amount())
            });
        let net_before_vat = subtotal - total_discount;
        let vat_amount = net_before_vat * self.vat_rate.rate();
        Totals {
            subtotal,
            total_discount,
            net_before_vat,
            vat_amount,
            grand_total: net_before_vat + vat_amount,
        }
    }
}
