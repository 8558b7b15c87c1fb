mod line;
mod quotation;
mod snapshot;

pub use line::{QuoteLine, MAX_QUANTITY};
pub use quotation::{Customer, QuoteState, Quotation, Totals};
pub use snapshot::{QuoteSnapshot, SnapshotLine};

use rust_decimal::Decimal;
use std::fmt;
use std::str::FromStr;

use crate::error::{QuoteError, Result};

/// VAT applied to the net amount of a quotation.
///
/// Configurable in name only: 5% is the single recognised rate and anything
/// else is rejected when the config is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VatRate(Decimal);

impl VatRate {
    pub fn standard() -> Self {
        VatRate(Decimal::new(5, 2))
    }

    /// Rate as a fraction (`0.05`).
    pub fn rate(&self) -> Decimal {
        self.0
    }

    /// Rate as a percentage (`5`).
    pub fn percent(&self) -> Decimal {
        (self.0 * Decimal::ONE_HUNDRED).normalize()
    }

    pub fn from_config(value: f64) -> Result<Self> {
        let text = value.to_string();
        let rate = Decimal::from_str(&text).map_err(|_| QuoteError::UnsupportedVatRate(text.clone()))?;
        Self::try_from(rate)
    }
}

impl Default for VatRate {
    fn default() -> Self {
        Self::standard()
    }
}

impl TryFrom<Decimal> for VatRate {
    type Error = QuoteError;

    fn try_from(rate: Decimal) -> Result<Self> {
        if rate == Self::standard().0 {
            Ok(Self::standard())
        } else {
            Err(QuoteError::UnsupportedVatRate(rate.normalize().to_string()))
        }
    }
}

impl fmt::Display for VatRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.percent())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalogue::{PackOption, Product};
    use crate::money::round_money;

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn primer() -> Product {
        Product {
            code: "A119".to_string(),
            name: "National Acrylic Primer (W.B.)".to_string(),
            category: "Primers".to_string(),
            subcategory: None,
            description: String::new(),
            uses: String::new(),
            advantages: String::new(),
            packs: vec![
                PackOption::new("18 Ltr (Drum)", d("120.00")),
                PackOption::new("3.6 Ltr (Gallon)", d("26.25")),
            ],
        }
    }

    #[test]
    fn vat_rate_accepts_only_five_percent() {
        assert_eq!(VatRate::from_config(0.05).unwrap(), VatRate::standard());
        assert_eq!(VatRate::standard().to_string(), "5%");
        assert!(matches!(
            VatRate::from_config(0.2),
            Err(QuoteError::UnsupportedVatRate(_))
        ));
        assert!(VatRate::try_from(d("0.050")).is_ok());
    }

    #[test]
    fn single_line_totals() {
        let mut quote = Quotation::default();
        quote.add_line(&primer(), "18 Ltr (Drum)", 2, d("10")).unwrap();

        let totals = quote.compute_totals();
        assert_eq!(totals.subtotal, d("240.00"));
        assert_eq!(totals.total_discount, d("24.00"));
        assert_eq!(totals.net_before_vat, d("216.00"));
        assert_eq!(totals.vat_amount, d("10.80"));
        assert_eq!(totals.grand_total, d("226.80"));
    }

    #[test]
    fn grand_total_matches_sum_of_lines() {
        let product = primer();
        let mut quote = Quotation::default();
        quote.add_line(&product, "18 Ltr (Drum)", 2, d("10")).unwrap();
        quote.add_line(&product, "3.6 Ltr (Gallon)", 3, d("12.5")).unwrap();
        quote.add_line(&product, "3.6 Ltr (Gallon)", 7, d("0")).unwrap();

        let net: Decimal = quote.lines().iter().map(|l| l.line_net()).sum();
        let totals = quote.compute_totals();
        assert_eq!(totals.net_before_vat, net);
        assert_eq!(totals.grand_total, net + net * d("0.05"));
        assert_eq!(quote.compute_totals(), totals);
    }

    #[test]
    fn vat_rounds_half_up_at_the_boundary() {
        let product = Product {
            packs: vec![PackOption::new("1 Ltr", d("100.10"))],
            ..primer()
        };
        let mut quote = Quotation::default();
        quote.add_line(&product, "1 Ltr", 1, Decimal::ZERO).unwrap();
        let totals = quote.compute_totals();
        assert_eq!(totals.vat_amount, d("5.005"));
        assert_eq!(round_money(totals.vat_amount), d("5.01"));
        assert_eq!(round_money(totals.grand_total), d("105.11"));
    }

    #[test]
    fn state_follows_lines() {
        let product = primer();
        let mut quote = Quotation::default();
        assert_eq!(quote.state(), QuoteState::Empty);
        assert_eq!(quote.compute_totals(), Totals::ZERO);

        quote.add_line(&product, "18 Ltr (Drum)", 1, d("5")).unwrap();
        quote.add_line(&product, "3.6 Ltr (Gallon)", 4, d("0")).unwrap();
        assert_eq!(quote.state(), QuoteState::NonEmpty);

        quote.remove_line(1).unwrap();
        assert_eq!(quote.state(), QuoteState::NonEmpty);
        let removed = quote.remove_line(0).unwrap();
        assert_eq!(removed.pack_label(), "18 Ltr (Drum)");
        assert_eq!(quote.state(), QuoteState::Empty);
        assert_eq!(quote.compute_totals(), Totals::ZERO);
    }

    #[test]
    fn rejected_mutations_leave_quotation_unchanged() {
        let product = primer();
        let mut quote = Quotation::default();
        quote.add_line(&product, "18 Ltr (Drum)", 2, d("10")).unwrap();
        let before = quote.compute_totals();

        assert!(matches!(
            quote.remove_line(1),
            Err(QuoteError::IndexOutOfRange { index: 1, len: 1 })
        ));
        assert!(matches!(
            quote.update_quantity(3, 1),
            Err(QuoteError::IndexOutOfRange { .. })
        ));
        assert!(matches!(
            quote.update_quantity(0, 0),
            Err(QuoteError::InvalidQuantity { line: Some(1), .. })
        ));
        assert!(matches!(
            quote.update_discount(0, d("101")),
            Err(QuoteError::InvalidDiscount { line: Some(1), .. })
        ));
        assert!(matches!(
            quote.add_line(&product, "55 Gal (Drum)", 1, Decimal::ZERO),
            Err(QuoteError::UnknownPackSize { .. })
        ));

        assert_eq!(quote.len(), 1);
        assert_eq!(quote.compute_totals(), before);
    }

    #[test]
    fn update_errors_name_the_line() {
        let product = primer();
        let mut quote = Quotation::default();
        quote.add_line(&product, "18 Ltr (Drum)", 2, d("10")).unwrap();
        quote.add_line(&product, "3.6 Ltr (Gallon)", 3, Decimal::ZERO).unwrap();

        let err = quote.update_quantity(1, 0).unwrap_err();
        assert_eq!(
            err.to_string(),
            format!("Invalid quantity '0' for line 2 (product 'A119'): must be a whole number from 1 to {MAX_QUANTITY}")
        );
        let err = quote.update_discount(1, d("-5")).unwrap_err();
        assert!(err.to_string().contains("for line 2 (product 'A119')"));

        // new lines have no position yet
        let err = quote.add_line(&product, "18 Ltr (Drum)", 0, Decimal::ZERO).unwrap_err();
        assert!(err.to_string().contains("for product 'A119'"));
    }

    #[test]
    fn updates_flow_into_totals() {
        let product = primer();
        let mut quote = Quotation::default();
        quote.add_line(&product, "18 Ltr (Drum)", 2, d("10")).unwrap();
        quote.update_quantity(0, 1).unwrap();
        quote.update_discount(0, d("0")).unwrap();

        let totals = quote.compute_totals();
        assert_eq!(totals.subtotal, d("120"));
        assert_eq!(totals.total_discount, Decimal::ZERO);
        assert_eq!(totals.grand_total, d("126"));
    }
}
