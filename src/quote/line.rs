use rust_decimal::Decimal;
use serde::Serialize;

use crate::catalogue::Product;
use crate::error::{QuoteError, Result};
use crate::money::MAX_UNIT_PRICE;

/// Largest quantity a single line accepts.
pub const MAX_QUANTITY: u32 = 1_000_000;

/// One product + pack + quantity + discount entry of a quotation.
///
/// The three derived amounts are kept at full precision and recomputed on
/// every change; fields are private so they cannot drift from the inputs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuoteLine {
    product_code: String,
    product_name: String,
    pack_label: String,
    unit_price: Decimal,
    quantity: u32,
    discount_percent: Decimal,
    line_subtotal: Decimal,
    discount_amount: Decimal,
    line_net: Decimal,
}

impl QuoteLine {
    /// Price a line for `product`. Validation order: quantity, discount,
    /// pack size, unit price.
    pub fn new(product: &Product, pack_label: &str, quantity: i64, discount_percent: Decimal) -> Result<Self> {
        let quantity = validate_quantity(&product.code, quantity)?;
        validate_discount(&product.code, discount_percent)?;
        let pack = product
            .pack(pack_label)
            .ok_or_else(|| QuoteError::UnknownPackSize {
                product: product.code.clone(),
                pack: pack_label.trim().to_string(),
                available: product.pack_labels().join(", "),
            })?;
        if pack.unit_price < Decimal::ZERO || pack.unit_price > MAX_UNIT_PRICE {
            return Err(QuoteError::PriceOutOfRange {
                product: product.code.clone(),
                pack: pack.label.clone(),
                price: pack.unit_price.to_string(),
                max: MAX_UNIT_PRICE.to_string(),
            });
        }

        let mut line = Self {
            product_code: product.code.clone(),
            product_name: product.name.clone(),
            pack_label: pack.label.clone(),
            unit_price: pack.unit_price,
            quantity,
            discount_percent,
            line_subtotal: Decimal::ZERO,
            discount_amount: Decimal::ZERO,
            line_net: Decimal::ZERO,
        };
        line.derive();
        Ok(line)
    }

    /// Change the quantity. On error the line is left as it was.
    pub fn set_quantity(&mut self, quantity: i64) -> Result<()> {
        self.quantity = validate_quantity(&self.product_code, quantity)?;
        self.derive();
        Ok(())
    }

    /// Change the discount. On error the line is left as it was.
    pub fn set_discount(&mut self, discount_percent: Decimal) -> Result<()> {
        validate_discount(&self.product_code, discount_percent)?;
        self.discount_percent = discount_percent;
        self.derive();
        Ok(())
    }

    fn derive(&mut self) {
        self.line_subtotal = self.unit_price * Decimal::from(self.quantity);
        self.discount_amount = self.line_subtotal * self.discount_percent / Decimal::ONE_HUNDRED;
        self.line_net = self.line_subtotal - self.discount_amount;
    }

    pub fn product_code(&self) -> &str {
        &self.product_code
    }

    pub fn product_name(&self) -> &str {
        &self.product_name
    }

    pub fn pack_label(&self) -> &str {
        &self.pack_label
    }

    pub fn unit_price(&self) -> Decimal {
        self.unit_price
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn discount_percent(&self) -> Decimal {
        self.discount_percent
    }

    pub fn line_subtotal(&self) -> Decimal {
        self.line_subtotal
    }

    pub fn discount_amount(&self) -> Decimal {
        self.discount_amount
    }

    pub fn line_net(&self) -> Decimal {
        self.line_net
    }
}

fn validate_quantity(product: &str, quantity: i64) -> Result<u32> {
    u32::try_from(quantity)
        .ok()
        .filter(|q| (1..=MAX_QUANTITY).contains(q))
        .ok_or_else(|| QuoteError::InvalidQuantity {
            product: product.to_string(),
            line: None,
            quantity,
        })
}

fn validate_discount(product: &str, discount: Decimal) -> Result<()> {
    if discount < Decimal::ZERO || discount > Decimal::ONE_HUNDRED {
        return Err(QuoteError::InvalidDiscount {
            product: product.to_string(),
            line: None,
            discount: discount.normalize().to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalogue::PackOption;
    use std::str::FromStr;

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
    fn derives_amounts() {
        let line = QuoteLine::new(&primer(), "18 Ltr (Drum)", 2, d("10")).unwrap();
        assert_eq!(line.line_subtotal(), d("240.00"));
        assert_eq!(line.discount_amount(), d("24.00"));
        assert_eq!(line.line_net(), d("216.00"));
        assert_eq!(line.line_net(), line.line_subtotal() - line.discount_amount());
    }

    #[test]
    fn keeps_full_precision() {
        let line = QuoteLine::new(&primer(), "3.6 ltr (gallon)", 3, d("12.5")).unwrap();
        assert_eq!(line.pack_label(), "3.6 Ltr (Gallon)");
        assert_eq!(line.line_subtotal(), d("78.75"));
        assert_eq!(line.discount_amount(), d("9.84375"));
        assert_eq!(line.line_net(), d("68.90625"));
    }

    #[test]
    fn rejects_unknown_pack() {
        let err = QuoteLine::new(&primer(), "55 Gal (Drum)", 1, Decimal::ZERO).unwrap_err();
        match err {
            QuoteError::UnknownPackSize { product, pack, available } => {
                assert_eq!(product, "A119");
                assert_eq!(pack, "55 Gal (Drum)");
                assert_eq!(available, "18 Ltr (Drum), 3.6 Ltr (Gallon)");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn rejects_non_positive_quantity() {
        for qty in [0, -3, i64::from(MAX_QUANTITY) + 1, i64::from(u32::MAX) + 1] {
            let err = QuoteLine::new(&primer(), "18 Ltr (Drum)", qty, Decimal::ZERO).unwrap_err();
            assert!(matches!(err, QuoteError::InvalidQuantity { quantity, .. } if quantity == qty));
        }
    }

    #[test]
    fn largest_quantity_and_price_do_not_overflow() {
        let mut product = primer();
        product.packs.push(PackOption::new("1 Ltr", MAX_UNIT_PRICE));
        let line = QuoteLine::new(&product, "1 Ltr", i64::from(MAX_QUANTITY), d("33.33")).unwrap();
        assert_eq!(line.line_subtotal(), d("1000000000000000"));
        assert_eq!(line.line_net(), line.line_subtotal() - line.discount_amount());

        let err = QuoteLine::new(&product, "1 Ltr", 4_000_000_000, Decimal::ZERO).unwrap_err();
        assert!(matches!(err, QuoteError::InvalidQuantity { .. }));
    }

    #[test]
    fn rejects_price_above_maximum() {
        let mut product = primer();
        product.packs.push(PackOption::new("1 Ltr", d("100000000000000000000")));
        let err = QuoteLine::new(&product, "1 Ltr", 1, Decimal::ZERO).unwrap_err();
        assert!(matches!(err, QuoteError::PriceOutOfRange { ref pack, .. } if pack == "1 Ltr"));
    }

    #[test]
    fn rejects_discount_out_of_range() {
        for pct in ["-1", "100.01"] {
            let err = QuoteLine::new(&primer(), "18 Ltr (Drum)", 1, d(pct)).unwrap_err();
            assert!(matches!(err, QuoteError::InvalidDiscount { .. }));
        }
        let free = QuoteLine::new(&primer(), "18 Ltr (Drum)", 1, d("100")).unwrap();
        assert_eq!(free.line_net(), Decimal::ZERO);
    }

    #[test]
    fn updates_rederive_and_failures_leave_line_unchanged() {
        let mut line = QuoteLine::new(&primer(), "18 Ltr (Drum)", 2, d("10")).unwrap();
        line.set_quantity(5).unwrap();
        assert_eq!(line.line_subtotal(), d("600"));
        assert_eq!(line.discount_amount(), d("60"));

        line.set_discount(d("0")).unwrap();
        assert_eq!(line.line_net(), d("600"));

        let before = line.clone();
        assert!(line.set_quantity(0).is_err());
        assert!(line.set_discount(d("150")).is_err());
        assert_eq!(line, before);
    }
}
