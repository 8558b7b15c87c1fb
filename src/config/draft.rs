use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::catalogue::Catalogue;
use crate::error::Result;
use crate::quote::{Customer, Quotation, VatRate};

/// The inputs of the quotation being built, as stored in `quote.toml`.
///
/// Only what the user typed is kept. Prices and totals are recomputed from
/// the catalogue each time the draft is opened.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Draft {
    #[serde(default)]
    pub customer: Customer,
    #[serde(default)]
    pub lines: Vec<DraftLine>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DraftLine {
    pub code: String,
    pub pack: String,
    pub quantity: u32,
    #[serde(default)]
    pub discount: Decimal,
}

impl Draft {
    pub fn from_quotation(quote: &Quotation) -> Self {
        Self {
            customer: quote.customer.clone(),
            lines: quote
                .lines()
                .iter()
                .map(|line| DraftLine {
                    code: line.product_code().to_string(),
                    pack: line.pack_label().to_string(),
                    quantity: line.quantity(),
                    discount: line.discount_percent(),
                })
                .collect(),
        }
    }

    /// Re-price every stored line against `catalogue`.
    pub fn to_quotation(&self, catalogue: &Catalogue, vat_rate: VatRate) -> Result<Quotation> {
        let mut quote = Quotation::new(vat_rate);
        quote.customer = self.customer.clone();
        for line in &self.lines {
            let product = catalogue.require(&line.code)?;
            quote.add_line(product, &line.pack, i64::from(line.quantity), line.discount)?;
        }
        Ok(quote)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalogue::{PackOption, Product};
    use crate::error::QuoteError;

    fn catalogue() -> Catalogue {
        Catalogue::from_products(
            "AED",
            vec![Product {
                code: "A119".to_string(),
                name: "Primer".to_string(),
                category: "Primers".to_string(),
                subcategory: None,
                description: String::new(),
                uses: String::new(),
                advantages: String::new(),
                packs: vec![PackOption::new("18 Ltr (Drum)", Decimal::from(120))],
            }],
        )
        .unwrap()
    }

    #[test]
    fn survives_a_toml_round_trip() {
        let cat = catalogue();
        let mut quote = Quotation::default();
        quote.customer.name = Some("Gulf Builders".to_string());
        quote
            .add_line(cat.get("A119").unwrap(), "18 Ltr (Drum)", 2, Decimal::from(10))
            .unwrap();

        let text = toml::to_string_pretty(&Draft::from_quotation(&quote)).unwrap();
        let draft: Draft = toml::from_str(&text).unwrap();
        let rebuilt = draft.to_quotation(&cat, VatRate::standard()).unwrap();

        assert_eq!(rebuilt.customer.name.as_deref(), Some("Gulf Builders"));
        assert_eq!(rebuilt.compute_totals(), quote.compute_totals());
    }

    #[test]
    fn fails_when_product_left_the_catalogue() {
        let draft = Draft {
            customer: Customer::default(),
            lines: vec![DraftLine {
                code: "Z999".to_string(),
                pack: "1 Ltr".to_string(),
                quantity: 1,
                discount: Decimal::ZERO,
            }],
        };
        let err = draft.to_quotation(&catalogue(), VatRate::standard()).unwrap_err();
        assert!(matches!(err, QuoteError::ProductNotFound(code) if code == "Z999"));
    }
}
