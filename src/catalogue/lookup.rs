use rust_decimal::Decimal;
use serde::Serialize;

use super::Catalogue;

/// Result of looking up the price of a (code, size) pair, shaped for JSON
/// consumers such as a chat front-end.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceLookup {
    pub requested_code: String,
    pub requested_size: String,
    pub currency: String,
    #[serde(flatten)]
    pub outcome: LookupOutcome,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LookupOutcome {
    Found {
        product_code: String,
        product_name: String,
        size: String,
        price: Decimal,
    },
    UnknownPack {
        product_code: String,
        product_name: String,
        available_sizes: Vec<String>,
    },
    MissingFields {
        missing: Vec<String>,
        available_sizes: Vec<String>,
    },
    UnknownCode,
}

impl PriceLookup {
    pub fn resolve(catalogue: &Catalogue, code: &str, size: &str) -> Self {
        let code = code.trim();
        let size = size.trim();

        let outcome = if code.is_empty() {
            let mut missing = vec!["code".to_string()];
            if size.is_empty() {
                missing.push("size".to_string());
            }
            LookupOutcome::MissingFields {
                missing,
                available_sizes: Vec::new(),
            }
        } else {
            match catalogue.get(code) {
                None => LookupOutcome::UnknownCode,
                Some(product) => {
                    let available_sizes: Vec<String> =
                        product.packs.iter().map(|p| p.label.clone()).collect();
                    if size.is_empty() {
                        LookupOutcome::MissingFields {
                            missing: vec!["size".to_string()],
                            available_sizes,
                        }
                    } else {
                        match product.pack(size) {
                            Some(pack) => LookupOutcome::Found {
                                product_code: product.code.clone(),
                                product_name: product.name.clone(),
                                size: pack.label.clone(),
                                price: pack.unit_price,
                            },
                            None => LookupOutcome::UnknownPack {
                                product_code: product.code.clone(),
                                product_name: product.name.clone(),
                                available_sizes,
                            },
                        }
                    }
                }
            }
        };

        Self {
            requested_code: code.to_string(),
            requested_size: size.to_string(),
            currency: catalogue.currency().to_string(),
            outcome,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self.outcome, LookupOutcome::Found { .. })
    }
}
