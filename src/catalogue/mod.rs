mod document;
mod lookup;

pub use lookup::{LookupOutcome, PriceLookup};

use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info};

use crate::error::{QuoteError, Result};
use crate::money::{parse_price, MAX_UNIT_PRICE};
use document::{flatten_text, PriceDocument, ProductNode, RawProduct};

const PRODUCTS_DOC: &str = "product catalogue";
const PRICES_DOC: &str = "price list";
const DEFAULT_CURRENCY: &str = "AED";

/// A sellable pack of a product with its own price.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PackOption {
    pub label: String,
    pub unit_price: Decimal,
}

impl PackOption {
    pub fn new(label: impl Into<String>, unit_price: Decimal) -> Self {
        Self {
            label: label.into(),
            unit_price,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Product {
    pub code: String,
    pub name: String,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<String>,
    pub description: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub uses: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub advantages: String,
    pub packs: Vec<PackOption>,
}

impl Product {
    /// Resolve a pack label, ignoring case and repeated whitespace.
    pub fn pack(&self, label: &str) -> Option<&PackOption> {
        let wanted = normalize_label(label);
        self.packs
            .iter()
            .find(|p| normalize_label(&p.label) == wanted)
    }

    pub fn pack_labels(&self) -> Vec<&str> {
        self.packs.iter().map(|p| p.label.as_str()).collect()
    }

    /// Description, uses and advantages, one per line.
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();
        if !self.description.is_empty() {
            parts.push(self.description.clone());
        }
        if !self.uses.is_empty() {
            parts.push(format!("Uses: {}", self.uses));
        }
        if !self.advantages.is_empty() {
            parts.push(format!("Advantages: {}", self.advantages));
        }
        if parts.is_empty() {
            return "No summary is available for this product.".to_string();
        }
        parts.join("\n")
    }
}

/// The product catalogue, loaded once and read everywhere.
///
/// A `Catalogue` has no interior mutability: share it between sessions with
/// `Arc<Catalogue>` and give each session its own `Quotation`.
#[derive(Debug, Clone, Default)]
pub struct Catalogue {
    products: BTreeMap<String, Product>,
    currency: String,
    effective_date: Option<String>,
}

impl Catalogue {
    /// Load the product and price documents from disk.
    pub fn load(products_path: &Path, prices_path: &Path) -> Result<Self> {
        debug!(products = %products_path.display(), prices = %prices_path.display(), "loading catalogue");
        let nodes: Vec<ProductNode> = read_json(products_path)?;
        let prices: PriceDocument = read_json(prices_path)?;
        Self::build(nodes, prices)
    }

    /// Build a catalogue from the two JSON documents held in memory.
    pub fn from_documents(products_json: &str, prices_json: &str) -> Result<Self> {
        let nodes: Vec<ProductNode> = serde_json::from_str(products_json)
            .map_err(|e| QuoteError::integrity(PRODUCTS_DOC, format!("malformed JSON: {e}")))?;
        let prices: PriceDocument = serde_json::from_str(prices_json)
            .map_err(|e| QuoteError::integrity(PRICES_DOC, format!("malformed JSON: {e}")))?;
        Self::build(nodes, prices)
    }

    /// Build a catalogue directly from products, applying the same integrity
    /// checks as the document loader.
    pub fn from_products(currency: &str, products: Vec<Product>) -> Result<Self> {
        let mut map = BTreeMap::new();
        for mut product in products {
            product.code = normalize_code(&product.code);
            if product.code.is_empty() {
                return Err(QuoteError::integrity(PRODUCTS_DOC, "product with empty code"));
            }
            let mut seen = HashSet::new();
            for pack in &product.packs {
                check_pack(&product.code, &pack.label, pack.unit_price, &mut seen)?;
            }
            if map.contains_key(&product.code) {
                return Err(QuoteError::integrity(
                    PRODUCTS_DOC,
                    format!("duplicate product code '{}'", product.code),
                ));
            }
            map.insert(product.code.clone(), product);
        }
        let catalogue = Self {
            products: map,
            currency: currency.to_string(),
            effective_date: None,
        };
        catalogue.check_packs_present()?;
        Ok(catalogue)
    }

    /// Replace this catalogue with a freshly loaded one. On failure the
    /// current contents are kept.
    pub fn reload(&mut self, products_path: &Path, prices_path: &Path) -> Result<()> {
        let fresh = Self::load(products_path, prices_path)?;
        *self = fresh;
        Ok(())
    }

    fn build(nodes: Vec<ProductNode>, prices: PriceDocument) -> Result<Self> {
        let mut products = BTreeMap::new();
        for (idx, raw) in ProductNode::flatten(nodes).into_iter().enumerate() {
            let product = product_from_raw(idx, raw)?;
            if products.contains_key(&product.code) {
                return Err(QuoteError::integrity(
                    PRODUCTS_DOC,
                    format!("duplicate product code '{}'", product.code),
                ));
            }
            products.insert(product.code.clone(), product);
        }

        let mut priced = HashSet::new();
        for category in prices.product_categories {
            let category_name = category.category_name.unwrap_or_default().trim().to_string();
            for sub in category.subcategories {
                let subcategory = sub
                    .subcategory_name
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty());
                for (idx, entry) in sub.products.into_iter().enumerate() {
                    let code = normalize_code(entry.product_code.as_deref().unwrap_or(""));
                    if code.is_empty() {
                        let label = entry.product_name.unwrap_or_else(|| format!("entry {idx}"));
                        return Err(QuoteError::integrity(
                            PRICES_DOC,
                            format!("category '{category_name}': '{label}' has no product code"),
                        ));
                    }
                    if !priced.insert(code.clone()) {
                        return Err(QuoteError::integrity(
                            PRICES_DOC,
                            format!("product code '{code}' is priced more than once"),
                        ));
                    }
                    let product = products.get_mut(&code).ok_or_else(|| {
                        QuoteError::integrity(
                            PRICES_DOC,
                            format!("category '{category_name}' references unknown product '{code}'"),
                        )
                    })?;
                    if product.category.is_empty() {
                        product.category = category_name.clone();
                    }
                    if subcategory.is_some() {
                        product.subcategory = subcategory.clone();
                    }

                    let mut seen = HashSet::new();
                    for tier in entry.prices {
                        let label = tier.size.unwrap_or_default().trim().to_string();
                        let unit_price = tier
                            .price
                            .as_ref()
                            .and_then(price_value)
                            .ok_or_else(|| {
                                QuoteError::integrity(
                                    PRICES_DOC,
                                    format!("product '{code}' pack '{label}': price is missing or not numeric"),
                                )
                            })?;
                        check_pack(&code, &label, unit_price, &mut seen)?;
                        product.packs.push(PackOption::new(label, unit_price));
                    }
                }
            }
        }

        let catalogue = Self {
            products,
            currency: prices
                .currency
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty())
                .unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
            effective_date: prices.effective_date,
        };
        catalogue.check_packs_present()?;

        info!(
            products = catalogue.len(),
            currency = %catalogue.currency,
            source = prices.document_source.as_deref().unwrap_or("-"),
            "catalogue loaded"
        );
        Ok(catalogue)
    }

    fn check_packs_present(&self) -> Result<()> {
        match self.products.values().find(|p| p.packs.is_empty()) {
            Some(product) => Err(QuoteError::integrity(
                PRICES_DOC,
                format!("product '{}' has no priced pack sizes", product.code),
            )),
            None => Ok(()),
        }
    }

    /// Look up a product by code, ignoring case and surrounding whitespace.
    pub fn get(&self, code: &str) -> Option<&Product> {
        self.products.get(&normalize_code(code))
    }

    /// Like [`Catalogue::get`] but fails with `ProductNotFound`.
    pub fn require(&self, code: &str) -> Result<&Product> {
        self.get(code)
            .ok_or_else(|| QuoteError::ProductNotFound(code.trim().to_string()))
    }

    /// Find a product by name: a normalised exact match wins, otherwise the
    /// first product (in code order) whose name contains the query.
    pub fn find_by_name(&self, name: &str) -> Option<&Product> {
        let wanted = normalize_label(name);
        if wanted.is_empty() {
            return None;
        }
        self.products
            .values()
            .find(|p| normalize_label(&p.name) == wanted)
            .or_else(|| {
                self.products
                    .values()
                    .find(|p| normalize_label(&p.name).contains(&wanted))
            })
    }

    /// Resolve a code first, then a name. Unlike
    /// [`find_by_name`](Self::find_by_name), a partial name resolves only
    /// when it matches a single product.
    pub fn resolve(&self, code_or_name: &str) -> Result<&Product> {
        let query = code_or_name.trim();
        if let Some(product) = self.get(query) {
            return Ok(product);
        }
        let wanted = normalize_label(query);
        if wanted.is_empty() {
            return Err(QuoteError::ProductNotFound(query.to_string()));
        }
        if let Some(product) = self.products.values().find(|p| normalize_label(&p.name) == wanted) {
            return Ok(product);
        }

        let partial: Vec<&Product> = self
            .products
            .values()
            .filter(|p| normalize_label(&p.name).contains(&wanted))
            .collect();
        match partial.as_slice() {
            [] => Err(QuoteError::ProductNotFound(query.to_string())),
            [only] => Ok(*only),
            several => Err(QuoteError::AmbiguousProduct {
                query: query.to_string(),
                candidates: several
                    .iter()
                    .map(|p| format!("{} {}", p.code, p.name))
                    .collect::<Vec<_>>()
                    .join(", "),
            }),
        }
    }

    /// Products in code order.
    pub fn products(&self) -> impl Iterator<Item = &Product> {
        self.products.values()
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn effective_date(&self) -> Option<&str> {
        self.effective_date.as_deref()
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    pub fn pack_count(&self) -> usize {
        self.products.values().map(|p| p.packs.len()).sum()
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    if !path.exists() {
        return Err(QuoteError::ConfigFileNotFound(path.to_path_buf()));
    }
    let content = fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(|e| QuoteError::CatalogueParse {
        path: path.to_path_buf(),
        source: e,
    })
}

fn product_from_raw(idx: usize, raw: RawProduct) -> Result<Product> {
    let uses = raw.uses_text();
    let advantages = raw.advantages_text();
    let code = normalize_code(raw.code.as_deref().unwrap_or(""));
    if code.is_empty() {
        return Err(QuoteError::integrity(
            PRODUCTS_DOC,
            format!("entry {idx}: missing product code"),
        ));
    }
    let name = raw.name.unwrap_or_default().trim().to_string();
    if name.is_empty() {
        return Err(QuoteError::integrity(
            PRODUCTS_DOC,
            format!("entry {idx} ({code}): missing product name"),
        ));
    }
    Ok(Product {
        code,
        name,
        category: raw.category.unwrap_or_default().trim().to_string(),
        subcategory: None,
        description: raw.description.as_ref().map(flatten_text).unwrap_or_default(),
        uses,
        advantages,
        packs: Vec::new(),
    })
}

fn check_pack(code: &str, label: &str, unit_price: Decimal, seen: &mut HashSet<String>) -> Result<()> {
    if label.trim().is_empty() {
        return Err(QuoteError::integrity(
            PRICES_DOC,
            format!("product '{code}' has a pack with an empty size label"),
        ));
    }
    if unit_price < Decimal::ZERO {
        return Err(QuoteError::integrity(
            PRICES_DOC,
            format!("product '{code}' pack '{label}': negative price {unit_price}"),
        ));
    }
    if unit_price > MAX_UNIT_PRICE {
        return Err(QuoteError::integrity(
            PRICES_DOC,
            format!("product '{code}' pack '{label}': price {unit_price} exceeds {MAX_UNIT_PRICE}"),
        ));
    }
    if !seen.insert(normalize_label(label)) {
        return Err(QuoteError::integrity(
            PRICES_DOC,
            format!("product '{code}' lists pack '{label}' more than once"),
        ));
    }
    Ok(())
}

fn price_value(value: &serde_json::Value) -> Option<Decimal> {
    match value {
        serde_json::Value::Number(n) => {
            let text = n.to_string();
            Decimal::from_str(&text)
                .or_else(|_| Decimal::from_scientific(&text))
                .ok()
        }
        serde_json::Value::String(s) => parse_price(s),
        _ => None,
    }
}

pub(crate) fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

pub(crate) fn normalize_label(label: &str) -> String {
    label.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}
