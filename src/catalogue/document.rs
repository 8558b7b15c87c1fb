use serde::Deserialize;
use serde_json::Value;

/// An element of the product document: either a record or a nested group of
/// records. Product exports group entries by range, so arrays may nest.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ProductNode {
    Group(Vec<ProductNode>),
    Record(RawProduct),
}

impl ProductNode {
    /// Flatten nested groups into records, keeping document order.
    pub fn flatten(nodes: Vec<ProductNode>) -> Vec<RawProduct> {
        let mut out = Vec::new();
        let mut stack: Vec<ProductNode> = nodes.into_iter().rev().collect();
        while let Some(node) = stack.pop() {
            match node {
                ProductNode::Record(record) => out.push(record),
                ProductNode::Group(children) => stack.extend(children.into_iter().rev()),
            }
        }
        out
    }
}

#[derive(Debug, Deserialize)]
pub struct RawProduct {
    #[serde(default, alias = "product_code")]
    pub code: Option<String>,
    #[serde(default, alias = "product_name")]
    pub name: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default, alias = "product_description")]
    pub description: Option<Value>,
    #[serde(default)]
    pub uses: Option<Value>,
    #[serde(default)]
    pub usage: Option<Value>,
    #[serde(default)]
    pub usage_data: Option<Value>,
    #[serde(default)]
    pub advantages: Option<Value>,
    #[serde(default)]
    pub advantages_and_intended_use: Option<Value>,
}

impl RawProduct {
    /// Usage notes, taken from the first of `uses`, `usage` and
    /// `usage_data` that has text.
    pub fn uses_text(&self) -> String {
        first_text(&[&self.uses, &self.usage, &self.usage_data])
    }

    /// Advantages, from `advantages` or `advantages_and_intended_use`.
    pub fn advantages_text(&self) -> String {
        first_text(&[&self.advantages, &self.advantages_and_intended_use])
    }
}

fn first_text(fields: &[&Option<Value>]) -> String {
    fields
        .iter()
        .filter_map(|f| f.as_ref())
        .map(flatten_text)
        .find(|s| !s.is_empty())
        .unwrap_or_default()
}

#[derive(Debug, Deserialize)]
pub struct PriceDocument {
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub effective_date: Option<String>,
    #[serde(default)]
    pub document_source: Option<String>,
    #[serde(default)]
    pub product_categories: Vec<PriceCategory>,
}

#[derive(Debug, Deserialize)]
pub struct PriceCategory {
    #[serde(default)]
    pub category_name: Option<String>,
    #[serde(default)]
    pub subcategories: Vec<PriceSubcategory>,
}

#[derive(Debug, Deserialize)]
pub struct PriceSubcategory {
    #[serde(default)]
    pub subcategory_name: Option<String>,
    #[serde(default)]
    pub products: Vec<PricedProduct>,
}

#[derive(Debug, Deserialize)]
pub struct PricedProduct {
    #[serde(default)]
    pub product_code: Option<String>,
    #[serde(default)]
    pub product_name: Option<String>,
    #[serde(default)]
    pub prices: Vec<PriceTier>,
}

#[derive(Debug, Deserialize)]
pub struct PriceTier {
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub price: Option<Value>,
}

/// Collapse a free-text field (string, list or object) into one line.
pub fn flatten_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.split_whitespace().collect::<Vec<_>>().join(" "),
        Value::Array(items) => items
            .iter()
            .map(flatten_text)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("; "),
        Value::Object(map) => map
            .values()
            .map(flatten_text)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("; "),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
