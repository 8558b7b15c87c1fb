use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum QuoteError {
    #[error("Data integrity error in {document}: {detail}")]
    DataIntegrity { document: String, detail: String },

    #[error("Failed to parse catalogue file {path}: {source}")]
    CatalogueParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(
        "Invalid quantity '{quantity}' for {}: must be a whole number from 1 to {}",
        subject(.product, .line),
        crate::quote::MAX_QUANTITY
    )]
    InvalidQuantity {
        product: String,
        line: Option<usize>,
        quantity: i64,
    },

    #[error(
        "Invalid discount '{discount}%' for {}: must be between 0 and 100",
        subject(.product, .line)
    )]
    InvalidDiscount {
        product: String,
        line: Option<usize>,
        discount: String,
    },

    #[error("Price {price} of product '{product}' pack '{pack}' exceeds the maximum of {max}")]
    PriceOutOfRange {
        product: String,
        pack: String,
        price: String,
        max: String,
    },

    #[error("Pack size '{pack}' not available for product '{product}' (available: {available})")]
    UnknownPackSize {
        product: String,
        pack: String,
        available: String,
    },

    #[error("Line {index} is out of range (quotation has {len} line(s))")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Product '{0}' not found in catalogue")]
    ProductNotFound(String),

    #[error("'{query}' matches several products ({candidates}). Use a product code.")]
    AmbiguousProduct { query: String, candidates: String },

    #[error("Unsupported VAT rate {0}. Only 0.05 is recognised.")]
    UnsupportedVatRate(String),

    #[error("Config directory not found at {0}. Run 'paintquote init' to create it.")]
    ConfigNotFound(PathBuf),

    #[error("Config file not found: {0}")]
    ConfigFileNotFound(PathBuf),

    #[error("Failed to parse config file {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Config directory already exists at {0}")]
    AlreadyInitialized(PathBuf),

    #[error("The quotation is empty. Use 'paintquote add' to add line items.")]
    EmptyQuotation,

    #[error("Typst not found. Install it from https://typst.app/ or run: cargo install typst-cli")]
    TypstNotFound,

    #[error("Failed to generate PDF: {0}")]
    PdfGeneration(String),

    #[error("CSV export failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl QuoteError {
    /// Attach a 1-based line number to a line-level error. `IndexOutOfRange`
    /// reports it in place of the raw index.
    pub fn with_line(self, number: usize) -> Self {
        match self {
            QuoteError::InvalidQuantity { product, quantity, .. } => QuoteError::InvalidQuantity {
                product,
                line: Some(number),
                quantity,
            },
            QuoteError::InvalidDiscount { product, discount, .. } => QuoteError::InvalidDiscount {
                product,
                line: Some(number),
                discount,
            },
            QuoteError::IndexOutOfRange { len, .. } => QuoteError::IndexOutOfRange { index: number, len },
            other => other,
        }
    }

    pub(crate) fn integrity(document: &str, detail: impl Into<String>) -> Self {
        QuoteError::DataIntegrity {
            document: document.to_string(),
            detail: detail.into(),
        }
    }
}

fn subject(product: &str, line: &Option<usize>) -> String {
    match line {
        Some(n) => format!("line {n} (product '{product}')"),
        None => format!("product '{product}'"),
    }
}

pub type Result<T> = std::result::Result<T, QuoteError>;
