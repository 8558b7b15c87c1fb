pub mod catalogue;
pub mod chat;
pub mod config;
pub mod error;
pub mod export;
pub mod money;
pub mod quote;
pub mod repl;
pub mod search;

pub use catalogue::{Catalogue, LookupOutcome, PackOption, PriceLookup, Product};
pub use error::{QuoteError, Result};
pub use quote::{Customer, QuoteLine, QuoteSnapshot, QuoteState, Quotation, Totals, VatRate};
pub use search::SearchIndex;
