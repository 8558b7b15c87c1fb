mod csv_file;
mod pdf;

pub use csv_file::{export_csv, write_csv};
pub use pdf::generate_pdf;

use crate::error::{QuoteError, Result};
use crate::quote::QuoteSnapshot;

/// Pretty-printed JSON form of a snapshot.
pub fn to_json(snapshot: &QuoteSnapshot) -> Result<String> {
    serde_json::to_string_pretty(snapshot).map_err(|e| {
        QuoteError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            e.to_string(),
        ))
    })
}
