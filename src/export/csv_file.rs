use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::error::Result;
use crate::quote::QuoteSnapshot;

const HEADERS: [&str; 9] = [
    "product_code",
    "product_name",
    "pack",
    "quantity",
    "unit_price",
    "discount_pct",
    "line_subtotal",
    "discount_amount",
    "line_net",
];

/// Write one CSV row per quotation line, header first.
pub fn write_csv<W: Write>(snapshot: &QuoteSnapshot, writer: W) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new().has_headers(false).from_writer(writer);
    wtr.write_record(HEADERS)?;
    for line in &snapshot.lines {
        wtr.write_record([
            line.product_code.clone(),
            line.product_name.clone(),
            line.pack.clone(),
            line.quantity.to_string(),
            line.unit_price.to_string(),
            line.discount_pct.to_string(),
            line.line_subtotal.to_string(),
            line.discount_amount.to_string(),
            line.line_net.to_string(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn export_csv(snapshot: &QuoteSnapshot, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let file = File::create(path)?;
    write_csv(snapshot, file)
}
