use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;
use tracing::debug;

use crate::error::{QuoteError, Result};
use crate::quote::QuoteSnapshot;

/// Embedded Typst template for quotation rendering.
/// Amounts arrive as pre-rounded strings (e.g. "240.00").
const QUOTATION_TEMPLATE: &str = r##"// Quotation Template
// Data is loaded from JSON file

#let data = json("DATA_JSON_PATH")

#set page(
  paper: "a4",
  margin: (top: 20mm, bottom: 20mm, left: 20mm, right: 20mm),
)

#set text(font: "Helvetica", size: 10pt)

#let fmt-int(digits) = {
  let len = digits.len()
  let out = ""
  for (i, digit) in digits.clusters().enumerate() {
    if i > 0 and calc.rem(len - i, 3) == 0 {
      out += ","
    }
    out += digit
  }
  out
}

#let fmt-money(amount) = {
  let parts = amount.split(".")
  let frac = if parts.len() > 1 { parts.at(1) } else { "00" }
  data.currency + " " + fmt-int(parts.at(0)) + "." + frac
}

#grid(
  columns: (1fr, 1fr),
  align: (left, right),
  [
    #text(size: 18pt, weight: "bold")[Paint Quotation]
  ],
  [
    #table(
      columns: (auto, auto),
      stroke: none,
      align: (right, left),
      inset: 2pt,
      [*Date:*], [#data.date],
    )
  ]
)

#v(1em)
#line(length: 100%, stroke: 0.5pt + gray)
#v(1em)

#let customer = data.customer
#if customer.at("name", default: none) != none [
  #text(weight: "bold")[Customer:] #customer.name \
]
#if customer.at("phone", default: none) != none [
  #text(weight: "bold")[Phone:] #customer.phone \
]
#if customer.at("notes", default: none) != none [
  #text(weight: "bold")[Notes:] #customer.notes
]

#v(1.5em)

#table(
  columns: (auto, 1fr, auto, auto, auto, auto, auto),
  align: (center, left, left, right, right, right, right),
  stroke: (x, y) => if y == 0 { (bottom: 1pt + black) } else if y > 0 { (bottom: 0.5pt + gray) },
  inset: 6pt,
  fill: (x, y) => if y == 0 { luma(240) } else { none },

  [*\#*], [*Product*], [*Pack*], [*Qty*], [*Unit Price*], [*Disc %*], [*Line Net*],

  ..data.lines.map(line => (
    str(line.index),
    [#line.product_name \ #text(size: 8pt, fill: gray)[#line.product_code]],
    line.pack,
    str(line.quantity),
    [#fmt-money(line.unit_price)],
    [#line.discount_pct%],
    [#fmt-money(line.line_net)],
  )).flatten()
)

#v(1em)

#align(right)[
  #table(
    columns: (auto, auto),
    stroke: none,
    align: (right, right),
    inset: 6pt,

    [Subtotal:], [#fmt-money(data.totals.subtotal)],
    [Discount:], [#fmt-money(data.totals.total_discount)],
    [Net:], [#fmt-money(data.totals.net_before_vat)],
    [VAT (#data.vat_percent%):], [#fmt-money(data.totals.vat_amount)],

    table.hline(stroke: 1pt),
    [*Total:*], [*#fmt-money(data.totals.grand_total)*],
  )
]
"##;

/// Write the template and its JSON data into a fresh temporary directory.
/// The directory and both files are removed when the returned guard drops.
fn stage(snapshot: &QuoteSnapshot) -> Result<(TempDir, PathBuf)> {
    let temp_dir = tempfile::Builder::new().prefix("paintquote-").tempdir()?;

    let json_data =
        serde_json::to_string(snapshot).map_err(|e| QuoteError::PdfGeneration(e.to_string()))?;
    std::fs::write(temp_dir.path().join("data.json"), &json_data)?;

    // data.json sits next to the template, so a relative path is enough
    let template_content = QUOTATION_TEMPLATE.replace("DATA_JSON_PATH", "data.json");
    let template_path = temp_dir.path().join("quotation.typ");
    std::fs::write(&template_path, &template_content)?;

    Ok((temp_dir, template_path))
}

/// Render the quotation to PDF using the Typst CLI.
pub fn generate_pdf(snapshot: &QuoteSnapshot, output_path: &Path) -> Result<()> {
    // Check if typst is available
    if Command::new("typst").arg("--version").output().is_err() {
        return Err(QuoteError::TypstNotFound);
    }

    let (temp_dir, template_path) = stage(snapshot)?;

    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    debug!(output = %output_path.display(), "running typst compile");
    let output = Command::new("typst")
        .arg("compile")
        .arg("--root")
        .arg(temp_dir.path())
        .arg(&template_path)
        .arg(output_path)
        .output()?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(QuoteError::PdfGeneration(stderr.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalogue::{Catalogue, PackOption, Product};
    use crate::quote::Quotation;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn snapshot() -> QuoteSnapshot {
        let catalogue = Catalogue::from_products(
            "AED",
            vec![Product {
                code: "C101".to_string(),
                name: "NP Colorant".to_string(),
                category: "Tinting".to_string(),
                subcategory: None,
                description: String::new(),
                uses: String::new(),
                advantages: String::new(),
                packs: vec![PackOption::new("1 Ltr (Tin)", Decimal::from(35))],
            }],
        )
        .unwrap();
        let mut quote = Quotation::default();
        quote
            .add_line(catalogue.get("C101").unwrap(), "1 Ltr (Tin)", 2, Decimal::ZERO)
            .unwrap();
        QuoteSnapshot::new(&quote, "AED", NaiveDate::from_ymd_opt(2024, 5, 1).unwrap())
    }

    #[test]
    fn each_render_gets_its_own_scratch_dir() {
        let snapshot = snapshot();
        let (first, first_template) = stage(&snapshot).unwrap();
        let (second, _) = stage(&snapshot).unwrap();
        assert_ne!(first.path(), second.path());

        let template = std::fs::read_to_string(&first_template).unwrap();
        assert!(template.contains(r#"json("data.json")"#));
        let data = std::fs::read_to_string(first.path().join("data.json")).unwrap();
        assert!(data.contains("NP Colorant"));

        let kept = first.path().to_path_buf();
        drop(first);
        assert!(!kept.exists());
    }
}
