//! Prompt-driven quotation builder.
//!
//! Reads from any `BufRead` and writes to any `Write`, so the same loop
//! serves a terminal and tests.

use rust_decimal::Decimal;
use std::io::{BufRead, Write};
use std::str::FromStr;

use crate::catalogue::Catalogue;
use crate::error::Result;
use crate::money::{format_amount, format_percent};
use crate::quote::Quotation;
use crate::search::SearchIndex;

struct Prompt<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompt<R, W> {
    /// `None` on end of input, otherwise the trimmed line.
    fn ask(&mut self, prompt: &str) -> Result<Option<String>> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;
        let mut buf = String::new();
        if self.input.read_line(&mut buf)? == 0 {
            writeln!(self.output)?;
            return Ok(None);
        }
        Ok(Some(buf.trim().to_string()))
    }

    /// Blank or end of input cancels.
    fn ask_nonblank(&mut self, prompt: &str) -> Result<Option<String>> {
        Ok(self.ask(prompt)?.filter(|s| !s.is_empty()))
    }

    fn choose(&mut self, options: &[String], prompt: &str) -> Result<Option<usize>> {
        for (idx, option) in options.iter().enumerate() {
            writeln!(self.output, "  {}. {}", idx + 1, option)?;
        }
        loop {
            let Some(choice) = self.ask_nonblank(prompt)? else {
                return Ok(None);
            };
            match choice.parse::<usize>() {
                Ok(n) if (1..=options.len()).contains(&n) => return Ok(Some(n - 1)),
                _ => writeln!(
                    self.output,
                    "Please enter a valid number from the list or leave blank to cancel."
                )?,
            }
        }
    }

    fn quantity(&mut self) -> Result<Option<i64>> {
        loop {
            let Some(raw) = self.ask_nonblank("Quantity (blank to cancel): ")? else {
                return Ok(None);
            };
            match raw.parse::<i64>() {
                Ok(q) if q > 0 => return Ok(Some(q)),
                Ok(_) => writeln!(self.output, "Quantity must be greater than zero.")?,
                Err(_) => writeln!(self.output, "Enter a whole number quantity.")?,
            }
        }
    }

    fn discount(&mut self) -> Result<Option<Decimal>> {
        loop {
            let Some(raw) = self.ask("Discount % [0-100] (default 0): ")? else {
                return Ok(None);
            };
            if raw.is_empty() {
                return Ok(Some(Decimal::ZERO));
            }
            match Decimal::from_str(raw.trim_end_matches('%')) {
                Ok(d) if d >= Decimal::ZERO && d <= Decimal::ONE_HUNDRED => return Ok(Some(d)),
                Ok(_) => writeln!(self.output, "Discount must be between 0 and 100 percent.")?,
                Err(_) => writeln!(self.output, "Enter a numeric percentage between 0 and 100.")?,
            }
        }
    }
}

/// Run the interactive builder, appending to `quote`. Returns the number of
/// lines added.
pub fn run_session<R: BufRead, W: Write>(
    catalogue: &Catalogue,
    quote: &mut Quotation,
    search_limit: usize,
    input: R,
    output: W,
) -> Result<usize> {
    let index = SearchIndex::new(catalogue);
    let currency = catalogue.currency();
    let mut prompt = Prompt { input, output };
    let mut added = 0;

    writeln!(prompt.output, "Paint quotation assistant")?;
    writeln!(
        prompt.output,
        "Type part of a product name to see suggestions. Press Enter on an empty line to finish.\n"
    )?;

    while let Some(query) = prompt.ask_nonblank("Search product (blank to finish): ")? {
        let matches = index.suggest(&query, search_limit);
        if matches.is_empty() {
            writeln!(prompt.output, "No products matched your search. Try a different term.\n")?;
            continue;
        }

        writeln!(prompt.output, "Matches:")?;
        let names: Vec<String> = matches
            .iter()
            .map(|p| format!("{} [{}]", p.name, p.code))
            .collect();
        let Some(choice) = prompt.choose(&names, "Choose a product number (blank to search again): ")? else {
            writeln!(prompt.output)?;
            continue;
        };
        let product = matches[choice];

        writeln!(prompt.output, "Available pack sizes:")?;
        let packs: Vec<String> = product
            .packs
            .iter()
            .map(|p| format!("{} - {}", p.label, format_amount(p.unit_price, currency)))
            .collect();
        let Some(pack_idx) = prompt.choose(&packs, "Select pack size (blank to cancel): ")? else {
            writeln!(prompt.output)?;
            continue;
        };
        let pack = &product.packs[pack_idx];

        let Some(quantity) = prompt.quantity()? else {
            writeln!(prompt.output)?;
            continue;
        };
        let Some(discount) = prompt.discount()? else {
            writeln!(prompt.output)?;
            continue;
        };

        match quote.add_line(product, &pack.label, quantity, discount) {
            Ok(idx) => {
                let line = &quote.lines()[idx];
                writeln!(
                    prompt.output,
                    "Added {} ({}) x {} at {} each, discount {}%",
                    line.product_name(),
                    line.pack_label(),
                    line.quantity(),
                    format_amount(line.unit_price(), currency),
                    format_percent(line.discount_percent())
                )?;
                writeln!(prompt.output, "Line total: {}\n", format_amount(line.line_net(), currency))?;
                added += 1;
            }
            Err(e) => writeln!(prompt.output, "Could not add line: {e}\n")?,
        }
    }

    if quote.is_empty() {
        writeln!(prompt.output, "No items added. Goodbye!")?;
        return Ok(added);
    }

    write_summary(&mut prompt.output, quote, currency)?;
    Ok(added)
}

/// Plain-text quotation summary.
pub fn write_summary<W: Write>(out: &mut W, quote: &Quotation, currency: &str) -> Result<()> {
    writeln!(out, "Quotation summary:\n")?;
    for line in quote.lines() {
        writeln!(
            out,
            "- {} ({}) x {} @ {} less {}% -> {}",
            line.product_name(),
            line.pack_label(),
            line.quantity(),
            format_amount(line.unit_price(), currency),
            format_percent(line.discount_percent()),
            format_amount(line.line_net(), currency)
        )?;
    }
    let totals = quote.compute_totals();
    writeln!(out)?;
    writeln!(out, "Subtotal: {}", format_amount(totals.subtotal, currency))?;
    writeln!(out, "Discount: {}", format_amount(totals.total_discount, currency))?;
    writeln!(out, "VAT ({}): {}", quote.vat_rate(), format_amount(totals.vat_amount, currency))?;
    writeln!(out, "Total: {}", format_amount(totals.grand_total, currency))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalogue::{PackOption, Product};

    fn catalogue() -> Catalogue {
        let product = |code: &str, name: &str, packs: Vec<PackOption>| Product {
            code: code.to_string(),
            name: name.to_string(),
            category: "Paints".to_string(),
            subcategory: None,
            description: String::new(),
            uses: String::new(),
            advantages: String::new(),
            packs,
        };
        Catalogue::from_products(
            "AED",
            vec![
                product(
                    "A119",
                    "National Acrylic Primer (W.B.)",
                    vec![
                        PackOption::new("18 Ltr (Drum)", Decimal::from(80)),
                        PackOption::new("3.6 Ltr (Gallon)", Decimal::from(22)),
                    ],
                ),
                product("C101", "NP Colorant", vec![PackOption::new("1 Ltr (Tin)", Decimal::from(35))]),
            ],
        )
        .unwrap()
    }

    fn run(script: &str) -> (Quotation, String) {
        let cat = catalogue();
        let mut quote = Quotation::default();
        let mut out = Vec::new();
        run_session(&cat, &mut quote, 10, script.as_bytes(), &mut out).unwrap();
        (quote, String::from_utf8(out).unwrap())
    }

    #[test]
    fn builds_a_quotation() {
        let (quote, out) = run("primer\n1\n1\n2\n10\nprimer\n1\n2\n3\n\n\n");
        assert_eq!(quote.len(), 2);
        assert!(out.contains("Line total: AED 144.00"));
        assert!(out.contains("Subtotal: AED 226.00"));
        assert!(out.contains("VAT (5%): AED 10.50"));
        assert!(out.contains("Total: AED 220.50"));
    }

    #[test]
    fn reprompts_on_bad_input() {
        let (quote, out) = run("np\n7\n1\n1\n0\nabc\n4\n150\n5\n\n");
        assert_eq!(quote.len(), 1);
        assert!(out.contains("Please enter a valid number"));
        assert!(out.contains("Quantity must be greater than zero."));
        assert!(out.contains("Enter a whole number quantity."));
        assert!(out.contains("Discount must be between 0 and 100 percent."));
        assert_eq!(quote.lines()[0].quantity(), 4);
        assert_eq!(quote.lines()[0].discount_percent(), Decimal::from(5));
    }

    #[test]
    fn no_match_and_early_exit() {
        let (quote, out) = run("xyz-no-match\n");
        assert!(quote.is_empty());
        assert!(out.contains("No products matched your search."));
        assert!(out.contains("No items added. Goodbye!"));
    }
}
