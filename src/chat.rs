//! Rule-based product assistant.
//!
//! Answers two kinds of question over the loaded catalogue:
//! `Tell me about <product name>` and `How much is <code> in <size>?`.
//! Anything else gets a short usage hint.

use once_cell::sync::Lazy;
use regex::Regex;
use std::io::{BufRead, Write};

use crate::catalogue::{Catalogue, LookupOutcome, PriceLookup};
use crate::error::Result;
use crate::money::format_amount;

static ABOUT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*tell me about\s+(.+?)[.!?]*\s*$").expect("valid about pattern")
});

static PRICE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*how much is\s+([A-Za-z0-9]+)\s+in\s+(.+?)[.!?]*\s*$")
        .expect("valid price pattern")
});

const EMPTY_REPLY: &str = "Please enter a question about a product or its price.";
const HELP_REPLY: &str = "I'm not sure how to help with that. Try asking 'Tell me about <product name>' or 'How much is <product code> in <size>?'.";

/// Answer a single message.
pub fn respond_to(catalogue: &Catalogue, message: &str) -> String {
    let message = message.trim();
    if message.is_empty() {
        return EMPTY_REPLY.to_string();
    }
    if let Some(caps) = ABOUT_RE.captures(message) {
        return about(catalogue, &caps[1]);
    }
    if let Some(caps) = PRICE_RE.captures(message) {
        return price(catalogue, &caps[1], &caps[2]);
    }
    HELP_REPLY.to_string()
}

fn about(catalogue: &Catalogue, name: &str) -> String {
    match catalogue.find_by_name(name) {
        Some(product) => format!("{}\n{}", product.name, product.summary()),
        None => format!("I couldn't find a product named \"{}\".", name.trim()),
    }
}

fn price(catalogue: &Catalogue, code: &str, size: &str) -> String {
    let lookup = PriceLookup::resolve(catalogue, code, size);
    match lookup.outcome {
        LookupOutcome::Found {
            product_code,
            product_name,
            size,
            price,
        } => format!(
            "{product_name} (code {product_code}) costs {} for {size}.",
            format_amount(price, &lookup.currency)
        ),
        LookupOutcome::UnknownPack {
            product_code,
            product_name,
            available_sizes,
        } => format!(
            "I couldn't find the size \"{}\" for {product_name} (code {product_code}). Available sizes are: {}.",
            lookup.requested_size,
            available_sizes.join(", ")
        ),
        LookupOutcome::MissingFields { available_sizes, .. } if !available_sizes.is_empty() => format!(
            "Which size of {}? Available sizes are: {}.",
            lookup.requested_code,
            available_sizes.join(", ")
        ),
        LookupOutcome::MissingFields { .. } => HELP_REPLY.to_string(),
        LookupOutcome::UnknownCode => format!(
            "I couldn't find a product with the code \"{}\".",
            lookup.requested_code
        ),
    }
}

/// Question-and-answer loop until `exit`, `quit` or end of input.
pub fn run_chat<R: BufRead, W: Write>(catalogue: &Catalogue, mut input: R, mut output: W) -> Result<()> {
    writeln!(output, "Paint Assistant Chatbot")?;
    writeln!(
        output,
        "Ask me about a product or a price. Type 'exit' or 'quit' to leave.\n"
    )?;

    loop {
        write!(output, "You: ")?;
        output.flush()?;
        let mut buf = String::new();
        if input.read_line(&mut buf)? == 0 {
            writeln!(output)?;
            return Ok(());
        }
        let message = buf.trim();
        if message.eq_ignore_ascii_case("exit") || message.eq_ignore_ascii_case("quit") {
            writeln!(output, "Assistant: Goodbye!")?;
            return Ok(());
        }
        writeln!(output, "Assistant: {}", respond_to(catalogue, message))?;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PRODUCTS: &str = r#"[
        {"code": "A119", "name": "National Acrylic Primer (W.B.)",
         "description": "Water based primer", "uses": "Masonry", "advantages": "Quick drying"},
        {"code": "C101", "name": "NP Colorant"}
    ]"#;

    const PRICES: &str = r#"{"currency": "AED", "product_categories": [{"category_name": "Paints", "subcategories": [{"products": [
        {"product_code": "A119", "prices": [{"size": "18 Ltr (Drum)", "price": 80}, {"size": "3.6 Ltr (Gallon)", "price": 22}]},
        {"product_code": "C101", "prices": [{"size": "1 Ltr (Tin)", "price": "1,250/-"}]}
    ]}]}]}"#;

    fn catalogue() -> Catalogue {
        Catalogue::from_documents(PRODUCTS, PRICES).unwrap()
    }

    #[test]
    fn describes_products_by_name() {
        let reply = respond_to(&catalogue(), "Tell me about national acrylic primer!");
        assert_eq!(
            reply,
            "National Acrylic Primer (W.B.)\nWater based primer\nUses: Masonry\nAdvantages: Quick drying"
        );
        assert_eq!(
            respond_to(&catalogue(), "TELL ME ABOUT np colorant"),
            "NP Colorant\nNo summary is available for this product."
        );
        assert_eq!(
            respond_to(&catalogue(), "tell me about Unicorn Gloss?"),
            "I couldn't find a product named \"Unicorn Gloss\"."
        );
    }

    #[test]
    fn quotes_prices_by_code_and_size() {
        let cat = catalogue();
        assert_eq!(
            respond_to(&cat, "How much is a119 in 18 ltr (drum)?"),
            "National Acrylic Primer (W.B.) (code A119) costs AED 80.00 for 18 Ltr (Drum)."
        );
        assert_eq!(
            respond_to(&cat, "how much is C101 in 1 Ltr (Tin)"),
            "NP Colorant (code C101) costs AED 1,250.00 for 1 Ltr (Tin)."
        );
        assert_eq!(
            respond_to(&cat, "How much is A119 in 5 Ltr?"),
            "I couldn't find the size \"5 Ltr\" for National Acrylic Primer (W.B.) (code A119). Available sizes are: 18 Ltr (Drum), 3.6 Ltr (Gallon)."
        );
        assert_eq!(
            respond_to(&cat, "How much is Z999 in 1 Ltr?"),
            "I couldn't find a product with the code \"Z999\"."
        );
    }

    #[test]
    fn empty_and_unrecognised_messages() {
        let cat = catalogue();
        assert_eq!(respond_to(&cat, "   "), EMPTY_REPLY);
        assert_eq!(respond_to(&cat, "what colours do you have"), HELP_REPLY);
        assert!(HELP_REPLY.contains("Tell me about <product name>"));
    }

    #[test]
    fn session_runs_until_exit() {
        let mut out = Vec::new();
        run_chat(
            &catalogue(),
            "how much is c101 in 1 ltr (tin)\n\nQUIT\ntell me about np colorant\n".as_bytes(),
            &mut out,
        )
        .unwrap();
        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("Assistant: NP Colorant (code C101) costs AED 1,250.00"));
        assert!(out.contains(&format!("Assistant: {EMPTY_REPLY}")));
        assert!(out.ends_with("Assistant: Goodbye!\n"));
        assert!(!out.contains("No summary"));
    }

    #[test]
    fn session_ends_at_end_of_input() {
        let mut out = Vec::new();
        run_chat(&catalogue(), "tell me about np colorant".as_bytes(), &mut out).unwrap();
        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("Assistant: NP Colorant\n"));
        assert!(!out.contains("Goodbye"));
    }
}
