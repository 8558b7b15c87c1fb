//! Decimal helpers shared by the calculator and the exporters.
//!
//! Amounts are carried at full precision through every calculation. They are
//! rounded to two decimal places, half away from zero, only when they leave
//! the core (exports, tables, printed summaries).

use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

/// Decimal places used for displayed and exported amounts.
pub const MONEY_DP: u32 = 2;

/// Largest accepted unit price (1,000,000,000). Together with
/// `quote::MAX_QUANTITY` this keeps every line amount far inside `Decimal`'s
/// range, so the calculator never overflows.
pub const MAX_UNIT_PRICE: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

/// Round an amount for display or export.
pub fn round_money(value: Decimal) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(MONEY_DP, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(MONEY_DP);
    rounded
}

/// Format an amount as `AED 1,234.50`.
pub fn format_amount(value: Decimal, currency: &str) -> String {
    let text = round_money(value).to_string();
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.as_str()),
    };
    let (whole, frac) = digits.split_once('.').unwrap_or((digits, "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if negative { "-" } else { "" };
    if currency.is_empty() {
        format!("{sign}{grouped}.{frac}")
    } else {
        format!("{currency} {sign}{grouped}.{frac}")
    }
}

/// Render a percentage without trailing zeros (`12.50` -> `12.5`).
pub fn format_percent(value: Decimal) -> String {
    value.normalize().to_string()
}

/// Parse a price as written in price lists: `78`, `78.50`, `1,250`, `78/-`
/// or `AED 78/-`.
pub fn parse_price(raw: &str) -> Option<Decimal> {
    let mut text = raw.trim();
    if let Some(rest) = text.strip_suffix("/-") {
        text = rest.trim_end();
    }
    let text = text.trim_start_matches(|c: char| c.is_ascii_alphabetic()).trim();
    if text.is_empty() {
        return None;
    }
    let cleaned: String = text.chars().filter(|c| *c != ',').collect();
    Decimal::from_str(&cleaned).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn rounds_half_away_from_zero() {
        assert_eq!(round_money(d("5.005")).to_string(), "5.01");
        assert_eq!(round_money(d("105.105")).to_string(), "105.11");
        assert_eq!(round_money(d("240")).to_string(), "240.00");
        assert_eq!(round_money(d("-0.125")).to_string(), "-0.13");
    }

    #[test]
    fn formats_grouped_amounts() {
        assert_eq!(format_amount(d("1234567.5"), "AED"), "AED 1,234,567.50");
        assert_eq!(format_amount(d("226.8"), "AED"), "AED 226.80");
        assert_eq!(format_amount(d("0"), ""), "0.00");
        assert_eq!(format_amount(d("-1000"), "AED"), "AED -1,000.00");
    }

    #[test]
    fn formats_percentages() {
        assert_eq!(format_percent(d("10.00")), "10");
        assert_eq!(format_percent(d("12.50")), "12.5");
    }

    #[test]
    fn parses_price_list_notation() {
        assert_eq!(parse_price("78/-"), Some(d("78")));
        assert_eq!(parse_price("AED 78/-"), Some(d("78")));
        assert_eq!(parse_price(" 1,250.75 "), Some(d("1250.75")));
        assert_eq!(parse_price("call us"), None);
        assert_eq!(parse_price(""), None);
    }
}
