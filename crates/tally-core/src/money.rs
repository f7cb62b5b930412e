//! Boundary helpers for monetary values: lenient parsing and Thai display formatting.

use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer};

/// Fraction digits used for line amounts.
pub const LINE_DIGITS: u32 = 2;

/// Fraction digits used for headline totals.
pub const HEADLINE_DIGITS: u32 = 0;

/// Parse a form value, falling back to zero for blank or malformed input.
///
/// Mirrors what the entry forms have always done: anything that is not a
/// number silently becomes `0`.
pub fn parse_or_zero(s: &str) -> Decimal {
    parse_or(s, Decimal::ZERO)
}

/// Parse a form value, falling back to `default` when the result is blank,
/// malformed or zero (used for quantities that default to 1).
pub fn parse_or(s: &str, default: Decimal) -> Decimal {
    match try_parse(s) {
        Some(value) if !value.is_zero() => value,
        _ => default,
    }
}

/// Parse a form value strictly: `None` for blank or malformed input.
///
/// Accepts a leading `+` and scientific notation.
pub fn try_parse(s: &str) -> Option<Decimal> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    let s = s.strip_prefix('+').unwrap_or(s);

    Decimal::from_str(s)
        .ok()
        .or_else(|| Decimal::from_scientific(s).ok())
}

/// Round for display, halves away from zero.
pub fn round_display(amount: Decimal, digits: u32) -> Decimal {
    amount.round_dp_with_strategy(digits, RoundingStrategy::MidpointAwayFromZero)
}

/// Format an amount the way the Thai locale does (1,234.56).
pub fn format_thai(amount: Decimal, digits: u32) -> String {
    let rounded = round_display(amount, digits);
    let s = format!("{:.*}", digits as usize, rounded.abs());

    let (integer_part, fraction_part) = match s.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (s.as_str(), None),
    };

    let chars: Vec<char> = integer_part.chars().collect();
    let mut formatted = String::new();
    if rounded.is_sign_negative() && !rounded.is_zero() {
        formatted.push('-');
    }
    for (i, c) in chars.iter().enumerate() {
        if i > 0 && (chars.len() - i) % 3 == 0 {
            formatted.push(',');
        }
        formatted.push(*c);
    }

    match fraction_part {
        Some(f) => format!("{}.{}", formatted, f),
        None => formatted,
    }
}

/// Format with the baht sign (฿1,234.56).
pub fn format_baht(amount: Decimal, digits: u32) -> String {
    let s = format_thai(amount, digits);
    match s.strip_prefix('-') {
        Some(rest) => format!("-฿{}", rest),
        None => format!("฿{}", s),
    }
}

/// Serde helper for numeric columns: `null`, strings and numbers are all
/// accepted, anything unparseable becomes zero.
pub fn de_or_zero<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => parse_or_zero(&n.to_string()),
        Some(serde_json::Value::String(s)) => parse_or_zero(&s),
        _ => Decimal::ZERO,
    })
}

/// Like [`de_or_zero`] but falls back to one (quantities).
pub fn de_or_one<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let value = de_or_zero(deserializer)?;
    Ok(if value.is_zero() { Decimal::ONE } else { value })
}

pub(crate) fn one() -> Decimal {
    Decimal::ONE
}
