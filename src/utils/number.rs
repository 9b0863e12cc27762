//! Parsing of human-formatted amounts.

use rust_decimal::Decimal;
use std::str::FromStr;

/// Parses an amount such as `"$1,299.99"`, `"1.299,99"` or `"1205"`.
///
/// The last `.` or `,` is the decimal separator when one or two digits
/// follow it; every other separator is a thousands separator. Anything that
/// is not a digit or a separator is ignored.
pub fn parse_decimal(text: &str) -> Option<Decimal> {
    let cleaned: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == ',')
        .collect();
    if !cleaned.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }

    let normalized = match cleaned.rfind(['.', ',']) {
        Some(pos) if (1..=2).contains(&(cleaned.len() - pos - 1)) => {
            let whole: String = cleaned[..pos].chars().filter(char::is_ascii_digit).collect();
            let whole = if whole.is_empty() { "0".to_string() } else { whole };
            format!("{}.{}", whole, &cleaned[pos + 1..])
        }
        _ => cleaned.chars().filter(char::is_ascii_digit).collect(),
    };

    Decimal::from_str(&normalized).ok()
}
