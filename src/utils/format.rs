//! Currency-aware number formatting for report labels.

use thousands::policies::{COMMA_SEPARATOR, DOT_SEPARATOR};
use thousands::{Separable, SeparatorPolicy};

use crate::models::CurrencyCode;

/// Groups an integer with commas: `1000` becomes `"1,000"`.
pub fn format_number(value: i64) -> String {
    value.separate_with_commas()
}

/// Formats an amount with the separators the currency is usually quoted with.
///
/// Whole amounts print without decimals; anything else is rounded to cents.
pub fn format_amount(value: f64, currency: CurrencyCode) -> String {
    let cents = (value.abs() * 100.0).round() as u64;
    let whole = cents / 100;
    let fraction = cents % 100;

    let mut out = String::new();
    if value < 0.0 && cents > 0 {
        out.push('-');
    }
    out.push_str(&whole.separate_by_policy(grouping_policy(currency)));
    if fraction > 0 {
        out.push(currency.decimal_separator());
        out.push_str(&format!("{:02}", fraction));
    }
    out
}

/// `format_amount` followed by the currency code, e.g. `"150.000 ARS"`.
pub fn format_price(value: f64, currency: CurrencyCode) -> String {
    format!("{} {}", format_amount(value, currency), currency)
}

fn grouping_policy(currency: CurrencyCode) -> SeparatorPolicy<'static> {
    match currency.thousands_separator() {
        '.' => DOT_SEPARATOR,
        _ => COMMA_SEPARATOR,
    }
}
