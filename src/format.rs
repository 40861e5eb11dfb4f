// Display formatting for money and dates shared by summaries and invoices

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};

/// Display symbol for an ISO currency code.
///
/// Known codes map to their symbol; anything else is shown as the code
/// followed by a space (`"KES "`).
pub fn currency_symbol(code: &str) -> String {
    match code.trim().to_uppercase().as_str() {
        "NGN" => "₦".to_string(),
        "USD" => "$".to_string(),
        "EUR" => "€".to_string(),
        "GBP" => "£".to_string(),
        "" => String::new(),
        other => format!("{} ", other),
    }
}

/// Format an amount with the currency symbol and thousands separators.
///
/// Whole amounts have no decimals (`₦15,000`); fractional amounts are
/// rounded to two places (`₦1,234.50`).
pub fn format_money(amount: Decimal, currency_code: &str) -> String {
    format!("{}{}", currency_symbol(currency_code), format_amount(amount))
}

/// Format an amount with thousands separators and no currency symbol.
pub fn format_amount(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let abs = rounded.abs();

    let whole = abs.trunc();
    let fraction = abs - whole;

    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push_str(&group_thousands(&whole.to_string()));

    if !fraction.is_zero() {
        // fraction is in [0.01, 0.99] after rounding
        let cents = (fraction * Decimal::ONE_HUNDRED).trunc();
        out.push_str(&format!(".{:0>2}", cents.to_string()));
    }

    out
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Long human-readable timestamp, e.g. `October 19, 2026, 02:05 PM`
pub fn format_date(date: &DateTime<Utc>) -> String {
    date.format("%B %-d, %Y, %I:%M %p").to_string()
}

/// Short date for invoice headers, e.g. `19 Oct 2026`
pub fn format_short_date(date: &DateTime<Utc>) -> String {
    date.format("%-d %b %Y").to_string()
}
