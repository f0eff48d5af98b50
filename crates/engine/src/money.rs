//! Display helpers for monetary amounts.
//!
//! Amounts are carried as `f64` through every computation and only rounded
//! here, when they are turned into text for the presentation layer.

use crate::RateTable;

/// Rounds to two decimals.
#[must_use]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Formats `amount` with the currency symbol, two decimals and `,` as the
/// thousands separator.
///
/// The sign is dropped: callers decide how to present negative values.
///
/// # Examples
///
/// ```rust
/// use engine::{RateTable, format_amount};
///
/// let rates = RateTable::supported();
/// assert_eq!(format_amount(1234.5, "EUR", &rates), "€1,234.50");
/// assert_eq!(format_amount(-3.0, "USD", &rates), "$3.00");
/// assert_eq!(format_amount(7.0, "SEK", &rates), "SEK7.00");
/// ```
pub fn format_amount(amount: f64, currency: &str, rates: &RateTable) -> String {
    let symbol = rates.symbol(currency);
    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = cents / 100;
    let fraction = cents % 100;
    format!("{symbol}{}.{fraction:02}", group_thousands(whole))
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
