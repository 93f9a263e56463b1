//! Display helpers for ranges and money.

use crate::models::Range;

/// Format a number the way an en-GB locale does: thousands grouped
/// with commas, at most three decimal places, trailing zeros dropped.
pub fn format_number(n: f64) -> String {
    if !n.is_finite() {
        return n.to_string();
    }
    let rounded = (n * 1000.0).round() / 1000.0;
    let sign = if rounded < 0.0 { "-" } else { "" };
    let text = format!("{:.3}", rounded.abs());
    let (whole, frac) = text.split_once('.').unwrap_or((text.as_str(), ""));
    let frac = frac.trim_end_matches('0');
    let grouped = group_thousands(whole);
    if frac.is_empty() {
        format!("{sign}{grouped}")
    } else {
        format!("{sign}{grouped}.{frac}")
    }
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Whole pounds, e.g. `£1,235`.
pub fn format_currency(amount: f64) -> String {
    let whole = amount.round();
    if whole < 0.0 {
        format!("-£{}", format_number(-whole))
    } else {
        format!("£{}", format_number(whole))
    }
}

pub fn format_range(range: Range, formatter: impl Fn(f64) -> String) -> String {
    format!("{} – {}", formatter(range[0]), formatter(range[1]))
}

pub fn format_price_range(range: Range) -> String {
    format_range(range, format_currency)
}

/// A pair of whole-pound amounts, as used for [`crate::models::FinalPricing`] bounds.
pub fn format_pounds_range(low: u64, high: u64) -> String {
    format_price_range([low as f64, high as f64])
}

/// Hours expressed as working days, rounded up to a tenth of a day.
pub fn hours_to_workdays(hours: f64, hours_per_day: f64) -> f64 {
    ((hours / hours_per_day) * 10.0).ceil() / 10.0
}

/// e.g. `20–30 hours (2.5–3.8 days)`.
pub fn format_labour_range(range: Range) -> String {
    let days = |hours: f64| hours_to_workdays(hours, crate::pricing::HOURS_PER_DAY);
    format!(
        "{}–{} hours ({}–{} days)",
        range[0],
        range[1],
        days(range[0]),
        days(range[1])
    )
}
