//! Locale-aware number, currency and delta formatting.

use wowpulse_core::{CurrencyLocale, DeltaKind, DeltaResult, GlyphPosition};

/// Placeholder for an undefined delta.
pub const NOT_AVAILABLE: &str = "N/A";

/// Placeholder for a missing value.
pub const MISSING: &str = "-";

/// Round to `digits` decimals and group the integer part.
pub fn format_number(value: f64, locale: CurrencyLocale, digits: usize) -> String {
    let text = format!("{:.*}", digits, value.abs());
    let (int_part, frac_part) = match text.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (text.as_str(), None),
    };

    let mut out = String::with_capacity(text.len() + text.len() / 3 + 1);
    if value < 0.0 && !is_zero(&text) {
        out.push('-');
    }
    out.push_str(&group_digits(int_part, locale.group_separator()));
    if let Some(frac) = frac_part {
        out.push(locale.decimal_separator());
        out.push_str(frac);
    }
    out
}

/// Amount with the locale's glyph, grouping and minor-unit digits.
pub fn format_currency(value: f64, locale: CurrencyLocale) -> String {
    let amount = format_number(value.abs(), locale, locale.fraction_digits());
    let sign = if value < 0.0 && !is_zero(&amount) { "-" } else { "" };
    match locale.glyph_position() {
        GlyphPosition::Prefix => format!("{sign}{}{amount}", locale.glyph()),
        GlyphPosition::Suffix => format!("{sign}{amount} {}", locale.glyph()),
    }
}

/// Signed change, e.g. `+12.5%`, `-1.0%p`, `0.0%`, or `N/A`.
pub fn format_delta(delta: Option<f64>, kind: DeltaKind) -> String {
    let Some(delta) = delta else {
        return NOT_AVAILABLE.to_string();
    };
    let rounded = format!("{:.1}", delta);
    if is_zero(&rounded) {
        return format!("0.0{}", kind.unit());
    }
    let sign = if delta > 0.0 { "+" } else { "" };
    format!("{sign}{rounded}{}", kind.unit())
}

/// `(-33.3% ↓)`, or `(N/A)` when the delta is undefined.
pub fn delta_suffix(result: &DeltaResult) -> String {
    let text = format_delta(result.delta, result.metric.delta_kind());
    match result.trend.icon() {
        "" => format!("({text})"),
        icon => format!("({text} {icon})"),
    }
}

pub fn format_count(value: Option<f64>, locale: CurrencyLocale) -> String {
    value
        .map(|v| format_number(v, locale, 0))
        .unwrap_or_else(|| MISSING.to_string())
}

pub fn format_money(value: Option<f64>, locale: CurrencyLocale) -> String {
    value
        .map(|v| format_currency(v, locale))
        .unwrap_or_else(|| MISSING.to_string())
}

/// A percentage value (not a change), one decimal.
pub fn format_rate(value: Option<f64>) -> String {
    value
        .map(|v| format!("{:.1}%", v))
        .unwrap_or_else(|| MISSING.to_string())
}

fn group_digits(digits: &str, separator: char) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(separator);
        }
        out.push(ch);
    }
    out
}

fn is_zero(text: &str) -> bool {
    !text.chars().any(|c| c.is_ascii_digit() && c != '0')
}
