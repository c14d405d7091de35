// Display formatting for extracted field values
use serde_json::Value;

use super::widget::FormatOptions;

const DEFAULT_FRACTION_DIGITS: u8 = 2;

/// Format a raw field value for display.
///
/// Exactly one of currency / percentage / fixed-decimals applies per call
/// (first matching option wins); a non-numeric value under any of them falls
/// back to the raw stringification.
pub fn format_value(value: Option<&Value>, options: &FormatOptions) -> String {
    let Some(value) = value else {
        return "N/A".to_string();
    };
    if value.is_null() {
        return "N/A".to_string();
    }

    if let Some(code) = &options.currency {
        if let Some(amount) = as_float(value) {
            let digits = options.decimal_places.unwrap_or(DEFAULT_FRACTION_DIGITS);
            return format_currency(amount, code, digits);
        }
    } else if options.percentage {
        if let Some(amount) = as_float(value) {
            let digits = usize::from(options.decimal_places.unwrap_or(DEFAULT_FRACTION_DIGITS));
            let scaled = amount * 100.0;
            return format!("{scaled:.digits$}%");
        }
    } else if let Some(decimal_places) = options.decimal_places {
        if let Some(amount) = as_float(value) {
            let digits = usize::from(decimal_places);
            return format!("{amount:.digits$}");
        }
    }

    stringify(value)
}

fn as_float(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn stringify(value: &Value) -> String {
    match value {
        // Bare string, not its JSON quoting
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn format_currency(amount: f64, code: &str, digits: u8) -> String {
    let digits = usize::from(digits);
    let magnitude = group_thousands(&format!("{:.digits$}", amount.abs()));
    let sign = if amount < 0.0 { "-" } else { "" };

    match currency_symbol(code) {
        Some(symbol) => format!("{sign}{symbol}{magnitude}"),
        None => format!("{sign}{code} {magnitude}"),
    }
}

fn currency_symbol(code: &str) -> Option<&'static str> {
    match code {
        "USD" => Some("$"),
        "EUR" => Some("\u{20ac}"),
        "GBP" => Some("\u{a3}"),
        "JPY" => Some("\u{a5}"),
        _ => None,
    }
}

fn group_thousands(magnitude: &str) -> String {
    let (int_part, frac_part) = match magnitude.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (magnitude, None),
    };

    let mut grouped = String::with_capacity(magnitude.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if let Some(frac) = frac_part {
        grouped.push('.');
        grouped.push_str(frac);
    }
    grouped
}
