use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

/// Optional `$`, then a digit-led run of digits and thousands separators.
fn price_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\$?(\d[\d,]*)").expect("price pattern is valid"))
}

/// Parse the first dollar amount in a price display string
///
/// `"$1,500"` and `"$1,500/month"` both yield `Some(1500)`. Strings with no
/// digits (`"Contact for price"`) yield `None`.
pub fn parse_price(display: &str) -> Option<u64> {
    let captures = price_pattern().captures(display)?;
    let digits: String = captures[1].chars().filter(|c| *c != ',').collect();
    digits.parse().ok()
}

/// Numeric price used for sorting; `0` when nothing parses
#[inline]
pub fn extract_price(display: &str) -> u64 {
    parse_price(display).unwrap_or(0)
}

/// Collapse "whole+partial" bedroom notation into a single count
///
/// `"2+1"` becomes `"3"`. Values without a `+` come back unchanged. Only the
/// first two segments are summed, so `"1+1+1"` gives `"2"`. Each segment is
/// coerced leniently: anything non-numeric counts as zero.
pub fn sum_bedroom_notation(value: &str) -> String {
    if !value.contains('+') {
        return value.to_string();
    }

    let mut parts = value.split('+');
    let whole = parts.next().map_or(0.0, lenient_number);
    let partial = parts.next().map_or(0.0, lenient_number);
    format_count(whole + partial)
}

/// Integer bedroom count for sorting, after summing the notation
///
/// Reads the leading digits only, so `"3 beds"` counts as 3. Unparsable → 0.
pub fn bedroom_count(raw: &str) -> u32 {
    let summed = sum_bedroom_notation(raw);
    let digits: String = summed
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().unwrap_or(0)
}

/// Coerce a loosely typed coordinate to a finite float
///
/// Accepts JSON numbers and numeric strings. Returns `None` for anything
/// missing, malformed, or non-finite.
pub fn parse_coordinate(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

/// Coerce a scalar field to display text
///
/// Empty strings, nulls and structured values all come back as `None`.
pub fn coerce_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Split an amenities field into tags
///
/// Upstream sends either a comma separated string or an array of strings.
pub fn split_amenities(value: &Value) -> Vec<String> {
    match value {
        Value::String(s) => s
            .split(',')
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
            .map(str::to_string)
            .collect(),
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

fn lenient_number(part: &str) -> f64 {
    let trimmed = part.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    trimmed
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .unwrap_or(0.0)
}

fn format_count(total: f64) -> String {
    if total.fract() == 0.0 {
        format!("{}", total as i64)
    } else {
        total.to_string()
    }
}
