//! Number parsing and display formatting shared by every tool
//!
//! Tools keep their operands as display strings. These helpers are the
//! only place where text becomes `f64` and back, so every display agrees
//! on rounding and on what counts as "not a number".

/// Fractional digits kept for non-integral calculator results
pub const RESULT_DECIMALS: usize = 8;

/// Render a calculator result
///
/// Integral values render without a fractional part, anything else is
/// fixed to eight decimals with trailing zeros trimmed. Returns `None`
/// for NaN and infinities so callers can enter their error state.
pub fn format_result(value: f64) -> Option<String> {
    if !value.is_finite() {
        return None;
    }
    if value.fract() == 0.0 {
        // `{}` on an integral f64 prints no fraction; normalise -0
        let s = format!("{}", value);
        return Some(if s == "-0" { "0".to_string() } else { s });
    }
    let fixed = format!("{:.*}", RESULT_DECIMALS, value);
    Some(trim_fraction(&fixed))
}

/// Fixed-point rendering with exactly `decimals` fractional digits
pub fn format_fixed(value: f64, decimals: u32) -> String {
    let s = format!("{:.*}", decimals as usize, value);
    // Rounding can leave "-0.000"; a negative zero is never meaningful here
    if s.starts_with('-') && s[1..].chars().all(|c| c == '0' || c == '.') {
        s[1..].to_string()
    } else {
        s
    }
}

/// Drop trailing zeros (and a dangling point) from a fixed-point string
pub fn trim_fraction(s: &str) -> String {
    if !s.contains('.') {
        return s.to_string();
    }
    let trimmed = s.trim_end_matches('0').trim_end_matches('.');
    match trimmed {
        "" | "-" | "-0" => "0".to_string(),
        other => other.to_string(),
    }
}

/// Parse the longest numeric prefix of `text`
///
/// Accepts leading whitespace, an optional sign, digits with at most one
/// decimal point and an optional exponent. Trailing garbage is ignored
/// (`"12abc"` is 12). Returns `None` when no digits are found or the value
/// is not finite.
pub fn parse_leading_float(text: &str) -> Option<f64> {
    let s = text.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if end < bytes.len() && (bytes[end] == b'+' || bytes[end] == b'-') {
        end += 1;
    }

    let mut digits = 0;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
        digits += 1;
    }
    if end < bytes.len() && bytes[end] == b'.' {
        end += 1;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
            digits += 1;
        }
    }
    if digits == 0 {
        return None;
    }

    // Exponent only counts when at least one digit follows
    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && (bytes[exp_end] == b'+' || bytes[exp_end] == b'-') {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    s[..end].parse::<f64>().ok().filter(|v| v.is_finite())
}
