/// Trim and upper-case a user supplied symbol. Blank input yields `None`.
pub fn normalize_symbol(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_uppercase())
    }
}

/// Coerce a free-form numeric field into a non-negative whole number.
///
/// Blank, non-numeric, negative and non-finite input all collapse to 0;
/// fractional values are truncated.
pub fn coerce_non_negative(raw: &str) -> u64 {
    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() && value > 0.0 => value.trunc() as u64,
        _ => 0,
    }
}
