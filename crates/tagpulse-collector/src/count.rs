//! Engagement count parsing for abbreviated labels such as `1.2K` or `3M`.

/// Parses a human-readable engagement count into an integer.
///
/// Thousands separators and surrounding whitespace are stripped. A `K`
/// multiplies the preceding number by 1 000 and an `M` by 1 000 000, with
/// the product truncated toward zero. Plain integers parse directly.
///
/// Engagement counts are advisory, so any malformed input (including the
/// empty string and negative numbers) yields `0` instead of an error.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn parse_count(text: &str) -> u64 {
    let cleaned = text.replace(',', "");
    let cleaned = cleaned.trim();

    let (number, multiplier) = if cleaned.contains('K') {
        (cleaned.replace('K', ""), 1_000.0)
    } else if cleaned.contains('M') {
        (cleaned.replace('M', ""), 1_000_000.0)
    } else {
        return cleaned.parse::<u64>().unwrap_or(0);
    };

    match number.trim().parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 0.0 => (value * multiplier) as u64,
        _ => 0,
    }
}
