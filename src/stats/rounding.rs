use rust_decimal::{Decimal, RoundingStrategy};

/// Largest number of decimal places a reported figure may be rounded to.
pub const MAX_ROUNDING_DIGITS: u32 = 15;

/// Rounds `value` to `digits` decimal places, halves away from zero.
///
/// The decision is taken on the decimal expansion of the stored binary value,
/// so `2.675` (stored as `2.67499999...`) rounds to `2.67`. Values beyond the
/// decimal range have no fractional part and come back unchanged. Negative
/// zero is normalized to `0.0` so that e.g. `-0.001` reports as `0.00`.
pub fn round_to(value: f64, digits: u32) -> f64 {
    // below half of the finest reportable step
    if value.abs() < 1e-16 {
        return 0.0;
    }
    let Some(exact) = Decimal::from_f64_retain(value) else {
        return value;
    };
    let rounded = exact
        .round_dp_with_strategy(
            digits.min(MAX_ROUNDING_DIGITS),
            RoundingStrategy::MidpointAwayFromZero,
        )
        .to_string()
        .parse::<f64>()
        .unwrap_or(value);
    if rounded == 0.0 { 0.0 } else { rounded }
}

/// Formats an already rounded figure with exactly `digits` decimals.
pub fn format_fixed(value: f64, digits: u32) -> String {
    format!("{:.*}", digits as usize, value)
}
