//! Fixed-point decimal rendering of integer amounts.
use bigdecimal::{num_bigint::BigInt, BigDecimal, RoundingMode, ToPrimitive};

/// Computes `amount * numerator / denominator` rounded to the nearest
/// integer, ties away from zero.
///
/// Returns `None` when `denominator` is zero or the result exceeds `u128`.
pub fn scale_round_half_up(amount: u128, numerator: u64, denominator: u64) -> Option<u128> {
    if denominator == 0 {
        return None;
    }
    let scaled =
        BigDecimal::from(amount) * BigDecimal::from(numerator) / BigDecimal::from(denominator);
    scaled.with_scale_round(0, RoundingMode::HalfUp).to_u128()
}

/// Formats `amount` (expressed in units of `10^-decimals`) with exactly
/// `digits` fraction digits, rounding half-up.
///
/// `format_units_half_up(5_000_000_000, 9, 4)` yields `"5.0000"`.
pub fn format_units_half_up(amount: u128, decimals: u32, digits: u32) -> String {
    BigDecimal::new(BigInt::from(amount), i64::from(decimals))
        .with_scale_round(i64::from(digits), RoundingMode::HalfUp)
        .to_plain_string()
}
