//! Numeric utilities: saturating conversions and budget arithmetic.
//!
//! Byte budgets are u64 throughout; intermediate products go through u128 so
//! percentage math never overflows or panics.

/// `value * numerator / denominator`, computed without overflow. A zero denominator yields 0.
#[inline]
#[must_use]
pub fn fraction_of(value: u64, numerator: u64, denominator: u64) -> u64 {
    if denominator == 0 {
        return 0;
    }
    u128_to_u64_saturating(u128::from(value) * u128::from(numerator) / u128::from(denominator))
}

#[inline]
#[must_use]
pub fn usize_to_u64(v: usize) -> u64 {
    u64::try_from(v).unwrap_or(u64::MAX)
}

#[inline]
#[must_use]
pub fn u128_to_u64_saturating(v: u128) -> u64 {
    u64::try_from(v).unwrap_or(u64::MAX)
}

/// Ratio helper for hit rates and utilization; 0.0 when the denominator is 0.
#[inline]
#[must_use]
pub fn ratio(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 { 0.0 } else { numerator as f64 / denominator as f64 }
}
