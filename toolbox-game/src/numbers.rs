//! Numeric conversion helpers centralizing safe numeric casts.

use num_traits::cast::cast;

/// Clamp a f32 into `[0.0, 1.0]`, returning 0.0 for NaN.
#[must_use]
pub fn clamp_unit_f32(value: f32) -> f32 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 1.0)
}

/// Clamp an i64 into the u32 range.
#[must_use]
pub fn clamp_i64_to_u32(value: i64) -> u32 {
    let clamped = value.clamp(0, i64::from(u32::MAX));
    cast::<i64, u32>(clamped).unwrap_or(u32::MAX)
}

/// `part / whole` as a rounded percentage in `[0, 100]`; 0 when `whole` is 0.
#[must_use]
pub fn ratio_pct(part: usize, whole: usize) -> u32 {
    if whole == 0 {
        return 0;
    }
    let part = cast::<usize, f64>(part.min(whole)).unwrap_or(0.0);
    let whole = cast::<usize, f64>(whole).unwrap_or(1.0);
    let pct = (part / whole * 100.0).round();
    cast::<f64, u32>(pct).unwrap_or(0)
}

/// Convert milliseconds to fractional seconds for tone scheduling.
#[must_use]
pub fn millis_to_secs(millis: u32) -> f32 {
    let secs = f64::from(millis) / 1000.0;
    cast::<f64, f32>(secs).unwrap_or(0.0)
}
