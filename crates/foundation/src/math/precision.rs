//! Precision policies.
//!
//! Deterministic handling of floats that end up in keys or comparisons:
//! - `canonical_f64` folds `-0.0` and NaN payloads.
//! - `within_tolerance` compares two values with an absolute tolerance, so
//!   float noise never separates values that should be considered equal.

/// Canonicalize a floating-point value for deterministic ordering.
///
/// Rules:
/// - `-0.0` becomes `0.0`
/// - all NaNs become a single canonical NaN
pub fn canonical_f64(v: f64) -> f64 {
    if v == 0.0 {
        // Handles +0.0 and -0.0.
        0.0
    } else if v.is_nan() {
        f64::NAN
    } else {
        v
    }
}

/// True when `|a - b| <= tolerance`.
///
/// Non-finite values only match the same canonical value. A non-positive or
/// NaN `tolerance` means exact comparison.
pub fn within_tolerance(a: f64, b: f64, tolerance: f64) -> bool {
    let (a, b) = (canonical_f64(a), canonical_f64(b));
    if !a.is_finite() || !b.is_finite() {
        return a.to_bits() == b.to_bits();
    }
    if tolerance.is_nan() || tolerance <= 0.0 {
        return a == b;
    }
    (a - b).abs() <= tolerance
}
