//! Floating-point comparison helpers shared by every component.
//!
//! Monetary sums accumulate rounding error, so fill completion and
//! tick-grid checks must never use exact equality. All tolerances in the
//! engine go through these two functions so no component picks its own
//! informal epsilon.

/// Tolerance for monetary comparisons (fill completion, spend totals).
///
/// Chosen as well below the smallest unit of collateral anyone can spend
/// (0.01) while comfortably above accumulated f64 summation error across
/// a realistic fill list.
pub const FILL_EPSILON: f64 = 1e-7;

/// Tolerance for price-grid checks (limit probabilities on the 0.01 grid).
pub const TICK_EPSILON: f64 = 1e-9;

/// Whether `a` and `b` are equal within [`FILL_EPSILON`].
#[must_use]
pub fn floating_equal(a: f64, b: f64) -> bool {
    floating_equal_eps(a, b, FILL_EPSILON)
}

/// Whether `a` and `b` are equal within an explicit tolerance.
#[must_use]
pub fn floating_equal_eps(a: f64, b: f64, epsilon: f64) -> bool {
    (a - b).abs() < epsilon
}
