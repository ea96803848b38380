//! Two-anchor trilateration via the law of cosines.
//!
//! With anchor B at the origin and anchor A at `(c, 0)`:
//!
//! cos α = (b² + c² − a²) / (2·b·c)
//! x = b·cos α,  y = b·√(1 − cos²α)
//!
//! where `a`, `b` are the ranges to A and B and `c` the baseline. If the
//! ranges violate the triangle inequality, `1 − cos²α` is clamped to zero
//! and the result lands on the baseline axis.

use nalgebra::Vector2;

/// Locate a tag from its range to anchor A (`range_a`), its range to anchor
/// B (`range_b`, the origin anchor) and the anchor separation `baseline`.
///
/// Both `range_b` and `baseline` must be non-zero; callers only invoke this
/// once both ranges are valid and the baseline has been validated.
pub fn locate(range_a: f64, range_b: f64, baseline: f64) -> Vector2<f64> {
    let cos_a = (range_b * range_b + baseline * baseline - range_a * range_a)
        / (2.0 * range_b * baseline);
    let x = range_b * cos_a;
    let y = range_b * (1.0 - cos_a * cos_a).max(0.0).sqrt();
    Vector2::new(x, y)
}
