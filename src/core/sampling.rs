//! Sampling routines

use crate::core::common::Float;
use crate::core::geometry::{Point3f, Triangle};

/// Maps a uniform sample in [0, 1)² to barycentric coordinates (b0, b1) of a
/// uniformly distributed point on a triangle.
///
/// * `u1` - First sample dimension.
/// * `u2` - Second sample dimension.
#[inline]
pub fn uniform_sample_triangle(u1: Float, u2: Float) -> (Float, Float) {
    let su1 = u1.sqrt();
    (1.0 - su1, u2 * su1)
}

/// Returns the solid angle subtended by a triangle as seen from a point,
/// using the formula of Van Oosterom and Strackee. The result is in
/// [0, 2π].
///
/// * `o`   - View point.
/// * `tri` - The triangle.
pub fn solid_angle(o: &Point3f, tri: &Triangle) -> Float {
    let a = tri.p0 - *o;
    let b = tri.p1 - *o;
    let c = tri.p2 - *o;

    let la = a.length();
    let lb = b.length();
    let lc = c.length();

    let numer = a.dot(&b.cross(&c)).abs();
    let denom = la * lb * lc + a.dot(&b) * lc + a.dot(&c) * lb + b.dot(&c) * la;

    // atan2 keeps the result stable when the denominator goes negative,
    // which happens once the triangle subtends more than a hemisphere.
    2.0 * numer.atan2(denom)
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
