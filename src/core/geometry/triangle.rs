//! Scene triangles

use super::{Bounds3f, Normal3f, Point3f, Ray};
use crate::core::color::Color;
use crate::core::common::Float;
use crate::core::sampling::uniform_sample_triangle;

/// A triangle of the input scene together with its diffuse material. The
/// solver treats every surface as a Lambertian reflector with an optional
/// intrinsic emission.
#[derive(Copy, Clone, Debug)]
pub struct Triangle {
    /// First vertex position.
    pub p0: Point3f,

    /// Second vertex position.
    pub p1: Point3f,

    /// Third vertex position.
    pub p2: Point3f,

    /// Unit geometric normal, oriented by the winding (p0, p1, p2).
    pub normal: Normal3f,

    /// Intrinsic emissive color.
    pub emissive: Color,

    /// Diffuse reflectivity, each channel in [0, 1].
    pub diffuse: Color,
}

impl Triangle {
    /// Create a new triangle. Panics on degenerate geometry (zero area or a
    /// non-finite normal), which indicates an upstream contract violation.
    ///
    /// * `p0`       - First vertex position.
    /// * `p1`       - Second vertex position.
    /// * `p2`       - Third vertex position.
    /// * `emissive` - Intrinsic emissive color.
    /// * `diffuse`  - Diffuse reflectivity.
    pub fn new(p0: Point3f, p1: Point3f, p2: Point3f, emissive: Color, diffuse: Color) -> Self {
        let n = (p1 - p0).cross(&(p2 - p0));
        assert!(
            n.length_squared() > 0.0 && !n.has_nans(),
            "degenerate triangle {p0:?} {p1:?} {p2:?}"
        );

        Self {
            p0,
            p1,
            p2,
            normal: Normal3f::from(n.normalize()),
            emissive,
            diffuse,
        }
    }

    /// Returns the surface area of the triangle.
    pub fn area(&self) -> Float {
        0.5 * (self.p1 - self.p0).cross(&(self.p2 - self.p0)).length()
    }

    /// Returns the centroid of the triangle.
    pub fn centroid(&self) -> Point3f {
        (self.p0 + self.p1 + self.p2) * (1.0 / 3.0)
    }

    /// Returns the bounding box of the triangle.
    pub fn bounds(&self) -> Bounds3f {
        Bounds3f::empty()
            .union_point(&self.p0)
            .union_point(&self.p1)
            .union_point(&self.p2)
    }

    /// Maps a uniform sample in [0, 1)² to a uniformly distributed point on
    /// the triangle's surface.
    ///
    /// * `u1` - First sample dimension.
    /// * `u2` - Second sample dimension.
    pub fn sample_point(&self, u1: Float, u2: Float) -> Point3f {
        let (b0, b1) = uniform_sample_triangle(u1, u2);
        b0 * self.p0 + b1 * self.p1 + (1.0 - b0 - b1) * self.p2
    }

    /// Returns `true` if the ray intersects the triangle with a hit parameter
    /// in `(t_min, r.t_max)`.
    ///
    /// * `r`     - The ray.
    /// * `t_min` - Minimum accepted hit parameter.
    pub fn intersect_p(&self, r: &Ray, t_min: Float) -> bool {
        // Moeller-Trumbore test.
        let e1 = self.p1 - self.p0;
        let e2 = self.p2 - self.p0;
        let pv = r.d.cross(&e2);
        let det = e1.dot(&pv);
        if det.abs() < 1e-12 {
            return false;
        }

        let inv_det = 1.0 / det;
        let tv = r.o - self.p0;
        let b1 = tv.dot(&pv) * inv_det;
        if !(0.0..=1.0).contains(&b1) {
            return false;
        }

        let qv = tv.cross(&e1);
        let b2 = r.d.dot(&qv) * inv_det;
        if b2 < 0.0 || b1 + b2 > 1.0 {
            return false;
        }

        let t = e2.dot(&qv) * inv_det;
        t > t_min && t < r.t_max
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
