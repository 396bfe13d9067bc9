//! 3-D Axis Aligned Bounding Boxes

#![allow(dead_code)]
use super::{Point3f, Ray, Vector3f};
use crate::core::common::{max, min, Float, INFINITY};

/// A 3-D axis aligned bounding box.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Bounds3f {
    /// Minimum corner.
    pub p_min: Point3f,

    /// Maximum corner.
    pub p_max: Point3f,
}

impl Bounds3f {
    /// Create a new bounding box from two corner points.
    ///
    /// * `p1` - First corner.
    /// * `p2` - Second corner.
    pub fn new(p1: Point3f, p2: Point3f) -> Self {
        Self {
            p_min: Point3f::new(min(p1.x, p2.x), min(p1.y, p2.y), min(p1.z, p2.z)),
            p_max: Point3f::new(max(p1.x, p2.x), max(p1.y, p2.y), max(p1.z, p2.z)),
        }
    }

    /// Create an empty bounding box that can be grown with `union_*`.
    pub fn empty() -> Self {
        Self {
            p_min: Point3f::new(INFINITY, INFINITY, INFINITY),
            p_max: Point3f::new(-INFINITY, -INFINITY, -INFINITY),
        }
    }

    /// Returns the union with a point.
    ///
    /// * `p` - The point.
    pub fn union_point(&self, p: &Point3f) -> Self {
        Self {
            p_min: Point3f::new(
                min(self.p_min.x, p.x),
                min(self.p_min.y, p.y),
                min(self.p_min.z, p.z),
            ),
            p_max: Point3f::new(
                max(self.p_max.x, p.x),
                max(self.p_max.y, p.y),
                max(self.p_max.z, p.z),
            ),
        }
    }

    /// Returns the union with another bounding box.
    ///
    /// * `other` - The other bounding box.
    pub fn union(&self, other: &Self) -> Self {
        self.union_point(&other.p_min).union_point(&other.p_max)
    }

    /// Returns the vector from the minimum to the maximum corner.
    pub fn diagonal(&self) -> Vector3f {
        self.p_max - self.p_min
    }

    /// Returns the axis with the largest extent (0, 1 or 2).
    pub fn maximum_extent(&self) -> usize {
        let d = self.diagonal();
        if d.x > d.y && d.x > d.z {
            0
        } else if d.y > d.z {
            1
        } else {
            2
        }
    }

    /// Returns the centroid of the bounding box.
    pub fn centroid(&self) -> Point3f {
        0.5 * (self.p_min + self.p_max)
    }

    /// Slab test. Returns the parametric range where the ray overlaps the
    /// bounding box, or `None` when it misses.
    ///
    /// * `r` - The ray.
    pub fn intersect_p(&self, r: &Ray) -> Option<(Float, Float)> {
        let mut t0: Float = 0.0;
        let mut t1 = r.t_max;
        for axis in 0..3 {
            let inv_dir = 1.0 / r.d[axis];
            let mut t_near = (self.p_min[axis] - r.o[axis]) * inv_dir;
            let mut t_far = (self.p_max[axis] - r.o[axis]) * inv_dir;
            if t_near > t_far {
                std::mem::swap(&mut t_near, &mut t_far);
            }
            t0 = if t_near > t0 { t_near } else { t0 };
            t1 = if t_far < t1 { t_far } else { t1 };
            if t0 > t1 {
                return None;
            }
        }
        Some((t0, t1))
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn union_grows_from_empty() {
        let b = Bounds3f::empty()
            .union_point(&Point3f::new(1.0, 2.0, 3.0))
            .union_point(&Point3f::new(-1.0, 0.0, 5.0));
        assert_eq!(b.p_min, Point3f::new(-1.0, 0.0, 3.0));
        assert_eq!(b.p_max, Point3f::new(1.0, 2.0, 5.0));
    }

    #[test]
    fn maximum_extent_picks_longest_axis() {
        let b = Bounds3f::new(Point3f::new(0.0, 0.0, 0.0), Point3f::new(1.0, 3.0, 2.0));
        assert_eq!(b.maximum_extent(), 1);
    }

    #[test]
    fn ray_hits_box() {
        let b = Bounds3f::new(Point3f::new(-1.0, -1.0, -1.0), Point3f::new(1.0, 1.0, 1.0));
        let r = Ray::new(
            Point3f::new(0.0, 0.0, -5.0),
            Vector3f::new(0.0, 0.0, 1.0),
            100.0,
        );
        let (t0, t1) = b.intersect_p(&r).unwrap();
        assert!((t0 - 4.0).abs() < 1e-5);
        assert!((t1 - 6.0).abs() < 1e-5);
    }

    #[test]
    fn ray_misses_box() {
        let b = Bounds3f::new(Point3f::new(-1.0, -1.0, -1.0), Point3f::new(1.0, 1.0, 1.0));
        let r = Ray::new(
            Point3f::new(0.0, 5.0, -5.0),
            Vector3f::new(0.0, 0.0, 1.0),
            100.0,
        );
        assert!(b.intersect_p(&r).is_none());
    }
}
