//! Rays

#![allow(dead_code)]
use super::{Point3f, Vector3f};
use crate::core::common::Float;

/// A ray with an origin, a unit direction and a parametric extent.
#[derive(Copy, Clone, Debug)]
pub struct Ray {
    /// Origin.
    pub o: Point3f,

    /// Direction.
    pub d: Vector3f,

    /// Maximum extent of the ray along `d`.
    pub t_max: Float,
}

impl Ray {
    /// Create a new ray.
    ///
    /// * `o`     - Origin.
    /// * `d`     - Direction.
    /// * `t_max` - Maximum extent of the ray.
    pub fn new(o: Point3f, d: Vector3f, t_max: Float) -> Self {
        Self { o, d, t_max }
    }

    /// Returns the position along the ray at parameter `t`.
    ///
    /// * `t` - Parameter to evaluate.
    pub fn at(&self, t: Float) -> Point3f {
        self.o + self.d * t
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
