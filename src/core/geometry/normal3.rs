//! 3-D Normals

#![allow(dead_code)]
use super::Vector3;
use crate::core::common::Float;
use num_traits::Num;
use std::ops::{Add, Mul, Neg};

/// A 3-D normal containing numeric values. Normals are not necessarily of
/// unit length; they are a distinct type because they transform differently
/// from vectors.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Normal3<T> {
    /// X-coordinate.
    pub x: T,

    /// Y-coordinate.
    pub y: T,

    /// Z-coordinate.
    pub z: T,
}

/// 3-D normal containing `Float` values.
pub type Normal3f = Normal3<Float>;

impl<T: Num> Normal3<T> {
    /// Creates a new 3-D normal.
    ///
    /// * `x` - X-coordinate.
    /// * `y` - Y-coordinate.
    /// * `z` - Z-coordinate.
    pub fn new(x: T, y: T, z: T) -> Self {
        Self { x, y, z }
    }

    /// Returns true if either coordinate is NaN.
    pub fn has_nans(&self) -> bool
    where
        T: num_traits::Float,
    {
        self.x.is_nan() || self.y.is_nan() || self.z.is_nan()
    }

    /// Returns the square of the normal's length.
    pub fn length_squared(&self) -> T
    where
        T: Mul<Output = T> + Add<Output = T> + Copy,
    {
        self.x * self.x + self.y * self.y + self.z * self.z
    }

    /// Returns the normal's length.
    pub fn length(&self) -> T
    where
        T: num_traits::Float,
    {
        self.length_squared().sqrt()
    }

    /// Returns the unit normal.
    pub fn normalize(&self) -> Self
    where
        T: num_traits::Float,
    {
        let inv = T::one() / self.length();
        Self::new(self.x * inv, self.y * inv, self.z * inv)
    }

    /// Returns the dot product with a vector.
    ///
    /// * `v` - The vector.
    pub fn dot(&self, v: &Vector3<T>) -> T
    where
        T: Copy,
    {
        self.x * v.x + self.y * v.y + self.z * v.z
    }
}

impl<T: Num + Neg<Output = T>> Neg for Normal3<T> {
    type Output = Normal3<T>;

    /// Flip the normal's direction (scale by -1).
    fn neg(self) -> Self::Output {
        Self::Output::new(-self.x, -self.y, -self.z)
    }
}

impl<T> From<Vector3<T>> for Normal3<T> {
    /// Convert a 3-D vector to a 3-D normal.
    ///
    /// * `v` - 3-D vector.
    fn from(v: Vector3<T>) -> Self {
        Self {
            x: v.x,
            y: v.y,
            z: v.z,
        }
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    prop_vector3!(
        vector3_f32,
        f32,
        -100.0..100.0f32,
        -100.0..100.0f32,
        -100.0..100.0f32
    );

    proptest! {
        #[test]
        fn dot_matches_vector_dot(v1 in vector3_f32(), v2 in vector3_f32()) {
            let n = Normal3::from(v1);
            prop_assert_eq!(n.dot(&v2), v1.dot(&v2));
        }

        #[test]
        fn normalize_has_unit_length(
            v in vector3_f32().prop_filter("non-zero", |v| v.length() > 1e-3)
        ) {
            let n = Normal3::from(v).normalize();
            prop_assert!((n.length() - 1.0).abs() < 1e-4);
        }
    }
}
