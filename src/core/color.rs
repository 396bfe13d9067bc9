//! RGB radiometric color

#![allow(dead_code)]
use crate::core::common::{clamp, Float};
use std::iter::Sum;
use std::ops::{Add, AddAssign, Div, Mul, Sub};

/// A linear RGB triple used for emission, reflectivity and radiosity values.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Color {
    /// Red channel.
    pub r: Float,

    /// Green channel.
    pub g: Float,

    /// Blue channel.
    pub b: Float,
}

impl Color {
    /// Create a new color.
    ///
    /// * `r` - Red channel.
    /// * `g` - Green channel.
    /// * `b` - Blue channel.
    pub fn new(r: Float, g: Float, b: Float) -> Self {
        Self { r, g, b }
    }

    /// Returns black.
    pub fn black() -> Self {
        Self::default()
    }

    /// Returns true if all channels are zero.
    pub fn is_black(&self) -> bool {
        self.r == 0.0 && self.g == 0.0 && self.b == 0.0
    }

    /// Returns true if any channel is NaN.
    pub fn has_nans(&self) -> bool {
        self.r.is_nan() || self.g.is_nan() || self.b.is_nan()
    }

    /// Returns the largest channel value (the L∞ norm for nonnegative
    /// radiometric values).
    pub fn max_component(&self) -> Float {
        self.r.max(self.g).max(self.b)
    }

    /// Clamps every channel into `[low, high]`.
    ///
    /// * `low`  - Lower bound.
    /// * `high` - Upper bound.
    pub fn clamp(&self, low: Float, high: Float) -> Self {
        Self::new(
            clamp(self.r, low, high),
            clamp(self.g, low, high),
            clamp(self.b, low, high),
        )
    }
}

impl Add for Color {
    type Output = Self;

    /// Adds the corresponding channels of another color.
    ///
    /// * `other` - The other color.
    fn add(self, other: Self) -> Self::Output {
        Self::Output::new(self.r + other.r, self.g + other.g, self.b + other.b)
    }
}

impl AddAssign for Color {
    /// Performs the `+=` operation.
    ///
    /// * `other` - The other color.
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

impl Sub for Color {
    type Output = Self;

    /// Subtracts the corresponding channels of another color.
    ///
    /// * `other` - The other color.
    fn sub(self, other: Self) -> Self::Output {
        Self::Output::new(self.r - other.r, self.g - other.g, self.b - other.b)
    }
}

impl Mul for Color {
    type Output = Self;

    /// Channel-wise product; used to apply reflectivity to gathered
    /// radiosity.
    ///
    /// * `other` - The other color.
    fn mul(self, other: Self) -> Self::Output {
        Self::Output::new(self.r * other.r, self.g * other.g, self.b * other.b)
    }
}

impl Mul<Float> for Color {
    type Output = Self;

    /// Scale every channel.
    ///
    /// * `f` - The scaling factor.
    fn mul(self, f: Float) -> Self::Output {
        Self::Output::new(self.r * f, self.g * f, self.b * f)
    }
}

impl Mul<Color> for Float {
    type Output = Color;

    /// Scale every channel.
    ///
    /// * `c` - The color.
    fn mul(self, c: Color) -> Color {
        c * self
    }
}

impl Div<Float> for Color {
    type Output = Self;

    /// Scale every channel by 1/f.
    ///
    /// * `f` - The scaling factor.
    fn div(self, f: Float) -> Self::Output {
        debug_assert!(f != 0.0);
        self * (1.0 / f)
    }
}

impl Sum for Color {
    /// Sums an iterator of colors channel-wise.
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::black(), |acc, c| acc + c)
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn black_is_black() {
        assert!(Color::black().is_black());
        assert!(!Color::new(0.0, 0.1, 0.0).is_black());
    }

    prop_compose! {
        fn color_strategy()(
            r in 0.0..10.0f32,
            g in 0.0..10.0f32,
            b in 0.0..10.0f32
        ) -> Color {
            Color { r, g, b }
        }
    }

    proptest! {
        #[test]
        fn add_mul_channelwise(c1 in color_strategy(), c2 in color_strategy()) {
            prop_assert_eq!(c1 + c2, Color::new(c1.r + c2.r, c1.g + c2.g, c1.b + c2.b));
            prop_assert_eq!(c1 * c2, Color::new(c1.r * c2.r, c1.g * c2.g, c1.b * c2.b));
        }

        #[test]
        fn scalar_mul_commutes(c in color_strategy(), f in 0.0..10.0f32) {
            prop_assert_eq!(c * f, f * c);
        }

        #[test]
        fn max_component_is_linf(c in color_strategy()) {
            prop_assert!(c.max_component() >= c.r);
            prop_assert!(c.max_component() >= c.g);
            prop_assert!(c.max_component() >= c.b);
        }

        #[test]
        fn black_absorbs_products(c in color_strategy()) {
            prop_assert!((Color::black() * c).is_black());
        }
    }
}
