//! Built-in scenes for the demo binary and the test suite.

use crate::core::color::Color;
use crate::core::common::Float;
use crate::core::geometry::{Point3f, Triangle};

/// Splits the quad (p00, p10, p11, p01) into two triangles sharing the
/// diagonal p00-p11. The winding of the corners determines the normal of
/// both triangles.
///
/// * `p00`      - First corner.
/// * `p10`      - Second corner.
/// * `p11`      - Third corner.
/// * `p01`      - Fourth corner.
/// * `emissive` - Intrinsic emissive color.
/// * `diffuse`  - Diffuse reflectivity.
pub fn quad(
    p00: Point3f,
    p10: Point3f,
    p11: Point3f,
    p01: Point3f,
    emissive: Color,
    diffuse: Color,
) -> [Triangle; 2] {
    [
        Triangle::new(p00, p10, p11, emissive, diffuse),
        Triangle::new(p00, p11, p01, emissive, diffuse),
    ]
}

/// A Cornell-style unit box: white floor, ceiling and back wall, a red wall
/// at x = 0, a green wall at x = 1, an open front, and a white area light
/// just below the ceiling. All normals face the interior.
pub fn cornell_box() -> Vec<Triangle> {
    let white = Color::new(0.75, 0.75, 0.75);
    let red = Color::new(0.75, 0.0, 0.0);
    let green = Color::new(0.0, 0.75, 0.0);
    let black = Color::black();

    let p = |x: Float, y: Float, z: Float| Point3f::new(x, y, z);

    let mut tris = Vec::new();

    // Floor, normal +y.
    tris.extend(quad(
        p(0.0, 0.0, 0.0),
        p(0.0, 0.0, 1.0),
        p(1.0, 0.0, 1.0),
        p(1.0, 0.0, 0.0),
        black,
        white,
    ));
    // Ceiling, normal -y.
    tris.extend(quad(
        p(0.0, 1.0, 0.0),
        p(1.0, 1.0, 0.0),
        p(1.0, 1.0, 1.0),
        p(0.0, 1.0, 1.0),
        black,
        white,
    ));
    // Back wall, normal +z.
    tris.extend(quad(
        p(0.0, 0.0, 0.0),
        p(1.0, 0.0, 0.0),
        p(1.0, 1.0, 0.0),
        p(0.0, 1.0, 0.0),
        black,
        white,
    ));
    // Red wall at x = 0, normal +x.
    tris.extend(quad(
        p(0.0, 0.0, 0.0),
        p(0.0, 1.0, 0.0),
        p(0.0, 1.0, 1.0),
        p(0.0, 0.0, 1.0),
        black,
        red,
    ));
    // Green wall at x = 1, normal -x.
    tris.extend(quad(
        p(1.0, 0.0, 0.0),
        p(1.0, 0.0, 1.0),
        p(1.0, 1.0, 1.0),
        p(1.0, 1.0, 0.0),
        black,
        green,
    ));
    // Area light just below the ceiling, normal -y.
    tris.extend(quad(
        p(0.35, 0.99, 0.35),
        p(0.65, 0.99, 0.35),
        p(0.65, 0.99, 0.65),
        p(0.35, 0.99, 0.65),
        Color::new(1.0, 1.0, 1.0),
        black,
    ));

    tris
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
