//! Form factor estimation and integration.

use crate::accelerators::{Bvh, TriangleId};
use crate::core::common::{Float, INV_PI, PI};
use crate::core::geometry::{Triangle, Vector3f};
use crate::core::sampling::solid_angle;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

/// Strata per dimension used by the oracle; the sample count is the square.
const STRATA: usize = 4;

/// Cheap point-sample estimate of the form factor F(p ← q), used only to
/// drive refinement decisions. Both patches are collapsed to their
/// centroids; q contributes its full solid angle. The estimate is
/// asymmetric in general.
///
/// * `tri_p` - The gathering patch's triangle.
/// * `tri_q` - The shooting patch's triangle.
pub fn estimate_form_factor(tri_p: &Triangle, tri_q: &Triangle) -> Float {
    let p_mid = tri_p.centroid();
    let q_mid = tri_q.centroid();

    let cos_theta = tri_p.normal.dot(&(q_mid - p_mid).normalize());
    assert!(!cos_theta.is_nan(), "degenerate patch pair");
    if cos_theta <= 0.0 {
        return 0.0;
    }

    cos_theta * solid_angle(&p_mid, tri_q) * INV_PI
}

/// Visibility-aware form factor F(p ← q), integrated with stratified Monte
/// Carlo over deterministic jittered point pairs. Rays are cast against the
/// scene index; the shooter's root triangle is exempt from occlusion since
/// the sample points lie on it. Results are clamped into [0, 1].
///
/// * `tree`   - The scene index.
/// * `tri_p`  - The gathering patch's triangle.
/// * `tri_q`  - The shooting patch's triangle.
/// * `q_root` - Root triangle id of the shooting patch.
pub fn form_factor(tree: &Bvh, tri_p: &Triangle, tri_q: &Triangle, q_root: TriangleId) -> Float {
    // A fixed seed keeps the integration deterministic across runs, which
    // the solver relies on for reproducible solutions.
    let mut rng = Pcg32::seed_from_u64(0x853c_49e6_748f_ea9b);

    let n_p = Vector3f::from(tri_p.normal);
    let n_q = Vector3f::from(tri_q.normal);

    let inv_strata = 1.0 / STRATA as Float;
    let mut sum = 0.0;
    for i in 0..STRATA {
        for j in 0..STRATA {
            let u1 = (i as Float + rng.gen::<Float>()) * inv_strata;
            let u2 = (j as Float + rng.gen::<Float>()) * inv_strata;
            let x = tri_p.sample_point(u1, u2);

            let v1 = (j as Float + rng.gen::<Float>()) * inv_strata;
            let v2 = (i as Float + rng.gen::<Float>()) * inv_strata;
            let y = tri_q.sample_point(v1, v2);

            let d = y - x;
            let r2 = d.length_squared();
            if r2 == 0.0 {
                continue;
            }
            let w = d / r2.sqrt();

            let cos_p = n_p.dot(&w);
            let cos_q = -n_q.dot(&w);
            if cos_p <= 0.0 || cos_q <= 0.0 {
                continue;
            }

            if !tree.unoccluded(x, y, q_root) {
                continue;
            }

            sum += cos_p * cos_q / (PI * r2);
        }
    }

    let factor = sum * tri_q.area() / (STRATA * STRATA) as Float;
    if factor > 1.0 {
        debug!("clamping form factor {factor} to 1");
        1.0
    } else {
        factor
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::color::Color;
    use crate::core::geometry::Point3f;
    use float_cmp::approx_eq;

    /// Unit right triangle in the y = `y` plane. `up` flips the winding so
    /// the normal points towards +y or -y.
    fn flat_triangle(y: Float, up: bool) -> Triangle {
        let p0 = Point3f::new(0.0, y, 0.0);
        let p1 = Point3f::new(1.0, y, 0.0);
        let p2 = Point3f::new(0.0, y, 1.0);
        let (a, b, c) = if up { (p0, p2, p1) } else { (p0, p1, p2) };
        Triangle::new(a, b, c, Color::black(), Color::new(0.5, 0.5, 0.5))
    }

    #[test]
    fn estimate_is_zero_below_horizon() {
        // Shooter behind the gatherer's plane.
        let p = flat_triangle(0.0, true);
        let q = flat_triangle(-1.0, false);
        assert_eq!(estimate_form_factor(&p, &q), 0.0);
    }

    #[test]
    fn estimate_is_symmetric_for_mirrored_pair() {
        let p = flat_triangle(0.0, true);
        let q = flat_triangle(2.0, false);
        let f_pq = estimate_form_factor(&p, &q);
        let f_qp = estimate_form_factor(&q, &p);
        assert!(f_pq > 0.0);
        assert!(approx_eq!(Float, f_pq, f_qp, epsilon = 1e-5));
    }

    #[test]
    fn estimate_decreases_with_distance() {
        let p = flat_triangle(0.0, true);
        let near = flat_triangle(1.0, false);
        let far = flat_triangle(4.0, false);
        assert!(estimate_form_factor(&p, &near) > estimate_form_factor(&p, &far));
    }

    #[test]
    fn oracle_obeys_reciprocity_for_equal_areas() {
        let p = flat_triangle(0.0, true);
        let q = flat_triangle(2.0, false);
        let tree = Bvh::new(vec![p, q]);

        let f_pq = form_factor(&tree, &p, &q, 1);
        let f_qp = form_factor(&tree, &q, &p, 0);
        assert!(f_pq > 0.0);

        // Equal areas: F_pq * A_p == F_qp * A_q reduces to F_pq == F_qp.
        // Monte Carlo noise bounds the achievable tolerance.
        let diff = (f_pq - f_qp).abs();
        assert!(diff / f_pq.max(f_qp) < 0.2, "f_pq={f_pq} f_qp={f_qp}");
    }

    #[test]
    fn oracle_is_deterministic() {
        let p = flat_triangle(0.0, true);
        let q = flat_triangle(2.0, false);
        let tree = Bvh::new(vec![p, q]);
        assert_eq!(form_factor(&tree, &p, &q, 1), form_factor(&tree, &p, &q, 1));
    }

    #[test]
    fn oracle_is_zero_for_facing_away_pair() {
        let p = flat_triangle(0.0, true);
        let q = flat_triangle(2.0, true); // facing away from p
        let tree = Bvh::new(vec![p, q]);
        assert_eq!(form_factor(&tree, &p, &q, 1), 0.0);
    }

    #[test]
    fn occluder_blocks_transfer() {
        let p = flat_triangle(0.0, true);
        let q = flat_triangle(2.0, false);
        // A large blocking square between the two.
        let b0 = Point3f::new(-10.0, 1.0, -10.0);
        let b1 = Point3f::new(10.0, 1.0, -10.0);
        let b2 = Point3f::new(10.0, 1.0, 10.0);
        let b3 = Point3f::new(-10.0, 1.0, 10.0);
        let blocker = [
            Triangle::new(b0, b1, b2, Color::black(), Color::black()),
            Triangle::new(b0, b2, b3, Color::black(), Color::black()),
        ];
        let tree = Bvh::new(vec![p, q, blocker[0], blocker[1]]);

        assert_eq!(form_factor(&tree, &p, &q, 1), 0.0);
    }
}
