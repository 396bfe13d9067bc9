//! Bounding Volume Hierarchy scene index.

use crate::core::common::SHADOW_EPSILON;
use crate::core::geometry::{Bounds3f, Point3f, Ray, Triangle};
use std::ops::Index;

/// Identifier of a scene triangle; root triangles keep their input order.
pub type TriangleId = usize;

/// Maximum number of triangles stored in a leaf node.
const MAX_TRIS_PER_LEAF: usize = 4;

/// A flattened BVH node. Interior nodes store the index of their second
/// child (the first child immediately follows the node); leaves store a
/// range into the ordered triangle list.
#[derive(Copy, Clone)]
struct LinearNode {
    /// Bounds of everything below this node.
    bounds: Bounds3f,

    /// Second-child index for interior nodes; first-triangle offset for
    /// leaves.
    offset: usize,

    /// Number of triangles in a leaf; 0 for interior nodes.
    count: usize,
}

/// The scene index: a bounding volume hierarchy over the input triangles,
/// used to answer the visibility queries of the form-factor oracle.
pub struct Bvh {
    /// The scene triangles in input order. `TriangleId`s index this vector.
    triangles: Vec<Triangle>,

    /// Triangle ids ordered so that each leaf covers a contiguous range.
    ordered: Vec<TriangleId>,

    /// Flattened nodes in depth-first order.
    nodes: Vec<LinearNode>,
}

impl Bvh {
    /// Build the index over a set of scene triangles.
    ///
    /// * `triangles` - The scene triangles.
    pub fn new(triangles: Vec<Triangle>) -> Self {
        let mut bvh = Self {
            triangles,
            ordered: Vec::new(),
            nodes: Vec::new(),
        };

        if bvh.triangles.is_empty() {
            return bvh;
        }

        // (id, bounds, centroid) per triangle, reordered during the build.
        let mut info: Vec<(TriangleId, Bounds3f, Point3f)> = bvh
            .triangles
            .iter()
            .enumerate()
            .map(|(i, t)| (i, t.bounds(), t.centroid()))
            .collect();

        let n = info.len();
        bvh.ordered.reserve(n);
        bvh.build_range(&mut info, 0, n);

        info!(
            "BVH created with {} nodes for {} triangles",
            bvh.nodes.len(),
            n
        );

        bvh
    }

    /// Recursively build nodes for `info[start..end]` and return the index
    /// of the created node. Uses equal-counts splits on the axis with the
    /// largest centroid extent.
    fn build_range(
        &mut self,
        info: &mut [(TriangleId, Bounds3f, Point3f)],
        start: usize,
        end: usize,
    ) -> usize {
        let bounds = info[start..end]
            .iter()
            .fold(Bounds3f::empty(), |b, (_, tb, _)| b.union(tb));

        let count = end - start;
        let centroid_bounds = info[start..end]
            .iter()
            .fold(Bounds3f::empty(), |b, (_, _, c)| b.union_point(c));
        let axis = centroid_bounds.maximum_extent();

        // Degenerate centroid extents cannot be split.
        let splittable = centroid_bounds.p_max[axis] > centroid_bounds.p_min[axis];

        if count <= MAX_TRIS_PER_LEAF || !splittable {
            let offset = self.ordered.len();
            for (id, _, _) in &info[start..end] {
                self.ordered.push(*id);
            }
            self.nodes.push(LinearNode {
                bounds,
                offset,
                count,
            });
            return self.nodes.len() - 1;
        }

        let mid = (start + end) / 2;
        info[start..end].sort_unstable_by(|a, b| a.2[axis].partial_cmp(&b.2[axis]).unwrap());

        let node_index = self.nodes.len();
        self.nodes.push(LinearNode {
            bounds,
            offset: 0,
            count: 0,
        });
        self.build_range(info, start, mid);
        let second = self.build_range(info, mid, end);
        self.nodes[node_index].offset = second;
        node_index
    }

    /// Returns the number of scene triangles.
    pub fn num_triangles(&self) -> usize {
        self.triangles.len()
    }

    /// Returns the scene triangles in input order.
    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    /// Returns `true` when the open segment between two surface points is
    /// not blocked by scene geometry. The triangle identified by `exclude`
    /// is ignored, as are grazing hits within an epsilon of either endpoint.
    ///
    /// * `from`    - Segment start, on a surface.
    /// * `to`      - Segment end, on a surface.
    /// * `exclude` - Triangle id exempt from occlusion (the shooter's root).
    pub fn unoccluded(&self, from: Point3f, to: Point3f, exclude: TriangleId) -> bool {
        let d = to - from;
        let dist = d.length();
        if dist <= 2.0 * SHADOW_EPSILON {
            return true;
        }

        let ray = Ray::new(from, d / dist, dist - SHADOW_EPSILON);

        let mut stack = Vec::with_capacity(64);
        if !self.nodes.is_empty() {
            stack.push(0);
        }
        while let Some(index) = stack.pop() {
            let node = self.nodes[index];
            if node.bounds.intersect_p(&ray).is_none() {
                continue;
            }
            if node.count > 0 {
                for i in 0..node.count {
                    let id = self.ordered[node.offset + i];
                    if id == exclude {
                        continue;
                    }
                    if self.triangles[id].intersect_p(&ray, SHADOW_EPSILON) {
                        return false;
                    }
                }
            } else {
                stack.push(index + 1);
                stack.push(node.offset);
            }
        }
        true
    }
}

impl Index<TriangleId> for Bvh {
    type Output = Triangle;

    /// Returns the scene triangle with the given id.
    ///
    /// * `id` - The triangle id.
    fn index(&self, id: TriangleId) -> &Self::Output {
        &self.triangles[id]
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
