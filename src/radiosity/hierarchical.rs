//! Hierarchical radiosity solver.
//!
//! Surfaces are adaptively subdivided into a forest of quadtrees over the
//! input triangles. Energy transfer is represented by directed links between
//! patches, established at the coarsest level that satisfies the refinement
//! oracle, and the solution is relaxed by alternating gather and push-pull
//! sweeps until link refinement stabilizes.
//!
//! See <https://graphics.stanford.edu/papers/rad/>.

use super::form_factor::{estimate_form_factor, form_factor};
use crate::accelerators::{Bvh, TriangleId};
use crate::core::color::Color;
use crate::core::common::Float;
use crate::core::geometry::Triangle;
use crate::mesh::{FaceId, RadiosityMesh};
use itertools::iproduct;
use std::collections::HashMap;

/// Index of a patch in the solver's node arena.
pub type QuadId = usize;

/// Safety cap on the outer solve/refine loop. The area floor guarantees
/// termination long before this; hitting the cap means the configured
/// thresholds interact badly and is reported as a warning.
const MAX_SOLVE_PASSES: usize = 64;

/// A directed link: the owning patch p gathers radiosity from patch `q`
/// weighted by `form_factor` F(p ← q).
#[derive(Copy, Clone, Debug)]
struct Linknode {
    /// The shooting patch.
    q: QuadId,

    /// Form factor F(p ← q), where p is the owner of the link.
    form_factor: Float,
}

/// A patch of the hierarchy: an input triangle or a product of recursive
/// 1-to-4 midpoint subdivision.
struct Quadnode {
    /// The original scene triangle this patch descends from.
    root_tri: TriangleId,

    /// The triangle represented by this patch; equals `root_tri` for roots,
    /// otherwise allocated from a monotonically increasing counter.
    tri: TriangleId,

    /// Face handle in the mesh registry.
    face: FaceId,

    /// Patch area.
    area: Float,

    /// Radiosity gathered from incoming links in the current iteration.
    rad_gather: Color,

    /// Radiosity this patch shoots towards others.
    rad_shoot: Color,

    /// Intrinsic emission, inherited by children.
    emission: Color,

    /// Diffuse reflectivity, inherited by children.
    rho: Color,

    /// Parent patch; `None` for roots. Never an owning reference.
    #[allow(dead_code)]
    parent: Option<QuadId>,

    /// The four children created by subdivision; `None` for leaves.
    children: Option<[QuadId; 4]>,

    /// Links this patch gathers over.
    gathering_from: Vec<Linknode>,
}

impl Quadnode {
    /// Due to full subdivision a patch either has four children or none.
    fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    /// Rebuilds the patch's triangle from the mesh registry and its
    /// material.
    fn triangle(&self, mesh: &RadiosityMesh) -> Triangle {
        let (p0, p1, p2) = mesh.face_points(self.face);
        Triangle::new(p0, p1, p2, self.emission, self.rho)
    }
}

/// The hierarchical radiosity solver.
///
/// Patches live in a dense arena owned by the solver; `QuadId`s index it.
/// The arena only grows during a run, so a link's target always outlives
/// the link.
pub struct HierarchicalRadiosity<'a> {
    /// The scene index used for visibility queries.
    tree: &'a Bvh,

    /// Estimated form factor below which patches are linked directly.
    f_eps: Float,

    /// Minimum patch area; subdivision below this is refused.
    a_eps: Float,

    /// Per-link energy threshold driving link refinement.
    bf_eps: Float,

    /// Gather/push-pull iterations per solve pass.
    max_iterations: usize,

    /// The patch arena. Roots occupy slots `0..num_roots` in scene order.
    nodes: Vec<Quadnode>,

    /// Number of root patches.
    num_roots: usize,

    /// Next triangle id to hand out to a subdivided patch.
    next_tri: TriangleId,

    /// The mesh registry backing patch geometry.
    mesh: RadiosityMesh,

    /// Solve passes performed by the last `compute` call.
    passes: usize,
}

impl<'a> HierarchicalRadiosity<'a> {
    /// Create a new solver over a scene index.
    ///
    /// * `tree`           - The scene index; borrowed for the solver's
    ///                      lifetime.
    /// * `f_eps`          - Estimated form factor below which two patches
    ///                      may be linked without further subdivision.
    /// * `a_eps`          - Minimum allowed patch area in world units².
    /// * `bf_eps`         - Radiometric threshold below which a link is not
    ///                      refined.
    /// * `max_iterations` - Relaxation steps per solve pass.
    pub fn new(
        tree: &'a Bvh,
        f_eps: Float,
        a_eps: Float,
        bf_eps: Float,
        max_iterations: usize,
    ) -> Self {
        assert!(max_iterations > 0, "max_iterations must be positive");
        Self {
            tree,
            f_eps,
            a_eps,
            bf_eps,
            max_iterations,
            nodes: Vec::new(),
            num_roots: 0,
            next_tri: 0,
            mesh: RadiosityMesh::default(),
            passes: 0,
        }
    }

    /// Runs the full pipeline: build root patches, seed the link graph by
    /// pairwise refinement, then alternate solving and link refinement until
    /// no link needs further refinement.
    pub fn compute(&mut self) {
        self.build_patches();
        self.seed_links();

        loop {
            self.solve_system();
            self.passes += 1;

            if !self.refine_links() {
                break;
            }
            if self.passes >= MAX_SOLVE_PASSES {
                warn!(
                    "link refinement did not stabilize within {} passes; \
                     emitting the current solution",
                    self.passes
                );
                break;
            }
        }

        info!(
            "solved in {} passes: {} patches, {} links, {} leaves",
            self.passes,
            self.nodes.len(),
            self.num_links(),
            self.num_leaves()
        );
    }

    /// Rebuilds the mesh registry and the root patches from the scene,
    /// discarding any previous state so `compute` is idempotent.
    fn build_patches(&mut self) {
        self.nodes.clear();
        self.passes = 0;
        self.mesh = RadiosityMesh::from(self.tree.triangles());
        self.num_roots = self.tree.num_triangles();
        self.next_tri = self.num_roots;

        for (i, tri) in self.tree.triangles().iter().enumerate() {
            self.nodes.push(Quadnode {
                root_tri: i,
                tri: i,
                face: i,
                area: tri.area(),
                rad_gather: Color::black(),
                rad_shoot: tri.emissive,
                emission: tri.emissive,
                rho: tri.diffuse,
                parent: None,
                children: None,
                gathering_from: Vec::new(),
            });
        }
    }

    /// Seeds the link graph by refining every ordered pair of distinct
    /// roots, so that both gather directions of each unordered pair are
    /// established.
    fn seed_links(&mut self) {
        info!("refining {} root patches pairwise", self.num_roots);
        for (p, q) in iproduct!(0..self.num_roots, 0..self.num_roots) {
            if self.nodes[p].root_tri == self.nodes[q].root_tri {
                continue;
            }
            self.refine(p, q);
        }
    }

    /// Rebuilds the triangle of a patch from the mesh registry and the
    /// patch's material.
    fn patch_triangle(&self, id: QuadId) -> Triangle {
        self.nodes[id].triangle(&self.mesh)
    }

    /// Splits a leaf patch into four children. Returns `true` when the
    /// patch is subdivided (or already was); `false` when the area floor
    /// refuses the split.
    ///
    /// * `p` - The patch to subdivide.
    fn subdivide(&mut self, p: QuadId) -> bool {
        if self.nodes[p].children.is_some() {
            return true;
        }

        let child_area = self.nodes[p].area / 4.0;
        if child_area < self.a_eps {
            return false;
        }

        let faces = self.mesh.subdivide4(self.nodes[p].face);
        let (root_tri, rad_shoot, emission, rho) = {
            let node = &self.nodes[p];
            (node.root_tri, node.rad_shoot, node.emission, node.rho)
        };

        let mut children = [0; 4];
        for (slot, face) in faces.into_iter().enumerate() {
            let id = self.nodes.len();
            self.nodes.push(Quadnode {
                root_tri,
                tri: self.next_tri,
                face,
                area: child_area,
                rad_gather: Color::black(),
                rad_shoot,
                emission,
                rho,
                parent: Some(p),
                children: None,
                gathering_from: Vec::new(),
            });
            self.next_tri += 1;
            children[slot] = id;
        }
        self.nodes[p].children = Some(children);

        true
    }

    /// Links p to q so that p gathers energy from q, weighted by the
    /// oracle's form factor.
    ///
    /// * `p` - The gathering patch.
    /// * `q` - The shooting patch.
    fn link(&mut self, p: QuadId, q: QuadId) {
        debug_assert_ne!(
            self.nodes[p].root_tri, self.nodes[q].root_tri,
            "self-link within one root triangle"
        );

        let tri_p = self.patch_triangle(p);
        let tri_q = self.patch_triangle(q);
        let f_pq = form_factor(self.tree, &tri_p, &tri_q, self.nodes[q].root_tri);
        self.nodes[p].gathering_from.push(Linknode { q, form_factor: f_pq });
    }

    /// Pairwise refinement: links the two patches at the coarsest level
    /// where the estimated form factors drop below the threshold, otherwise
    /// subdivides the side that receives less and recurses. Subtrees can be
    /// deep, so the recursion runs over an explicit work stack.
    ///
    /// * `p` - The gathering patch.
    /// * `q` - The shooting patch.
    fn refine(&mut self, p: QuadId, q: QuadId) {
        let mut stack = vec![(p, q)];
        while let Some((p, q)) = stack.pop() {
            let tri_p = self.patch_triangle(p);
            let tri_q = self.patch_triangle(q);
            let f_pq = estimate_form_factor(&tri_p, &tri_q);
            let f_qp = estimate_form_factor(&tri_q, &tri_p);

            if f_pq < self.f_eps && f_qp < self.f_eps {
                self.link(p, q);
                continue;
            }

            if f_qp < f_pq {
                if self.subdivide(q) {
                    let children = self.nodes[q].children.unwrap();
                    for child in children.into_iter().rev() {
                        stack.push((p, child));
                    }
                    continue;
                }
            } else if self.subdivide(p) {
                let children = self.nodes[p].children.unwrap();
                for child in children.into_iter().rev() {
                    stack.push((child, q));
                }
                continue;
            }

            // The area floor refused the split; link at the current level.
            self.link(p, q);
        }
    }

    /// One solve pass: `max_iterations` repetitions of a gather sweep
    /// followed by a push-pull sweep over every root subtree.
    fn solve_system(&mut self) {
        for _ in 0..self.max_iterations {
            for root in 0..self.num_roots {
                self.gather_radiosity(root);
            }
            for root in 0..self.num_roots {
                self.push_pull_radiosity(root, Color::black());
            }
        }
    }

    /// Gather sweep over one root subtree: every patch accumulates the
    /// radiosity shot over its own links, scaled by its reflectivity.
    ///
    /// * `root` - The subtree root.
    fn gather_radiosity(&mut self, root: QuadId) {
        let mut stack = vec![root];
        while let Some(p) = stack.pop() {
            let gathered: Color = self.nodes[p]
                .gathering_from
                .iter()
                .map(|link| link.form_factor * self.nodes[link.q].rad_shoot)
                .sum();
            let rho = self.nodes[p].rho;
            self.nodes[p].rad_gather = rho * gathered;

            if let Some(children) = self.nodes[p].children {
                for child in children.into_iter().rev() {
                    stack.push(child);
                }
            }
        }
    }

    /// Push-pull sweep: pushes the gathered radiosity of every ancestor
    /// down to the leaves and pulls the synthesized shooting radiosity back
    /// up as the per-level mean (siblings are equi-area). Recursion depth is
    /// bounded by the area floor.
    ///
    /// * `p`        - The current patch.
    /// * `rad_down` - Gathered radiosity accumulated from the ancestors.
    fn push_pull_radiosity(&mut self, p: QuadId, rad_down: Color) -> Color {
        match self.nodes[p].children {
            None => {
                let node = &mut self.nodes[p];
                node.rad_shoot = node.emission + node.rad_gather + rad_down;
                node.rad_shoot
            }
            Some(children) => {
                let down = self.nodes[p].rad_gather + rad_down;
                let mut rad_up = Color::black();
                for child in children {
                    rad_up += self.push_pull_radiosity(child, down);
                }
                let shoot = rad_up / 4.0;
                self.nodes[p].rad_shoot = shoot;
                shoot
            }
        }
    }

    /// Revisits every link after a solve pass and refines the ones whose
    /// energy contribution exceeds the threshold. Returns `true` if at
    /// least one link was refined anywhere.
    fn refine_links(&mut self) -> bool {
        let mut refined = false;
        for root in 0..self.num_roots {
            refined |= self.refine_root_links(root);
        }
        refined
    }

    /// Link refinement over one root subtree, children before parents.
    ///
    /// * `root` - The subtree root.
    fn refine_root_links(&mut self, root: QuadId) -> bool {
        // Reversed preorder visits children before their parents. The node
        // list is snapshot up front: patches created during the pass are
        // not revisited.
        let mut order = Vec::new();
        let mut stack = vec![root];
        while let Some(p) = stack.pop() {
            order.push(p);
            if let Some(children) = self.nodes[p].children {
                for child in children.into_iter().rev() {
                    stack.push(child);
                }
            }
        }

        let mut refined = false;
        for &p in order.iter().rev() {
            // Refining may append replacement links to this same list; only
            // the links present at the start of the scan are visited.
            let mut size = self.nodes[p].gathering_from.len();
            let mut i = 0;
            while i < size {
                let link = self.nodes[p].gathering_from[i];
                if self.refine_link(p, link) {
                    self.nodes[p].gathering_from.remove(i);
                    size -= 1;
                    refined = true;
                } else {
                    i += 1;
                }
            }
        }
        refined
    }

    /// Refines a single link of the receiving patch p when its energy
    /// contribution is above the threshold: the side with the smaller form
    /// factor is subdivided and the link is replaced by four child links.
    /// Returns `true` when the link was replaced.
    ///
    /// * `p`    - The receiving patch.
    /// * `link` - The link to examine.
    fn refine_link(&mut self, p: QuadId, link: Linknode) -> bool {
        let q = link.q;

        let energy = self.nodes[q].rad_shoot * self.nodes[q].area * link.form_factor;
        if energy.r <= self.bf_eps && energy.g <= self.bf_eps && energy.b <= self.bf_eps {
            return false;
        }

        let f_pq = link.form_factor;
        let f_qp = f_pq * self.nodes[p].area / self.nodes[q].area;

        if f_pq < f_qp {
            if self.subdivide(p) {
                // The receiver was split: its children gather from q now.
                let children = self.nodes[p].children.unwrap();
                for child in children {
                    self.link(child, q);
                }
                return true;
            }
        } else if self.subdivide(q) {
            // The shooter was split: p gathers from q's children now.
            let children = self.nodes[q].children.unwrap();
            for child in children {
                self.link(p, child);
            }
            return true;
        }

        false
    }

    /// Depth-first iterator over the leaf patches, roots in scene order and
    /// children in slot order.
    fn leaves(&self) -> Leaves<'_> {
        Leaves {
            nodes: &self.nodes,
            stack: (0..self.num_roots).rev().collect(),
        }
    }

    /// Lazy sequence of leaf triangles in stable traversal order.
    pub fn triangles(&self) -> impl Iterator<Item = Triangle> + '_ {
        let nodes = &self.nodes;
        let mesh = &self.mesh;
        self.leaves().map(move |id| nodes[id].triangle(mesh))
    }

    /// Mapping from leaf triangle id to its dense index in `triangles`
    /// order.
    pub fn triangle_index(&self) -> HashMap<TriangleId, usize> {
        let mut index = HashMap::new();
        for id in self.leaves() {
            let dense = index.len();
            index.insert(self.nodes[id].tri, dense);
        }
        index
    }

    /// Lazy sequence of per-leaf radiosity aligned with `triangles`.
    pub fn radiosity(&self) -> impl Iterator<Item = Color> + '_ {
        let nodes = &self.nodes;
        self.leaves().map(move |id| nodes[id].rad_shoot)
    }

    /// Expands per-leaf radiosity to per-corner colors: every leaf emits
    /// three copies of its color (flat shading).
    ///
    /// * `leaf_rad` - Per-leaf radiosity in `triangles` order.
    pub fn radiosity_at_vertices(&self, leaf_rad: &[Color]) -> Vec<Color> {
        let index = self.triangle_index();
        assert_eq!(leaf_rad.len(), index.len());

        let mut result = Vec::with_capacity(leaf_rad.len() * 3);
        for id in self.leaves() {
            let rad = leaf_rad[index[&self.nodes[id].tri]];
            result.extend([rad, rad, rad]);
        }
        result
    }

    /// The mesh registry snapshot.
    pub fn mesh(&self) -> &RadiosityMesh {
        &self.mesh
    }

    /// Returns the number of leaf patches.
    pub fn num_leaves(&self) -> usize {
        self.leaves().count()
    }

    /// Returns the total number of links in the graph.
    pub fn num_links(&self) -> usize {
        self.nodes.iter().map(|n| n.gathering_from.len()).sum()
    }

    /// Returns the number of solve passes of the last `compute` call.
    pub fn passes(&self) -> usize {
        self.passes
    }
}

/// Iterator yielding leaf patch ids in stable depth-first order.
struct Leaves<'s> {
    nodes: &'s [Quadnode],
    stack: Vec<QuadId>,
}

impl Iterator for Leaves<'_> {
    type Item = QuadId;

    fn next(&mut self) -> Option<QuadId> {
        while let Some(p) = self.stack.pop() {
            match self.nodes[p].children {
                None => return Some(p),
                Some(children) => {
                    for child in children.into_iter().rev() {
                        self.stack.push(child);
                    }
                }
            }
        }
        None
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geometry::Point3f;
    use crate::scenes::{cornell_box, quad};

    fn p(x: Float, y: Float, z: Float) -> Point3f {
        Point3f::new(x, y, z)
    }

    /// An emitting unit square at y = 1 facing down, over a receiving unit
    /// square at y = 0 facing up. Emitter triangles get ids 0 and 1,
    /// receiver triangles ids 2 and 3.
    fn facing_squares(emission: Color, receiver_rho: Color) -> Vec<Triangle> {
        let mut tris = Vec::new();
        tris.extend(quad(
            p(0.0, 1.0, 0.0),
            p(1.0, 1.0, 0.0),
            p(1.0, 1.0, 1.0),
            p(0.0, 1.0, 1.0),
            emission,
            Color::black(),
        ));
        tris.extend(quad(
            p(0.0, 0.0, 0.0),
            p(0.0, 0.0, 1.0),
            p(1.0, 0.0, 1.0),
            p(1.0, 0.0, 0.0),
            Color::black(),
            receiver_rho,
        ));
        tris
    }

    #[test]
    fn subdivision_creates_four_equal_children() {
        let tree = Bvh::new(facing_squares(
            Color::new(1.0, 1.0, 1.0),
            Color::new(0.5, 0.5, 0.5),
        ));
        let mut solver = HierarchicalRadiosity::new(&tree, 0.1, 1e-6, 1e-3, 4);
        solver.build_patches();

        assert!(solver.subdivide(0));
        let children = solver.nodes[0].children.unwrap();
        let parent_area = solver.nodes[0].area;

        let mut sum = 0.0;
        for c in children {
            let child = &solver.nodes[c];
            assert!((child.area - parent_area / 4.0).abs() < 1e-6);
            assert_eq!(child.rho, solver.nodes[0].rho);
            assert_eq!(child.emission, solver.nodes[0].emission);
            assert_eq!(child.root_tri, solver.nodes[0].root_tri);
            assert_eq!(child.parent, Some(0));
            assert_eq!(child.rad_shoot, solver.nodes[0].rad_shoot);
            assert!(child.rad_gather.is_black());
            assert!(child.tri >= tree.num_triangles());
            sum += child.area;
        }
        assert!((sum - parent_area).abs() < 1e-5);

        // Subdividing an internal patch succeeds without creating nodes.
        let count = solver.nodes.len();
        assert!(solver.subdivide(0));
        assert_eq!(solver.nodes.len(), count);
    }

    #[test]
    fn subdivision_respects_area_floor() {
        let tree = Bvh::new(facing_squares(Color::black(), Color::black()));
        let mut solver = HierarchicalRadiosity::new(&tree, 0.1, 1.0, 1e-3, 4);
        solver.build_patches();

        // Triangle area is 0.5; a quarter of that is below the floor.
        assert!(!solver.subdivide(0));
        assert!(solver.nodes[0].is_leaf());
    }

    #[test]
    fn links_connect_distinct_roots_only() {
        let tree = Bvh::new(facing_squares(
            Color::new(1.0, 1.0, 1.0),
            Color::new(0.5, 0.5, 0.5),
        ));
        let mut solver = HierarchicalRadiosity::new(&tree, 0.1, 0.01, 1e-3, 4);
        solver.compute();

        assert!(solver.num_links() > 0);
        for node in &solver.nodes {
            for link in &node.gathering_from {
                assert_ne!(node.root_tri, solver.nodes[link.q].root_tri);
            }
        }
    }

    #[test]
    fn no_subdivision_below_area_floor() {
        let a_eps = 0.01;
        let tree = Bvh::new(facing_squares(
            Color::new(1.0, 1.0, 1.0),
            Color::new(0.5, 0.5, 0.5),
        ));
        let mut solver = HierarchicalRadiosity::new(&tree, 0.1, a_eps, 1e-3, 4);
        solver.compute();

        for node in &solver.nodes {
            if node.children.is_some() {
                assert!(node.area / 4.0 >= a_eps);
            }
        }
    }

    #[test]
    fn radiosity_decays_in_dark_enclosure() {
        let mut tris = cornell_box();
        for tri in &mut tris {
            tri.emissive = Color::black();
        }
        let tree = Bvh::new(tris);
        let mut solver = HierarchicalRadiosity::new(&tree, 0.04, 0.02, 1e-3, 4);
        solver.compute();

        // Inject energy everywhere; with no sources the maximum leaf
        // radiosity must decay monotonically under further relaxation.
        for node in &mut solver.nodes {
            node.rad_shoot = Color::new(1.0, 1.0, 1.0);
        }
        let linf = |s: &HierarchicalRadiosity| {
            s.radiosity()
                .map(|c| c.max_component())
                .fold(0.0f32, f32::max)
        };

        let l0 = linf(&solver);
        solver.solve_system();
        let l1 = linf(&solver);
        solver.solve_system();
        let l2 = linf(&solver);

        assert!(l1 <= l0 + 1e-6);
        assert!(l2 <= l1 + 1e-6);
        assert!(l2 < l0);
    }

    #[test]
    fn compute_is_idempotent() {
        let tris = facing_squares(Color::new(1.0, 0.0, 0.0), Color::new(0.5, 0.5, 0.5));
        let tree1 = Bvh::new(tris.clone());
        let tree2 = Bvh::new(tris);

        let mut s1 = HierarchicalRadiosity::new(&tree1, 0.1, 0.01, 1e-3, 8);
        s1.compute();
        let r1: Vec<Color> = s1.radiosity().collect();

        s1.compute();
        let r1_again: Vec<Color> = s1.radiosity().collect();
        assert_eq!(r1, r1_again);

        let mut s2 = HierarchicalRadiosity::new(&tree2, 0.1, 0.01, 1e-3, 8);
        s2.compute();
        let r2: Vec<Color> = s2.radiosity().collect();
        assert_eq!(r1, r2);
    }

    #[test]
    fn refinement_terminates_within_floor_bound() {
        let a_eps = 0.02;
        let tree = Bvh::new(cornell_box());
        let mut solver = HierarchicalRadiosity::new(&tree, 0.04, a_eps, 1e-3, 4);
        solver.compute();

        // Every root has area <= 0.5, so at most ceil(log4(0.5 / a_eps))
        // subdivision levels exist per root; the pass count is bounded by
        // the total number of levels across roots.
        let levels = (0.5f32 / a_eps).log2().ceil() as usize / 2 + 1;
        let bound = tree.num_triangles() * levels;
        assert!(solver.passes() <= bound);
        assert!(solver.passes() < MAX_SOLVE_PASSES);
    }

    #[test]
    fn single_emissive_triangle_keeps_its_emission() {
        let tri = Triangle::new(
            p(0.0, 0.0, 0.0),
            p(1.0, 0.0, 0.0),
            p(0.0, 1.0, 0.0),
            Color::new(1.0, 1.0, 1.0),
            Color::black(),
        );
        let tree = Bvh::new(vec![tri]);
        let mut solver = HierarchicalRadiosity::new(&tree, 0.1, 0.01, 1e-3, 4);
        solver.compute();

        assert_eq!(solver.num_links(), 0);
        assert_eq!(solver.num_leaves(), 1);
        assert_eq!(solver.passes(), 1);

        let rad: Vec<Color> = solver.radiosity().collect();
        assert_eq!(rad, vec![Color::new(1.0, 1.0, 1.0)]);
        assert!(solver.nodes[0].rad_gather.is_black());
    }

    #[test]
    fn emissive_square_leaves_carry_emission() {
        // Two coplanar triangles; nothing faces anything, so no energy is
        // exchanged and every leaf keeps its emission.
        let tris: Vec<Triangle> = quad(
            p(0.0, 0.0, 0.0),
            p(1.0, 0.0, 0.0),
            p(1.0, 1.0, 0.0),
            p(0.0, 1.0, 0.0),
            Color::new(1.0, 1.0, 1.0),
            Color::black(),
        )
        .to_vec();
        let tree = Bvh::new(tris);
        let mut solver = HierarchicalRadiosity::new(&tree, 0.1, 0.01, 1e-3, 4);
        solver.compute();

        for (id, rad) in solver.leaves().zip(solver.radiosity()) {
            assert_eq!(rad, Color::new(1.0, 1.0, 1.0));
            assert!(solver.nodes[id].rad_gather.is_black());
        }
    }

    #[test]
    fn facing_squares_transfer_red_light() {
        let tree = Bvh::new(facing_squares(
            Color::new(1.0, 0.0, 0.0),
            Color::new(0.5, 0.5, 0.5),
        ));
        let mut solver = HierarchicalRadiosity::new(&tree, 0.1, 0.01, 1e-3, 16);
        solver.compute();

        let ids: Vec<QuadId> = solver.leaves().collect();
        let mut receiver_leaves = 0;
        for id in ids {
            let node = &solver.nodes[id];
            if node.root_tri >= 2 {
                receiver_leaves += 1;
                assert!(node.rad_shoot.r > 0.0, "receiver leaf got no red light");
                assert_eq!(node.rad_shoot.g, 0.0);
                assert_eq!(node.rad_shoot.b, 0.0);
            } else {
                assert_eq!(node.rad_shoot, Color::new(1.0, 0.0, 0.0));
            }
        }
        assert!(receiver_leaves > 0);
    }

    #[test]
    fn cornell_box_shows_color_bleeding() {
        let tree = Bvh::new(cornell_box());
        let mut solver = HierarchicalRadiosity::new(&tree, 0.04, 0.02, 1e-3, 8);
        solver.compute();

        // Floor roots are triangles 0 and 1; the red wall sits at x = 0 and
        // the green wall at x = 1.
        let mut near_red = (0usize, 0.0f32, 0.0f32); // (count, r, b)
        let mut near_green = (0usize, 0.0f32, 0.0f32); // (count, g, r)
        let ids: Vec<QuadId> = solver.leaves().collect();
        for id in ids {
            let node = &solver.nodes[id];
            if node.root_tri > 1 {
                continue;
            }
            let c = solver.patch_triangle(id).centroid();
            if c.x < 0.3 {
                near_red.0 += 1;
                near_red.1 += node.rad_shoot.r;
                near_red.2 += node.rad_shoot.b;
            } else if c.x > 0.7 {
                near_green.0 += 1;
                near_green.1 += node.rad_shoot.g;
                near_green.2 += node.rad_shoot.r;
            }
        }

        assert!(near_red.0 > 0 && near_green.0 > 0);
        assert!(near_red.1 > near_red.2, "no red bleeding near the red wall");
        assert!(
            near_green.1 > near_green.2,
            "no green bleeding near the green wall"
        );
    }

    #[test]
    fn area_floor_refusal_links_at_current_level() {
        // Two close facing triangles whose estimate exceeds the threshold,
        // while the floor forbids any subdivision: a single link must be
        // installed at the root level.
        let lower = Triangle::new(
            p(0.0, 0.0, 0.0),
            p(0.0, 0.0, 1.0),
            p(1.0, 0.0, 0.0),
            Color::black(),
            Color::new(0.5, 0.5, 0.5),
        );
        let upper = Triangle::new(
            p(0.0, 0.05, 0.0),
            p(1.0, 0.05, 0.0),
            p(0.0, 0.05, 1.0),
            Color::new(1.0, 1.0, 1.0),
            Color::black(),
        );
        let tree = Bvh::new(vec![lower, upper]);
        let mut solver = HierarchicalRadiosity::new(&tree, 0.04, 1.0, 1e-3, 4);
        solver.build_patches();

        let tri_p = solver.patch_triangle(0);
        let tri_q = solver.patch_triangle(1);
        assert!(estimate_form_factor(&tri_p, &tri_q) >= solver.f_eps);

        solver.refine(0, 1);

        assert_eq!(solver.num_links(), 1);
        assert!(solver.nodes.iter().all(|n| n.is_leaf()));
        assert!(solver.nodes[0].gathering_from[0].form_factor > 0.0);
    }

    #[test]
    fn resolving_converged_system_is_stable() {
        let tree = Bvh::new(facing_squares(
            Color::new(1.0, 0.0, 0.0),
            Color::new(0.5, 0.5, 0.5),
        ));
        let mut solver = HierarchicalRadiosity::new(&tree, 0.1, 0.01, 1e-3, 32);
        solver.compute();

        let before: Vec<Color> = solver.radiosity().collect();
        solver.solve_system();
        let after: Vec<Color> = solver.radiosity().collect();

        for (b, a) in before.iter().zip(&after) {
            assert!((b.r - a.r).abs() < 1e-4);
            assert!((b.g - a.g).abs() < 1e-4);
            assert!((b.b - a.b).abs() < 1e-4);
        }
    }

    #[test]
    fn black_absorber_gathers_nothing() {
        let tree = Bvh::new(facing_squares(Color::new(1.0, 1.0, 1.0), Color::black()));
        let mut solver = HierarchicalRadiosity::new(&tree, 0.1, 0.01, 1e-3, 8);
        solver.compute();

        let ids: Vec<QuadId> = solver.leaves().collect();
        for id in ids {
            let node = &solver.nodes[id];
            if node.root_tri >= 2 {
                assert!(node.rad_gather.is_black());
                assert!(node.rad_shoot.is_black());
            } else {
                assert_eq!(node.rad_shoot, Color::new(1.0, 1.0, 1.0));
            }
        }
    }

    #[test]
    fn triangle_index_matches_traversal_order() {
        let tree = Bvh::new(facing_squares(
            Color::new(1.0, 1.0, 1.0),
            Color::new(0.5, 0.5, 0.5),
        ));
        let mut solver = HierarchicalRadiosity::new(&tree, 0.1, 0.01, 1e-3, 4);
        solver.compute();

        let index = solver.triangle_index();
        let ids: Vec<QuadId> = solver.leaves().collect();
        assert_eq!(index.len(), ids.len());
        for (dense, id) in ids.iter().enumerate() {
            assert_eq!(index[&solver.nodes[*id].tri], dense);
        }
        assert_eq!(solver.triangles().count(), ids.len());
    }

    // Legacy flat-shading behavior: three identical colors per leaf.
    #[test]
    fn radiosity_at_vertices_replicates_leaf_colors() {
        let tree = Bvh::new(facing_squares(
            Color::new(1.0, 0.0, 0.0),
            Color::new(0.5, 0.5, 0.5),
        ));
        let mut solver = HierarchicalRadiosity::new(&tree, 0.1, 0.01, 1e-3, 4);
        solver.compute();

        let rad: Vec<Color> = solver.radiosity().collect();
        let verts = solver.radiosity_at_vertices(&rad);
        assert_eq!(verts.len(), rad.len() * 3);
        for (i, c) in rad.iter().enumerate() {
            assert_eq!(verts[3 * i], *c);
            assert_eq!(verts[3 * i + 1], *c);
            assert_eq!(verts[3 * i + 2], *c);
        }
    }
}
