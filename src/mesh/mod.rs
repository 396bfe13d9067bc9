//! Radiosity mesh registry.
//!
//! Stores the vertex and face data backing the patch hierarchy. Faces are
//! append-only: subdividing a face keeps the parent entry valid (patches
//! hold on to their face handles) and registers four new child faces.
//! Midpoints are cached per undirected edge so neighboring faces subdivide
//! conformingly, sharing the vertex inserted on their common edge.

#![allow(dead_code)]
use crate::core::geometry::{Point3f, Triangle};
use std::collections::HashMap;

/// Handle of a mesh vertex.
pub type VertexId = usize;

/// Handle of a mesh face.
pub type FaceId = usize;

/// The mesh registry.
#[derive(Default)]
pub struct RadiosityMesh {
    /// Vertex positions.
    points: Vec<Point3f>,

    /// Corner vertices per face, in winding order.
    faces: Vec<[VertexId; 3]>,

    /// Exact-position lookup used to merge identical vertices of adjacent
    /// input triangles.
    vertex_lookup: HashMap<[u32; 3], VertexId>,

    /// Midpoint vertex per undirected edge.
    edge_midpoints: HashMap<(VertexId, VertexId), VertexId>,
}

impl RadiosityMesh {
    /// Returns the number of vertices.
    pub fn num_vertices(&self) -> usize {
        self.points.len()
    }

    /// Returns the number of faces, subdivided faces included.
    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    /// Returns the position of a vertex.
    ///
    /// * `v` - The vertex handle.
    pub fn point(&self, v: VertexId) -> Point3f {
        self.points[v]
    }

    /// Returns the corner vertices of a face in winding order.
    ///
    /// * `face` - The face handle.
    pub fn corners(&self, face: FaceId) -> [VertexId; 3] {
        self.faces[face]
    }

    /// Returns the corner positions of a face in winding order.
    ///
    /// * `face` - The face handle.
    pub fn face_points(&self, face: FaceId) -> (Point3f, Point3f, Point3f) {
        let [a, b, c] = self.faces[face];
        (self.points[a], self.points[b], self.points[c])
    }

    /// Adds a vertex, merging it with an existing vertex at the exact same
    /// position.
    ///
    /// * `p` - The vertex position.
    fn add_vertex(&mut self, p: Point3f) -> VertexId {
        let key = [p.x.to_bits(), p.y.to_bits(), p.z.to_bits()];
        if let Some(&v) = self.vertex_lookup.get(&key) {
            return v;
        }
        let v = self.points.len();
        self.points.push(p);
        self.vertex_lookup.insert(key, v);
        v
    }

    /// Adds a face over three vertex positions.
    ///
    /// * `p0` - First corner position.
    /// * `p1` - Second corner position.
    /// * `p2` - Third corner position.
    fn add_face(&mut self, p0: Point3f, p1: Point3f, p2: Point3f) -> FaceId {
        let corners = [
            self.add_vertex(p0),
            self.add_vertex(p1),
            self.add_vertex(p2),
        ];
        self.faces.push(corners);
        self.faces.len() - 1
    }

    /// Returns the midpoint vertex of an edge, inserting it on first use.
    /// The cache is keyed by the undirected edge so both faces sharing the
    /// edge get the same vertex.
    ///
    /// * `a` - First edge vertex.
    /// * `b` - Second edge vertex.
    fn midpoint(&mut self, a: VertexId, b: VertexId) -> VertexId {
        let key = (a.min(b), a.max(b));
        if let Some(&v) = self.edge_midpoints.get(&key) {
            return v;
        }
        let p = 0.5 * (self.points[a] + self.points[b]);
        let v = self.points.len();
        self.points.push(p);
        self.edge_midpoints.insert(key, v);
        v
    }

    /// Splits a face into four equi-area child faces by midpoint insertion
    /// and returns their handles: the three corner-adjacent children in
    /// corner order, then the center child. The parent face stays valid.
    ///
    /// * `face` - The face to subdivide.
    pub fn subdivide4(&mut self, face: FaceId) -> [FaceId; 4] {
        let [a, b, c] = self.faces[face];
        let ab = self.midpoint(a, b);
        let bc = self.midpoint(b, c);
        let ca = self.midpoint(c, a);

        let first = self.faces.len();
        self.faces.push([a, ab, ca]);
        self.faces.push([ab, b, bc]);
        self.faces.push([ca, bc, c]);
        self.faces.push([ab, bc, ca]);

        [first, first + 1, first + 2, first + 3]
    }
}

impl From<&[Triangle]> for RadiosityMesh {
    /// Build the registry from the scene's root triangles, merging shared
    /// vertices so neighboring faces subdivide conformingly.
    ///
    /// * `triangles` - The root triangles, in scene order. Face handle `i`
    ///                 corresponds to triangle `i`.
    fn from(triangles: &[Triangle]) -> Self {
        let mut mesh = Self::default();
        for tri in triangles {
            mesh.add_face(tri.p0, tri.p1, tri.p2);
        }
        mesh
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
