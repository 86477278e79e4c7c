//! Vertex adjacency and boundary classification.
//!
//! [`Connectivity`] is derived from a face list in one pass:
//!
//! 1. Every face contributes the edges between consecutive vertices,
//!    including the edge that closes the polygon. Self-edges (a vertex
//!    repeated back to back) are skipped.
//! 2. Edges are normalized to `(min, max)` and counted across all faces.
//! 3. Each edge makes its endpoints neighbors of each other.
//! 4. An edge used by exactly one face is a boundary edge; both of its
//!    endpoints belong to the boundary set.
//!
//! Neighbor sets are stored as compressed rows: one contiguous array of
//! neighbor IDs plus per-vertex offsets. Rows are sorted ascending.
//!
//! # Example
//!
//! ```
//! use lapsmooth::algo::connectivity::Connectivity;
//! use lapsmooth::mesh::VertexId;
//!
//! // Two triangles sharing the edge (0, 2).
//! let faces = vec![[0, 1, 2], [0, 2, 3]];
//! let conn: Connectivity = Connectivity::from_faces(4, &faces).unwrap();
//!
//! assert_eq!(conn.num_edges(), 5);
//! assert_eq!(conn.edge_multiplicity(0, 2), 2);
//! assert_eq!(conn.valence(VertexId::new(0)), 3);
//! assert_eq!(conn.num_boundary_vertices(), 4);
//! ```

use std::collections::HashMap;

use nalgebra::Point3;

use crate::error::{MeshError, Result};
use crate::mesh::{validate_face, MeshIndex, PolyMesh, VertexId};

/// An undirected edge with the number of face sides that reference it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge<I: MeshIndex = u32> {
    /// Lower endpoint.
    pub v0: VertexId<I>,
    /// Higher endpoint.
    pub v1: VertexId<I>,
    /// How many face sides use this edge. 1 means boundary, 2 means an
    /// ordinary interior edge, more means the edge is non-manifold.
    pub multiplicity: u32,
}

impl<I: MeshIndex> Edge<I> {
    /// Whether only one face uses this edge.
    #[inline]
    pub fn is_boundary(&self) -> bool {
        self.multiplicity == 1
    }
}

/// Adjacency map and boundary set of a mesh.
#[derive(Debug, Clone)]
pub struct Connectivity<I: MeshIndex = u32> {
    offsets: Vec<usize>,
    neighbors: Vec<VertexId<I>>,
    boundary: Vec<bool>,
    edges: Vec<Edge<I>>,
}

impl<I: MeshIndex> Connectivity<I> {
    /// Derive connectivity from a validated mesh.
    pub fn build(mesh: &PolyMesh<I>) -> Result<Self> {
        let mut counter = EdgeCounter::new(mesh.num_vertices(), mesh.num_faces())?;
        let mut face = Vec::new();
        for (fi, vertices) in mesh.faces().enumerate() {
            face.clear();
            face.extend(vertices.iter().map(|v| v.index()));
            counter.add_face(fi, &face)?;
        }
        Ok(counter.finish())
    }

    /// Derive connectivity from raw face index lists over `num_vertices` vertices.
    ///
    /// Every face must have in-range indices and at least three distinct
    /// vertices. Repeated consecutive vertices produce no edge.
    pub fn from_faces<F: AsRef<[usize]>>(num_vertices: usize, faces: &[F]) -> Result<Self> {
        if num_vertices > I::max_usize().saturating_add(1) {
            return Err(MeshError::TooManyVertices {
                count: num_vertices,
                max: I::max_usize().saturating_add(1),
            });
        }
        let mut counter = EdgeCounter::new(num_vertices, faces.len())?;
        for (fi, face) in faces.iter().enumerate() {
            counter.add_face(fi, face.as_ref())?;
        }
        Ok(counter.finish())
    }

    /// Number of vertices covered by this connectivity.
    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.boundary.len()
    }

    /// Neighbors of a vertex, sorted ascending. Empty for unreferenced vertices.
    #[inline]
    pub fn neighbors(&self, v: VertexId<I>) -> &[VertexId<I>] {
        self.row(v.index())
    }

    #[inline]
    pub(crate) fn row(&self, i: usize) -> &[VertexId<I>] {
        &self.neighbors[self.offsets[i]..self.offsets[i + 1]]
    }

    /// Number of distinct neighbors of a vertex.
    #[inline]
    pub fn valence(&self, v: VertexId<I>) -> usize {
        let i = v.index();
        self.offsets[i + 1] - self.offsets[i]
    }

    /// Whether a vertex touches a boundary edge.
    #[inline]
    pub fn is_boundary(&self, v: VertexId<I>) -> bool {
        self.boundary[v.index()]
    }

    /// Per-vertex boundary flags, in index order.
    #[inline]
    pub fn boundary_flags(&self) -> &[bool] {
        &self.boundary
    }

    /// Iterate over boundary vertices in ascending order.
    pub fn boundary_vertices(&self) -> impl Iterator<Item = VertexId<I>> + '_ {
        self.boundary
            .iter()
            .enumerate()
            .filter(|(_, &b)| b)
            .map(|(i, _)| VertexId::new(i))
    }

    /// Number of boundary vertices.
    pub fn num_boundary_vertices(&self) -> usize {
        self.boundary.iter().filter(|&&b| b).count()
    }

    /// Whether the vertex is neither on the boundary nor isolated, i.e.
    /// whether relaxation moves it.
    #[inline]
    pub fn is_free(&self, v: VertexId<I>) -> bool {
        !self.is_boundary(v) && self.valence(v) > 0
    }

    /// All distinct edges, sorted by `(v0, v1)`.
    #[inline]
    pub fn edges(&self) -> &[Edge<I>] {
        &self.edges
    }

    /// Number of distinct edges.
    #[inline]
    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    /// How many face sides use the edge `(a, b)`; 0 if there is no such edge.
    pub fn edge_multiplicity(&self, a: usize, b: usize) -> u32 {
        let key = (a.min(b), a.max(b));
        self.edges
            .binary_search_by(|e| (e.v0.index(), e.v1.index()).cmp(&key))
            .map(|i| self.edges[i].multiplicity)
            .unwrap_or(0)
    }

    /// Edges used by exactly one face.
    pub fn boundary_edges(&self) -> impl Iterator<Item = &Edge<I>> + '_ {
        self.edges.iter().filter(|e| e.is_boundary())
    }

    /// Edges used by more than two faces.
    pub fn non_manifold_edges(&self) -> impl Iterator<Item = &Edge<I>> + '_ {
        self.edges.iter().filter(|e| e.multiplicity > 2)
    }

    /// Whether the mesh has no boundary edges.
    pub fn is_closed(&self) -> bool {
        !self.edges.iter().any(Edge::is_boundary)
    }

    /// Mean length of all distinct edges under the given positions.
    ///
    /// Returns 0.0 when there are no edges.
    pub fn average_edge_length(&self, positions: &[Point3<f64>]) -> Result<f64> {
        if positions.len() != self.num_vertices() {
            return Err(MeshError::VertexCountMismatch {
                expected: self.num_vertices(),
                actual: positions.len(),
            });
        }
        if self.edges.is_empty() {
            return Ok(0.0);
        }
        let total: f64 = self
            .edges
            .iter()
            .map(|e| (positions[e.v1.index()] - positions[e.v0.index()]).norm())
            .sum();
        Ok(total / self.edges.len() as f64)
    }
}

/// Accumulates edge multiplicities face by face.
struct EdgeCounter {
    num_vertices: usize,
    counts: HashMap<(usize, usize), u32>,
    scratch: Vec<usize>,
}

impl EdgeCounter {
    fn new(num_vertices: usize, num_faces: usize) -> Result<Self> {
        if num_vertices == 0 {
            return Err(MeshError::NoVertices);
        }
        if num_faces == 0 {
            return Err(MeshError::EmptyMesh);
        }
        Ok(Self {
            num_vertices,
            counts: HashMap::with_capacity(num_faces * 2),
            scratch: Vec::new(),
        })
    }

    fn add_face(&mut self, fi: usize, face: &[usize]) -> Result<()> {
        validate_face(fi, face, self.num_vertices, &mut self.scratch)?;
        let m = face.len();
        for j in 0..m {
            let a = face[j];
            let b = face[(j + 1) % m];
            if a == b {
                continue;
            }
            *self.counts.entry((a.min(b), a.max(b))).or_insert(0) += 1;
        }
        Ok(())
    }

    fn finish<I: MeshIndex>(self) -> Connectivity<I> {
        let n = self.num_vertices;

        let mut edges: Vec<Edge<I>> = self
            .counts
            .into_iter()
            .map(|((a, b), multiplicity)| Edge {
                v0: VertexId::new(a),
                v1: VertexId::new(b),
                multiplicity,
            })
            .collect();
        edges.sort_unstable_by_key(|e| (e.v0, e.v1));

        let mut degree = vec![0usize; n];
        let mut boundary = vec![false; n];
        for e in &edges {
            degree[e.v0.index()] += 1;
            degree[e.v1.index()] += 1;
            if e.is_boundary() {
                boundary[e.v0.index()] = true;
                boundary[e.v1.index()] = true;
            }
        }

        let mut offsets = Vec::with_capacity(n + 1);
        offsets.push(0);
        for d in &degree {
            let last = offsets[offsets.len() - 1];
            offsets.push(last + d);
        }

        // Edges are sorted, so filling rows in edge order leaves every row
        // ascending: for vertex v, all (u, v) with u < v come before (v, w).
        let mut cursor = offsets[..n].to_vec();
        let mut neighbors = vec![VertexId::new(0); offsets[n]];
        for e in &edges {
            let (a, b) = (e.v0.index(), e.v1.index());
            neighbors[cursor[a]] = e.v1;
            cursor[a] += 1;
            neighbors[cursor[b]] = e.v0;
            cursor[b] += 1;
        }

        log::debug!(
            "connectivity: {} vertices, {} edges, {} boundary vertices",
            n,
            edges.len(),
            boundary.iter().filter(|&&b| b).count()
        );

        Connectivity {
            offsets,
            neighbors,
            boundary,
            edges,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::build_from_polygons;

    fn ids(slice: &[VertexId]) -> Vec<usize> {
        slice.iter().map(|v| v.index()).collect()
    }

    fn tetrahedron_faces() -> Vec<[usize; 3]> {
        vec![[0, 2, 1], [0, 1, 3], [1, 2, 3], [2, 0, 3]]
    }

    #[test]
    fn test_tetrahedron_is_closed() {
        let conn: Connectivity = Connectivity::from_faces(4, &tetrahedron_faces()).unwrap();

        assert_eq!(conn.num_edges(), 6);
        assert!(conn.is_closed());
        assert_eq!(conn.num_boundary_vertices(), 0);
        for e in conn.edges() {
            assert_eq!(e.multiplicity, 2);
        }
        for v in 0..4 {
            let expected: Vec<usize> = (0..4).filter(|&u| u != v).collect();
            assert_eq!(ids(conn.neighbors(VertexId::new(v))), expected);
        }
    }

    #[test]
    fn test_split_quad_is_all_boundary() {
        let faces = vec![[0, 1, 2], [0, 2, 3]];
        let conn: Connectivity = Connectivity::from_faces(4, &faces).unwrap();

        assert_eq!(conn.edge_multiplicity(2, 0), 2);
        assert_eq!(conn.edge_multiplicity(0, 1), 1);
        assert_eq!(conn.edge_multiplicity(1, 3), 0);
        assert_eq!(conn.boundary_edges().count(), 4);
        assert!(!conn.is_closed());

        let boundary: Vec<usize> = conn.boundary_vertices().map(|v| v.index()).collect();
        assert_eq!(boundary, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_polygon_wraparound_edge() {
        let faces = vec![vec![0, 1, 2, 3, 4]];
        let conn: Connectivity = Connectivity::from_faces(5, &faces).unwrap();

        assert_eq!(conn.num_edges(), 5);
        assert_eq!(conn.edge_multiplicity(4, 0), 1);
        assert_eq!(ids(conn.neighbors(VertexId::new(0))), vec![1, 4]);
    }

    #[test]
    fn test_self_edges_skipped() {
        let faces = vec![vec![0, 0, 1, 2]];
        let conn: Connectivity = Connectivity::from_faces(3, &faces).unwrap();

        assert_eq!(conn.num_edges(), 3);
        assert_eq!(conn.edge_multiplicity(0, 0), 0);
        assert_eq!(ids(conn.neighbors(VertexId::new(0))), vec![1, 2]);
    }

    #[test]
    fn test_unreferenced_vertex_has_no_neighbors() {
        let faces = vec![[0, 1, 2]];
        let conn: Connectivity = Connectivity::from_faces(4, &faces).unwrap();

        let lonely = VertexId::new(3);
        assert!(conn.neighbors(lonely).is_empty());
        assert!(!conn.is_boundary(lonely));
        assert!(!conn.is_free(lonely));
    }

    #[test]
    fn test_non_manifold_edge() {
        // Three triangles hinged on edge (0, 1).
        let faces = vec![[0, 1, 2], [1, 0, 3], [0, 1, 4]];
        let conn: Connectivity = Connectivity::from_faces(5, &faces).unwrap();

        assert_eq!(conn.edge_multiplicity(0, 1), 3);
        assert_eq!(conn.non_manifold_edges().count(), 1);
        assert_eq!(conn.valence(VertexId::new(0)), 4);
    }

    #[test]
    fn test_invalid_input() {
        let faces = vec![[0, 1, 5]];
        let err = Connectivity::<u32>::from_faces(3, &faces).unwrap_err();
        assert!(matches!(
            err,
            MeshError::InvalidVertexIndex {
                face: 0,
                vertex: 5,
                num_vertices: 3
            }
        ));

        let err = Connectivity::<u32>::from_faces(0, &faces).unwrap_err();
        assert!(matches!(err, MeshError::NoVertices));

        let none: Vec<[usize; 3]> = Vec::new();
        let err = Connectivity::<u32>::from_faces(3, &none).unwrap_err();
        assert!(matches!(err, MeshError::EmptyMesh));
    }

    #[test]
    fn test_degenerate_faces_rejected() {
        let segment = vec![vec![0, 1]];
        let err = Connectivity::<u32>::from_faces(3, &segment).unwrap_err();
        assert!(matches!(err, MeshError::DegenerateFace { face: 0 }));

        let folded = vec![vec![0, 1, 2], vec![1, 2, 1]];
        let err = Connectivity::<u32>::from_faces(4, &folded).unwrap_err();
        assert!(matches!(err, MeshError::DegenerateFace { face: 1 }));
        assert_eq!(err.kind(), crate::error::ErrorKind::InvalidGeometry);
    }

    #[test]
    fn test_build_from_mesh_matches_raw_faces() {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(2.0, 0.5, 0.0),
        ];
        let faces = vec![vec![0, 1, 2, 3], vec![1, 4, 2]];
        let mesh: PolyMesh = build_from_polygons(&vertices, &faces).unwrap();

        let from_mesh = Connectivity::build(&mesh).unwrap();
        let from_raw: Connectivity = Connectivity::from_faces(5, &faces).unwrap();
        assert_eq!(from_mesh.edges(), from_raw.edges());
        assert_eq!(from_mesh.boundary_flags(), from_raw.boundary_flags());

        // (1, 2) is shared by both faces.
        assert_eq!(from_mesh.edge_multiplicity(1, 2), 2);
        let avg = from_mesh.average_edge_length(mesh.positions()).unwrap();
        assert!(avg > 0.0);
    }

    #[test]
    fn test_small_index_type() {
        let conn: Connectivity<u16> = Connectivity::from_faces(4, &tetrahedron_faces()).unwrap();
        assert_eq!(conn.valence(VertexId::new(2)), 3);
    }
}
