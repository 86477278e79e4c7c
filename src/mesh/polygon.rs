//! Indexed polygon mesh.

use nalgebra::Point3;

use super::index::{FaceId, MeshIndex, VertexId};
use crate::error::{MeshError, Result};

/// A polygon surface mesh: a vertex position array plus a list of faces.
///
/// Faces are stored back to back in a single index array, with `face_starts`
/// marking where each face begins (plus one trailing entry for the end of the
/// last face). Faces may have any number of sides from three upwards.
///
/// A `PolyMesh` is only created through the validated builders in
/// [`crate::mesh`], so every face index is in range and every face has at
/// least three distinct vertices.
#[derive(Debug, Clone, PartialEq)]
pub struct PolyMesh<I: MeshIndex = u32> {
    pub(crate) positions: Vec<Point3<f64>>,
    pub(crate) face_starts: Vec<usize>,
    pub(crate) face_vertices: Vec<VertexId<I>>,
}

impl<I: MeshIndex> PolyMesh<I> {
    pub(crate) fn from_parts(
        positions: Vec<Point3<f64>>,
        face_starts: Vec<usize>,
        face_vertices: Vec<VertexId<I>>,
    ) -> Self {
        debug_assert_eq!(face_starts.last().copied(), Some(face_vertices.len()));
        Self {
            positions,
            face_starts,
            face_vertices,
        }
    }

    /// Number of vertices.
    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.positions.len()
    }

    /// Number of faces.
    #[inline]
    pub fn num_faces(&self) -> usize {
        self.face_starts.len() - 1
    }

    /// Position of a vertex.
    #[inline]
    pub fn position(&self, v: VertexId<I>) -> &Point3<f64> {
        &self.positions[v.index()]
    }

    /// All vertex positions, in index order.
    #[inline]
    pub fn positions(&self) -> &[Point3<f64>] {
        &self.positions
    }

    /// Vertices of a face, in winding order.
    #[inline]
    pub fn face_vertices(&self, f: FaceId<I>) -> &[VertexId<I>] {
        let i = f.index();
        &self.face_vertices[self.face_starts[i]..self.face_starts[i + 1]]
    }

    /// Iterate over all vertex IDs.
    pub fn vertex_ids(&self) -> impl Iterator<Item = VertexId<I>> + '_ {
        (0..self.num_vertices()).map(VertexId::new)
    }

    /// Iterate over all face IDs.
    pub fn face_ids(&self) -> impl Iterator<Item = FaceId<I>> + '_ {
        (0..self.num_faces()).map(FaceId::new)
    }

    /// Iterate over all faces as vertex slices.
    pub fn faces(&self) -> impl Iterator<Item = &[VertexId<I>]> + '_ {
        self.face_ids().map(move |f| self.face_vertices(f))
    }

    /// Faces as plain `usize` index lists.
    pub fn face_index_lists(&self) -> Vec<Vec<usize>> {
        self.faces()
            .map(|face| face.iter().map(|v| v.index()).collect())
            .collect()
    }

    /// Whether every face is a triangle.
    pub fn is_triangle_mesh(&self) -> bool {
        self.face_starts.windows(2).all(|w| w[1] - w[0] == 3)
    }

    /// Whether every face is a quad.
    pub fn is_quad_mesh(&self) -> bool {
        self.face_starts.windows(2).all(|w| w[1] - w[0] == 4)
    }

    /// Faces fan-triangulated around their first vertex.
    ///
    /// Triangles pass through unchanged; an n-gon yields n - 2 triangles.
    pub fn triangles(&self) -> Vec<[usize; 3]> {
        let mut out = Vec::with_capacity(self.face_vertices.len());
        for face in self.faces() {
            for i in 1..face.len() - 1 {
                out.push([face[0].index(), face[i].index(), face[i + 1].index()]);
            }
        }
        out
    }

    /// Build a mesh from a flat face stream.
    ///
    /// Shorthand for [`crate::mesh::build_from_flat_faces`].
    pub fn from_flat_faces(vertices: &[Point3<f64>], stream: &[usize]) -> Result<Self> {
        super::build_from_flat_faces(vertices, stream)
    }

    /// Encode faces as a flat stream: `[n0, i0.., n1, i1.., ...]`.
    ///
    /// This is the polygon layout used by VTK-style viewers. It is decoded
    /// by [`crate::mesh::build_from_flat_faces`].
    pub fn to_flat_faces(&self) -> Vec<usize> {
        let mut stream = Vec::with_capacity(self.face_vertices.len() + self.num_faces());
        for face in self.faces() {
            stream.push(face.len());
            stream.extend(face.iter().map(|v| v.index()));
        }
        stream
    }

    /// Axis-aligned bounding box as `(min, max)`, or `None` for an empty mesh.
    pub fn bounding_box(&self) -> Option<(Point3<f64>, Point3<f64>)> {
        let first = *self.positions.first()?;
        let bounds = self
            .positions
            .iter()
            .fold((first, first), |(mut min, mut max), p| {
                for k in 0..3 {
                    min[k] = min[k].min(p[k]);
                    max[k] = max[k].max(p[k]);
                }
                (min, max)
            });
        Some(bounds)
    }

    /// Build a new mesh that shares this mesh's faces but uses new positions.
    ///
    /// The position array must have exactly one entry per vertex; index
    /// correspondence is preserved.
    pub fn with_positions(&self, positions: Vec<Point3<f64>>) -> Result<Self> {
        if positions.len() != self.positions.len() {
            return Err(MeshError::VertexCountMismatch {
                expected: self.positions.len(),
                actual: positions.len(),
            });
        }
        Ok(Self {
            positions,
            face_starts: self.face_starts.clone(),
            face_vertices: self.face_vertices.clone(),
        })
    }

    /// Consume the mesh and return its position array.
    pub fn into_positions(self) -> Vec<Point3<f64>> {
        self.positions
    }
}
