//! Mesh construction utilities.
//!
//! This module builds [`PolyMesh`] values from face-vertex lists as commonly
//! found in mesh file formats, and from the flat polygon stream used by
//! VTK-style viewers. All builders validate their input: a mesh that comes
//! out of here has at least one vertex, at least one face, only in-range
//! indices and no face with fewer than three distinct vertices.

use nalgebra::Point3;

use super::index::{MeshIndex, VertexId};
use super::polygon::PolyMesh;
use crate::error::{MeshError, Result};

/// Build a mesh from vertices and polygon faces.
///
/// # Arguments
/// * `vertices` - List of vertex positions
/// * `faces` - List of faces, each a list of vertex indices in winding order
///
/// # Example
/// ```
/// use lapsmooth::mesh::{build_from_polygons, PolyMesh};
/// use nalgebra::Point3;
///
/// let vertices = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(1.0, 1.0, 0.0),
///     Point3::new(0.0, 1.0, 0.0),
/// ];
/// let faces = vec![vec![0, 1, 2, 3]];
///
/// let mesh: PolyMesh = build_from_polygons(&vertices, &faces).unwrap();
/// assert_eq!(mesh.num_vertices(), 4);
/// assert_eq!(mesh.num_faces(), 1);
/// ```
pub fn build_from_polygons<I, F>(vertices: &[Point3<f64>], faces: &[F]) -> Result<PolyMesh<I>>
where
    I: MeshIndex,
    F: AsRef<[usize]>,
{
    check_vertex_count::<I>(vertices.len())?;
    if faces.is_empty() {
        return Err(MeshError::EmptyMesh);
    }

    let total: usize = faces.iter().map(|f| f.as_ref().len()).sum();
    let mut face_starts = Vec::with_capacity(faces.len() + 1);
    let mut face_vertices = Vec::with_capacity(total);
    let mut scratch = Vec::new();

    for (fi, face) in faces.iter().enumerate() {
        let face = face.as_ref();
        validate_face(fi, face, vertices.len(), &mut scratch)?;
        face_starts.push(face_vertices.len());
        face_vertices.extend(face.iter().map(|&v| VertexId::<I>::new(v)));
    }
    face_starts.push(face_vertices.len());

    Ok(PolyMesh::from_parts(vertices.to_vec(), face_starts, face_vertices))
}

/// Build a mesh from vertices and triangle faces.
///
/// # Example
/// ```
/// use lapsmooth::mesh::{build_from_triangles, PolyMesh};
/// use nalgebra::Point3;
///
/// let vertices = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(0.5, 1.0, 0.0),
/// ];
/// let faces = vec![[0, 1, 2]];
///
/// let mesh: PolyMesh = build_from_triangles(&vertices, &faces).unwrap();
/// assert!(mesh.is_triangle_mesh());
/// ```
pub fn build_from_triangles<I: MeshIndex>(
    vertices: &[Point3<f64>],
    faces: &[[usize; 3]],
) -> Result<PolyMesh<I>> {
    build_from_polygons(vertices, faces)
}

/// Build a mesh from vertices and a flat face stream.
///
/// The stream holds each face as its vertex count followed by that many
/// vertex indices: `[n0, i0_0, .., i0_(n0-1), n1, ...]`.
///
/// # Example
/// ```
/// use lapsmooth::mesh::{build_from_flat_faces, PolyMesh};
/// use nalgebra::Point3;
///
/// let vertices = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(1.0, 1.0, 0.0),
///     Point3::new(0.0, 1.0, 0.0),
/// ];
/// let stream = [3, 0, 1, 2, 3, 0, 2, 3];
///
/// let mesh: PolyMesh = build_from_flat_faces(&vertices, &stream).unwrap();
/// assert_eq!(mesh.num_faces(), 2);
/// ```
pub fn build_from_flat_faces<I: MeshIndex>(
    vertices: &[Point3<f64>],
    stream: &[usize],
) -> Result<PolyMesh<I>> {
    let faces = split_flat_faces(stream)?;
    build_from_polygons(vertices, &faces)
}

/// Split a flat face stream into per-face slices without validating indices.
pub fn split_flat_faces(stream: &[usize]) -> Result<Vec<&[usize]>> {
    let mut faces = Vec::new();
    let mut offset = 0;
    while offset < stream.len() {
        let n = stream[offset];
        if n == 0 {
            return Err(MeshError::MalformedFaceStream {
                offset,
                reason: "face has a vertex count of zero",
            });
        }
        let start = offset + 1;
        let end = start
            .checked_add(n)
            .filter(|&end| end <= stream.len())
            .ok_or(MeshError::MalformedFaceStream {
                offset,
                reason: "face runs past the end of the stream",
            })?;
        faces.push(&stream[start..end]);
        offset = end;
    }
    Ok(faces)
}

fn check_vertex_count<I: MeshIndex>(count: usize) -> Result<()> {
    if count == 0 {
        return Err(MeshError::NoVertices);
    }
    // Every index in 0..count must fit, so count - 1 <= MAX.
    let max = I::max_usize().saturating_add(1);
    if count > max {
        return Err(MeshError::TooManyVertices { count, max });
    }
    Ok(())
}

pub(crate) fn validate_face(
    fi: usize,
    face: &[usize],
    num_vertices: usize,
    scratch: &mut Vec<usize>,
) -> Result<()> {
    if let Some(&bad) = face.iter().find(|&&v| v >= num_vertices) {
        return Err(MeshError::InvalidVertexIndex {
            face: fi,
            vertex: bad,
            num_vertices,
        });
    }

    scratch.clear();
    scratch.extend_from_slice(face);
    scratch.sort_unstable();
    scratch.dedup();
    if scratch.len() < 3 {
        return Err(MeshError::DegenerateFace { face: fi });
    }
    Ok(())
}
