//! Core mesh data structures.
//!
//! The primary type is [`PolyMesh`], an indexed polygon mesh: a vertex
//! position array plus faces of three or more vertex indices each. It is the
//! shape the smoothing pipeline consumes and produces.
//!
//! # Index Types
//!
//! Mesh elements are identified by type-safe index wrappers:
//! - [`VertexId`] - Identifies a vertex
//! - [`FaceId`] - Identifies a face
//!
//! These indices are generic over the underlying integer type ([`MeshIndex`] trait),
//! allowing you to choose `u16`, `u32`, or `u64` based on mesh size.
//!
//! # Construction
//!
//! ```
//! use lapsmooth::mesh::{PolyMesh, build_from_triangles};
//! use nalgebra::Point3;
//!
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.5, 1.0, 0.0),
//! ];
//! let faces = vec![[0, 1, 2]];
//!
//! let mesh: PolyMesh = build_from_triangles(&vertices, &faces).unwrap();
//! ```

mod builder;
mod index;
mod polygon;

pub(crate) use builder::validate_face;
pub use builder::{build_from_flat_faces, build_from_polygons, build_from_triangles, split_flat_faces};
pub use index::{FaceId, MeshIndex, VertexId};
pub use polygon::PolyMesh;
