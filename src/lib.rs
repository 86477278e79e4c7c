//! # lapsmooth
//!
//! Uniform Laplacian smoothing for polygon surface meshes.
//!
//! lapsmooth takes a mesh (vertex positions plus faces of three or more
//! vertices), works out which vertices neighbor which and which lie on an
//! open boundary, and then repeatedly pulls every interior vertex part of
//! the way toward the centroid of its neighbors. Boundary vertices stay
//! where they are and faces are never modified, so the result can be paired
//! with the original connectivity as-is.
//!
//! ## Features
//!
//! - **Polygon meshes**: Triangles, quads and mixed n-gons
//! - **Flexible indexing**: Support for 16-bit, 32-bit, and 64-bit indices
//! - **Order-independent passes**: Double-buffered updates, optionally parallel via rayon
//! - **Multiple file formats**: OBJ, STL, PLY
//!
//! ## Quick Start
//!
//! ```no_run
//! use lapsmooth::prelude::*;
//!
//! let mesh: PolyMesh = lapsmooth::io::load("model.obj").unwrap();
//!
//! let options = SmoothOptions::default().with_lambda(0.5).with_iterations(10);
//! let smoothed = laplacian_smooth(&mesh, &options).unwrap();
//!
//! lapsmooth::io::save(&smoothed, "smoothed.obj").unwrap();
//! ```
//!
//! ## Working With Raw Arrays
//!
//! ```
//! use lapsmooth::algo::smooth::smooth_points;
//! use nalgebra::Point3;
//!
//! // A square split into two triangles: every vertex is on the boundary.
//! let points = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(1.0, 1.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.0),
//! ];
//! let faces = [3, 0, 1, 2, 3, 0, 2, 3];
//!
//! let smoothed = smooth_points(&points, &faces, 0.5, 10).unwrap();
//! assert_eq!(smoothed, points);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod algo;
pub mod error;
pub mod io;
pub mod mesh;

/// Prelude module for convenient imports.
///
/// ```
/// use lapsmooth::prelude::*;
/// ```
pub mod prelude {
    pub use crate::algo::connectivity::{Connectivity, Edge};
    pub use crate::algo::smooth::{laplacian_smooth, relax_positions, taubin_smooth, SmoothOptions};
    pub use crate::algo::Progress;
    pub use crate::error::{ErrorKind, MeshError, Result};
    pub use crate::mesh::{
        build_from_flat_faces, build_from_polygons, build_from_triangles, FaceId, MeshIndex,
        PolyMesh, VertexId,
    };
}

// Re-export nalgebra types for convenience
pub use nalgebra;
