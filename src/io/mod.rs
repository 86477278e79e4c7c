//! Mesh file I/O.
//!
//! This module provides functions for loading and saving meshes in various formats.
//!
//! # Supported Formats
//!
//! | Format | Extension | Load | Save | Notes |
//! |--------|-----------|------|------|-------|
//! | Wavefront OBJ | `.obj` | ✓ | ✓ | Polygon faces kept as-is |
//! | STL | `.stl` | ✓ | ✓ | Binary and ASCII; polygons fan-triangulated on save |
//! | PLY | `.ply` | ✓ | ✓ | Polygon faces kept as-is; saved as ASCII |
//!
//! # Usage
//!
//! ```no_run
//! use lapsmooth::io::{load, save};
//! use lapsmooth::mesh::PolyMesh;
//!
//! // Load with automatic format detection
//! let mesh: PolyMesh = load("model.obj").unwrap();
//!
//! // Save with automatic format detection
//! save(&mesh, "output.stl").unwrap();
//! ```

pub mod obj;
pub mod ply;
pub mod stl;

use std::path::{Path, PathBuf};

use crate::error::{MeshError, Result};
use crate::mesh::{MeshIndex, PolyMesh};

/// Supported mesh file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Wavefront OBJ format.
    Obj,
    /// STL (stereolithography) format.
    Stl,
    /// PLY (Stanford polygon) format.
    Ply,
}

impl Format {
    /// Detect format from file extension.
    pub fn from_extension(ext: &str) -> Option<Format> {
        match ext.to_lowercase().as_str() {
            "obj" => Some(Format::Obj),
            "stl" => Some(Format::Stl),
            "ply" => Some(Format::Ply),
            _ => None,
        }
    }

    /// Detect format from file path.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Format> {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(Format::from_extension)
    }
}

fn detect(path: &Path) -> Result<Format> {
    Format::from_path(path).ok_or_else(|| MeshError::UnsupportedFormat {
        extension: path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("(none)")
            .to_string(),
    })
}

/// Load a mesh from a file with automatic format detection.
///
/// The format is determined by the file extension.
pub fn load<P: AsRef<Path>, I: MeshIndex>(path: P) -> Result<PolyMesh<I>> {
    let path = path.as_ref();
    log::debug!("loading mesh from {}", path.display());

    match detect(path)? {
        Format::Obj => obj::load(path),
        Format::Stl => stl::load(path),
        Format::Ply => ply::load(path),
    }
}

/// Path a mesh is actually written to by [`save`].
///
/// A path without an extension gets `.obj` appended; any other path is
/// returned unchanged.
pub fn output_path<P: AsRef<Path>>(path: P) -> PathBuf {
    let path = path.as_ref();
    if path.extension().is_none() {
        path.with_extension("obj")
    } else {
        path.to_path_buf()
    }
}

/// Save a mesh to a file with automatic format detection.
///
/// The format is determined by the file extension. Paths without an
/// extension are written as OBJ, see [`output_path`].
pub fn save<P: AsRef<Path>, I: MeshIndex>(mesh: &PolyMesh<I>, path: P) -> Result<()> {
    let path = output_path(path);
    log::debug!("saving mesh to {}", path.display());

    match detect(&path)? {
        Format::Obj => obj::save(mesh, &path),
        Format::Stl => stl::save(mesh, &path),
        Format::Ply => ply::save(mesh, &path),
    }
}
