//! Error types for lapsmooth.
//!
//! Every failure in the library is reported through [`MeshError`]. The
//! smoothing core never retries and never clamps: a bad face or a bad
//! parameter comes back to the caller as-is, and [`MeshError::kind`] tells it
//! which class of contract violation it is looking at.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using [`MeshError`].
pub type Result<T> = std::result::Result<T, MeshError>;

/// Errors that can occur during mesh operations.
#[derive(Error, Debug)]
pub enum MeshError {
    /// The mesh has no vertices.
    #[error("mesh has no vertices")]
    NoVertices,

    /// The mesh has no faces.
    #[error("mesh has no faces")]
    EmptyMesh,

    /// A face references a vertex index outside `[0, num_vertices)`.
    #[error("face {face} references invalid vertex index {vertex} (mesh has {num_vertices} vertices)")]
    InvalidVertexIndex {
        /// The face index.
        face: usize,
        /// The invalid vertex index.
        vertex: usize,
        /// Number of vertices in the mesh.
        num_vertices: usize,
    },

    /// A face has fewer than three distinct vertices.
    #[error("face {face} is degenerate (fewer than 3 distinct vertices)")]
    DegenerateFace {
        /// The face index.
        face: usize,
    },

    /// A flat face stream could not be decoded.
    #[error("malformed face stream at offset {offset}: {reason}")]
    MalformedFaceStream {
        /// Position in the stream where decoding failed.
        offset: usize,
        /// What was wrong.
        reason: &'static str,
    },

    /// A position array does not match the vertex count of the connectivity.
    #[error("expected {expected} vertex positions, got {actual}")]
    VertexCountMismatch {
        /// Vertex count of the connectivity.
        expected: usize,
        /// Length of the supplied position array.
        actual: usize,
    },

    /// The mesh has more vertices than the chosen index type can address.
    #[error("mesh has {count} vertices, index type supports at most {max}")]
    TooManyVertices {
        /// Number of vertices supplied.
        count: usize,
        /// Largest vertex count the index type supports.
        max: usize,
    },

    /// Invalid parameter value.
    #[error("invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// The invalid value (as string).
        value: String,
        /// Reason the value is invalid.
        reason: &'static str,
    },

    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error loading mesh from file.
    #[error("failed to load mesh from {path}: {message}")]
    LoadError {
        /// The file path.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// Error saving mesh to file.
    #[error("failed to save mesh to {path}: {message}")]
    SaveError {
        /// The file path.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// Unsupported file format.
    #[error("unsupported file format: {extension}")]
    UnsupportedFormat {
        /// The file extension.
        extension: String,
    },
}

/// Broad classification of a [`MeshError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Faces reference missing or repeated vertices, or arrays disagree in size.
    InvalidGeometry,
    /// A smoothing parameter is out of range.
    InvalidParameter,
    /// No vertices or no faces were supplied.
    EmptyInput,
    /// Reading or writing a mesh file failed.
    Io,
}

impl MeshError {
    /// Create an invalid parameter error.
    pub fn invalid_param<T: std::fmt::Display>(
        name: &'static str,
        value: T,
        reason: &'static str,
    ) -> Self {
        MeshError::InvalidParameter {
            name,
            value: value.to_string(),
            reason,
        }
    }

    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            MeshError::NoVertices | MeshError::EmptyMesh => ErrorKind::EmptyInput,
            MeshError::InvalidVertexIndex { .. }
            | MeshError::DegenerateFace { .. }
            | MeshError::MalformedFaceStream { .. }
            | MeshError::VertexCountMismatch { .. }
            | MeshError::TooManyVertices { .. } => ErrorKind::InvalidGeometry,
            MeshError::InvalidParameter { .. } => ErrorKind::InvalidParameter,
            MeshError::Io(_)
            | MeshError::LoadError { .. }
            | MeshError::SaveError { .. }
            | MeshError::UnsupportedFormat { .. } => ErrorKind::Io,
        }
    }
}
