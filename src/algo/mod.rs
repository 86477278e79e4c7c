//! Mesh processing algorithms.
//!
//! Smoothing is a two-stage pipeline:
//!
//! - **Connectivity**: vertex adjacency and boundary classification
//!   derived from the face list ([`connectivity`])
//! - **Smoothing**: Laplacian relaxation of the free vertices, plus the
//!   Taubin variant built on the same passes ([`smooth`])

pub mod connectivity;
mod progress;
pub mod smooth;

pub use progress::Progress;
