//! Laplacian mesh smoothing.
//!
//! Smoothing moves every free vertex part of the way toward the centroid of
//! its neighbors, repeated for a fixed number of passes. Boundary vertices
//! and vertices without neighbors never move, and faces are never touched.
//!
//! # Algorithms
//!
//! - [`laplacian_smooth`]: Classic uniform Laplacian smoothing (shrinks the mesh)
//! - [`taubin_smooth`]: Taubin's λ|μ smoothing (compensates shrinkage)
//! - [`relax_positions`]: The relaxation engine on its own, for callers that
//!   keep positions and [`Connectivity`] separately
//! - [`smooth_points`]: Stateless entry point over raw points and a flat face stream
//!
//! Every pass reads the previous pass's positions and writes a separate
//! buffer, so the result does not depend on the order vertices are visited
//! in and parallel execution gives bit-identical output.
//!
//! # Example
//!
//! ```
//! use lapsmooth::prelude::*;
//! use lapsmooth::algo::smooth::{laplacian_smooth, SmoothOptions};
//! use nalgebra::Point3;
//!
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.5, 1.0, 0.0),
//!     Point3::new(0.5, 0.5, 0.5),
//! ];
//! let faces = vec![[0, 1, 2], [0, 2, 3], [0, 3, 1], [1, 3, 2]];
//! let mesh: PolyMesh = build_from_triangles(&vertices, &faces).unwrap();
//!
//! let smoothed = laplacian_smooth(&mesh, &SmoothOptions::default()).unwrap();
//! assert_eq!(smoothed.num_vertices(), mesh.num_vertices());
//! ```

use nalgebra::{Point3, Vector3};
use rayon::prelude::*;

use crate::error::{MeshError, Result};
use crate::mesh::{build_from_flat_faces, MeshIndex, PolyMesh};

use super::connectivity::Connectivity;
use super::Progress;

/// Options for mesh smoothing algorithms.
#[derive(Debug, Clone)]
pub struct SmoothOptions {
    /// Number of smoothing iterations. Must be at least 1.
    pub iterations: usize,

    /// Smoothing factor in `[0.0, 1.0]`.
    /// 0 leaves the mesh untouched, 1 moves each free vertex all the way
    /// onto its neighbor centroid every pass.
    pub lambda: f64,

    /// Whether to use parallel execution (default: true).
    pub parallel: bool,
}

impl Default for SmoothOptions {
    fn default() -> Self {
        Self {
            iterations: 1,
            lambda: 0.5,
            parallel: true,
        }
    }
}

impl SmoothOptions {
    /// Create options with the specified number of iterations.
    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    /// Create options with the specified lambda value.
    ///
    /// The value is stored as given; [`SmoothOptions::validate`] rejects
    /// anything outside `[0, 1]`.
    pub fn with_lambda(mut self, lambda: f64) -> Self {
        self.lambda = lambda;
        self
    }

    /// Set whether to use parallel execution.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Create options for single-threaded execution.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Check the parameters before any work is done.
    pub fn validate(&self) -> Result<()> {
        if self.iterations < 1 {
            return Err(MeshError::invalid_param(
                "iterations",
                self.iterations,
                "must be at least 1",
            ));
        }
        if !(0.0..=1.0).contains(&self.lambda) {
            return Err(MeshError::invalid_param(
                "lambda",
                self.lambda,
                "must be in [0, 1]",
            ));
        }
        Ok(())
    }
}

/// Passband frequency used to derive Taubin's inflation factor.
const TAUBIN_K_PB: f64 = 0.1;

/// Performs Laplacian smoothing on a mesh.
///
/// Builds the mesh's [`Connectivity`], relaxes its positions and returns a
/// new mesh with the smoothed positions and the original faces. The input
/// mesh is not modified.
///
/// # Algorithm
///
/// For each iteration, for every vertex that is not on the boundary and has
/// at least one neighbor:
/// 1. Compute the centroid c of its neighbors from the previous iteration
/// 2. Move v towards c: `new_pos = old_pos + λ * (c - old_pos)`
///
/// # Errors
///
/// Returns [`MeshError::InvalidParameter`] if `options` fails validation.
///
/// # Example
///
/// ```
/// use lapsmooth::prelude::*;
/// use lapsmooth::algo::smooth::{laplacian_smooth, SmoothOptions};
/// use nalgebra::Point3;
///
/// let vertices = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(0.5, 1.0, 0.0),
/// ];
/// let faces = vec![[0, 1, 2]];
/// let mesh: PolyMesh = build_from_triangles(&vertices, &faces).unwrap();
///
/// let options = SmoothOptions::default()
///     .with_iterations(5)
///     .with_lambda(0.3);
/// let smoothed = laplacian_smooth(&mesh, &options).unwrap();
///
/// // A lone triangle is all boundary.
/// assert_eq!(smoothed.positions(), mesh.positions());
/// ```
pub fn laplacian_smooth<I: MeshIndex>(mesh: &PolyMesh<I>, options: &SmoothOptions) -> Result<PolyMesh<I>> {
    laplacian_smooth_with_progress(mesh, options, &Progress::none())
}

/// Laplacian smoothing with progress reporting.
pub fn laplacian_smooth_with_progress<I: MeshIndex>(
    mesh: &PolyMesh<I>,
    options: &SmoothOptions,
    progress: &Progress,
) -> Result<PolyMesh<I>> {
    options.validate()?;
    let connectivity = Connectivity::build(mesh)?;
    let positions = relax_positions_with_progress(mesh.positions(), &connectivity, options, progress)?;
    mesh.with_positions(positions)
}

/// Runs the relaxation engine over a position array.
///
/// `positions` must have one entry per vertex of `connectivity`. Returns a
/// freshly allocated array; the input is left as it was.
///
/// # Errors
///
/// - [`MeshError::InvalidParameter`] if `options` fails validation
/// - [`MeshError::VertexCountMismatch`] if the array length is wrong
pub fn relax_positions<I: MeshIndex>(
    positions: &[Point3<f64>],
    connectivity: &Connectivity<I>,
    options: &SmoothOptions,
) -> Result<Vec<Point3<f64>>> {
    relax_positions_with_progress(positions, connectivity, options, &Progress::none())
}

/// [`relax_positions`] with progress reporting.
pub fn relax_positions_with_progress<I: MeshIndex>(
    positions: &[Point3<f64>],
    connectivity: &Connectivity<I>,
    options: &SmoothOptions,
    progress: &Progress,
) -> Result<Vec<Point3<f64>>> {
    options.validate()?;
    check_positions(positions, connectivity)?;

    log::debug!(
        "laplacian smoothing: {} vertices, {} iterations, lambda={}, parallel={}",
        positions.len(),
        options.iterations,
        options.lambda,
        options.parallel
    );

    let mut buffers = Buffers::new(positions);
    for iter in 0..options.iterations {
        progress.report(iter, options.iterations, "Laplacian smoothing");
        log::trace!("laplacian pass {}/{}", iter + 1, options.iterations);
        buffers.pass(connectivity, options.lambda, options.parallel);
    }
    progress.report(options.iterations, options.iterations, "Laplacian smoothing");

    Ok(buffers.into_current())
}

/// Performs Taubin smoothing on a mesh.
///
/// Taubin smoothing alternates between a positive smoothing step (λ) and a
/// negative "inflation" step (μ) to reduce the shrinkage that occurs with
/// standard Laplacian smoothing. Boundary handling and validation are the
/// same as for [`laplacian_smooth`].
///
/// The μ value is computed as: `μ = λ / (k_pb * λ - 1)` with `k_pb = 0.1`.
///
/// # Reference
///
/// Taubin, G. (1995). "A signal processing approach to fair surface design."
/// SIGGRAPH '95.
pub fn taubin_smooth<I: MeshIndex>(mesh: &PolyMesh<I>, options: &SmoothOptions) -> Result<PolyMesh<I>> {
    taubin_smooth_with_progress(mesh, options, &Progress::none())
}

/// Taubin smoothing with progress reporting.
pub fn taubin_smooth_with_progress<I: MeshIndex>(
    mesh: &PolyMesh<I>,
    options: &SmoothOptions,
    progress: &Progress,
) -> Result<PolyMesh<I>> {
    options.validate()?;
    let connectivity = Connectivity::build(mesh)?;

    let lambda = options.lambda;
    let mu = lambda / (TAUBIN_K_PB * lambda - 1.0);

    log::debug!(
        "taubin smoothing: {} vertices, {} iterations, lambda={}, mu={}",
        mesh.num_vertices(),
        options.iterations,
        lambda,
        mu
    );

    let mut buffers = Buffers::new(mesh.positions());
    for iter in 0..options.iterations {
        progress.report(iter, options.iterations, "Taubin smoothing");
        buffers.pass(&connectivity, lambda, options.parallel);
        buffers.pass(&connectivity, mu, options.parallel);
    }
    progress.report(options.iterations, options.iterations, "Taubin smoothing");

    mesh.with_positions(buffers.into_current())
}

/// Smooths raw points with faces given as a flat face stream.
///
/// This is the whole pipeline as one pure function of
/// `(points, faces, lambda, iterations)`: faces are decoded and validated,
/// connectivity is built, and the relaxed points are returned. See
/// [`crate::mesh::build_from_flat_faces`] for the stream layout.
///
/// # Example
///
/// ```
/// use lapsmooth::algo::smooth::smooth_points;
/// use nalgebra::Point3;
///
/// let points = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(0.5, 1.0, 0.0),
///     Point3::new(0.5, 0.5, 1.0),
/// ];
/// let faces = [3, 0, 2, 1, 3, 0, 1, 3, 3, 1, 2, 3, 3, 2, 0, 3];
///
/// let smoothed = smooth_points(&points, &faces, 0.5, 10).unwrap();
/// assert_eq!(smoothed.len(), 4);
/// ```
pub fn smooth_points(
    points: &[Point3<f64>],
    faces: &[usize],
    lambda: f64,
    iterations: usize,
) -> Result<Vec<Point3<f64>>> {
    let options = SmoothOptions::default()
        .with_lambda(lambda)
        .with_iterations(iterations);
    options.validate()?;

    let mesh: PolyMesh<u32> = build_from_flat_faces(points, faces)?;
    Ok(laplacian_smooth(&mesh, &options)?.into_positions())
}

fn check_positions<I: MeshIndex>(positions: &[Point3<f64>], connectivity: &Connectivity<I>) -> Result<()> {
    if positions.is_empty() {
        return Err(MeshError::NoVertices);
    }
    if positions.len() != connectivity.num_vertices() {
        return Err(MeshError::VertexCountMismatch {
            expected: connectivity.num_vertices(),
            actual: positions.len(),
        });
    }
    Ok(())
}

/// Double buffer for Jacobi-style passes: `current` is only read during a
/// pass, `next` is only written, then the two swap.
struct Buffers {
    current: Vec<Point3<f64>>,
    next: Vec<Point3<f64>>,
}

impl Buffers {
    fn new(positions: &[Point3<f64>]) -> Self {
        Self {
            current: positions.to_vec(),
            next: positions.to_vec(),
        }
    }

    fn pass<I: MeshIndex>(&mut self, connectivity: &Connectivity<I>, factor: f64, parallel: bool) {
        let current = &self.current;
        if parallel {
            self.next
                .par_iter_mut()
                .enumerate()
                .for_each(|(i, out)| *out = compute_laplacian_step(connectivity, current, i, factor));
        } else {
            self.next
                .iter_mut()
                .enumerate()
                .for_each(|(i, out)| *out = compute_laplacian_step(connectivity, current, i, factor));
        }
        std::mem::swap(&mut self.current, &mut self.next);
    }

    fn into_current(self) -> Vec<Point3<f64>> {
        self.current
    }
}

/// Compute one uniform Laplacian step for vertex `i`.
fn compute_laplacian_step<I: MeshIndex>(
    connectivity: &Connectivity<I>,
    positions: &[Point3<f64>],
    i: usize,
    factor: f64,
) -> Point3<f64> {
    let pos = positions[i];
    if connectivity.boundary_flags()[i] {
        return pos;
    }

    let neighbors = connectivity.row(i);
    if neighbors.is_empty() {
        return pos;
    }

    let sum = neighbors
        .iter()
        .fold(Vector3::zeros(), |acc, n| acc + positions[n.index()].coords);
    let centroid = sum / neighbors.len() as f64;

    Point3::from(pos.coords + factor * (centroid - pos.coords))
}
