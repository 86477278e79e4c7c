//! Property-based tests for Laplacian smoothing.
//!
//! These tests use proptest to generate random grid meshes and verify the
//! invariants every smoothing run must keep.
//!
//! Run with: cargo test --test smoothing_properties

use lapsmooth::prelude::*;
use lapsmooth::algo::smooth::smooth_points;
use nalgebra::Point3;
use proptest::prelude::*;

// =============================================================================
// Strategies for generating random meshes
// =============================================================================

/// A grid of `nx * ny` quads with random heights, optionally split into triangles.
#[derive(Debug, Clone)]
struct GridCase {
    nx: usize,
    ny: usize,
    points: Vec<Point3<f64>>,
    triangulate: bool,
}

impl GridCase {
    fn faces(&self) -> Vec<Vec<usize>> {
        let mut faces = Vec::new();
        for j in 0..self.ny {
            for i in 0..self.nx {
                let v00 = j * (self.nx + 1) + i;
                let v10 = v00 + 1;
                let v01 = v00 + self.nx + 1;
                let v11 = v01 + 1;
                if self.triangulate {
                    faces.push(vec![v00, v10, v11]);
                    faces.push(vec![v00, v11, v01]);
                } else {
                    faces.push(vec![v00, v10, v11, v01]);
                }
            }
        }
        faces
    }

    fn mesh(&self) -> PolyMesh {
        build_from_polygons(&self.points, &self.faces()).unwrap()
    }

    fn is_rim(&self, v: usize) -> bool {
        let (i, j) = (v % (self.nx + 1), v / (self.nx + 1));
        i == 0 || j == 0 || i == self.nx || j == self.ny
    }
}

fn arb_grid() -> impl Strategy<Value = GridCase> {
    (1usize..=6, 1usize..=6, any::<bool>()).prop_flat_map(|(nx, ny, triangulate)| {
        let count = (nx + 1) * (ny + 1);
        prop::collection::vec(-1.0..1.0f64, count).prop_map(move |heights| {
            let points = heights
                .iter()
                .enumerate()
                .map(|(v, &z)| Point3::new((v % (nx + 1)) as f64, (v / (nx + 1)) as f64, z))
                .collect();
            GridCase {
                nx,
                ny,
                points,
                triangulate,
            }
        })
    })
}

fn arb_lambda() -> impl Strategy<Value = f64> {
    0.0..=1.0f64
}

// =============================================================================
// Property tests
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// The grid rim is exactly the boundary set.
    #[test]
    fn grid_rim_is_boundary(grid in arb_grid()) {
        let mesh = grid.mesh();
        let connectivity = Connectivity::build(&mesh).unwrap();

        for v in mesh.vertex_ids() {
            prop_assert_eq!(connectivity.is_boundary(v), grid.is_rim(v.index()));
        }
    }

    /// Boundary vertices never move, whatever the parameters.
    #[test]
    fn boundary_is_fixed(grid in arb_grid(), lambda in arb_lambda(), iterations in 1usize..8) {
        let mesh = grid.mesh();
        let options = SmoothOptions::default().with_lambda(lambda).with_iterations(iterations);
        let smoothed = laplacian_smooth(&mesh, &options).unwrap();

        for (v, (before, after)) in mesh.positions().iter().zip(smoothed.positions()).enumerate() {
            if grid.is_rim(v) {
                prop_assert_eq!(before, after);
            }
        }
    }

    /// Smoothing keeps vertex count and faces.
    #[test]
    fn topology_is_preserved(grid in arb_grid(), lambda in arb_lambda()) {
        let mesh = grid.mesh();
        let options = SmoothOptions::default().with_lambda(lambda).with_iterations(3);
        let smoothed = laplacian_smooth(&mesh, &options).unwrap();

        prop_assert_eq!(smoothed.num_vertices(), mesh.num_vertices());
        prop_assert_eq!(smoothed.to_flat_faces(), mesh.to_flat_faces());
    }

    /// A zero factor returns the input exactly.
    #[test]
    fn zero_lambda_is_identity(grid in arb_grid(), iterations in 1usize..8) {
        let mesh = grid.mesh();
        let options = SmoothOptions::default().with_lambda(0.0).with_iterations(iterations);
        let smoothed = laplacian_smooth(&mesh, &options).unwrap();

        prop_assert_eq!(smoothed.positions(), mesh.positions());
    }

    /// Running K passes at once equals K single-pass runs chained.
    #[test]
    fn chained_runs_match_single_call(grid in arb_grid(), lambda in arb_lambda(), iterations in 1usize..6) {
        let mesh = grid.mesh();
        let connectivity = Connectivity::build(&mesh).unwrap();

        let all_at_once = relax_positions(
            mesh.positions(),
            &connectivity,
            &SmoothOptions::default().with_lambda(lambda).with_iterations(iterations),
        )
        .unwrap();

        let one_pass = SmoothOptions::default().with_lambda(lambda).with_iterations(1);
        let mut chained = mesh.positions().to_vec();
        for _ in 0..iterations {
            chained = relax_positions(&chained, &connectivity, &one_pass).unwrap();
        }

        prop_assert_eq!(all_at_once, chained);
    }

    /// Parallel and sequential passes produce bit-identical output.
    #[test]
    fn parallel_matches_sequential(grid in arb_grid(), lambda in arb_lambda()) {
        let mesh = grid.mesh();
        let options = SmoothOptions::default().with_lambda(lambda).with_iterations(4);

        let parallel = laplacian_smooth(&mesh, &options.clone().with_parallel(true)).unwrap();
        let sequential = laplacian_smooth(&mesh, &options.sequential()).unwrap();

        prop_assert_eq!(parallel.positions(), sequential.positions());
    }

    /// Every free vertex stays inside the bounding box of the input.
    #[test]
    fn stays_within_bounds(grid in arb_grid(), lambda in arb_lambda(), iterations in 1usize..8) {
        let mesh = grid.mesh();
        let (min, max) = mesh.bounding_box().unwrap();
        let options = SmoothOptions::default().with_lambda(lambda).with_iterations(iterations);
        let smoothed = laplacian_smooth(&mesh, &options).unwrap();

        for p in smoothed.positions() {
            for axis in 0..3 {
                prop_assert!(p[axis] >= min[axis] - 1e-12 && p[axis] <= max[axis] + 1e-12);
            }
        }
    }

    /// The flat-stream entry point agrees with the mesh pipeline.
    #[test]
    fn flat_stream_matches_mesh_pipeline(grid in arb_grid(), lambda in arb_lambda(), iterations in 1usize..6) {
        let mesh = grid.mesh();
        let options = SmoothOptions::default().with_lambda(lambda).with_iterations(iterations);

        let from_mesh = laplacian_smooth(&mesh, &options).unwrap();
        let from_stream = smooth_points(&grid.points, &mesh.to_flat_faces(), lambda, iterations).unwrap();

        prop_assert_eq!(from_mesh.positions(), &from_stream[..]);
    }
}

// =============================================================================
// Fixed-input tests
// =============================================================================

#[test]
fn out_of_range_parameters_are_rejected() {
    let grid = GridCase {
        nx: 2,
        ny: 2,
        points: (0..9).map(|v| Point3::new((v % 3) as f64, (v / 3) as f64, 0.0)).collect(),
        triangulate: false,
    };
    let mesh = grid.mesh();

    for lambda in [-0.1, 1.5, f64::NAN] {
        let err = laplacian_smooth(&mesh, &SmoothOptions::default().with_lambda(lambda)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParameter);
    }

    let err = laplacian_smooth(&mesh, &SmoothOptions::default().with_iterations(0)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidParameter);
}

#[test]
fn center_of_flat_grid_moves_to_neighbor_average() {
    let mut points: Vec<Point3<f64>> =
        (0..9).map(|v| Point3::new((v % 3) as f64, (v / 3) as f64, 0.0)).collect();
    points[4].z = 1.0;
    let grid = GridCase {
        nx: 2,
        ny: 2,
        points,
        triangulate: false,
    };
    let mesh = grid.mesh();

    let smoothed = laplacian_smooth(&mesh, &SmoothOptions::default().with_lambda(1.0)).unwrap();
    let center = smoothed.positions()[4];
    assert!((center - Point3::new(1.0, 1.0, 0.0)).norm() < 1e-12);
}
