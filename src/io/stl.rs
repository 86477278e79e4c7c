//! STL (stereolithography) format support.
//!
//! This module provides loading and saving of meshes in the STL format,
//! commonly used for 3D printing. Both binary and ASCII formats are read;
//! files are written as binary. STL only knows triangles, so polygon faces
//! are fan-triangulated on save.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use nalgebra::{Point3, Vector3};

use crate::error::{MeshError, Result};
use crate::mesh::{build_from_triangles, MeshIndex, PolyMesh};

/// Load a mesh from an STL file.
///
/// Automatically detects binary vs ASCII format. Coincident corners are
/// welded by `stl_io`, so shared edges are recognized as such; triangles
/// that collapse after welding are dropped.
///
/// # Example
///
/// ```no_run
/// use lapsmooth::io::stl;
/// use lapsmooth::mesh::PolyMesh;
///
/// let mesh: PolyMesh = stl::load("model.stl").unwrap();
/// ```
pub fn load<P: AsRef<Path>, I: MeshIndex>(path: P) -> Result<PolyMesh<I>> {
    let path = path.as_ref();
    let mut file = File::open(path)?;

    let stl = stl_io::read_stl(&mut file).map_err(|e| MeshError::LoadError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let vertices: Vec<Point3<f64>> = stl
        .vertices
        .iter()
        .map(|v| Point3::new(v[0] as f64, v[1] as f64, v[2] as f64))
        .collect();

    let faces: Vec<[usize; 3]> = stl
        .faces
        .iter()
        .map(|tri| tri.vertices)
        .filter(|[i0, i1, i2]| i0 != i1 && i1 != i2 && i0 != i2)
        .collect();

    if faces.is_empty() {
        return Err(MeshError::LoadError {
            path: path.to_path_buf(),
            message: "STL file contains no valid triangles".to_string(),
        });
    }

    let skipped = stl.faces.len() - faces.len();
    if skipped > 0 {
        log::warn!("{}: skipped {} degenerate triangles", path.display(), skipped);
    }

    build_from_triangles(&vertices, &faces)
}

/// Save a mesh to a binary STL file.
///
/// # Example
///
/// ```no_run
/// use lapsmooth::io::stl;
/// use lapsmooth::mesh::PolyMesh;
/// # let mesh: PolyMesh = stl::load("model.stl").unwrap();
///
/// stl::save(&mesh, "output.stl").unwrap();
/// ```
pub fn save<P: AsRef<Path>, I: MeshIndex>(mesh: &PolyMesh<I>, path: P) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    let vertices = mesh.positions();
    let triangles: Vec<stl_io::Triangle> = mesh
        .triangles()
        .iter()
        .map(|f| {
            let p0 = &vertices[f[0]];
            let p1 = &vertices[f[1]];
            let p2 = &vertices[f[2]];
            let n = triangle_normal(p0, p1, p2);

            stl_io::Triangle {
                normal: stl_io::Normal::new([n.x as f32, n.y as f32, n.z as f32]),
                vertices: [
                    stl_io::Vertex::new([p0.x as f32, p0.y as f32, p0.z as f32]),
                    stl_io::Vertex::new([p1.x as f32, p1.y as f32, p1.z as f32]),
                    stl_io::Vertex::new([p2.x as f32, p2.y as f32, p2.z as f32]),
                ],
            }
        })
        .collect();

    stl_io::write_stl(&mut writer, triangles.iter()).map_err(|e| MeshError::SaveError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    writer.flush()?;

    Ok(())
}

/// Unit normal of a triangle, or zero for a degenerate one.
fn triangle_normal(p0: &Point3<f64>, p1: &Point3<f64>, p2: &Point3<f64>) -> Vector3<f64> {
    let n = (p1 - p0).cross(&(p2 - p0));
    n.try_normalize(1e-12).unwrap_or_else(Vector3::zeros)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::build_from_polygons;

    #[test]
    fn test_save_and_load_square() {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        let mesh: PolyMesh = build_from_polygons(&vertices, &[vec![0, 1, 2, 3]]).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("square.stl");
        save(&mesh, &path).unwrap();

        let loaded: PolyMesh = load(&path).unwrap();
        assert_eq!(loaded.num_faces(), 2);
        assert_eq!(loaded.num_vertices(), 4);
        assert!(loaded.is_triangle_mesh());
    }

    #[test]
    fn test_degenerate_normal_is_zero() {
        let p = Point3::new(1.0, 2.0, 3.0);
        assert_eq!(triangle_normal(&p, &p, &p), Vector3::zeros());

        let n = triangle_normal(
            &Point3::origin(),
            &Point3::new(1.0, 0.0, 0.0),
            &Point3::new(0.0, 1.0, 0.0),
        );
        assert!((n - Vector3::z()).norm() < 1e-12);
    }
}
