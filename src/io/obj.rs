//! Wavefront OBJ format support.
//!
//! Only geometry is read: `v` records become vertex positions and `f`
//! records become polygon faces, with their side count preserved. Texture
//! coordinates, normals, groups and materials are skipped. Face corners may
//! use any of the `v`, `v/vt`, `v//vn` or `v/vt/vn` forms, and negative
//! indices count back from the most recent vertex.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use nalgebra::Point3;

use crate::error::{MeshError, Result};
use crate::mesh::{build_from_polygons, MeshIndex, PolyMesh};

/// Load a mesh from an OBJ file.
///
/// # Example
///
/// ```no_run
/// use lapsmooth::io::obj;
/// use lapsmooth::mesh::PolyMesh;
///
/// let mesh: PolyMesh = obj::load("model.obj").unwrap();
/// ```
pub fn load<P: AsRef<Path>, I: MeshIndex>(path: P) -> Result<PolyMesh<I>> {
    let path = path.as_ref();
    let file = File::open(path)?;

    let (vertices, faces) = parse(BufReader::new(file)).map_err(|e| match e {
        ParseError::Io(e) => MeshError::Io(e),
        ParseError::Syntax { line, message } => MeshError::LoadError {
            path: path.to_path_buf(),
            message: format!("line {}: {}", line, message),
        },
    })?;

    if faces.is_empty() {
        return Err(MeshError::LoadError {
            path: path.to_path_buf(),
            message: "OBJ file contains no faces".to_string(),
        });
    }

    build_from_polygons(&vertices, &faces)
}

/// Read a mesh from OBJ text.
///
/// # Example
///
/// ```
/// use lapsmooth::io::obj;
/// use lapsmooth::mesh::PolyMesh;
///
/// let text = "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf 1 2 3 4\n";
/// let mesh: PolyMesh = obj::read(text.as_bytes()).unwrap();
/// assert_eq!(mesh.num_faces(), 1);
/// ```
pub fn read<R: BufRead, I: MeshIndex>(reader: R) -> Result<PolyMesh<I>> {
    let (vertices, faces) = parse(reader).map_err(|e| match e {
        ParseError::Io(e) => MeshError::Io(e),
        ParseError::Syntax { line, message } => MeshError::LoadError {
            path: "<reader>".into(),
            message: format!("line {}: {}", line, message),
        },
    })?;
    build_from_polygons(&vertices, &faces)
}

/// Save a mesh to an OBJ file.
///
/// # Example
///
/// ```no_run
/// use lapsmooth::io::obj;
/// use lapsmooth::mesh::PolyMesh;
/// # let mesh: PolyMesh = obj::load("model.obj").unwrap();
///
/// obj::save(&mesh, "output.obj").unwrap();
/// ```
pub fn save<P: AsRef<Path>, I: MeshIndex>(mesh: &PolyMesh<I>, path: P) -> Result<()> {
    let file = File::create(path.as_ref())?;
    let mut writer = BufWriter::new(file);
    write(mesh, &mut writer)?;
    writer.flush()?;
    Ok(())
}

/// Write a mesh as OBJ text.
pub fn write<W: Write, I: MeshIndex>(mesh: &PolyMesh<I>, writer: &mut W) -> Result<()> {
    writeln!(writer, "# Generated by lapsmooth")?;
    writeln!(writer, "# {} vertices, {} faces", mesh.num_vertices(), mesh.num_faces())?;

    for p in mesh.positions() {
        writeln!(writer, "v {} {} {}", p.x, p.y, p.z)?;
    }

    for face in mesh.faces() {
        write!(writer, "f")?;
        for v in face {
            write!(writer, " {}", v.index() + 1)?;
        }
        writeln!(writer)?;
    }

    Ok(())
}

enum ParseError {
    Io(std::io::Error),
    Syntax { line: usize, message: String },
}

impl From<std::io::Error> for ParseError {
    fn from(e: std::io::Error) -> Self {
        ParseError::Io(e)
    }
}

type Parsed = (Vec<Point3<f64>>, Vec<Vec<usize>>);

fn parse<R: BufRead>(reader: R) -> std::result::Result<Parsed, ParseError> {
    let mut vertices = Vec::new();
    let mut faces = Vec::new();

    for (lineno, line) in reader.lines().enumerate() {
        let line = line?;
        let lineno = lineno + 1;
        let syntax = |message: String| ParseError::Syntax {
            line: lineno,
            message,
        };

        let content = line.split('#').next().unwrap_or("").trim();
        let mut parts = content.split_whitespace();
        match parts.next() {
            Some("v") => {
                let mut coords = [0.0f64; 3];
                for c in &mut coords {
                    let token = parts
                        .next()
                        .ok_or_else(|| syntax("vertex needs three coordinates".to_string()))?;
                    *c = token
                        .parse()
                        .map_err(|_| syntax(format!("bad coordinate '{}'", token)))?;
                }
                vertices.push(Point3::new(coords[0], coords[1], coords[2]));
            }
            Some("f") => {
                let face = parts
                    .map(|token| resolve_index(token, vertices.len()))
                    .collect::<std::result::Result<Vec<usize>, String>>()
                    .map_err(&syntax)?;
                if face.len() < 3 {
                    return Err(syntax(format!("face has {} vertices", face.len())));
                }
                faces.push(face);
            }
            _ => {}
        }
    }

    Ok((vertices, faces))
}

/// Turn one face corner token into a zero-based vertex index.
fn resolve_index(token: &str, vertices_so_far: usize) -> std::result::Result<usize, String> {
    let position = token.split('/').next().unwrap_or("");
    let raw: i64 = position
        .parse()
        .map_err(|_| format!("bad face index '{}'", token))?;

    if raw > 0 {
        Ok(raw as usize - 1)
    } else if raw < 0 {
        let back = raw.unsigned_abs() as usize;
        vertices_so_far
            .checked_sub(back)
            .ok_or_else(|| format!("relative index {} points before the first vertex", raw))
    } else {
        Err("face index 0 is not valid in OBJ".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::FaceId;

    const CUBE_QUADS: &str = "\
# unit cube, quad faces
o cube
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
v 0 0 1
v 1 0 1
v 1 1 1
v 0 1 1
vn 0 0 -1
s off
f 1 4 3 2
f 5 6 7 8
f 1 2 6 5
f 2 3 7 6
f 3 4 8 7
f 4 1 5 8
";

    #[test]
    fn test_read_quads() {
        let mesh: PolyMesh = read(CUBE_QUADS.as_bytes()).unwrap();
        assert_eq!(mesh.num_vertices(), 8);
        assert_eq!(mesh.num_faces(), 6);
        assert!(mesh.is_quad_mesh());

        let first: Vec<usize> = mesh
            .face_vertices(FaceId::new(0))
            .iter()
            .map(|v| v.index())
            .collect();
        assert_eq!(first, vec![0, 3, 2, 1]);
    }

    #[test]
    fn test_corner_forms_and_relative_indices() {
        let text = "v 0 0 0\nv 1 0 0\nv 0 1 0\nvt 0 0\nvn 0 0 1\nf 1/1 2/1/1 3//1\nf -3 -2 -1\n";
        let mesh: PolyMesh = read(text.as_bytes()).unwrap();
        assert_eq!(mesh.face_index_lists(), vec![vec![0, 1, 2], vec![0, 1, 2]]);
    }

    #[test]
    fn test_syntax_errors() {
        let err = read::<_, u32>("v 0 0\nf 1 2 3\n".as_bytes()).unwrap_err();
        assert!(err.to_string().contains("line 1"), "{}", err);

        let err = read::<_, u32>("v 0 0 0\nf 0 1 2\n".as_bytes()).unwrap_err();
        assert!(err.to_string().contains("index 0"), "{}", err);

        let err = read::<_, u32>("v 0 0 0\nf -2 1 1\n".as_bytes()).unwrap_err();
        assert!(err.to_string().contains("before the first vertex"), "{}", err);
    }

    #[test]
    fn test_out_of_range_face_is_geometry_error() {
        let err = read::<_, u32>("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 9\n".as_bytes()).unwrap_err();
        assert!(matches!(err, MeshError::InvalidVertexIndex { vertex: 8, .. }));
    }

    #[test]
    fn test_write_then_read() {
        let mesh: PolyMesh = read(CUBE_QUADS.as_bytes()).unwrap();

        let mut buffer = Vec::new();
        write(&mesh, &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert!(text.contains("f 1 4 3 2"));

        let again: PolyMesh = read(text.as_bytes()).unwrap();
        assert_eq!(again, mesh);
    }

    #[test]
    fn test_save_and_load_file() {
        let mesh: PolyMesh = read(CUBE_QUADS.as_bytes()).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cube.obj");
        save(&mesh, &path).unwrap();

        let loaded: PolyMesh = load(&path).unwrap();
        assert_eq!(loaded, mesh);
    }

    #[test]
    fn test_load_without_faces() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("points.obj");
        std::fs::write(&path, "v 0 0 0\nv 1 0 0\n").unwrap();

        let err = load::<_, u32>(&path).unwrap_err();
        assert!(matches!(err, MeshError::LoadError { .. }));
    }
}
