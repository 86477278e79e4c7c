//! PLY (Stanford polygon) format support.
//!
//! This module provides loading and saving of meshes in the PLY format,
//! also known as the Polygon File Format or Stanford Triangle Format.
//! Faces keep their side count in both directions.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use nalgebra::Point3;
use ply_rs::parser::Parser;
use ply_rs::ply::{DefaultElement, Property};

use crate::error::{MeshError, Result};
use crate::mesh::{build_from_polygons, MeshIndex, PolyMesh};

/// Load a mesh from a PLY file.
///
/// # Example
///
/// ```no_run
/// use lapsmooth::io::ply;
/// use lapsmooth::mesh::PolyMesh;
///
/// let mesh: PolyMesh = ply::load("model.ply").unwrap();
/// ```
pub fn load<P: AsRef<Path>, I: MeshIndex>(path: P) -> Result<PolyMesh<I>> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);

    let load_error = |message: &str| MeshError::LoadError {
        path: path.to_path_buf(),
        message: message.to_string(),
    };

    let parser = Parser::<DefaultElement>::new();
    let ply = parser
        .read_ply(&mut reader)
        .map_err(|e| load_error(&e.to_string()))?;

    let vertex_element = ply
        .payload
        .get("vertex")
        .ok_or_else(|| load_error("PLY file has no vertex element"))?;

    let mut vertices: Vec<Point3<f64>> = Vec::with_capacity(vertex_element.len());
    for vertex in vertex_element {
        let x = get_float_property(vertex, "x").ok_or_else(|| load_error("vertex missing x coordinate"))?;
        let y = get_float_property(vertex, "y").ok_or_else(|| load_error("vertex missing y coordinate"))?;
        let z = get_float_property(vertex, "z").ok_or_else(|| load_error("vertex missing z coordinate"))?;
        vertices.push(Point3::new(x, y, z));
    }

    let face_element = ply
        .payload
        .get("face")
        .ok_or_else(|| load_error("PLY file has no face element"))?;

    let mut faces: Vec<Vec<usize>> = Vec::with_capacity(face_element.len());
    for face in face_element {
        let indices = get_list_property(face, "vertex_indices")
            .or_else(|| get_list_property(face, "vertex_index"))
            .ok_or_else(|| load_error("face missing vertex_indices property"))?;
        faces.push(indices);
    }

    if faces.is_empty() {
        return Err(load_error("PLY file contains no faces"));
    }

    build_from_polygons(&vertices, &faces)
}

fn get_float_property(element: &DefaultElement, name: &str) -> Option<f64> {
    match element.get(name)? {
        Property::Float(v) => Some(*v as f64),
        Property::Double(v) => Some(*v),
        Property::Int(v) => Some(*v as f64),
        Property::UInt(v) => Some(*v as f64),
        Property::Short(v) => Some(*v as f64),
        Property::UShort(v) => Some(*v as f64),
        Property::Char(v) => Some(*v as f64),
        Property::UChar(v) => Some(*v as f64),
        _ => None,
    }
}

/// Negative entries map to `usize::MAX` so index validation rejects them.
fn get_list_property(element: &DefaultElement, name: &str) -> Option<Vec<usize>> {
    fn idx<T: TryInto<usize>>(x: T) -> usize {
        x.try_into().unwrap_or(usize::MAX)
    }
    match element.get(name)? {
        Property::ListInt(v) => Some(v.iter().map(|&x| idx(x)).collect()),
        Property::ListUInt(v) => Some(v.iter().map(|&x| idx(x)).collect()),
        Property::ListShort(v) => Some(v.iter().map(|&x| idx(x)).collect()),
        Property::ListUShort(v) => Some(v.iter().map(|&x| idx(x)).collect()),
        Property::ListChar(v) => Some(v.iter().map(|&x| idx(x)).collect()),
        Property::ListUChar(v) => Some(v.iter().map(|&x| idx(x)).collect()),
        _ => None,
    }
}

/// Save a mesh to a PLY file (ASCII format).
///
/// # Example
///
/// ```no_run
/// use lapsmooth::io::ply;
/// use lapsmooth::mesh::PolyMesh;
/// # let mesh: PolyMesh = ply::load("model.ply").unwrap();
///
/// ply::save(&mesh, "output.ply").unwrap();
/// ```
pub fn save<P: AsRef<Path>, I: MeshIndex>(mesh: &PolyMesh<I>, path: P) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    // Write header
    writeln!(writer, "ply")?;
    writeln!(writer, "format ascii 1.0")?;
    writeln!(writer, "comment Generated by lapsmooth")?;
    writeln!(writer, "element vertex {}", mesh.num_vertices())?;
    writeln!(writer, "property double x")?;
    writeln!(writer, "property double y")?;
    writeln!(writer, "property double z")?;
    writeln!(writer, "element face {}", mesh.num_faces())?;
    writeln!(writer, "property list uchar int vertex_indices")?;
    writeln!(writer, "end_header")?;

    for v in mesh.positions() {
        writeln!(writer, "{} {} {}", v.x, v.y, v.z)?;
    }

    for face in mesh.faces() {
        if face.len() > u8::MAX as usize {
            return Err(MeshError::SaveError {
                path: path.to_path_buf(),
                message: format!("face with {} vertices does not fit a uchar list", face.len()),
            });
        }
        write!(writer, "{}", face.len())?;
        for v in face {
            write!(writer, " {}", v.index())?;
        }
        writeln!(writer)?;
    }

    writer.flush()?;
    Ok(())
}
