//! Wavefront OBJ format support

use crate::{MeshReader, MeshWriter};
use isomesh_core::{Error, Result, TriangleMesh, Vec3};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

pub struct ObjReader;
pub struct ObjWriter;

impl MeshWriter for ObjWriter {
    fn write_mesh<P: AsRef<Path>>(mesh: &TriangleMesh, path: P) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);

        for v in &mesh.vertices {
            writeln!(writer, "v {} {} {}", v[0], v[1], v[2])?;
        }

        if let Some(normals) = &mesh.normals {
            for n in normals {
                writeln!(writer, "vn {} {} {}", n[0], n[1], n[2])?;
            }
            for face in &mesh.faces {
                // OBJ indices are 1-based; vertex and normal lists are
                // parallel, so the indices coincide.
                writeln!(
                    writer,
                    "f {0}//{0} {1}//{1} {2}//{2}",
                    face[0] + 1,
                    face[1] + 1,
                    face[2] + 1
                )?;
            }
        } else {
            for face in &mesh.faces {
                writeln!(writer, "f {} {} {}", face[0] + 1, face[1] + 1, face[2] + 1)?;
            }
        }

        writer.flush()?;
        Ok(())
    }
}

impl MeshReader for ObjReader {
    fn read_mesh<P: AsRef<Path>>(path: P) -> Result<TriangleMesh> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);

        let mut vertices = Vec::new();
        let mut normals = Vec::new();
        let mut faces = Vec::new();

        for line in reader.lines() {
            let line = line?;
            let mut tokens = line.split_whitespace();
            match tokens.next() {
                Some("v") => vertices.push(parse_triple(tokens.by_ref())?),
                Some("vn") => normals.push(parse_triple(tokens.by_ref())?),
                Some("f") => {
                    let indices: Vec<usize> = tokens
                        .by_ref()
                        .map(parse_face_vertex)
                        .collect::<Result<_>>()?;
                    if indices.len() != 3 {
                        return Err(Error::UnsupportedFormat(format!(
                            "only triangulated faces are supported, got {} vertices",
                            indices.len()
                        )));
                    }
                    faces.push([indices[0], indices[1], indices[2]]);
                }
                // Comments, groups, materials and the rest are ignored.
                _ => {}
            }
        }

        for face in &faces {
            if face.iter().any(|&i| i >= vertices.len()) {
                return Err(Error::InvalidArgument(format!(
                    "face references vertex {} of {}",
                    face.iter().max().copied().unwrap_or(0),
                    vertices.len()
                )));
            }
        }

        let mut mesh = TriangleMesh::from_vertices_and_faces(vertices, faces);
        mesh.set_normals(normals);
        Ok(mesh)
    }
}

fn parse_triple<'a>(mut tokens: impl Iterator<Item = &'a str>) -> Result<Vec3<f64>> {
    let components: Vec<f64> = tokens
        .by_ref()
        .take(3)
        .map(|t| {
            t.parse::<f64>()
                .map_err(|e| Error::InvalidArgument(format!("bad coordinate {t:?}: {e}")))
        })
        .collect::<Result<_>>()?;
    Vec3::from_slice(&components)
}

/// Parse one face vertex reference: `i`, `i/t`, `i//n` or `i/t/n`, keeping
/// only the 1-based vertex index.
fn parse_face_vertex(token: &str) -> Result<usize> {
    let index_part = token.split('/').next().unwrap_or(token);
    let index: usize = index_part
        .parse()
        .map_err(|e| Error::InvalidArgument(format!("bad face index {token:?}: {e}")))?;
    if index == 0 {
        return Err(Error::InvalidArgument(
            "OBJ face indices are 1-based".to_string(),
        ));
    }
    Ok(index - 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn test_mesh(with_normals: bool) -> TriangleMesh {
        let mut mesh = TriangleMesh::from_vertices_and_faces(
            vec![
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(1.0, 0.0, 0.0),
                Vec3::new(0.0, 1.0, 0.0),
                Vec3::new(0.0, 0.0, 1.0),
            ],
            vec![[0, 1, 2], [0, 1, 3]],
        );
        if with_normals {
            mesh.set_normals(vec![Vec3::new(0.0, 0.0, 1.0); 4]);
        }
        mesh
    }

    #[test]
    fn test_obj_roundtrip_without_normals() {
        let temp_file = "test_mesh_plain.obj";
        let mesh = test_mesh(false);

        ObjWriter::write_mesh(&mesh, temp_file).unwrap();
        let loaded = ObjReader::read_mesh(temp_file).unwrap();

        assert_eq!(loaded.vertex_count(), mesh.vertex_count());
        assert_eq!(loaded.faces, mesh.faces);
        assert!(loaded.normals.is_none());
        for (original, loaded) in mesh.vertices.iter().zip(loaded.vertices.iter()) {
            assert_eq!(original, loaded);
        }

        let _ = fs::remove_file(temp_file);
    }

    #[test]
    fn test_obj_roundtrip_with_normals() {
        let temp_file = "test_mesh_normals.obj";
        let mesh = test_mesh(true);

        ObjWriter::write_mesh(&mesh, temp_file).unwrap();

        let contents = fs::read_to_string(temp_file).unwrap();
        assert!(contents.contains("vn 0 0 1"));
        assert!(contents.contains("f 1//1 2//2 3//3"));

        let loaded = ObjReader::read_mesh(temp_file).unwrap();
        assert_eq!(loaded.vertex_count(), 4);
        assert_eq!(loaded.normals.as_ref().map(Vec::len), Some(4));

        let _ = fs::remove_file(temp_file);
    }

    #[test]
    fn test_non_triangulated_face_is_rejected() {
        let temp_file = "test_mesh_quad.obj";
        fs::write(
            temp_file,
            "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf 1 2 3 4\n",
        )
        .unwrap();

        let err = ObjReader::read_mesh(temp_file).unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat(_)));

        let _ = fs::remove_file(temp_file);
    }

    #[test]
    fn test_face_index_out_of_range_is_rejected() {
        let temp_file = "test_mesh_bad_index.obj";
        fs::write(temp_file, "v 0 0 0\nv 1 0 0\nf 1 2 3\n").unwrap();

        let err = ObjReader::read_mesh(temp_file).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));

        let _ = fs::remove_file(temp_file);
    }
}
