//! Mesh I/O for isomesh
//!
//! This crate moves extracted meshes in and out of text-based geometry
//! formats. Wavefront OBJ is the only format currently supported.

pub mod obj;

pub use obj::{ObjReader, ObjWriter};

use isomesh_core::{Error, Result, TriangleMesh};
use std::path::Path;

/// Trait for reading meshes from files
pub trait MeshReader {
    fn read_mesh<P: AsRef<Path>>(path: P) -> Result<TriangleMesh>;
}

/// Trait for writing meshes to files
pub trait MeshWriter {
    fn write_mesh<P: AsRef<Path>>(mesh: &TriangleMesh, path: P) -> Result<()>;
}

/// Auto-detect format from the file extension and read a mesh
pub fn read_mesh<P: AsRef<Path>>(path: P) -> Result<TriangleMesh> {
    let path = path.as_ref();
    match path.extension().and_then(|s| s.to_str()) {
        Some("obj") => ObjReader::read_mesh(path),
        _ => Err(Error::UnsupportedFormat(format!(
            "Unsupported mesh format: {:?}",
            path.extension()
        ))),
    }
}

/// Auto-detect format from the file extension and write a mesh
pub fn write_mesh<P: AsRef<Path>>(mesh: &TriangleMesh, path: P) -> Result<()> {
    let path = path.as_ref();
    match path.extension().and_then(|s| s.to_str()) {
        Some("obj") => ObjWriter::write_mesh(mesh, path),
        _ => Err(Error::UnsupportedFormat(format!(
            "Unsupported mesh format: {:?}",
            path.extension()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_extension_is_rejected() {
        let mesh = TriangleMesh::new();
        let err = write_mesh(&mesh, "mesh.stl").unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat(_)));

        let err = read_mesh("mesh.stl").unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat(_)));
    }
}
