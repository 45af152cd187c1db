//! Mesh data structures and functionality

use crate::vec3::Vec3;
use serde::{Deserialize, Serialize};

/// A triangle mesh with vertices, faces and optional per-vertex normals
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriangleMesh {
    pub vertices: Vec<Vec3<f64>>,
    pub faces: Vec<[usize; 3]>,
    pub normals: Option<Vec<Vec3<f64>>>,
}

impl TriangleMesh {
    /// Create a new empty mesh
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            faces: Vec::new(),
            normals: None,
        }
    }

    /// Create a mesh from vertices and faces
    pub fn from_vertices_and_faces(vertices: Vec<Vec3<f64>>, faces: Vec<[usize; 3]>) -> Self {
        Self {
            vertices,
            faces,
            normals: None,
        }
    }

    /// Get the number of vertices
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Get the number of faces
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Check if the mesh is empty
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() || self.faces.is_empty()
    }

    /// Add a vertex to the mesh, returning its index
    pub fn add_vertex(&mut self, vertex: Vec3<f64>) -> usize {
        let index = self.vertices.len();
        self.vertices.push(vertex);
        index
    }

    /// Add a face to the mesh
    pub fn add_face(&mut self, face: [usize; 3]) {
        self.faces.push(face);
    }

    /// Set vertex normals; ignored unless one normal per vertex is supplied
    pub fn set_normals(&mut self, normals: Vec<Vec3<f64>>) {
        if normals.len() == self.vertices.len() {
            self.normals = Some(normals);
        }
    }

    /// Append another mesh, shifting its face indices past this mesh's vertices.
    ///
    /// Normals are carried over only when both meshes agree on having them.
    pub fn append(&mut self, other: TriangleMesh) {
        let vertex_offset = self.vertices.len();

        for face in other.faces {
            self.faces.push([
                face[0] + vertex_offset,
                face[1] + vertex_offset,
                face[2] + vertex_offset,
            ]);
        }

        if vertex_offset == 0 {
            self.normals = other.normals;
        } else if let (Some(ours), Some(theirs)) = (self.normals.as_mut(), other.normals) {
            ours.extend(theirs);
        } else if self.normals.is_some() {
            // Mixed presence would leave normals misaligned with vertices.
            self.normals = None;
        }

        self.vertices.extend(other.vertices);
    }

    /// Clear the mesh
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.faces.clear();
        self.normals = None;
    }
}

impl Default for TriangleMesh {
    fn default() -> Self {
        Self::new()
    }
}
