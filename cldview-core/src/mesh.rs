//! Triangle mesh geometry for scene decorations

use crate::transform::{Point3f, RigidTransform};
use serde::{Deserialize, Serialize};

/// A triangle mesh with vertices, faces and optional per-vertex colors
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TriangleMesh {
    pub vertices: Vec<Point3f>,
    pub faces: Vec<[usize; 3]>,
    pub colors: Option<Vec<[u8; 3]>>,
}

impl TriangleMesh {
    /// Create a new empty mesh
    pub fn new() -> Self {
        Self::default()
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

    /// Add a vertex to the mesh
    pub fn add_vertex(&mut self, vertex: Point3f) -> usize {
        let index = self.vertices.len();
        self.vertices.push(vertex);
        index
    }

    /// Add a face to the mesh
    pub fn add_face(&mut self, face: [usize; 3]) {
        self.faces.push(face);
    }

    /// Paint every vertex the same color
    pub fn fill_color(&mut self, color: [u8; 3]) {
        self.colors = Some(vec![color; self.vertices.len()]);
    }

    /// Copy of this mesh with every vertex moved by `transform`
    pub fn transformed(&self, transform: &RigidTransform) -> Self {
        Self {
            vertices: self
                .vertices
                .iter()
                .map(|v| transform.transform_point(v))
                .collect(),
            faces: self.faces.clone(),
            colors: self.colors.clone(),
        }
    }

    /// Append another mesh, re-indexing its faces.
    ///
    /// Colors survive only when both meshes carry them.
    pub fn merge(&mut self, other: &TriangleMesh) {
        let offset = self.vertices.len();
        let had_vertices = offset > 0;
        self.colors = match (self.colors.take(), &other.colors) {
            (Some(mut mine), Some(theirs)) => {
                mine.extend_from_slice(theirs);
                Some(mine)
            }
            (None, Some(theirs)) if !had_vertices => Some(theirs.clone()),
            _ => None,
        };
        self.vertices.extend_from_slice(&other.vertices);
        self.faces.extend(
            other
                .faces
                .iter()
                .map(|f| [f[0] + offset, f[1] + offset, f[2] + offset]),
        );
    }
}
