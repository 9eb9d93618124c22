//! Triangle mesh used for isosurfaces

use crate::geometry::ScalarArray;
use crate::point::*;
use serde::{Deserialize, Serialize};

/// A triangle mesh with vertices, faces and optional point scalars
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriangleMesh {
    pub vertices: Vec<Point3d>,
    pub faces: Vec<[usize; 3]>,
    pub scalars: Option<ScalarArray>,
}

impl TriangleMesh {
    /// Create a new empty mesh
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            faces: Vec::new(),
            scalars: None,
        }
    }

    /// Create a mesh from vertices and faces
    pub fn from_vertices_and_faces(vertices: Vec<Point3d>, faces: Vec<[usize; 3]>) -> Self {
        Self {
            vertices,
            faces,
            scalars: None,
        }
    }

    /// A quad split into two triangles, corners given in winding order
    pub fn quad(corners: [Point3d; 4]) -> Self {
        Self::from_vertices_and_faces(corners.to_vec(), vec![[0, 1, 2], [0, 2, 3]])
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

    /// Calculate unit face normals
    pub fn face_normals(&self) -> Vec<Vector3d> {
        self.faces
            .iter()
            .map(|face| {
                let v0 = self.vertices[face[0]];
                let v1 = self.vertices[face[1]];
                let v2 = self.vertices[face[2]];

                let edge1 = v1 - v0;
                let edge2 = v2 - v0;

                edge1.cross(&edge2).normalize()
            })
            .collect()
    }

    pub fn bounds(&self) -> Option<(Point3d, Point3d)> {
        extent(&self.vertices)
    }
}

impl Default for TriangleMesh {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_quad() {
        let mesh = TriangleMesh::quad([
            Point3d::new(0.0, 0.0, 0.0),
            Point3d::new(1.0, 0.0, 0.0),
            Point3d::new(1.0, 1.0, 0.0),
            Point3d::new(0.0, 1.0, 0.0),
        ]);
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.face_count(), 2);
        for normal in mesh.face_normals() {
            assert_relative_eq!(normal, Vector3d::new(0.0, 0.0, 1.0));
        }
    }

    #[test]
    fn test_empty_mesh() {
        let mesh = TriangleMesh::default();
        assert!(mesh.is_empty());
        assert!(mesh.bounds().is_none());
    }
}
