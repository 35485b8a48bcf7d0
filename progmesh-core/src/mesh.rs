//! Mesh data structures and functionality

use crate::index_buffer::*;
use crate::point::*;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// A triangle mesh with vertices and faces
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriangleMesh {
    pub vertices: Vec<Point3f>,
    pub faces: Vec<[usize; 3]>,
}

impl TriangleMesh {
    /// Create a new empty mesh
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            faces: Vec::new(),
        }
    }

    /// Create a mesh from vertices and faces
    pub fn from_vertices_and_faces(vertices: Vec<Point3f>, faces: Vec<[usize; 3]>) -> Self {
        Self { vertices, faces }
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
}

impl Default for TriangleMesh {
    fn default() -> Self {
        Self::new()
    }
}

/// A renderable mesh: shared positions, a base index buffer and any number
/// of baked level-of-detail index buffers over the same positions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexedMesh {
    pub positions: Vec<Point3f>,
    pub indices: IndexBuffer,
    lod_levels: Vec<IndexBuffer>,
}

impl IndexedMesh {
    pub fn new(positions: Vec<Point3f>, indices: IndexBuffer) -> Self {
        Self {
            positions,
            indices,
            lod_levels: Vec::new(),
        }
    }

    /// Convert a face-list mesh, choosing the index width from its vertex count
    pub fn from_triangle_mesh(mesh: &TriangleMesh) -> Result<Self> {
        let indices = IndexBuffer::from_faces(&mesh.faces, mesh.vertices.len())?;
        Ok(Self::new(mesh.vertices.clone(), indices))
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.triangle_count()
    }

    /// Check that the index buffer is a whole number of triangles and only
    /// references existing positions
    pub fn validate(&self) -> Result<()> {
        if self.indices.len() % 3 != 0 {
            return Err(Error::InvalidData(format!(
                "index count {} is not a multiple of 3",
                self.indices.len()
            )));
        }
        if let Some(max) = self.indices.max_index() {
            if max as usize >= self.positions.len() {
                return Err(Error::InvalidData(format!(
                    "index {} out of range for {} positions",
                    max,
                    self.positions.len()
                )));
            }
        }
        Ok(())
    }

    /// Replace the selectable LOD levels; level 0 is conventionally the base buffer
    pub fn set_lod_levels(&mut self, levels: Vec<IndexBuffer>) {
        self.lod_levels = levels;
    }

    pub fn lod_levels(&self) -> &[IndexBuffer] {
        &self.lod_levels
    }

    pub fn num_lod_levels(&self) -> usize {
        self.lod_levels.len()
    }

    pub fn lod_level(&self, level: usize) -> Option<&IndexBuffer> {
        self.lod_levels.get(level)
    }

    /// Index buffer to draw for `level`, clamped to the coarsest baked level.
    /// Falls back to the base buffer when nothing has been baked.
    pub fn select_lod(&self, level: usize) -> &IndexBuffer {
        match self.lod_levels.len() {
            0 => &self.indices,
            n => &self.lod_levels[level.min(n - 1)],
        }
    }

    /// Raw position bytes for upload into a GPU vertex buffer
    pub fn position_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.positions)
    }
}
