//! One-shot simplification through the LOD generator

use crate::config::LodConfig;
use crate::generator::LodGenerator;
use crate::levels::ReductionMethod;
use crate::MeshSimplifier;
use progmesh_core::{Error, IndexBuffer, IndexedMesh, Result, TriangleMesh};
use std::collections::HashMap;

/// Simplifies a face-list mesh by baking a single proportional LOD level
#[derive(Debug, Clone, Default)]
pub struct ProgressiveMeshSimplifier {
    pub config: LodConfig,
}

impl ProgressiveMeshSimplifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: LodConfig) -> Self {
        Self { config }
    }
}

impl MeshSimplifier for ProgressiveMeshSimplifier {
    fn simplify(&self, mesh: &TriangleMesh, reduction_ratio: f32) -> Result<TriangleMesh> {
        if mesh.is_empty() {
            return Err(Error::InvalidData("Mesh is empty".to_string()));
        }
        if !(0.0..=1.0).contains(&reduction_ratio) {
            return Err(Error::InvalidData(
                "Reduction ratio must be between 0.0 and 1.0".to_string(),
            ));
        }
        if reduction_ratio == 0.0 {
            return Ok(mesh.clone());
        }

        let indexed = IndexedMesh::from_triangle_mesh(mesh)?;
        let mut generator = LodGenerator::with_config(&indexed, self.config.clone())?;
        let levels = generator.compute_levels(ReductionMethod::Proportional, &[reduction_ratio])?;
        let level = levels.last().unwrap_or(&indexed.indices);
        Ok(compact(&indexed, level))
    }
}

/// Face-list mesh of the triangles in `level`, keeping only referenced
/// positions
fn compact(mesh: &IndexedMesh, level: &IndexBuffer) -> TriangleMesh {
    let mut old_to_new: HashMap<u32, usize> = HashMap::new();
    let mut new_positions = Vec::new();
    let mut new_faces = Vec::with_capacity(level.triangle_count());

    for [a, b, c] in level.triangles() {
        if a == b || b == c || c == a {
            continue;
        }
        let face = [a, b, c].map(|id| {
            *old_to_new.entry(id).or_insert_with(|| {
                new_positions.push(mesh.positions[id as usize]);
                new_positions.len() - 1
            })
        });
        new_faces.push(face);
    }

    TriangleMesh::from_vertices_and_faces(new_positions, new_faces)
}
