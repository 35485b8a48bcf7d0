//! Parallel LOD generation over independent meshes

use crate::config::LodConfig;
use crate::generator::LodGenerator;
use crate::levels::ReductionMethod;
use progmesh_core::{IndexBuffer, IndexedMesh, Result};
use rayon::prelude::*;

/// Compute LOD levels for every mesh on the rayon pool, one generator per
/// mesh. Results keep the order of `meshes`; the first error wins.
pub fn compute_lods_batch(
    meshes: &[IndexedMesh],
    method: ReductionMethod,
    values: &[f32],
    config: &LodConfig,
) -> Result<Vec<Vec<IndexBuffer>>> {
    meshes
        .par_iter()
        .map(|mesh| {
            let mut generator = LodGenerator::with_config(mesh, config.clone())?;
            generator.compute_levels(method, values)
        })
        .collect()
}

/// Compute LOD levels in parallel and store them on each mesh
pub fn bake_lods_batch(
    meshes: &mut [IndexedMesh],
    method: ReductionMethod,
    values: &[f32],
    config: &LodConfig,
) -> Result<()> {
    meshes.par_iter_mut().try_for_each(|mesh| {
        let mut generator = LodGenerator::with_config(mesh, config.clone())?;
        let levels = generator.compute_levels(method, values)?;
        mesh.set_lod_levels(levels);
        Ok(())
    })
}
