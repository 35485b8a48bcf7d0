//! Progressive-mesh LOD generator
//!
//! Builds the topology graph once, then bakes any number of reduced index
//! buffers by greedily collapsing the cheapest vertex until each level's
//! target is reached.

use crate::collapse::CollapseEngine;
use crate::config::LodConfig;
use crate::levels::ReductionMethod;
use crate::topology::{Topology, TopologyStats};
use log::debug;
use progmesh_core::{
    points_from_flat, Error, IndexBuffer, IndexWidth, IndexedMesh, Point3f, Result,
};

/// Generates LOD index buffers for one mesh.
///
/// The generator owns its topology; reductions are cumulative, so repeated
/// calls to [`compute_levels`](Self::compute_levels) continue from the state
/// the previous call left behind.
pub struct LodGenerator {
    engine: CollapseEngine,
    original: IndexBuffer,
    initial_triangles: usize,
    config: LodConfig,
}

impl LodGenerator {
    /// Build a generator with the default configuration
    pub fn new(mesh: &IndexedMesh) -> Result<Self> {
        Self::with_config(mesh, LodConfig::default())
    }

    pub fn with_config(mesh: &IndexedMesh, config: LodConfig) -> Result<Self> {
        Self::from_buffers(&mesh.positions, mesh.indices.clone(), config)
    }

    /// Build from positions and an index buffer whose width is kept for
    /// every baked level
    pub fn from_buffers(
        positions: &[Point3f],
        indices: IndexBuffer,
        config: LodConfig,
    ) -> Result<Self> {
        let topology = Topology::build(positions, &indices)?;
        let initial_triangles = topology.live_triangles;
        let stats = topology.stats();
        debug!(
            "LOD topology: {} vertices ({} seams, {} isolated), {} live triangles, {} excluded",
            stats.vertices,
            stats.seam_vertices,
            stats.isolated_vertices,
            stats.live_triangles,
            stats.excluded_triangles
        );
        let engine = CollapseEngine::new(topology, &config);
        debug!("{} vertices queued for collapse", engine.queued_vertices());
        Ok(Self {
            engine,
            original: indices,
            initial_triangles,
            config,
        })
    }

    /// Build from flat xyz coordinates and raw indices; the index width is
    /// chosen from the vertex count
    pub fn from_raw(coords: &[f32], indices: &[u32], config: LodConfig) -> Result<Self> {
        let positions = points_from_flat(coords)?;
        let width = IndexWidth::for_vertex_count(positions.len());
        let indices = IndexBuffer::from_indices(width, indices)?;
        Self::from_buffers(&positions, indices, config)
    }

    /// Reduce the mesh once per value and return the original buffer
    /// followed by one buffer per level that removed at least one triangle.
    ///
    /// Every value is checked before anything collapses.
    pub fn compute_levels(
        &mut self,
        method: ReductionMethod,
        values: &[f32],
    ) -> Result<Vec<IndexBuffer>> {
        for &value in values {
            method.validate_value(value)?;
        }

        let width = self.original.width();
        let mut levels = Vec::with_capacity(values.len() + 1);
        levels.push(self.original.clone());
        let mut last_baked = self.engine.topology.live_triangles;

        for &value in values {
            let target = method.level_target(self.initial_triangles, value);
            let removed = self.engine.reduce_to(target.triangle_count, target.cost_limit)?;
            let live = self.engine.topology.live_triangles;
            if live == last_baked {
                debug!("{:?} {} removed nothing, level skipped", method, value);
                continue;
            }
            debug!(
                "baked LOD level {}: {} triangles ({} collapsed for {:?} {})",
                levels.len(),
                live,
                removed,
                method,
                value
            );
            levels.push(self.engine.topology.bake_level(width)?);
            last_baked = live;
        }
        Ok(levels)
    }

    /// Compute levels and store them on `mesh` as its selectable LOD levels.
    ///
    /// `mesh` must be well formed and have as many positions as the
    /// generator was built from.
    pub fn bake_into_mesh(
        &mut self,
        mesh: &mut IndexedMesh,
        method: ReductionMethod,
        values: &[f32],
    ) -> Result<()> {
        mesh.validate()?;
        if mesh.positions.len() != self.engine.topology.position_count() {
            return Err(Error::InvalidData(format!(
                "mesh has {} positions but the generator was built from {}",
                mesh.positions.len(),
                self.engine.topology.position_count()
            )));
        }
        let levels = self.compute_levels(method, values)?;
        mesh.set_lod_levels(levels);
        Ok(())
    }

    pub fn config(&self) -> &LodConfig {
        &self.config
    }

    /// Triangles still live in the current reduction state
    pub fn live_triangle_count(&self) -> usize {
        self.engine.topology.live_triangles
    }

    /// Live triangles right after ingestion; the base for reduction targets
    pub fn initial_triangle_count(&self) -> usize {
        self.initial_triangles
    }

    pub fn stats(&self) -> TopologyStats {
        self.engine.topology.stats()
    }

    /// Cached collapse cost of the vertex at buffer index `index`.
    /// `None` for an out-of-range index or an already collapsed vertex.
    pub fn vertex_collapse_cost(&self, index: usize) -> Option<f32> {
        let v = self.live_vertex(index)?;
        Some(self.engine.topology.vertices[v].collapse_cost)
    }

    /// Current cost of collapsing buffer index `from` onto buffer index `to`,
    /// or `None` when the two are not connected by an edge
    pub fn edge_collapse_cost(&self, from: usize, to: usize) -> Option<f32> {
        let src = self.live_vertex(from)?;
        let dst = self.live_vertex(to)?;
        let edge = self.engine.topology.vertices[src].edge_to(dst)?;
        Some(self.engine.topology.edge_collapse_cost(src, edge))
    }

    pub fn is_border_vertex(&self, index: usize) -> Option<bool> {
        let v = self.live_vertex(index)?;
        Some(self.engine.topology.is_border_vertex(v))
    }

    pub fn is_seam_vertex(&self, index: usize) -> Option<bool> {
        let v = self.engine.topology.resolve(index)?;
        Some(self.engine.topology.vertices[v].is_seam)
    }

    /// Check the topology and working-set invariants
    pub fn validate(&self) -> Result<()> {
        self.engine.validate()
    }

    fn live_vertex(&self, index: usize) -> Option<usize> {
        let v = self.engine.topology.resolve(index)?;
        (!self.engine.topology.vertices[v].collapsed).then_some(v)
    }
}

/// Generate LOD levels for `mesh` and store them on it
pub fn bake_lods(
    mesh: &mut IndexedMesh,
    method: ReductionMethod,
    values: &[f32],
    config: LodConfig,
) -> Result<()> {
    let mut generator = LodGenerator::with_config(mesh, config)?;
    let levels = generator.compute_levels(method, values)?;
    mesh.set_lod_levels(levels);
    Ok(())
}
