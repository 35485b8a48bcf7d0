//! Progressive-mesh level-of-detail generation
//!
//! This crate turns one high-resolution triangle mesh into a sequence of
//! reduced index buffers over the same positions:
//! - Topology ingestion with position welding and seam detection
//! - Curvature, border and seam aware collapse costs
//! - Greedy cheapest-first vertex collapse with incremental cost updates
//! - Level baking by proportional, constant or cost-limited reduction

mod collapse;
mod cost;
mod topology;

pub mod batch;
pub mod config;
pub mod generator;
pub mod levels;
pub mod simplifier;

pub use batch::*;
pub use config::*;
pub use generator::*;
pub use levels::*;
pub use simplifier::*;
pub use topology::{TopologyStats, NEVER_COLLAPSE_COST, UNINITIALIZED_COLLAPSE_COST};

use progmesh_core::{Result, TriangleMesh};

/// Simplify a mesh by reducing the number of faces/vertices
pub trait MeshSimplifier {
    /// Simplify mesh with target reduction ratio (0.0 = no reduction, 1.0 = maximum reduction)
    fn simplify(&self, mesh: &TriangleMesh, reduction_ratio: f32) -> Result<TriangleMesh>;
}
