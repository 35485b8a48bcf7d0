//! Generator configuration

use serde::{Deserialize, Serialize};

/// Which vertices get their collapse cost recomputed after a collapse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ReevaluationStrategy {
    /// Former neighbors of the collapsed vertex, then its target, then the
    /// target's neighbors. Slower, best quality.
    #[default]
    Exhaustive,
    /// Each vertex within two hops of the collapsed vertex, once
    Batched,
}

/// Configuration for LOD generation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LodConfig {
    pub strategy: ReevaluationStrategy,
    /// Check the topology invariants after every collapse
    pub validate: bool,
}

impl LodConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_params(strategy: ReevaluationStrategy, validate: bool) -> Self {
        Self { strategy, validate }
    }
}
