//! Reduction policies and level snapshots

use crate::topology::{Topology, NEVER_COLLAPSE_COST};
use progmesh_core::{Error, IndexBuffer, IndexWidth, Result};
use serde::{Deserialize, Serialize};

/// How the reduction values passed to the generator are interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReductionMethod {
    /// Remove this fraction (0..=1) of the original triangles
    Proportional,
    /// Remove this many triangles
    Constant,
    /// Collapse every vertex whose cost is below this value
    CollapseCost,
}

/// Stop condition for one level
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelTarget {
    pub triangle_count: usize,
    pub cost_limit: f32,
}

impl ReductionMethod {
    /// Reject values the method cannot interpret
    pub fn validate_value(self, value: f32) -> Result<()> {
        if !value.is_finite() {
            return Err(Error::InvalidData(format!(
                "{:?} reduction value {} is not finite",
                self, value
            )));
        }
        let in_range = match self {
            ReductionMethod::Proportional => (0.0..=1.0).contains(&value),
            ReductionMethod::Constant | ReductionMethod::CollapseCost => value >= 0.0,
        };
        if !in_range {
            return Err(Error::InvalidData(format!(
                "{:?} reduction value {} is out of range",
                self, value
            )));
        }
        Ok(())
    }

    /// Target for `value` given `base` live triangles at ingestion
    pub fn level_target(self, base: usize, value: f32) -> LevelTarget {
        match self {
            ReductionMethod::Proportional => {
                let n = base as f32;
                LevelTarget {
                    triangle_count: (n - n * value).max(0.0) as usize,
                    cost_limit: NEVER_COLLAPSE_COST,
                }
            }
            ReductionMethod::Constant => LevelTarget {
                triangle_count: if value < base as f32 {
                    base - value as usize
                } else {
                    0
                },
                cost_limit: NEVER_COLLAPSE_COST,
            },
            ReductionMethod::CollapseCost => LevelTarget {
                triangle_count: 0,
                cost_limit: value,
            },
        }
    }
}

impl Topology {
    /// Index buffer of the live triangles in ingestion order, written with
    /// their original slot values. An empty level holds one `[0, 0, 0]`
    /// triangle so it stays drawable.
    pub(crate) fn bake_level(&self, width: IndexWidth) -> Result<IndexBuffer> {
        if self.live_triangles == 0 {
            return IndexBuffer::from_indices(width, &[0, 0, 0]);
        }
        let mut buffer = IndexBuffer::with_capacity(width, self.live_triangles * 3);
        for triangle in self.triangles.iter().filter(|t| !t.removed) {
            for &id in &triangle.vertex_id {
                buffer.push(id)?;
            }
        }
        Ok(buffer)
    }
}
