//! Core traits for progmesh

use crate::{bounds::*, mesh::*};

/// Trait for objects with a spatial extent
pub trait Bounded {
    /// Get the axis-aligned bounding box of the object
    fn bounding_box(&self) -> BoundingBox;

    /// Get the minimal bounding sphere of the object
    fn bounding_sphere(&self) -> BoundingSphere;
}

impl Bounded for TriangleMesh {
    fn bounding_box(&self) -> BoundingBox {
        BoundingBox::from_points(&self.vertices)
    }

    fn bounding_sphere(&self) -> BoundingSphere {
        BoundingSphere::from_points(&self.vertices)
    }
}

impl Bounded for IndexedMesh {
    fn bounding_box(&self) -> BoundingBox {
        BoundingBox::from_points(&self.positions)
    }

    fn bounding_sphere(&self) -> BoundingSphere {
        BoundingSphere::from_points(&self.positions)
    }
}
