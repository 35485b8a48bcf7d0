//! Core data structures and traits for progmesh
//!
//! This crate provides the fundamental types shared by the LOD pipeline:
//! points, face-list and indexed meshes, 16/32-bit index buffers, bounding
//! volumes and the common error type.

pub mod point;
pub mod mesh;
pub mod index_buffer;
pub mod bounds;
pub mod traits;
pub mod error;

pub use point::*;
pub use mesh::*;
pub use index_buffer::*;
pub use bounds::*;
pub use traits::*;
pub use error::*;

/// Re-export commonly used types from nalgebra
pub use nalgebra::{Point3, Vector3};

/// Common result type for progmesh operations
pub type Result<T> = std::result::Result<T, Error>;
