//! Point types and related functionality

use crate::{Error, Result};
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

/// A 3D point with floating point coordinates
pub type Point3f = Point3<f32>;

/// A 3D vector with floating point components
pub type Vector3f = Vector3<f32>;

/// Exact, bitwise identity of a position.
///
/// Two positions share a key only when every component has the same bit
/// pattern, so `0.0` and `-0.0` are distinct while identical NaNs collide.
/// This is the equality used to weld co-located vertices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PositionKey([u32; 3]);

impl PositionKey {
    pub fn new(point: &Point3f) -> Self {
        Self([point.x.to_bits(), point.y.to_bits(), point.z.to_bits()])
    }
}

/// Build points from a flat `[x0, y0, z0, x1, y1, z1, ...]` buffer
pub fn points_from_flat(coords: &[f32]) -> Result<Vec<Point3f>> {
    if coords.len() % 3 != 0 {
        return Err(Error::InvalidData(format!(
            "position buffer length {} is not a multiple of 3",
            coords.len()
        )));
    }
    Ok(coords
        .chunks_exact(3)
        .map(|c| Point3f::new(c[0], c[1], c[2]))
        .collect())
}

/// Normalize `v`, leaving an exactly zero vector untouched.
pub fn normalize_or_zero(v: Vector3f) -> Vector3f {
    let length = v.norm();
    if length != 0.0 {
        v / length
    } else {
        v
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_key_is_bitwise() {
        let a = Point3f::new(0.0, 1.0, 2.0);
        let b = Point3f::new(0.0, 1.0, 2.0);
        let c = Point3f::new(-0.0, 1.0, 2.0);
        assert_eq!(PositionKey::new(&a), PositionKey::new(&b));
        assert_ne!(PositionKey::new(&a), PositionKey::new(&c));
    }

    #[test]
    fn test_points_from_flat() {
        let points = points_from_flat(&[0.0, 1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[1], Point3f::new(3.0, 4.0, 5.0));
        assert!(points_from_flat(&[0.0, 1.0]).is_err());
    }

    #[test]
    fn test_normalize_or_zero() {
        let zero = normalize_or_zero(Vector3f::zeros());
        assert_eq!(zero, Vector3f::zeros());
        let unit = normalize_or_zero(Vector3f::new(0.0, 3.0, 4.0));
        assert!((unit.norm() - 1.0).abs() < 1e-6);
    }
}
