//! Bounding volumes

use crate::point::*;
use serde::{Deserialize, Serialize};

/// Relative inflation applied to sphere radii so that the support points
/// themselves test as contained.
const RADIUS_EPSILON: f32 = 1.0 + 0.00001;

/// A sphere enclosing a set of points
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingSphere {
    pub center: Point3f,
    pub radius: f32,
}

impl BoundingSphere {
    pub fn new(center: Point3f, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Minimal enclosing sphere of `points` (Welzl's algorithm).
    ///
    /// An empty input yields a zero sphere at the origin.
    pub fn from_points(points: &[Point3f]) -> Self {
        let mut scratch = points.to_vec();
        let mut sphere = Self::new(Point3f::origin(), 0.0);
        sphere.recurse_mini(&mut scratch, points.len(), 0, 0);
        sphere.radius = sphere.radius.max(0.0);
        sphere
    }

    /// `p` points starting at `ap` remain to test; the `b` points right
    /// before `ap` are the current support set.
    fn recurse_mini(&mut self, points: &mut [Point3f], p: usize, b: usize, ap: usize) {
        match b {
            0 => {
                self.radius = 0.0;
                self.center = Point3f::origin();
            }
            1 => {
                self.radius = 1.0 - RADIUS_EPSILON;
                self.center = points[ap - 1];
            }
            2 => self.set_sphere2(points[ap - 1], points[ap - 2]),
            3 => self.set_sphere3(points[ap - 1], points[ap - 2], points[ap - 3]),
            _ => {
                self.set_sphere4(points[ap - 1], points[ap - 2], points[ap - 3], points[ap - 4]);
                return;
            }
        }

        for i in 0..p {
            let candidate = points[i + ap];
            let outside = (candidate - self.center).norm_squared() - self.radius * self.radius;
            if outside > RADIUS_EPSILON - 1.0 {
                // move-to-front
                for j in (1..=i).rev() {
                    points.swap(j + ap, j - 1 + ap);
                }
                self.recurse_mini(points, i, b + 1, ap + 1);
            }
        }
    }

    fn set_sphere2(&mut self, o: Point3f, a: Point3f) {
        self.radius = ((a - o).norm_squared() / 4.0).sqrt() + RADIUS_EPSILON - 1.0;
        self.center = o + (a - o) * 0.5;
    }

    fn set_sphere3(&mut self, o: Point3f, a: Point3f, b: Point3f) {
        let a = a - o;
        let b = b - o;
        let a_cross_b = a.cross(&b);
        let denominator = 2.0 * a_cross_b.dot(&a_cross_b);
        if denominator == 0.0 {
            self.center = Point3f::origin();
            self.radius = 0.0;
        } else {
            let offset = (a_cross_b.cross(&a) * b.norm_squared()
                + b.cross(&a_cross_b) * a.norm_squared())
                / denominator;
            self.radius = offset.norm() * RADIUS_EPSILON;
            self.center = o + offset;
        }
    }

    fn set_sphere4(&mut self, o: Point3f, a: Point3f, b: Point3f, c: Point3f) {
        let a = a - o;
        let b = b - o;
        let c = c - o;
        let denominator = 2.0 * a.dot(&b.cross(&c));
        if denominator == 0.0 {
            self.center = Point3f::origin();
            self.radius = 0.0;
        } else {
            let offset = (a.cross(&b) * c.norm_squared()
                + c.cross(&a) * b.norm_squared()
                + b.cross(&c) * a.norm_squared())
                / denominator;
            self.radius = offset.norm() * RADIUS_EPSILON;
            self.center = o + offset;
        }
    }
}

impl Default for BoundingSphere {
    fn default() -> Self {
        Self::new(Point3f::origin(), 0.0)
    }
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: Point3f,
    pub max: Point3f,
}

impl BoundingBox {
    /// Box around `points`; an empty input yields a degenerate box at the origin
    pub fn from_points(points: &[Point3f]) -> Self {
        let Some(first) = points.first() else {
            return Self {
                min: Point3f::origin(),
                max: Point3f::origin(),
            };
        };

        let mut min = *first;
        let mut max = *first;
        for p in points {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            min.z = min.z.min(p.z);

            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
            max.z = max.z.max(p.z);
        }
        Self { min, max }
    }

    pub fn center(&self) -> Point3f {
        Point3f::new(
            (self.min.x + self.max.x) / 2.0,
            (self.min.y + self.max.y) / 2.0,
            (self.min.z + self.max.z) / 2.0,
        )
    }

    pub fn extents(&self) -> Vector3f {
        self.max - self.min
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit_cube() -> Vec<Point3f> {
        let mut points = Vec::new();
        for x in 0..2 {
            for y in 0..2 {
                for z in 0..2 {
                    points.push(Point3f::new(x as f32, y as f32, z as f32));
                }
            }
        }
        points
    }

    #[test]
    fn test_empty_sphere() {
        let sphere = BoundingSphere::from_points(&[]);
        assert_eq!(sphere.radius, 0.0);
        assert_eq!(sphere.center, Point3f::origin());
    }

    #[test]
    fn test_single_point_sphere() {
        let p = Point3f::new(1.0, 2.0, 3.0);
        let sphere = BoundingSphere::from_points(&[p]);
        assert_eq!(sphere.radius, 0.0);
        assert_eq!(sphere.center, p);
    }

    #[test]
    fn test_two_point_sphere() {
        let sphere = BoundingSphere::from_points(&[
            Point3f::new(-1.0, 0.0, 0.0),
            Point3f::new(1.0, 0.0, 0.0),
        ]);
        assert_relative_eq!(sphere.radius, 1.0, epsilon = 1e-4);
        assert_relative_eq!(sphere.center.x, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_cube_sphere_is_minimal() {
        let points = unit_cube();
        let sphere = BoundingSphere::from_points(&points);
        assert_relative_eq!(sphere.radius, 3.0_f32.sqrt() / 2.0, epsilon = 1e-3);
        assert_relative_eq!(sphere.center.x, 0.5, epsilon = 1e-3);
        assert_relative_eq!(sphere.center.y, 0.5, epsilon = 1e-3);
        assert_relative_eq!(sphere.center.z, 0.5, epsilon = 1e-3);
    }

    #[test]
    fn test_sphere_contains_all_points() {
        let mut points = unit_cube();
        points.push(Point3f::new(0.5, 0.5, 3.0));
        points.push(Point3f::new(-2.0, 0.25, 0.5));
        let sphere = BoundingSphere::from_points(&points);
        for p in &points {
            assert!(
                (p - sphere.center).norm() <= sphere.radius + 1e-3,
                "point {:?} outside sphere {:?}",
                p,
                sphere
            );
        }
    }

    #[test]
    fn test_bounding_box() {
        let bbox = BoundingBox::from_points(&unit_cube());
        assert_eq!(bbox.min, Point3f::new(0.0, 0.0, 0.0));
        assert_eq!(bbox.max, Point3f::new(1.0, 1.0, 1.0));
        assert_eq!(bbox.center(), Point3f::new(0.5, 0.5, 0.5));
        assert_eq!(bbox.extents(), Vector3f::new(1.0, 1.0, 1.0));
    }
}
