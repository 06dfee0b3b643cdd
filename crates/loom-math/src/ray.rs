//! Ray queries against triangles and points.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Determinant threshold below which a ray is treated as parallel to a triangle.
const PARALLEL_EPSILON: f32 = 1e-8;

/// A half-line `origin + t * direction`, `t >= 0`.
///
/// `direction` is normalized on construction so that `t` is a distance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

/// Result of a successful ray-triangle test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// Distance along the ray.
    pub t: f32,
    /// Barycentric weight of the second vertex.
    pub u: f32,
    /// Barycentric weight of the third vertex.
    pub v: f32,
}

impl Ray {
    /// Creates a ray. Returns `None` for a zero or non-finite direction.
    pub fn new(origin: Vec3, direction: Vec3) -> Option<Self> {
        let direction = direction.try_normalize()?;
        Some(Self { origin, direction })
    }

    /// Point at distance `t` along the ray.
    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Möller–Trumbore intersection with triangle `(v0, v1, v2)`.
    ///
    /// Both windings hit. Hits behind the origin are rejected.
    pub fn intersect_triangle(&self, v0: Vec3, v1: Vec3, v2: Vec3) -> Option<RayHit> {
        let edge1 = v1 - v0;
        let edge2 = v2 - v0;

        let h = self.direction.cross(edge2);
        let a = edge1.dot(h);

        if a.abs() < PARALLEL_EPSILON {
            return None;
        }

        let f = 1.0 / a;
        let s = self.origin - v0;
        let u = f * s.dot(h);

        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let q = s.cross(edge1);
        let v = f * self.direction.dot(q);

        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = f * edge2.dot(q);

        if t > PARALLEL_EPSILON {
            Some(RayHit { t, u, v })
        } else {
            None
        }
    }

    /// Shortest distance from `point` to the ray (not the infinite line).
    pub fn distance_to_point(&self, point: Vec3) -> f32 {
        let t = (point - self.origin).dot(self.direction).max(0.0);
        self.at(t).distance(point)
    }
}
