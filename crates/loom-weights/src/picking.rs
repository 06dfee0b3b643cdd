//! Ray picking for the weight brush.
//!
//! Tests the ray against every particle triangle (O(triangles) per pick,
//! which is fine at interactive brush rates). When nothing is hit, the
//! particle closest to the ray within twice the brush radius is used
//! instead so strokes along silhouettes still land.

use loom_math::{Ray, Vec3};
use loom_types::ParticleId;

/// Factor applied to the brush radius for the nearest-particle fallback.
const FALLBACK_RADIUS_SCALE: f32 = 2.0;

/// How a pick was resolved.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PickKind {
    /// The ray hit triangle `triangle` at distance `t`.
    Surface { triangle: usize, t: f32 },
    /// No triangle was hit; `particle` was the closest one near the ray.
    NearestParticle { particle: ParticleId, distance: f32 },
}

/// A successful pick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickHit {
    /// World-space brush center.
    pub point: Vec3,
    pub kind: PickKind,
}

/// Picks the brush center along `ray`.
///
/// `positions` is indexed by particle and `indices` is the particle
/// triangle list; triangles with out-of-range indices are ignored.
/// Returns `None` on a miss (the caller paints nothing this frame).
pub fn pick(ray: &Ray, positions: &[Vec3], indices: &[u32], brush_radius: f32) -> Option<PickHit> {
    let n = positions.len();
    let mut best: Option<(usize, f32)> = None;

    for (t_idx, tri) in indices.chunks_exact(3).enumerate() {
        let (a, b, c) = (tri[0] as usize, tri[1] as usize, tri[2] as usize);
        if a >= n || b >= n || c >= n {
            continue;
        }
        if let Some(hit) = ray.intersect_triangle(positions[a], positions[b], positions[c]) {
            if best.map_or(true, |(_, t)| hit.t < t) {
                best = Some((t_idx, hit.t));
            }
        }
    }

    if let Some((triangle, t)) = best {
        return Some(PickHit {
            point: ray.at(t),
            kind: PickKind::Surface { triangle, t },
        });
    }

    nearest_particle(ray, positions, brush_radius * FALLBACK_RADIUS_SCALE)
}

fn nearest_particle(ray: &Ray, positions: &[Vec3], tolerance: f32) -> Option<PickHit> {
    if !(tolerance > 0.0) {
        return None;
    }

    let mut best: Option<(usize, f32)> = None;
    for (i, &p) in positions.iter().enumerate() {
        let distance = ray.distance_to_point(p);
        if distance <= tolerance && best.map_or(true, |(_, d)| distance < d) {
            best = Some((i, distance));
        }
    }

    best.map(|(i, distance)| PickHit {
        point: positions[i],
        kind: PickKind::NearestParticle {
            particle: ParticleId(i as u32),
            distance,
        },
    })
}
