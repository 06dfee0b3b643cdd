//! Vertex normal computation from triangle mesh data.
//!
//! Computes area-weighted vertex normals by accumulating
//! unnormalized face normals from each adjacent triangle.

use loom_math::Vec3;
use loom_types::constants::DEGENERATE_NORMAL_THRESHOLD;

/// Accumulates area-weighted face normals at every point of `positions`.
///
/// Each triangle adds `cross(p1 - p0, p2 - p0)` (magnitude = 2 × area) to
/// its three corners. Zero-area triangles therefore add nothing.
/// Triangles with an out-of-range index are ignored. The result is
/// unnormalized; see [`normalize_or`].
pub fn accumulate_face_normals(positions: &[Vec3], indices: &[u32], out: &mut Vec<Vec3>) {
    let n = positions.len();
    out.clear();
    out.resize(n, Vec3::ZERO);

    for tri in indices.chunks_exact(3) {
        let a = tri[0] as usize;
        let b = tri[1] as usize;
        let c = tri[2] as usize;
        if a >= n || b >= n || c >= n {
            continue;
        }

        let face = (positions[b] - positions[a]).cross(positions[c] - positions[a]);

        out[a] += face;
        out[b] += face;
        out[c] += face;
    }
}

/// Normalizes an accumulated normal, returning `fallback` when it is
/// (numerically) zero.
#[inline]
pub fn normalize_or(accumulated: Vec3, fallback: Vec3) -> Vec3 {
    let len_sq = accumulated.length_squared();
    if len_sq > DEGENERATE_NORMAL_THRESHOLD && len_sq.is_finite() {
        accumulated / len_sq.sqrt()
    } else {
        fallback
    }
}

/// Smooth per-point normals. Points touched only by degenerate triangles
/// (or by none) get `Vec3::ZERO`.
pub fn smooth_normals(positions: &[Vec3], indices: &[u32]) -> Vec<Vec3> {
    let mut acc = Vec::new();
    accumulate_face_normals(positions, indices, &mut acc);
    acc.into_iter()
        .map(|n| normalize_or(n, Vec3::ZERO))
        .collect()
}
