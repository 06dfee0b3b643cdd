//! Render-side skinned mesh.
//!
//! Vertices are stored interleaved (one [`RenderVertex`] per entry) because
//! this is the layout handed to the render sink for upload. The cloth
//! solver never sees this buffer directly; it runs on the welded
//! [`ParticleGraph`](crate::ParticleGraph).

use loom_math::{Vec2, Vec3, Vec4};
use loom_types::{LoomError, LoomResult};
use serde::{Deserialize, Serialize};

/// One render vertex.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RenderVertex {
    pub position: Vec3,
    pub normal: Vec3,
    pub uv: Vec2,
    /// Tangent with handedness in `w`.
    pub tangent: Vec4,
    pub color: Vec4,
}

impl RenderVertex {
    /// A vertex at `position` with a +Z normal, zero UV, +X tangent and white color.
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            normal: Vec3::Z,
            uv: Vec2::ZERO,
            tangent: Vec4::new(1.0, 0.0, 0.0, 1.0),
            color: Vec4::ONE,
        }
    }

    pub fn with_uv(mut self, uv: Vec2) -> Self {
        self.uv = uv;
        self
    }
}

/// A skinned character mesh (or mesh section) as loaded from an asset.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SkinnedMesh {
    /// Asset path or debug name.
    #[serde(default)]
    pub name: String,

    pub vertices: Vec<RenderVertex>,

    /// Triangle indices, each triangle is [v0, v1, v2].
    /// Stored flat: `[t0v0, t0v1, t0v2, t1v0, t1v1, t1v2, ...]`
    pub indices: Vec<u32>,
}

impl SkinnedMesh {
    /// Returns the number of vertices.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Returns the number of complete triangles.
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Returns the three vertex indices of triangle `t`.
    #[inline]
    pub fn triangle(&self, t: usize) -> [u32; 3] {
        let base = t * 3;
        [self.indices[base], self.indices[base + 1], self.indices[base + 2]]
    }

    /// Copies all vertex positions into a new buffer.
    pub fn positions(&self) -> Vec<Vec3> {
        self.vertices.iter().map(|v| v.position).collect()
    }

    /// Builds a mesh from bare positions; other attributes take
    /// [`RenderVertex::at`] defaults.
    pub fn from_positions(positions: &[Vec3], indices: &[u32]) -> Self {
        Self {
            name: String::new(),
            vertices: positions.iter().copied().map(RenderVertex::at).collect(),
            indices: indices.to_vec(),
        }
    }

    /// Validates mesh integrity.
    ///
    /// Checks:
    /// - The mesh has at least one triangle
    /// - Index count is a multiple of 3
    /// - Triangle indices are within bounds
    /// - Vertex positions are finite
    ///
    /// Welding tolerates out-of-range indices by skipping the triangle;
    /// this check is for tooling that wants to reject such assets up front.
    pub fn validate(&self) -> LoomResult<()> {
        if self.indices.is_empty() {
            return Err(LoomError::InvalidMesh("Mesh has no triangles".into()));
        }

        if self.indices.len() % 3 != 0 {
            return Err(LoomError::InvalidMesh(format!(
                "Index count ({}) is not divisible by 3",
                self.indices.len()
            )));
        }

        let n = self.vertices.len();
        for (i, &idx) in self.indices.iter().enumerate() {
            if idx as usize >= n {
                return Err(LoomError::InvalidMesh(format!(
                    "Index {} at position {} is out of range (vertex count: {})",
                    idx, i, n
                )));
            }
        }

        if let Some(i) = self
            .vertices
            .iter()
            .position(|v| !v.position.is_finite())
        {
            return Err(LoomError::InvalidMesh(format!(
                "Vertex {} has a non-finite position",
                i
            )));
        }

        Ok(())
    }
}
