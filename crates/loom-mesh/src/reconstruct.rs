//! Reconstruction of render geometry from solver output.
//!
//! The solver moves particles; the renderer needs every original vertex,
//! including seam duplicates. [`Reconstructor::write_back`] copies each
//! particle's position onto all of its vertices, carries UV, tangent and
//! color over unchanged, and recomputes smooth normals.
//!
//! Normals are accumulated per particle over the particle triangle list,
//! so vertices on either side of a UV seam get the same normal.

use loom_math::Vec3;

use crate::mesh::RenderVertex;
use crate::normals::{accumulate_face_normals, normalize_or};
use crate::weld::ParticleGraph;

/// Writes particle positions back onto a render vertex buffer.
///
/// Holds scratch buffers so per-frame write-back does not allocate.
/// Output depends only on the inputs: identical inputs give bit-identical
/// vertex buffers.
#[derive(Debug, Clone)]
pub struct Reconstructor {
    /// When false, original normals are copied through untouched.
    pub recompute_normals: bool,
    normal_scratch: Vec<Vec3>,
}

impl Default for Reconstructor {
    fn default() -> Self {
        Self::new(true)
    }
}

impl Reconstructor {
    pub fn new(recompute_normals: bool) -> Self {
        Self {
            recompute_normals,
            normal_scratch: Vec::new(),
        }
    }

    /// Rebuilds `out` from `original` with `positions` applied.
    ///
    /// `positions` is indexed by particle. A length different from the
    /// graph's particle count is a caller bug: it asserts in debug builds,
    /// and in release only the common prefix of particles is written.
    /// Vertices without a particle keep their original position.
    pub fn write_back_into(
        &mut self,
        positions: &[Vec3],
        graph: &ParticleGraph,
        original: &[RenderVertex],
        out: &mut Vec<RenderVertex>,
    ) {
        debug_assert_eq!(
            positions.len(),
            graph.particle_count(),
            "position buffer does not match particle count"
        );
        let particle_count = positions.len().min(graph.particle_count());

        out.clear();
        out.extend_from_slice(original);

        for (p, &position) in positions.iter().enumerate().take(particle_count) {
            for v in &graph.particle_to_vertices[p] {
                if let Some(vertex) = out.get_mut(v.index()) {
                    vertex.position = position;
                }
            }
        }

        if !self.recompute_normals {
            return;
        }

        // Only triangles fully inside the written prefix contribute.
        accumulate_face_normals(
            &positions[..particle_count],
            &graph.indices,
            &mut self.normal_scratch,
        );

        for (p, &acc) in self.normal_scratch.iter().enumerate() {
            for v in &graph.particle_to_vertices[p] {
                if let Some(vertex) = out.get_mut(v.index()) {
                    vertex.normal = normalize_or(acc, vertex.normal);
                }
            }
        }
    }

    /// Allocating form of [`write_back_into`](Self::write_back_into).
    pub fn write_back(
        &mut self,
        positions: &[Vec3],
        graph: &ParticleGraph,
        original: &[RenderVertex],
    ) -> Vec<RenderVertex> {
        let mut out = Vec::with_capacity(original.len());
        self.write_back_into(positions, graph, original, &mut out);
        out
    }
}

/// One-shot write-back with normal recomputation.
pub fn write_back(
    positions: &[Vec3],
    graph: &ParticleGraph,
    original: &[RenderVertex],
) -> Vec<RenderVertex> {
    Reconstructor::default().write_back(positions, graph, original)
}
