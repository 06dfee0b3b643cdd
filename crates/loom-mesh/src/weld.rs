//! Welding of coincident render vertices into simulation particles.
//!
//! A skinned mesh duplicates vertices wherever an attribute is
//! discontinuous (UV seams, hard edges). The solver must see one particle
//! per physical point, so positions are quantized onto a grid of cell size
//! [`WeldConfig::epsilon`] and vertices landing in the same cell are merged.
//!
//! Positions that straddle a cell boundary may fail to merge. That is a
//! false negative (an extra particle); two positions in different cells are
//! never merged.

use std::collections::HashMap;

use loom_math::Vec3;
use loom_types::constants::{DEFAULT_BASE_INVERSE_MASS, DEFAULT_WELD_EPSILON};
use loom_types::{LoomError, LoomResult, ParticleId, VertexId};
use serde::{Deserialize, Serialize};

use crate::particle::Particle;

/// Quantized grid cell of a position.
type WeldKey = (i64, i64, i64);

/// Welding parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeldConfig {
    /// Grid cell size in world units. With the default metre convention
    /// `1e-3` merges vertices within roughly a millimetre. Scale this with
    /// the asset's unit (e.g. `0.1` for centimetre assets).
    pub epsilon: f32,
}

impl Default for WeldConfig {
    fn default() -> Self {
        Self {
            epsilon: DEFAULT_WELD_EPSILON,
        }
    }
}

impl WeldConfig {
    pub fn new(epsilon: f32) -> LoomResult<Self> {
        let config = Self { epsilon };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> LoomResult<()> {
        if !(self.epsilon.is_finite() && self.epsilon > 0.0) {
            return Err(LoomError::InvalidConfig(format!(
                "Weld epsilon must be positive and finite, got {}",
                self.epsilon
            )));
        }
        Ok(())
    }

    /// Grid cell of `p`, or `None` if the position cannot be quantized
    /// (non-finite, or beyond the `i64` range at this epsilon).
    fn quantize(&self, p: Vec3) -> Option<WeldKey> {
        let q = (p / self.epsilon).round();
        const LIMIT: f32 = i64::MAX as f32;
        if !q.is_finite() || q.abs().max_element() >= LIMIT {
            return None;
        }
        Some((q.x as i64, q.y as i64, q.z as i64))
    }
}

/// The welded particle graph of one mesh.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParticleGraph {
    /// One particle per welded position, in first-seen order. Positions
    /// are those of the representative (first-seen) vertex.
    pub particles: Vec<Particle>,

    /// Triangle list over particle indices. Every entry is `< particles.len()`.
    pub indices: Vec<u32>,

    /// For every render vertex, the particle it was welded into.
    /// `None` for vertices no valid triangle references.
    pub vertex_to_particle: Vec<Option<ParticleId>>,

    /// For every particle, the render vertices it represents. Never empty.
    pub particle_to_vertices: Vec<Vec<VertexId>>,

    /// Number of source triangles dropped for referencing out-of-range vertices.
    pub skipped_triangles: usize,
}

impl ParticleGraph {
    #[inline]
    pub fn particle_count(&self) -> usize {
        self.particles.len()
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertex_to_particle.len()
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Returns the three particle indices of triangle `t`.
    #[inline]
    pub fn triangle(&self, t: usize) -> [u32; 3] {
        let base = t * 3;
        [self.indices[base], self.indices[base + 1], self.indices[base + 2]]
    }

    /// Particle a render vertex was welded into.
    pub fn particle_of(&self, vertex: VertexId) -> Option<ParticleId> {
        self.vertex_to_particle.get(vertex.index()).copied().flatten()
    }

    /// Render vertices represented by `particle` (empty slice if out of range).
    pub fn vertices_of(&self, particle: ParticleId) -> &[VertexId] {
        self.particle_to_vertices
            .get(particle.index())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Copies all particle positions into a new buffer.
    pub fn positions(&self) -> Vec<Vec3> {
        self.particles.iter().map(|p| p.position).collect()
    }

    /// Number of render vertices that were merged into an earlier particle.
    pub fn merged_vertex_count(&self) -> usize {
        self.particle_to_vertices
            .iter()
            .map(|group| group.len().saturating_sub(1))
            .sum()
    }
}

/// Welds `positions` (one per render vertex) into a [`ParticleGraph`].
///
/// Triangles are walked in index order, so particle indices are
/// deterministic: the first vertex seen in a cell becomes its particle.
/// Triangles with any out-of-range index are skipped; a trailing partial
/// triangle is ignored. Empty input yields an empty graph.
pub fn build_particles(positions: &[Vec3], indices: &[u32], config: &WeldConfig) -> ParticleGraph {
    let vertex_count = positions.len();
    let tri_count = indices.len() / 3;

    let mut cells: HashMap<WeldKey, ParticleId> = HashMap::with_capacity(vertex_count);
    let mut graph = ParticleGraph {
        particles: Vec::with_capacity(vertex_count),
        indices: Vec::with_capacity(tri_count * 3),
        vertex_to_particle: vec![None; vertex_count],
        particle_to_vertices: Vec::with_capacity(vertex_count),
        skipped_triangles: 0,
    };

    for tri in indices.chunks_exact(3) {
        if tri.iter().any(|&v| v as usize >= vertex_count) {
            graph.skipped_triangles += 1;
            continue;
        }

        for &v in tri {
            let vertex = VertexId(v);
            let existing = graph.vertex_to_particle[vertex.index()];
            let particle = match existing {
                Some(p) => p,
                None => {
                    let position = positions[vertex.index()];
                    let p = match config.quantize(position) {
                        Some(key) => *cells
                            .entry(key)
                            .or_insert_with(|| push_particle(&mut graph, position)),
                        // Unquantizable positions never share a particle.
                        None => push_particle(&mut graph, position),
                    };
                    graph.vertex_to_particle[vertex.index()] = Some(p);
                    graph.particle_to_vertices[p.index()].push(vertex);
                    p
                }
            };
            graph.indices.push(particle.0);
        }
    }

    if graph.skipped_triangles > 0 {
        tracing::warn!(
            skipped = graph.skipped_triangles,
            "skipped triangles with out-of-range vertex indices"
        );
    }
    tracing::debug!(
        vertices = vertex_count,
        particles = graph.particles.len(),
        triangles = graph.triangle_count(),
        "welded mesh into particles"
    );

    graph
}

fn push_particle(graph: &mut ParticleGraph, position: Vec3) -> ParticleId {
    let id = ParticleId(graph.particles.len() as u32);
    graph
        .particles
        .push(Particle::new(position, DEFAULT_BASE_INVERSE_MASS));
    graph.particle_to_vertices.push(Vec::new());
    id
}
