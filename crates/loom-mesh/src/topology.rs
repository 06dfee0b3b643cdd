//! Particle topology queries.
//!
//! Builds adjacency data structures from the particle triangle list,
//! enabling neighbor queries needed by weight relaxation and mesh
//! diagnostics.

use std::collections::HashMap;

use crate::weld::ParticleGraph;

/// Precomputed adjacency for a [`ParticleGraph`].
///
/// Built once per rebuild. Provides O(1) neighbor queries used by:
/// - The relax brush (1-ring weight averaging)
/// - Mesh diagnostics (boundary edges, closed surfaces)
#[derive(Debug, Clone, Default)]
pub struct ParticleTopology {
    /// For each particle, the sorted, deduplicated set of particles sharing an edge.
    pub neighbors: Vec<Vec<u32>>,

    /// Unique edges as `(p_min, p_max)` pairs, sorted.
    pub edges: Vec<[u32; 2]>,

    /// For each edge, the number of adjacent triangles.
    /// Boundary edges have exactly 1.
    pub edge_valence: Vec<u32>,
}

impl ParticleTopology {
    /// Build topology from a particle graph.
    pub fn build(graph: &ParticleGraph) -> Self {
        let particle_count = graph.particle_count();
        let tri_count = graph.triangle_count();

        let mut neighbors: Vec<Vec<u32>> = vec![Vec::new(); particle_count];

        // Key: (min, max) to canonicalize edge direction
        let mut edge_map: HashMap<(u32, u32), u32> = HashMap::new();

        for t in 0..tri_count {
            let [a, b, c] = graph.triangle(t);
            for (v0, v1) in [(a, b), (b, c), (c, a)] {
                // Edges collapsed by welding carry no adjacency.
                if v0 == v1 {
                    continue;
                }
                neighbors[v0 as usize].push(v1);
                neighbors[v1 as usize].push(v0);
                let key = if v0 < v1 { (v0, v1) } else { (v1, v0) };
                *edge_map.entry(key).or_default() += 1;
            }
        }

        for ring in &mut neighbors {
            ring.sort_unstable();
            ring.dedup();
        }

        let mut sorted: Vec<((u32, u32), u32)> = edge_map.into_iter().collect();
        sorted.sort_unstable_by_key(|&(key, _)| key);
        let edges = sorted.iter().map(|&((a, b), _)| [a, b]).collect();
        let edge_valence = sorted.iter().map(|&(_, count)| count).collect();

        Self {
            neighbors,
            edges,
            edge_valence,
        }
    }

    /// Returns the 1-ring particle neighborhood of `p`.
    pub fn one_ring(&self, p: u32) -> &[u32] {
        self.neighbors
            .get(p as usize)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Returns the number of boundary edges (edges with only 1 adjacent triangle).
    pub fn boundary_edge_count(&self) -> usize {
        self.edge_valence.iter().filter(|&&n| n == 1).count()
    }

    /// Returns the number of edges shared by more than two triangles.
    pub fn non_manifold_edge_count(&self) -> usize {
        self.edge_valence.iter().filter(|&&n| n > 2).count()
    }

    /// Returns true if the surface is closed (no boundary edges).
    pub fn is_closed(&self) -> bool {
        self.boundary_edge_count() == 0
    }
}
