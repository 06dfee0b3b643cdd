//! # loom-mesh
//!
//! Skinned render meshes and the particle graph the cloth solver runs on.
//!
//! ## Key Types
//!
//! - [`SkinnedMesh`] — Render vertex buffer plus triangle index buffer.
//! - [`ParticleGraph`] — Welded particles, particle triangles, and the
//!   vertex ↔ particle maps built by [`weld::build_particles`].
//! - [`Reconstructor`] — Writes solver positions back onto every render
//!   vertex and recomputes smooth normals.
//! - [`ParticleTopology`] — 1-ring adjacency over the particle triangles.
//! - Procedural generators for tests and the CLI (quad grids, seamed quads).

pub mod generators;
pub mod mesh;
pub mod normals;
pub mod particle;
pub mod reconstruct;
pub mod topology;
pub mod weld;

pub use mesh::{RenderVertex, SkinnedMesh};
pub use particle::Particle;
pub use reconstruct::{write_back, Reconstructor};
pub use topology::ParticleTopology;
pub use weld::{build_particles, ParticleGraph, WeldConfig};
