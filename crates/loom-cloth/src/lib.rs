//! # loom-cloth
//!
//! The cloth component: turns a skinned mesh into a solver particle graph,
//! runs the per-tick attach → step → reconstruct pipeline, and owns the
//! weight field the paint tool edits.
//!
//! ## Key Types
//!
//! - [`ClothComponent`] — One cloth instance bound to an injected solver
//! - [`ClothWorld`] — Several cloths stepped as one solver batch
//! - [`RenderSink`] — Where reconstructed vertices go each tick

pub mod component;
pub mod render;
pub mod world;

pub use component::{ClothComponent, TickReport};
pub use render::RenderSink;
pub use world::{ClothWorld, WorldTickReport};
