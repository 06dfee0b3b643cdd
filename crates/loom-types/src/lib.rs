//! # loom-types
//!
//! Shared identifiers, error types, and constants for the loom cloth
//! data layer.
//!
//! This crate has zero domain logic; it defines the vocabulary
//! that all other loom crates share.

pub mod constants;
pub mod error;
pub mod ids;

pub use error::{LoomError, LoomResult};
pub use ids::{BoneId, ParticleId, VertexId};
