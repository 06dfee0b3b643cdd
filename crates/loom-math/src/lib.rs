//! # loom-math
//!
//! Math primitives for the loom cloth data layer.
//!
//! Provides:
//! - Re-exports of `glam` types (`Vec3`, `Mat4`, etc.)
//! - [`Ray`] with Möller–Trumbore triangle intersection and
//!   point-to-ray distance, used by weight-paint picking

pub mod ray;

pub use ray::{Ray, RayHit};

// Re-export glam types as the canonical math types for loom.
pub use glam::{Affine3A, Mat3, Mat4, Quat, Vec2, Vec3, Vec4};
