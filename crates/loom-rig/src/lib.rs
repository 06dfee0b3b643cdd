//! # loom-rig
//!
//! Binds cloth particles to an animated skeleton.
//!
//! - [`SkeletonPose`] — what the cloth layer needs from the skeleton
//!   engine (bone lookup by name, bone world transforms). [`Pose`] is a
//!   plain in-memory implementation.
//! - [`AttachmentSpec`] / [`update_attachments`] — per-tick kinematic pinning.
//! - [`ParticleState`] — explicit free / attached / painted state, turned
//!   into a solver inverse mass only when particles are marshaled.

pub mod attachment;
pub mod skeleton;
pub mod state;

pub use attachment::{attachment_target, bind_states, update_attachments, AttachReport, AttachmentSpec};
pub use skeleton::{Pose, SkeletonPose};
pub use state::{resolve_particles, ParticleState};
