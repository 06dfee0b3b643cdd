//! Kinematic attachments of particles to skeleton bones.
//!
//! Runs once per tick, before the solver step that consumes it.

use loom_math::Vec3;
use loom_mesh::Particle;
use loom_types::ParticleId;
use serde::{Deserialize, Serialize};

use crate::skeleton::SkeletonPose;
use crate::state::ParticleState;

/// Rigidly binds one particle to a bone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttachmentSpec {
    pub bone_name: String,
    /// Offset in the bone's local space.
    #[serde(default)]
    pub local_offset: Vec3,
    pub particle: ParticleId,
}

impl AttachmentSpec {
    pub fn new(bone_name: &str, local_offset: Vec3, particle: ParticleId) -> Self {
        Self {
            bone_name: bone_name.to_string(),
            local_offset,
            particle,
        }
    }
}

/// Per-tick attachment outcome.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttachReport {
    /// Specs that pinned their particle.
    pub attached: usize,
    /// Bone names that could not be resolved this frame.
    pub missing_bones: Vec<String>,
    /// Specs whose particle index is out of range.
    pub invalid_particles: usize,
}

impl AttachReport {
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.missing_bones.is_empty() && self.invalid_particles == 0
    }
}

/// World position of `spec` under `pose`: `bone_world * local_offset`.
/// `None` if the bone is unknown.
pub fn attachment_target(spec: &AttachmentSpec, pose: &dyn SkeletonPose) -> Option<Vec3> {
    let bone = pose.find_bone_index(&spec.bone_name)?;
    let world = pose.bone_world_transform(bone)?;
    Some(world.transform_point3(spec.local_offset))
}

/// Pins the particles named by `specs` directly in a solver buffer:
/// position set to the bone target and inverse mass forced to 0.
///
/// Missing bones are skipped; those particles keep their current values.
pub fn update_attachments(
    particles: &mut [Particle],
    specs: &[AttachmentSpec],
    pose: &dyn SkeletonPose,
) -> AttachReport {
    apply(specs, pose, particles.len(), |i, target| {
        let particle = &mut particles[i];
        particle.position = target;
        particle.inverse_mass = 0.0;
    })
}

/// Marks the particles named by `specs` as [`ParticleState::Attached`].
///
/// Missing bones are skipped; those particles keep their weight-derived state.
pub fn bind_states(
    states: &mut [ParticleState],
    specs: &[AttachmentSpec],
    pose: &dyn SkeletonPose,
) -> AttachReport {
    apply(specs, pose, states.len(), |i, target| {
        states[i] = ParticleState::Attached(target);
    })
}

fn apply(
    specs: &[AttachmentSpec],
    pose: &dyn SkeletonPose,
    len: usize,
    mut pin: impl FnMut(usize, Vec3),
) -> AttachReport {
    let mut report = AttachReport::default();

    for spec in specs {
        let i = spec.particle.index();
        if i >= len {
            report.invalid_particles += 1;
            continue;
        }
        match attachment_target(spec, pose) {
            Some(target) => {
                pin(i, target);
                report.attached += 1;
            }
            None => {
                tracing::debug!(bone = %spec.bone_name, "attachment bone not found; skipping");
                report.missing_bones.push(spec.bone_name.clone());
            }
        }
    }

    report
}
