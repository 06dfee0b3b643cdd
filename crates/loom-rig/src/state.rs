//! Per-particle pin state.

use loom_math::Vec3;
use loom_mesh::Particle;

/// What drives a particle this frame.
///
/// Kept separate from the numeric inverse mass so that "pinned by an
/// attachment" and "painted fully fixed" stay distinguishable until the
/// particle buffer is handed to the solver.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ParticleState {
    /// Fully simulated.
    #[default]
    Free,
    /// Kinematically placed at this world position for the current frame.
    Attached(Vec3),
    /// Simulated with a painted weight in `[0, 1]`.
    Painted(f32),
}

impl ParticleState {
    /// State for a particle with painted weight `weight` (1.0 = free).
    pub fn from_weight(weight: f32) -> Self {
        if weight >= 1.0 {
            Self::Free
        } else {
            Self::Painted(weight.clamp(0.0, 1.0))
        }
    }

    /// Solver inverse mass for this state.
    pub fn inverse_mass(&self, base_inverse_mass: f32) -> f32 {
        match *self {
            Self::Free => base_inverse_mass,
            Self::Attached(_) => 0.0,
            Self::Painted(weight) => base_inverse_mass * weight.clamp(0.0, 1.0),
        }
    }

    #[inline]
    pub fn is_attached(&self) -> bool {
        matches!(self, Self::Attached(_))
    }
}

/// Writes `states` into the solver particle buffer.
///
/// Attached particles take their bone position and inverse mass 0;
/// everyone else keeps their simulated position and gets the inverse mass
/// their weight implies. Lengths must match; in release builds only the
/// common prefix is written.
pub fn resolve_particles(states: &[ParticleState], particles: &mut [Particle], base_inverse_mass: f32) {
    debug_assert_eq!(states.len(), particles.len(), "state buffer does not match particle count");
    for (state, particle) in states.iter().zip(particles.iter_mut()) {
        if let ParticleState::Attached(position) = *state {
            particle.position = position;
        }
        particle.inverse_mass = state.inverse_mass(base_inverse_mass);
    }
}
