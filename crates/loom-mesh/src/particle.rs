//! Solver point mass.

use loom_math::{Vec3, Vec4};
use serde::{Deserialize, Serialize};

/// A solver point mass: position plus inverse mass.
///
/// `inverse_mass == 0.0` means infinitely heavy (kinematic).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    pub position: Vec3,
    pub inverse_mass: f32,
}

impl Particle {
    #[inline]
    pub fn new(position: Vec3, inverse_mass: f32) -> Self {
        Self {
            position,
            inverse_mass,
        }
    }

    /// Packs as `(x, y, z, inverse_mass)`, the layout most cloth solvers consume.
    #[inline]
    pub fn to_vec4(self) -> Vec4 {
        self.position.extend(self.inverse_mass)
    }

    #[inline]
    pub fn from_vec4(v: Vec4) -> Self {
        Self {
            position: v.truncate(),
            inverse_mass: v.w,
        }
    }

    /// Returns true if the solver will not move this particle.
    #[inline]
    pub fn is_kinematic(&self) -> bool {
        self.inverse_mass == 0.0
    }
}
