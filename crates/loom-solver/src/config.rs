//! Scene tunables for a cloth instance.
//!
//! Parameters the solver exposes per instance (gravity, drag, inertia,
//! wind, tethers, per-phase stiffness) plus the data-layer settings that
//! shape the particle graph (weld epsilon, base inverse mass).
//! Loadable from TOML; every field has a default.

use std::path::Path;

use loom_math::Vec3;
use loom_mesh::WeldConfig;
use loom_types::constants::{DEFAULT_BASE_INVERSE_MASS, DEFAULT_WELD_EPSILON, GRAVITY};
use loom_types::{LoomError, LoomResult};
use serde::{Deserialize, Serialize};

/// Constraint phase a stiffness applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseKind {
    Stretch,
    Bend,
    Shear,
}

/// Stiffness of one constraint phase, `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhaseConfig {
    pub kind: PhaseKind,
    pub stiffness: f32,
}

/// Wind acting on the cloth.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindConfig {
    /// World-space wind velocity.
    pub velocity: Vec3,
    /// Drag coefficient, `[0, 1]`.
    pub drag: f32,
    /// Lift coefficient, `[0, 1]`.
    pub lift: f32,
}

impl Default for WindConfig {
    fn default() -> Self {
        Self {
            velocity: Vec3::ZERO,
            drag: 0.0,
            lift: 0.0,
        }
    }
}

/// Long-range tether constraints.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TetherConfig {
    /// Scale applied to tether rest lengths.
    pub scale: f32,
    /// Tether stiffness, `[0, 1]`. 0 disables tethers.
    pub stiffness: f32,
}

impl Default for TetherConfig {
    fn default() -> Self {
        Self {
            scale: 1.0,
            stiffness: 1.0,
        }
    }
}

/// Complete per-instance configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClothSettings {
    /// Gravity vector (m/s²).
    pub gravity: Vec3,

    /// Per-axis fraction of velocity removed each second, `[0, 1]`.
    pub linear_drag: Vec3,
    pub angular_drag: Vec3,

    /// How much of the owning object's motion is transferred to the
    /// particles, `[0, 1]` per axis.
    pub linear_inertia: Vec3,
    pub angular_inertia: Vec3,

    pub stretch_stiffness: f32,
    pub bend_stiffness: f32,
    pub shear_stiffness: f32,

    /// Solver iterations per second.
    pub solver_frequency: f32,

    /// Inverse mass of a free particle. Painted particles get
    /// `base_inverse_mass * weight`.
    pub base_inverse_mass: f32,

    /// Weld grid cell in world units (see [`WeldConfig`]).
    pub weld_epsilon: f32,

    /// Recompute render normals after every step.
    pub recompute_normals: bool,

    pub wind: WindConfig,
    pub tether: TetherConfig,
}

impl Default for ClothSettings {
    fn default() -> Self {
        Self {
            gravity: Vec3::new(0.0, -GRAVITY, 0.0),
            linear_drag: Vec3::splat(0.2),
            angular_drag: Vec3::splat(0.2),
            linear_inertia: Vec3::ONE,
            angular_inertia: Vec3::ONE,
            wind: WindConfig::default(),
            tether: TetherConfig::default(),
            stretch_stiffness: 1.0,
            bend_stiffness: 0.5,
            shear_stiffness: 0.75,
            solver_frequency: 300.0,
            base_inverse_mass: DEFAULT_BASE_INVERSE_MASS,
            weld_epsilon: DEFAULT_WELD_EPSILON,
            recompute_normals: true,
        }
    }
}

impl ClothSettings {
    /// Stiff, heavy fabric (leather, canvas).
    pub fn stiff() -> Self {
        Self {
            linear_drag: Vec3::splat(0.4),
            angular_drag: Vec3::splat(0.4),
            stretch_stiffness: 1.0,
            bend_stiffness: 0.9,
            shear_stiffness: 0.9,
            base_inverse_mass: 0.5,
            ..Default::default()
        }
    }

    /// Light, flowing fabric.
    pub fn silk() -> Self {
        Self {
            linear_drag: Vec3::splat(0.05),
            angular_drag: Vec3::splat(0.05),
            bend_stiffness: 0.1,
            shear_stiffness: 0.3,
            base_inverse_mass: 2.0,
            ..Default::default()
        }
    }

    /// Phase stiffnesses in solver order.
    pub fn phase_configs(&self) -> [PhaseConfig; 3] {
        [
            PhaseConfig {
                kind: PhaseKind::Stretch,
                stiffness: self.stretch_stiffness,
            },
            PhaseConfig {
                kind: PhaseKind::Bend,
                stiffness: self.bend_stiffness,
            },
            PhaseConfig {
                kind: PhaseKind::Shear,
                stiffness: self.shear_stiffness,
            },
        ]
    }

    pub fn weld_config(&self) -> WeldConfig {
        WeldConfig {
            epsilon: self.weld_epsilon,
        }
    }

    /// Checks that every value is finite and inside its documented range.
    pub fn validate(&self) -> LoomResult<()> {
        let vectors = [
            ("gravity", self.gravity),
            ("wind.velocity", self.wind.velocity),
        ];
        for (name, v) in vectors {
            if !v.is_finite() {
                return Err(LoomError::InvalidConfig(format!("{name} must be finite")));
            }
        }

        let unit_vectors = [
            ("linear_drag", self.linear_drag),
            ("angular_drag", self.angular_drag),
            ("linear_inertia", self.linear_inertia),
            ("angular_inertia", self.angular_inertia),
        ];
        for (name, v) in unit_vectors {
            if !in_unit_range(v.min_element()) || !in_unit_range(v.max_element()) || !v.is_finite() {
                return Err(LoomError::InvalidConfig(format!(
                    "{name} components must be in [0, 1], got {v}"
                )));
            }
        }

        let unit_scalars = [
            ("wind.drag", self.wind.drag),
            ("wind.lift", self.wind.lift),
            ("tether.stiffness", self.tether.stiffness),
            ("stretch_stiffness", self.stretch_stiffness),
            ("bend_stiffness", self.bend_stiffness),
            ("shear_stiffness", self.shear_stiffness),
        ];
        for (name, value) in unit_scalars {
            if !in_unit_range(value) {
                return Err(LoomError::InvalidConfig(format!(
                    "{name} must be in [0, 1], got {value}"
                )));
            }
        }

        let positive = [
            ("tether.scale", self.tether.scale),
            ("solver_frequency", self.solver_frequency),
            ("weld_epsilon", self.weld_epsilon),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(LoomError::InvalidConfig(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }

        if !(self.base_inverse_mass.is_finite() && self.base_inverse_mass >= 0.0) {
            return Err(LoomError::InvalidConfig(format!(
                "base_inverse_mass must be non-negative, got {}",
                self.base_inverse_mass
            )));
        }

        Ok(())
    }

    /// Parses and validates settings from TOML. Missing keys take defaults.
    pub fn from_toml_str(content: &str) -> LoomResult<Self> {
        let settings: Self =
            toml::from_str(content).map_err(|e| LoomError::Serialization(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_toml_string(&self) -> LoomResult<String> {
        toml::to_string(self).map_err(|e| LoomError::Serialization(e.to_string()))
    }

    pub fn load(path: impl AsRef<Path>) -> LoomResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }
}

#[inline]
fn in_unit_range(value: f32) -> bool {
    (0.0..=1.0).contains(&value)
}
