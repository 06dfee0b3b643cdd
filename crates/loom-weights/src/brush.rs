//! Brush math for weight painting.

use loom_math::Vec3;
use loom_mesh::ParticleTopology;
use loom_types::constants::DEFAULT_WEIGHT;
use loom_types::ParticleId;
use serde::{Deserialize, Serialize};

use crate::field::WeightField;

/// Target weight for [`BrushMode::Erase`].
const ERASE_TARGET: f32 = 1.0;
/// Target weight for [`BrushMode::Smooth`].
const SMOOTH_TARGET: f32 = 0.5;
/// [`BrushMode::Smooth`] applies at half strength.
const SMOOTH_RATE: f32 = 0.5;

/// How a brush dab changes weights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BrushMode {
    /// Blend toward `paint_value`.
    #[default]
    Paint,
    /// Blend back toward free (1.0).
    Erase,
    /// Blend toward the 0.5 midpoint at half rate.
    Smooth,
    /// Set to `paint_value` outright, ignoring strength and falloff.
    Fill,
    /// Blend toward the mean weight of each particle's 1-ring neighbors.
    Relax,
}

/// Brush parameters edited by the UI.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BrushState {
    pub mode: BrushMode,
    /// World-space radius. Particles farther than this are untouched.
    pub radius: f32,
    /// Blend amount at the brush center, `[0, 1]`.
    pub strength: f32,
    /// Edge falloff slope. 0 = flat disc, 1 = linear to zero at the rim,
    /// larger values reach zero before the rim.
    pub falloff: f32,
    /// Weight written by Paint and Fill.
    pub paint_value: f32,
}

impl Default for BrushState {
    fn default() -> Self {
        Self {
            mode: BrushMode::Paint,
            radius: 0.1,
            strength: 0.5,
            falloff: 1.0,
            paint_value: 0.0,
        }
    }
}

impl BrushState {
    pub fn set_radius(&mut self, radius: f32) {
        if radius.is_finite() && radius > 0.0 {
            self.radius = radius;
        }
    }

    pub fn set_strength(&mut self, strength: f32) {
        if !strength.is_nan() {
            self.strength = strength.clamp(0.0, 1.0);
        }
    }

    pub fn set_falloff(&mut self, falloff: f32) {
        if !falloff.is_nan() {
            self.falloff = falloff.max(0.0);
        }
    }

    pub fn set_paint_value(&mut self, value: f32) {
        if !value.is_nan() {
            self.paint_value = value.clamp(0.0, 1.0);
        }
    }

    /// Falloff factor at `distance` from the center:
    /// `clamp(1 - (distance / radius) * falloff, 0, 1)`.
    #[inline]
    pub fn falloff_at(&self, distance: f32) -> f32 {
        (1.0 - (distance / self.radius) * self.falloff).clamp(0.0, 1.0)
    }
}

#[inline]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Applies one brush dab centered at `center` to every particle of
/// `positions` within `brush.radius`.
///
/// `positions` is indexed by particle. `topology` is only consulted by
/// [`BrushMode::Relax`], which does nothing without it. Relax reads
/// neighbor weights from before the dab, so the result does not depend on
/// particle order. Returns the number of particles inside the brush.
pub fn apply_brush(
    field: &mut WeightField,
    center: Vec3,
    positions: &[Vec3],
    brush: &BrushState,
    topology: Option<&ParticleTopology>,
) -> usize {
    if !(brush.radius > 0.0) || !center.is_finite() {
        return 0;
    }

    let relax_snapshot = match (brush.mode, topology) {
        (BrushMode::Relax, Some(_)) => Some(field.to_dense()),
        (BrushMode::Relax, None) => return 0,
        _ => None,
    };

    let radius_sq = brush.radius * brush.radius;
    let mut touched = 0;

    for (i, &p) in positions.iter().enumerate() {
        let distance_sq = p.distance_squared(center);
        if !(distance_sq <= radius_sq) {
            continue;
        }
        touched += 1;

        let id = ParticleId(i as u32);
        let current = field.get(id);
        let applied = brush.strength * brush.falloff_at(distance_sq.sqrt());

        let next = match brush.mode {
            BrushMode::Paint => lerp(current, brush.paint_value, applied),
            BrushMode::Erase => lerp(current, ERASE_TARGET, applied),
            BrushMode::Smooth => lerp(current, SMOOTH_TARGET, applied * SMOOTH_RATE),
            BrushMode::Fill => brush.paint_value,
            BrushMode::Relax => {
                let (Some(weights), Some(topology)) = (&relax_snapshot, topology) else {
                    continue;
                };
                let ring = topology.one_ring(i as u32);
                if ring.is_empty() {
                    continue;
                }
                let mean = ring
                    .iter()
                    .map(|&n| weights.get(n as usize).copied().unwrap_or(DEFAULT_WEIGHT))
                    .sum::<f32>()
                    / ring.len() as f32;
                lerp(current, mean, applied)
            }
        };

        field.set(id, next);
    }

    touched
}
