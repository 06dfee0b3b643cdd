//! Sparse per-particle weight storage.

use std::collections::BTreeMap;

use loom_types::constants::DEFAULT_WEIGHT;
use loom_types::ParticleId;

/// Sparse map from particle index to weight in `[0, 1]`.
///
/// Only non-default weights are stored; every other particle in
/// `0..len` reads as [`DEFAULT_WEIGHT`] (free). The solver consumes
/// `base_inverse_mass * weight`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeightField {
    len: usize,
    entries: BTreeMap<u32, f32>,
}

impl WeightField {
    /// An all-free field over `len` particles.
    pub fn new(len: usize) -> Self {
        Self {
            len,
            entries: BTreeMap::new(),
        }
    }

    /// Number of particles the field covers.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of explicitly stored (non-default) weights.
    #[inline]
    pub fn painted_count(&self) -> usize {
        self.entries.len()
    }

    /// Weight of particle `i`. Unset and out-of-range particles read as free.
    pub fn get(&self, i: ParticleId) -> f32 {
        self.entries.get(&i.0).copied().unwrap_or(DEFAULT_WEIGHT)
    }

    /// Stored weight of `i`, or `None` if it is at the default.
    pub fn painted(&self, i: ParticleId) -> Option<f32> {
        self.entries.get(&i.0).copied()
    }

    /// Sets the weight of particle `i`, clamped to `[0, 1]`.
    ///
    /// Returns false (and changes nothing) for an out-of-range particle
    /// or a NaN weight.
    pub fn set(&mut self, i: ParticleId, weight: f32) -> bool {
        if i.index() >= self.len || weight.is_nan() {
            return false;
        }
        let weight = weight.clamp(0.0, 1.0);
        if weight == DEFAULT_WEIGHT {
            self.entries.remove(&i.0);
        } else {
            self.entries.insert(i.0, weight);
        }
        true
    }

    /// Resets every particle to `default` (clamped to `[0, 1]`).
    pub fn clear(&mut self, default: f32) {
        self.entries.clear();
        let default = if default.is_nan() {
            DEFAULT_WEIGHT
        } else {
            default.clamp(0.0, 1.0)
        };
        if default != DEFAULT_WEIGHT {
            self.entries.extend((0..self.len as u32).map(|i| (i, default)));
        }
    }

    /// Changes the particle count. Entries past the new end are dropped.
    pub fn resize(&mut self, len: usize) {
        self.len = len;
        self.entries.retain(|&i, _| (i as usize) < len);
    }

    /// Iterates stored `(particle, weight)` pairs in ascending index order.
    pub fn iter_painted(&self) -> impl Iterator<Item = (ParticleId, f32)> + '_ {
        self.entries.iter().map(|(&i, &w)| (ParticleId(i), w))
    }

    /// Dense copy of all weights, one per particle.
    pub fn to_dense(&self) -> Vec<f32> {
        let mut dense = vec![DEFAULT_WEIGHT; self.len];
        for (&i, &w) in &self.entries {
            dense[i as usize] = w;
        }
        dense
    }
}
