//! Weight asset persistence.
//!
//! Format (JSON):
//!
//! ```text
//! {
//!   "Name": "cape_weights",
//!   "SkeletalMeshPath": "characters/hero/cape.mesh",
//!   "VertexWeights": [ { "Index": 12, "Weight": 0.0 }, ... ],
//!   "VertexCount": 441
//! }
//! ```
//!
//! `Index` is a particle index and `VertexCount` the particle count of the
//! mesh the weights were painted on. Only non-default weights are listed.

use std::fs;
use std::path::Path;

use loom_types::{LoomError, LoomResult, ParticleId};
use serde::{Deserialize, Serialize};

use crate::field::WeightField;

/// One stored weight.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct WeightEntry {
    pub index: u32,
    pub weight: f32,
}

/// Sparse weight asset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct WeightAsset {
    pub name: String,
    #[serde(default)]
    pub skeletal_mesh_path: String,
    #[serde(default)]
    pub vertex_weights: Vec<WeightEntry>,
    #[serde(default)]
    pub vertex_count: usize,
}

/// Outcome of [`WeightAsset::apply_to_field`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ApplyReport {
    pub applied: usize,
    /// Entries whose index does not exist on the target field.
    pub skipped: usize,
}

impl WeightAsset {
    /// Captures the painted entries of `field`.
    pub fn from_field(name: &str, skeletal_mesh_path: &str, field: &WeightField) -> Self {
        Self {
            name: name.to_string(),
            skeletal_mesh_path: skeletal_mesh_path.to_string(),
            vertex_weights: field
                .iter_painted()
                .map(|(p, weight)| WeightEntry { index: p.0, weight })
                .collect(),
            vertex_count: field.len(),
        }
    }

    /// Replaces the contents of `field` with this asset's weights.
    ///
    /// Entries past the end of `field` are skipped rather than failing, so
    /// weights painted on a slightly different mesh still load.
    pub fn apply_to_field(&self, field: &mut WeightField) -> ApplyReport {
        if self.vertex_count != field.len() {
            tracing::warn!(
                asset = %self.name,
                asset_count = self.vertex_count,
                field_count = field.len(),
                "weight asset was painted on a mesh with a different particle count"
            );
        }

        field.clear(loom_types::constants::DEFAULT_WEIGHT);
        let mut report = ApplyReport::default();
        for entry in &self.vertex_weights {
            if field.set(ParticleId(entry.index), entry.weight) {
                report.applied += 1;
            } else {
                report.skipped += 1;
            }
        }
        report
    }

    pub fn to_json(&self) -> LoomResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| LoomError::Serialization(e.to_string()))
    }

    pub fn from_json(json: &str) -> LoomResult<Self> {
        serde_json::from_str(json).map_err(|e| LoomError::Serialization(e.to_string()))
    }

    pub fn load(path: impl AsRef<Path>) -> LoomResult<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> LoomResult<()> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Saves, logging and returning false on failure.
    pub fn try_save(&self, path: impl AsRef<Path>) -> bool {
        let path = path.as_ref();
        match self.save(path) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to save weight asset");
                false
            }
        }
    }

    /// Loads `path` into `field`, logging and returning false on failure.
    /// `field` is untouched when loading fails.
    pub fn try_load_into(path: impl AsRef<Path>, field: &mut WeightField) -> bool {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(asset) => {
                let report = asset.apply_to_field(field);
                tracing::debug!(
                    path = %path.display(),
                    applied = report.applied,
                    skipped = report.skipped,
                    "loaded weight asset"
                );
                true
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to load weight asset");
                false
            }
        }
    }
}
