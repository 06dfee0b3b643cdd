//! # loom-weights
//!
//! Per-particle constraint weights and the tools that edit them.
//!
//! - [`WeightField`] — sparse weight per particle in `[0, 1]`
//!   (0 = fixed, 1 = free; unset particles are free).
//! - [`BrushState`] / [`apply_brush`] — radius/falloff brush math.
//! - [`pick`] — ray picking against the particle triangles.
//! - [`WeightPaintTool`] — the idle/painting stroke state machine.
//! - [`WeightAsset`] — sparse `(index, weight)` persistence.

pub mod asset;
pub mod brush;
pub mod field;
pub mod paint;
pub mod picking;

pub use asset::{ApplyReport, WeightAsset, WeightEntry};
pub use brush::{apply_brush, BrushMode, BrushState};
pub use field::WeightField;
pub use paint::{PaintTarget, StrokeSummary, WeightPaintTool};
pub use picking::{pick, PickHit, PickKind};
