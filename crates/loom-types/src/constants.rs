//! Physical constants and simulation defaults.
//!
//! Unit convention: positions are in world units, and the defaults
//! below assume one world unit is one metre.

/// Gravitational acceleration (m/s²).
pub const GRAVITY: f32 = 9.81;

/// Default simulation timestep (seconds). 1/60th of a second.
pub const DEFAULT_DT: f32 = 1.0 / 60.0;

/// Default weld grid cell (world units). Vertices whose positions quantize
/// to the same cell become one particle. 1e-3 is one millimetre at metre scale.
pub const DEFAULT_WELD_EPSILON: f32 = 1.0e-3;

/// Inverse mass given to a fully free particle (weight 1.0).
pub const DEFAULT_BASE_INVERSE_MASS: f32 = 1.0;

/// Weight reported for particles with no painted entry.
pub const DEFAULT_WEIGHT: f32 = 1.0;

/// Squared length below which an accumulated normal is treated as zero.
pub const DEGENERATE_NORMAL_THRESHOLD: f32 = 1.0e-20;
