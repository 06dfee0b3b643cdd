//! Cloth event types.
//!
//! Structured events emitted by a cloth component at setup, during
//! ticks and while painting. Events are small value types carrying just
//! enough data for monitoring and debugging.

use serde::{Deserialize, Serialize};

/// An event emitted by a cloth component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClothEvent {
    /// Number of ticks the component had completed when the event fired.
    pub frame: u64,
    /// Event payload.
    pub kind: EventKind,
}

/// Event payload variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EventKind {
    /// A particle graph was (re)built and the solver instance created.
    ClothRebuilt {
        particles: u32,
        vertices: u32,
        triangles: u32,
    },

    /// Setup failed; the component stays uninitialized.
    SetupFailed { reason: String },

    /// A simulation tick finished.
    TickCompleted {
        /// Step size (seconds).
        dt: f32,
        /// Particles pinned to bones this tick.
        attached: u32,
        /// Wall-clock time spent in the solver (seconds).
        wall_time: f64,
    },

    /// An attachment's bone was not found in the pose.
    AttachmentMissed { bone: String },

    /// A paint stroke started.
    StrokeBegin,

    /// A paint stroke ended.
    StrokeEnd {
        /// Brush applications over the stroke.
        applications: u32,
    },

    /// A weight asset was applied to the weight field.
    WeightsLoaded { entries: u32, skipped: u32 },
}

impl ClothEvent {
    pub fn new(frame: u64, kind: EventKind) -> Self {
        Self { frame, kind }
    }

    /// Short stable label for the event kind.
    pub fn label(&self) -> &'static str {
        match self.kind {
            EventKind::ClothRebuilt { .. } => "cloth_rebuilt",
            EventKind::SetupFailed { .. } => "setup_failed",
            EventKind::TickCompleted { .. } => "tick_completed",
            EventKind::AttachmentMissed { .. } => "attachment_missed",
            EventKind::StrokeBegin => "stroke_begin",
            EventKind::StrokeEnd { .. } => "stroke_end",
            EventKind::WeightsLoaded { .. } => "weights_loaded",
        }
    }
}
