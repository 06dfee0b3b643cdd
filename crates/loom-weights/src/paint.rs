//! Weight paint stroke state machine.
//!
//! ```text
//! Idle ──mouse_down──▶ Painting ──mouse_move (held)──▶ Painting
//!   ▲                     │
//!   └──────mouse_up───────┘
//! ```
//!
//! Every `mouse_down` and `mouse_move` while painting picks the brush
//! center and applies one dab. A miss paints nothing but keeps the stroke
//! alive.

use loom_math::{Ray, Vec3};
use loom_mesh::ParticleTopology;

use crate::brush::{apply_brush, BrushState};
use crate::field::WeightField;
use crate::picking::{pick, PickHit};

/// Geometry a stroke paints on, indexed by particle.
#[derive(Debug, Clone, Copy)]
pub struct PaintTarget<'a> {
    pub positions: &'a [Vec3],
    /// Particle triangle list.
    pub indices: &'a [u32],
    /// Needed only by the relax brush.
    pub topology: Option<&'a ParticleTopology>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum StrokeState {
    #[default]
    Idle,
    Painting,
}

/// What a finished stroke did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StrokeSummary {
    /// Dabs that hit the mesh and were applied.
    pub applications: u32,
    /// Picks that missed.
    pub misses: u32,
}

/// Interactive weight painting over a [`WeightField`].
#[derive(Debug, Clone, Default)]
pub struct WeightPaintTool {
    pub brush: BrushState,
    state: StrokeState,
    stroke: StrokeSummary,
    last_hit: Option<PickHit>,
}

impl WeightPaintTool {
    pub fn new(brush: BrushState) -> Self {
        Self {
            brush,
            ..Default::default()
        }
    }

    /// True between `mouse_down` and `mouse_up`. The weight field must not
    /// be rebuilt while this holds.
    #[inline]
    pub fn is_painting(&self) -> bool {
        self.state == StrokeState::Painting
    }

    /// Where the most recent pick landed, for drawing the brush cursor.
    pub fn last_hit(&self) -> Option<PickHit> {
        self.last_hit
    }

    /// Starts a stroke and applies the first dab.
    pub fn mouse_down(
        &mut self,
        ray: &Ray,
        target: PaintTarget<'_>,
        field: &mut WeightField,
    ) -> Option<PickHit> {
        self.state = StrokeState::Painting;
        self.stroke = StrokeSummary::default();
        self.dab(ray, target, field)
    }

    /// Applies a dab if a stroke is in progress; ignored when idle.
    pub fn mouse_move(
        &mut self,
        ray: &Ray,
        target: PaintTarget<'_>,
        field: &mut WeightField,
    ) -> Option<PickHit> {
        if !self.is_painting() {
            return None;
        }
        self.dab(ray, target, field)
    }

    /// Ends the stroke. Returns `None` if no stroke was in progress.
    pub fn mouse_up(&mut self) -> Option<StrokeSummary> {
        if !self.is_painting() {
            return None;
        }
        self.state = StrokeState::Idle;
        tracing::debug!(
            applications = self.stroke.applications,
            misses = self.stroke.misses,
            "weight stroke finished"
        );
        Some(std::mem::take(&mut self.stroke))
    }

    /// Abandons a stroke without reporting it (e.g. the mesh went away).
    pub fn cancel(&mut self) {
        self.state = StrokeState::Idle;
        self.stroke = StrokeSummary::default();
        self.last_hit = None;
    }

    fn dab(&mut self, ray: &Ray, target: PaintTarget<'_>, field: &mut WeightField) -> Option<PickHit> {
        let hit = pick(ray, target.positions, target.indices, self.brush.radius);
        self.last_hit = hit;
        match hit {
            Some(hit) => {
                apply_brush(field, hit.point, target.positions, &self.brush, target.topology);
                self.stroke.applications += 1;
            }
            None => self.stroke.misses += 1,
        }
        hit
    }
}
