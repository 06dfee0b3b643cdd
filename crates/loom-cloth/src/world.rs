//! Several cloth components stepped as one solver batch.
//!
//! Per tick, every cloth stages and pushes its particles, the shared
//! solver steps once and is waited on, and only then does every cloth
//! read back and reconstruct. No cloth writes attachments while the batch
//! step is in flight.

use std::sync::Arc;
use std::time::Instant;

use loom_rig::SkeletonPose;
use loom_solver::solver::lock;
use loom_solver::{ClothSettings, SharedSolver};
use loom_types::{LoomError, LoomResult};

use crate::component::{ClothComponent, TickReport};

/// Result of one batch tick.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WorldTickReport {
    /// Per-cloth report, `None` for cloths that were skipped.
    pub cloths: Vec<Option<TickReport>>,
    /// Wall-clock time of the batch step (seconds).
    pub wall_time: f64,
}

impl WorldTickReport {
    /// Number of cloths that completed the tick.
    pub fn stepped(&self) -> usize {
        self.cloths.iter().filter(|r| r.is_some()).count()
    }
}

/// Cloth components sharing one solver.
pub struct ClothWorld {
    solver: SharedSolver,
    cloths: Vec<ClothComponent>,
}

impl ClothWorld {
    pub fn new(solver: SharedSolver) -> Self {
        Self {
            solver,
            cloths: Vec::new(),
        }
    }

    pub fn solver(&self) -> &SharedSolver {
        &self.solver
    }

    /// Creates an uninitialized cloth on this world's solver and returns
    /// its index.
    pub fn spawn(&mut self, settings: ClothSettings) -> LoomResult<usize> {
        let cloth = ClothComponent::new(self.solver.clone(), settings)?;
        self.cloths.push(cloth);
        Ok(self.cloths.len() - 1)
    }

    /// Adds an existing cloth. It must have been created on this world's
    /// solver.
    pub fn add(&mut self, cloth: ClothComponent) -> LoomResult<usize> {
        if !Arc::ptr_eq(cloth.solver(), &self.solver) {
            return Err(LoomError::InvalidConfig(
                "cloth was created on a different solver".into(),
            ));
        }
        self.cloths.push(cloth);
        Ok(self.cloths.len() - 1)
    }

    /// Removes and returns cloth `index`. Later indices shift down.
    pub fn remove(&mut self, index: usize) -> Option<ClothComponent> {
        (index < self.cloths.len()).then(|| self.cloths.remove(index))
    }

    pub fn get(&self, index: usize) -> Option<&ClothComponent> {
        self.cloths.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut ClothComponent> {
        self.cloths.get_mut(index)
    }

    pub fn len(&self) -> usize {
        self.cloths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cloths.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ClothComponent> {
        self.cloths.iter()
    }

    /// Attach all → one batch step → wait → write back all.
    ///
    /// Uninitialized cloths and cloths whose buffers the solver rejects are
    /// skipped. A failed batch step skips every cloth this tick.
    pub fn tick(&mut self, dt: f32, pose: &dyn SkeletonPose) -> WorldTickReport {
        let mut staged = Vec::with_capacity(self.cloths.len());
        for cloth in &mut self.cloths {
            let attach = cloth.stage(pose).and_then(|attach| match cloth.push_staged() {
                Ok(true) => Some(attach),
                Ok(false) => None,
                Err(e) => {
                    tracing::warn!(error = %e, "cloth push failed; skipped this tick");
                    None
                }
            });
            staged.push(attach);
        }

        let mut report = WorldTickReport {
            cloths: vec![None; self.cloths.len()],
            wall_time: 0.0,
        };
        if staged.iter().all(Option::is_none) {
            return report;
        }

        let start = Instant::now();
        {
            let mut solver = lock(&self.solver);
            if let Err(e) = solver.step(dt) {
                tracing::warn!(error = %e, "batch step failed; tick skipped");
                return report;
            }
            solver.wait_for_step_completion();
        }
        report.wall_time = start.elapsed().as_secs_f64();

        for ((cloth, attach), slot) in self.cloths.iter_mut().zip(staged).zip(&mut report.cloths) {
            let Some(attach) = attach else {
                continue;
            };
            match cloth.pull_results() {
                Ok(true) => *slot = Some(cloth.finish(dt, attach, report.wall_time)),
                Ok(false) => {}
                Err(e) => tracing::warn!(error = %e, "cloth pull failed; skipped this tick"),
            }
        }

        tracing::trace!(
            cloths = self.cloths.len(),
            stepped = report.stepped(),
            wall_time = report.wall_time,
            "world tick"
        );
        report
    }
}
