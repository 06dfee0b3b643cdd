//! Simulation bridge — marshals one cloth's particles through the solver.

use std::time::Instant;

use loom_mesh::Particle;
use loom_types::{LoomError, LoomResult};

use crate::config::ClothSettings;
use crate::solver::{lock, FabricId, InstanceId, SharedSolver};

/// Owns one fabric and one instance in a shared solver.
///
/// Dropping the handle waits for any in-flight step, removes the instance
/// from the solver, and only then destroys the instance and its fabric.
pub struct ClothHandle {
    solver: SharedSolver,
    fabric: FabricId,
    instance: InstanceId,
}

impl ClothHandle {
    /// Creates fabric and instance and adds the instance to the solver.
    pub fn create(
        solver: SharedSolver,
        particles: &[Particle],
        indices: &[u32],
        settings: &ClothSettings,
    ) -> LoomResult<Self> {
        let (fabric, instance) = {
            let mut s = lock(&solver);
            let fabric = s.create_fabric(particles, indices, settings.gravity)?;
            let instance = match s.create_instance(fabric, particles) {
                Ok(instance) => instance,
                Err(e) => {
                    s.destroy_fabric(fabric);
                    return Err(e);
                }
            };
            s.add_to_solver(instance);
            (fabric, instance)
        };

        Ok(Self {
            solver,
            fabric,
            instance,
        })
    }

    #[inline]
    pub fn instance(&self) -> InstanceId {
        self.instance
    }

    #[inline]
    pub fn fabric(&self) -> FabricId {
        self.fabric
    }
}

impl Drop for ClothHandle {
    fn drop(&mut self) {
        let mut s = lock(&self.solver);
        s.wait_for_step_completion();
        s.remove_from_solver(self.instance);
        s.destroy_instance(self.instance);
        s.destroy_fabric(self.fabric);
    }
}

/// Timing of one bridge step.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StepReport {
    /// Wall-clock time for push + step + wait + pull (seconds).
    pub wall_time: f64,
}

/// Marshals a cloth's particle buffer into and out of an injected solver.
///
/// Until [`create`](Self::create) succeeds every operation is a no-op.
pub struct SimulationBridge {
    solver: SharedSolver,
    handle: Option<ClothHandle>,
}

impl SimulationBridge {
    pub fn new(solver: SharedSolver) -> Self {
        Self {
            solver,
            handle: None,
        }
    }

    pub fn solver(&self) -> &SharedSolver {
        &self.solver
    }

    /// True once an instance exists in the solver.
    #[inline]
    pub fn is_ready(&self) -> bool {
        self.handle.is_some()
    }

    pub fn handle(&self) -> Option<&ClothHandle> {
        self.handle.as_ref()
    }

    /// (Re)creates the solver instance for a new particle graph and applies
    /// `settings`. Any previous instance is released first.
    pub fn create(&mut self, particles: &[Particle], indices: &[u32], settings: &ClothSettings) -> LoomResult<()> {
        self.destroy();
        let handle = ClothHandle::create(self.solver.clone(), particles, indices, settings)?;
        self.handle = Some(handle);
        self.apply_settings(settings);
        Ok(())
    }

    /// Releases the solver instance, waiting for any in-flight step.
    pub fn destroy(&mut self) {
        self.handle = None;
    }

    /// Pushes scene tunables to the solver instance.
    pub fn apply_settings(&mut self, settings: &ClothSettings) {
        let Some(handle) = &self.handle else {
            return;
        };
        let instance = handle.instance();
        let mut s = lock(&self.solver);
        s.set_gravity(instance, settings.gravity);
        s.set_damping(instance, settings.linear_drag, settings.angular_drag);
        s.set_inertia(instance, settings.linear_inertia, settings.angular_inertia);
        s.set_wind(instance, settings.wind);
        s.set_tethers(instance, settings.tether);
        s.set_phase_configs(instance, &settings.phase_configs());
        s.set_solver_frequency(instance, settings.solver_frequency);
    }

    /// Writes `particles` into the solver instance. Returns false when no
    /// instance exists.
    pub fn push(&mut self, particles: &[Particle]) -> LoomResult<bool> {
        let Some(handle) = &self.handle else {
            return Ok(false);
        };
        lock(&self.solver).write_particles(handle.instance(), particles)?;
        Ok(true)
    }

    /// Copies the solver's current particles into `particles`, preserving
    /// particle order. Returns false when no instance exists.
    ///
    /// A length mismatch asserts in debug builds; in release only the
    /// common prefix is copied.
    pub fn pull(&self, particles: &mut [Particle]) -> LoomResult<bool> {
        let Some(handle) = &self.handle else {
            return Ok(false);
        };
        let s = lock(&self.solver);
        let current = s.current_particles(handle.instance())?;
        copy_prefix(current, particles);
        Ok(true)
    }

    /// Push, step the solver by `dt`, wait for completion, pull.
    ///
    /// Stepping advances every instance sharing this solver. Returns
    /// `Ok(None)` without touching `particles` when no instance exists.
    pub fn step_and_retrieve(&mut self, particles: &mut [Particle], dt: f32) -> LoomResult<Option<StepReport>> {
        let Some(handle) = &self.handle else {
            return Ok(None);
        };
        let instance = handle.instance();
        let start = Instant::now();

        let mut s = lock(&self.solver);
        s.write_particles(instance, particles)?;
        s.step(dt)?;
        s.wait_for_step_completion();
        let current = s.current_particles(instance)?;
        copy_prefix(current, particles);

        Ok(Some(StepReport {
            wall_time: start.elapsed().as_secs_f64(),
        }))
    }
}

fn copy_prefix(src: &[Particle], dst: &mut [Particle]) {
    debug_assert_eq!(
        src.len(),
        dst.len(),
        "{}",
        LoomError::BufferMismatch {
            expected: dst.len(),
            actual: src.len(),
        }
    );
    let n = src.len().min(dst.len());
    dst[..n].copy_from_slice(&src[..n]);
}
