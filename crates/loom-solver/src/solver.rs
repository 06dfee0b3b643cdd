//! Cloth solver interface — the seam to the external constraint solver.
//!
//! The data layer never integrates or enforces constraints itself. It
//! creates a fabric (constraint topology) and an instance per cloth,
//! pushes particle buffers and tunables in, steps, and reads particles
//! back. A solver may batch many instances and step them together.
//!
//! ```text
//! let fabric = solver.create_fabric(&particles, &indices, gravity)?;
//! let instance = solver.create_instance(fabric, &particles)?;
//! solver.add_to_solver(instance);
//! loop {
//!     solver.write_particles(instance, &particles)?;
//!     solver.step(dt)?;
//!     solver.wait_for_step_completion();
//!     particles.copy_from_slice(solver.current_particles(instance)?);
//! }
//! ```

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use loom_math::Vec3;
use loom_mesh::Particle;
use loom_types::LoomResult;

use crate::config::{PhaseConfig, TetherConfig, WindConfig};

/// Solver-side fabric handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FabricId(pub u32);

/// Solver-side cloth instance handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InstanceId(pub u32);

/// Trait for cloth solver backends.
pub trait ClothSolver: Send {
    /// Builds constraint topology from rest particles and a particle
    /// triangle list.
    fn create_fabric(
        &mut self,
        particles: &[Particle],
        indices: &[u32],
        gravity: Vec3,
    ) -> LoomResult<FabricId>;

    fn destroy_fabric(&mut self, fabric: FabricId);

    /// Creates a simulated instance of `fabric` starting at `particles`.
    fn create_instance(&mut self, fabric: FabricId, particles: &[Particle]) -> LoomResult<InstanceId>;

    fn destroy_instance(&mut self, instance: InstanceId);

    /// Includes `instance` in subsequent steps.
    fn add_to_solver(&mut self, instance: InstanceId);

    /// Excludes `instance` from subsequent steps.
    fn remove_from_solver(&mut self, instance: InstanceId);

    fn set_gravity(&mut self, instance: InstanceId, gravity: Vec3);

    fn set_damping(&mut self, instance: InstanceId, linear_drag: Vec3, angular_drag: Vec3);

    fn set_inertia(&mut self, instance: InstanceId, linear: Vec3, angular: Vec3);

    fn set_wind(&mut self, instance: InstanceId, wind: WindConfig);

    fn set_tethers(&mut self, instance: InstanceId, tether: TetherConfig);

    fn set_phase_configs(&mut self, instance: InstanceId, phases: &[PhaseConfig]);

    fn set_solver_frequency(&mut self, instance: InstanceId, frequency: f32);

    /// Overwrites the instance's particles (positions and inverse masses).
    fn write_particles(&mut self, instance: InstanceId, particles: &[Particle]) -> LoomResult<()>;

    /// The instance's particles after the last completed step.
    fn current_particles(&self, instance: InstanceId) -> LoomResult<&[Particle]>;

    /// Advances every instance in the solver by `dt`. May run asynchronously.
    fn step(&mut self, dt: f32) -> LoomResult<()>;

    /// Blocks until the step started by [`step`](Self::step) has finished.
    fn wait_for_step_completion(&mut self);

    /// Returns the solver's name.
    fn name(&self) -> &str;
}

/// A solver shared by every cloth instance in one batch.
pub type SharedSolver = Arc<Mutex<dyn ClothSolver>>;

/// Wraps a solver for sharing.
pub fn shared(solver: impl ClothSolver + 'static) -> SharedSolver {
    Arc::new(Mutex::new(solver))
}

/// Locks a shared solver. A panic in another holder does not leave the
/// solver unusable for teardown, so poisoning is ignored.
pub fn lock(solver: &SharedSolver) -> MutexGuard<'_, dyn ClothSolver + 'static> {
    solver.lock().unwrap_or_else(PoisonError::into_inner)
}
