//! Ballistic reference solver.
//!
//! Implements the full [`ClothSolver`] interface but enforces no
//! constraints: free particles follow gravity, per-axis linear drag, wind
//! drag and wind lift; kinematic particles (`inverse_mass == 0`) stay
//! where they were written. Stiffness, inertia and tether settings are
//! recorded but have no effect.
//!
//! This exists to drive the data layer without a native solver and to
//! give tests a deterministic backend.

use std::collections::{BTreeSet, HashMap};

use loom_math::Vec3;
use loom_mesh::normals::smooth_normals;
use loom_mesh::Particle;
use loom_types::{LoomError, LoomResult};

use crate::config::{PhaseConfig, TetherConfig, WindConfig};
use crate::solver::{ClothSolver, FabricId, InstanceId};

struct Fabric {
    particle_count: usize,
    indices: Vec<u32>,
    gravity: Vec3,
}

struct Instance {
    fabric: FabricId,
    indices: Vec<u32>,
    particles: Vec<Particle>,
    velocities: Vec<Vec3>,
    gravity: Vec3,
    linear_drag: Vec3,
    wind: WindConfig,
    tether: TetherConfig,
    phases: Vec<PhaseConfig>,
    solver_frequency: f32,
}

/// Gravity-and-drag solver with no constraint phases.
#[derive(Default)]
pub struct BallisticSolver {
    fabrics: HashMap<u32, Fabric>,
    instances: HashMap<u32, Instance>,
    active: BTreeSet<u32>,
    next_id: u32,
    step_count: u64,
}

impl BallisticSolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fabric_count(&self) -> usize {
        self.fabrics.len()
    }

    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    /// Number of instances currently stepped.
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Number of completed calls to `step` with a positive `dt`.
    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    /// Triangle count of a live fabric.
    pub fn fabric_triangle_count(&self, fabric: FabricId) -> Option<usize> {
        self.fabrics.get(&fabric.0).map(|f| f.indices.len() / 3)
    }

    /// Phase stiffnesses last set on an instance.
    pub fn phase_configs(&self, instance: InstanceId) -> Option<&[PhaseConfig]> {
        self.instances.get(&instance.0).map(|i| i.phases.as_slice())
    }

    pub fn tether_config(&self, instance: InstanceId) -> Option<TetherConfig> {
        self.instances.get(&instance.0).map(|i| i.tether)
    }

    pub fn solver_frequency(&self, instance: InstanceId) -> Option<f32> {
        self.instances.get(&instance.0).map(|i| i.solver_frequency)
    }

    fn allocate_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn instance_mut(&mut self, instance: InstanceId) -> Option<&mut Instance> {
        let found = self.instances.get_mut(&instance.0);
        if found.is_none() {
            tracing::warn!(instance = instance.0, "Unknown cloth instance");
        }
        found
    }

    fn integrate(inst: &mut Instance, dt: f32) {
        let damping = (Vec3::ONE - inst.linear_drag * dt).max(Vec3::ZERO);
        let normals = if inst.wind.lift > 0.0 {
            let positions: Vec<Vec3> = inst.particles.iter().map(|p| p.position).collect();
            smooth_normals(&positions, &inst.indices)
        } else {
            Vec::new()
        };

        for (i, (p, v)) in inst.particles.iter_mut().zip(inst.velocities.iter_mut()).enumerate() {
            if p.is_kinematic() {
                *v = Vec3::ZERO;
                continue;
            }
            let relative = inst.wind.velocity - *v;
            let mut accel = inst.gravity + relative * inst.wind.drag;
            if let Some(&n) = normals.get(i) {
                accel += wind_lift(relative, n, inst.wind.lift);
            }
            *v = (*v + accel * dt) * damping;
            p.position += *v * dt;
        }
    }
}

impl ClothSolver for BallisticSolver {
    fn create_fabric(&mut self, particles: &[Particle], indices: &[u32], gravity: Vec3) -> LoomResult<FabricId> {
        if particles.is_empty() || indices.is_empty() {
            return Err(LoomError::InvalidMesh("Fabric needs particles and triangles".into()));
        }
        if indices.len() % 3 != 0 {
            return Err(LoomError::InvalidMesh(format!(
                "Fabric index count ({}) is not a multiple of 3",
                indices.len()
            )));
        }
        if let Some(&bad) = indices.iter().find(|&&i| i as usize >= particles.len()) {
            return Err(LoomError::InvalidMesh(format!(
                "Fabric index {bad} out of range for {} particles",
                particles.len()
            )));
        }

        let id = self.allocate_id();
        self.fabrics.insert(
            id,
            Fabric {
                particle_count: particles.len(),
                indices: indices.to_vec(),
                gravity,
            },
        );
        tracing::debug!(fabric = id, particles = particles.len(), "Fabric created");
        Ok(FabricId(id))
    }

    fn destroy_fabric(&mut self, fabric: FabricId) {
        if self.instances.values().any(|i| i.fabric == fabric) {
            tracing::warn!(fabric = fabric.0, "Destroying fabric with live instances");
        }
        self.fabrics.remove(&fabric.0);
    }

    fn create_instance(&mut self, fabric: FabricId, particles: &[Particle]) -> LoomResult<InstanceId> {
        let (expected, gravity, indices) = match self.fabrics.get(&fabric.0) {
            Some(f) => (f.particle_count, f.gravity, f.indices.clone()),
            None => return Err(LoomError::Solver(format!("Unknown fabric {}", fabric.0))),
        };
        if particles.len() != expected {
            return Err(LoomError::BufferMismatch {
                expected,
                actual: particles.len(),
            });
        }

        let id = self.allocate_id();
        self.instances.insert(
            id,
            Instance {
                fabric,
                indices,
                particles: particles.to_vec(),
                velocities: vec![Vec3::ZERO; particles.len()],
                gravity,
                linear_drag: Vec3::ZERO,
                wind: WindConfig::default(),
                tether: TetherConfig::default(),
                phases: Vec::new(),
                solver_frequency: 0.0,
            },
        );
        Ok(InstanceId(id))
    }

    fn destroy_instance(&mut self, instance: InstanceId) {
        self.active.remove(&instance.0);
        self.instances.remove(&instance.0);
    }

    fn add_to_solver(&mut self, instance: InstanceId) {
        if self.instances.contains_key(&instance.0) {
            self.active.insert(instance.0);
        }
    }

    fn remove_from_solver(&mut self, instance: InstanceId) {
        self.active.remove(&instance.0);
    }

    fn set_gravity(&mut self, instance: InstanceId, gravity: Vec3) {
        if let Some(inst) = self.instance_mut(instance) {
            inst.gravity = gravity;
        }
    }

    fn set_damping(&mut self, instance: InstanceId, linear_drag: Vec3, _angular_drag: Vec3) {
        if let Some(inst) = self.instance_mut(instance) {
            inst.linear_drag = linear_drag;
        }
    }

    fn set_inertia(&mut self, _instance: InstanceId, _linear: Vec3, _angular: Vec3) {}

    fn set_wind(&mut self, instance: InstanceId, wind: WindConfig) {
        if let Some(inst) = self.instance_mut(instance) {
            inst.wind = wind;
        }
    }

    fn set_tethers(&mut self, instance: InstanceId, tether: TetherConfig) {
        if let Some(inst) = self.instance_mut(instance) {
            inst.tether = tether;
        }
    }

    fn set_phase_configs(&mut self, instance: InstanceId, phases: &[PhaseConfig]) {
        if let Some(inst) = self.instance_mut(instance) {
            inst.phases = phases.to_vec();
        }
    }

    fn set_solver_frequency(&mut self, instance: InstanceId, frequency: f32) {
        if let Some(inst) = self.instance_mut(instance) {
            inst.solver_frequency = frequency;
        }
    }

    fn write_particles(&mut self, instance: InstanceId, particles: &[Particle]) -> LoomResult<()> {
        let inst = self
            .instances
            .get_mut(&instance.0)
            .ok_or_else(|| LoomError::Solver(format!("Unknown instance {}", instance.0)))?;
        if particles.len() != inst.particles.len() {
            return Err(LoomError::BufferMismatch {
                expected: inst.particles.len(),
                actual: particles.len(),
            });
        }

        // A teleported particle starts from rest.
        for ((dst, v), src) in inst.particles.iter_mut().zip(inst.velocities.iter_mut()).zip(particles) {
            if dst.position != src.position {
                *v = Vec3::ZERO;
            }
            *dst = *src;
        }
        Ok(())
    }

    fn current_particles(&self, instance: InstanceId) -> LoomResult<&[Particle]> {
        self.instances
            .get(&instance.0)
            .map(|i| i.particles.as_slice())
            .ok_or_else(|| LoomError::Solver(format!("Unknown instance {}", instance.0)))
    }

    fn step(&mut self, dt: f32) -> LoomResult<()> {
        if !dt.is_finite() {
            return Err(LoomError::Solver(format!("Non-finite time step {dt}")));
        }
        if dt <= 0.0 {
            return Ok(());
        }

        for id in &self.active {
            if let Some(inst) = self.instances.get_mut(id) {
                Self::integrate(inst, dt);
            }
        }
        self.step_count += 1;
        Ok(())
    }

    fn wait_for_step_completion(&mut self) {}

    fn name(&self) -> &str {
        "ballistic"
    }
}

/// Lift on a surface with unit normal `normal` in relative wind
/// `relative`: perpendicular to the wind, in the plane of wind and normal,
/// scaled by how squarely the wind meets the surface.
fn wind_lift(relative: Vec3, normal: Vec3, lift: f32) -> Vec3 {
    let speed = relative.length();
    if speed <= f32::EPSILON {
        return Vec3::ZERO;
    }
    let direction = relative / speed;
    let cos_angle = normal.dot(direction);
    let lift_direction = direction.cross(normal).cross(direction).normalize_or_zero();
    lift_direction * (lift * speed * cos_angle.abs() * (1.0 - cos_angle * cos_angle).sqrt())
}
