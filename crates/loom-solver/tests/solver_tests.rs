//! Integration tests for loom-solver.

use std::sync::{Arc, Mutex};

use loom_math::Vec3;
use loom_mesh::generators::quad_grid;
use loom_mesh::{build_particles, Particle, WeldConfig};
use loom_solver::config::{ClothSettings, PhaseKind};
use loom_solver::solver::{ClothSolver, FabricId, InstanceId, SharedSolver};
use loom_solver::{BallisticSolver, ClothHandle, PhaseConfig, SimulationBridge, TetherConfig, WindConfig};
use loom_types::{LoomError, LoomResult};

fn grid_particles() -> (Vec<Particle>, Vec<u32>) {
    let mesh = quad_grid(2, 2, 1.0, 1.0);
    let graph = build_particles(&mesh.positions(), &mesh.indices, &WeldConfig::default());
    (graph.particles, graph.indices)
}

fn ballistic() -> (Arc<Mutex<BallisticSolver>>, SharedSolver) {
    let concrete = Arc::new(Mutex::new(BallisticSolver::new()));
    let shared: SharedSolver = concrete.clone();
    (concrete, shared)
}

// ─── Recording Double ─────────────────────────────────────────

#[derive(Default)]
struct RecordingSolver {
    calls: Arc<Mutex<Vec<String>>>,
    particles: Vec<Particle>,
}

impl RecordingSolver {
    fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }
}

impl ClothSolver for RecordingSolver {
    fn create_fabric(&mut self, _p: &[Particle], _i: &[u32], _g: Vec3) -> LoomResult<FabricId> {
        self.record("create_fabric");
        Ok(FabricId(7))
    }
    fn destroy_fabric(&mut self, fabric: FabricId) {
        self.record(format!("destroy_fabric {}", fabric.0));
    }
    fn create_instance(&mut self, _f: FabricId, particles: &[Particle]) -> LoomResult<InstanceId> {
        self.record("create_instance");
        self.particles = particles.to_vec();
        Ok(InstanceId(3))
    }
    fn destroy_instance(&mut self, instance: InstanceId) {
        self.record(format!("destroy_instance {}", instance.0));
    }
    fn add_to_solver(&mut self, _i: InstanceId) {
        self.record("add_to_solver");
    }
    fn remove_from_solver(&mut self, _i: InstanceId) {
        self.record("remove_from_solver");
    }
    fn set_gravity(&mut self, _i: InstanceId, g: Vec3) {
        self.record(format!("set_gravity {}", g.y));
    }
    fn set_damping(&mut self, _i: InstanceId, _l: Vec3, _a: Vec3) {
        self.record("set_damping");
    }
    fn set_inertia(&mut self, _i: InstanceId, _l: Vec3, _a: Vec3) {
        self.record("set_inertia");
    }
    fn set_wind(&mut self, _i: InstanceId, _w: WindConfig) {
        self.record("set_wind");
    }
    fn set_tethers(&mut self, _i: InstanceId, _t: TetherConfig) {
        self.record("set_tethers");
    }
    fn set_phase_configs(&mut self, _i: InstanceId, phases: &[PhaseConfig]) {
        self.record(format!("set_phase_configs {}", phases.len()));
    }
    fn set_solver_frequency(&mut self, _i: InstanceId, _f: f32) {
        self.record("set_solver_frequency");
    }
    fn write_particles(&mut self, _i: InstanceId, particles: &[Particle]) -> LoomResult<()> {
        self.record("write_particles");
        self.particles = particles.to_vec();
        Ok(())
    }
    fn current_particles(&self, _i: InstanceId) -> LoomResult<&[Particle]> {
        Ok(&self.particles)
    }
    fn step(&mut self, _dt: f32) -> LoomResult<()> {
        self.record("step");
        for p in &mut self.particles {
            p.position.y += 1.0;
        }
        Ok(())
    }
    fn wait_for_step_completion(&mut self) {
        self.record("wait");
    }
    fn name(&self) -> &str {
        "recording"
    }
}

fn recording() -> (Arc<Mutex<Vec<String>>>, SharedSolver) {
    let solver = RecordingSolver::default();
    let calls = solver.calls.clone();
    (calls, loom_solver::shared(solver))
}

// ─── Settings Tests ───────────────────────────────────────────

#[test]
fn settings_defaults_validate() {
    let settings = ClothSettings::default();
    assert!(settings.validate().is_ok());
    assert!((settings.gravity.y + 9.81).abs() < 1e-6);
    assert_eq!(settings.weld_config().epsilon, loom_types::constants::DEFAULT_WELD_EPSILON);
}

#[test]
fn settings_presets_validate() {
    assert!(ClothSettings::stiff().validate().is_ok());
    assert!(ClothSettings::silk().validate().is_ok());
    assert!(ClothSettings::silk().bend_stiffness < ClothSettings::stiff().bend_stiffness);
}

#[test]
fn settings_reject_out_of_range() {
    let settings = ClothSettings {
        bend_stiffness: 1.5,
        ..Default::default()
    };
    assert!(matches!(settings.validate(), Err(LoomError::InvalidConfig(_))));

    let settings = ClothSettings {
        weld_epsilon: 0.0,
        ..Default::default()
    };
    assert!(settings.validate().is_err());

    let settings = ClothSettings {
        gravity: Vec3::new(0.0, f32::NAN, 0.0),
        ..Default::default()
    };
    assert!(settings.validate().is_err());

    let settings = ClothSettings {
        linear_drag: Vec3::new(0.1, -0.1, 0.1),
        ..Default::default()
    };
    assert!(settings.validate().is_err());
}

#[test]
fn settings_toml_partial_uses_defaults() {
    let settings = ClothSettings::from_toml_str(
        r#"
        bend_stiffness = 0.25
        solver_frequency = 120.0

        [wind]
        drag = 0.5
        "#,
    )
    .unwrap();
    assert_eq!(settings.bend_stiffness, 0.25);
    assert_eq!(settings.solver_frequency, 120.0);
    assert_eq!(settings.wind.drag, 0.5);
    assert_eq!(settings.wind.lift, 0.0);
    assert_eq!(settings.stretch_stiffness, ClothSettings::default().stretch_stiffness);
}

#[test]
fn settings_toml_round_trip() {
    let settings = ClothSettings::silk();
    let text = settings.to_toml_string().unwrap();
    let back = ClothSettings::from_toml_str(&text).unwrap();
    assert_eq!(back, settings);
}

#[test]
fn settings_toml_invalid_value_rejected() {
    let result = ClothSettings::from_toml_str("stretch_stiffness = 2.0");
    assert!(matches!(result, Err(LoomError::InvalidConfig(_))));
    let result = ClothSettings::from_toml_str("stretch_stiffness = \"high\"");
    assert!(matches!(result, Err(LoomError::Serialization(_))));
}

#[test]
fn settings_phase_configs_order() {
    let phases = ClothSettings::default().phase_configs();
    let kinds: Vec<PhaseKind> = phases.iter().map(|p| p.kind).collect();
    assert_eq!(kinds, vec![PhaseKind::Stretch, PhaseKind::Bend, PhaseKind::Shear]);
}

// ─── Ballistic Solver Tests ───────────────────────────────────

#[test]
fn ballistic_rejects_bad_fabric() {
    let (particles, _) = grid_particles();
    let mut solver = BallisticSolver::new();
    assert!(solver.create_fabric(&particles, &[], Vec3::ZERO).is_err());
    assert!(solver.create_fabric(&particles, &[0, 1], Vec3::ZERO).is_err());
    assert!(solver.create_fabric(&particles, &[0, 1, 99], Vec3::ZERO).is_err());
    assert_eq!(solver.fabric_count(), 0);
}

#[test]
fn ballistic_instance_count_must_match_fabric() {
    let (particles, indices) = grid_particles();
    let mut solver = BallisticSolver::new();
    let fabric = solver.create_fabric(&particles, &indices, Vec3::ZERO).unwrap();
    let result = solver.create_instance(fabric, &particles[..2]);
    assert!(matches!(result, Err(LoomError::BufferMismatch { .. })));
    assert!(solver.create_instance(FabricId(999), &particles).is_err());
}

#[test]
fn ballistic_free_particles_fall_kinematic_stay() {
    let (mut particles, indices) = grid_particles();
    particles[0].inverse_mass = 0.0;
    let start = particles.clone();

    let mut solver = BallisticSolver::new();
    let gravity = Vec3::new(0.0, -9.81, 0.0);
    let fabric = solver.create_fabric(&particles, &indices, gravity).unwrap();
    let instance = solver.create_instance(fabric, &particles).unwrap();
    solver.add_to_solver(instance);

    for _ in 0..10 {
        solver.step(1.0 / 60.0).unwrap();
    }

    let current = solver.current_particles(instance).unwrap();
    assert_eq!(current[0].position, start[0].position);
    for (now, before) in current.iter().zip(&start).skip(1) {
        assert!(now.position.y < before.position.y);
        assert_eq!(now.position.x, before.position.x);
    }
    assert_eq!(solver.step_count(), 10);
}

#[test]
fn ballistic_inactive_instance_does_not_move() {
    let (particles, indices) = grid_particles();
    let mut solver = BallisticSolver::new();
    let fabric = solver.create_fabric(&particles, &indices, Vec3::new(0.0, -9.81, 0.0)).unwrap();
    let instance = solver.create_instance(fabric, &particles).unwrap();

    solver.step(0.1).unwrap();
    assert_eq!(solver.current_particles(instance).unwrap(), particles.as_slice());
}

#[test]
fn ballistic_zero_dt_is_noop_nan_dt_errors() {
    let (particles, indices) = grid_particles();
    let mut solver = BallisticSolver::new();
    let fabric = solver.create_fabric(&particles, &indices, Vec3::new(0.0, -9.81, 0.0)).unwrap();
    let instance = solver.create_instance(fabric, &particles).unwrap();
    solver.add_to_solver(instance);

    solver.step(0.0).unwrap();
    assert_eq!(solver.current_particles(instance).unwrap(), particles.as_slice());
    assert_eq!(solver.step_count(), 0);
    assert!(solver.step(f32::NAN).is_err());
}

#[test]
fn ballistic_wind_drag_pushes_cloth() {
    let (particles, indices) = grid_particles();
    let mut solver = BallisticSolver::new();
    let fabric = solver.create_fabric(&particles, &indices, Vec3::ZERO).unwrap();
    let instance = solver.create_instance(fabric, &particles).unwrap();
    solver.add_to_solver(instance);
    solver.set_wind(
        instance,
        WindConfig {
            velocity: Vec3::new(5.0, 0.0, 0.0),
            drag: 0.5,
            lift: 0.0,
        },
    );

    solver.step(0.1).unwrap();
    let current = solver.current_particles(instance).unwrap();
    assert!(current.iter().zip(&particles).all(|(a, b)| a.position.x > b.position.x));
}

#[test]
fn ballistic_teleport_resets_velocity() {
    let (particles, indices) = grid_particles();
    let mut solver = BallisticSolver::new();
    let fabric = solver.create_fabric(&particles, &indices, Vec3::new(0.0, -10.0, 0.0)).unwrap();
    let instance = solver.create_instance(fabric, &particles).unwrap();
    solver.add_to_solver(instance);
    solver.step(0.1).unwrap();
    solver.step(0.1).unwrap();

    let mut moved = particles.clone();
    for p in &mut moved {
        p.position.y += 5.0;
    }
    solver.write_particles(instance, &moved).unwrap();
    solver.step(0.1).unwrap();

    // From rest: v = g*dt = -1, dy = v*dt = -0.1
    let current = solver.current_particles(instance).unwrap();
    for (now, start) in current.iter().zip(&moved) {
        assert!((now.position.y - (start.position.y - 0.1)).abs() < 1e-5);
    }
}

#[test]
fn ballistic_write_particles_length_mismatch() {
    let (particles, indices) = grid_particles();
    let mut solver = BallisticSolver::new();
    let fabric = solver.create_fabric(&particles, &indices, Vec3::ZERO).unwrap();
    let instance = solver.create_instance(fabric, &particles).unwrap();
    let result = solver.write_particles(instance, &particles[1..]);
    assert!(matches!(result, Err(LoomError::BufferMismatch { .. })));
    assert!(solver.write_particles(InstanceId(999), &particles).is_err());
}

// ─── Handle Lifetime Tests ────────────────────────────────────

#[test]
fn handle_drop_releases_in_order() {
    let (particles, indices) = grid_particles();
    let (calls, solver) = recording();

    let handle = ClothHandle::create(solver, &particles, &indices, &ClothSettings::default()).unwrap();
    assert_eq!(handle.instance(), InstanceId(3));
    assert_eq!(handle.fabric(), FabricId(7));
    calls.lock().unwrap().clear();
    drop(handle);

    let calls = calls.lock().unwrap().clone();
    assert_eq!(
        calls,
        vec![
            "wait".to_string(),
            "remove_from_solver".to_string(),
            "destroy_instance 3".to_string(),
            "destroy_fabric 7".to_string(),
        ]
    );
}

#[test]
fn handle_releases_ballistic_resources() {
    let (particles, indices) = grid_particles();
    let (concrete, solver) = ballistic();

    let handle = ClothHandle::create(solver, &particles, &indices, &ClothSettings::default()).unwrap();
    {
        let s = concrete.lock().unwrap();
        assert_eq!(s.fabric_count(), 1);
        assert_eq!(s.instance_count(), 1);
        assert_eq!(s.active_count(), 1);
    }
    drop(handle);

    let s = concrete.lock().unwrap();
    assert_eq!(s.fabric_count(), 0);
    assert_eq!(s.instance_count(), 0);
    assert_eq!(s.active_count(), 0);
}

#[test]
fn handle_invalid_fabric_leaves_no_resources() {
    let (particles, _) = grid_particles();
    let (concrete, solver) = ballistic();
    let result = ClothHandle::create(solver, &particles, &[0, 1, 99], &ClothSettings::default());
    assert!(matches!(result, Err(LoomError::InvalidMesh(_))));

    let s = concrete.lock().unwrap();
    assert_eq!(s.fabric_count(), 0);
    assert_eq!(s.instance_count(), 0);
}

// ─── Bridge Tests ─────────────────────────────────────────────

#[test]
fn bridge_without_instance_is_noop() {
    let (particles, _) = grid_particles();
    let (_, solver) = ballistic();
    let mut bridge = SimulationBridge::new(solver);
    assert!(!bridge.is_ready());

    let mut buffer = particles.clone();
    assert!(bridge.step_and_retrieve(&mut buffer, 0.1).unwrap().is_none());
    assert_eq!(buffer, particles);
    assert!(!bridge.push(&buffer).unwrap());
    assert!(!bridge.pull(&mut buffer).unwrap());
}

#[test]
fn bridge_applies_settings_on_create() {
    let (particles, indices) = grid_particles();
    let (calls, solver) = recording();
    let mut bridge = SimulationBridge::new(solver);
    bridge.create(&particles, &indices, &ClothSettings::default()).unwrap();

    let calls = calls.lock().unwrap().clone();
    let expected = [
        "create_fabric",
        "create_instance",
        "add_to_solver",
        "set_damping",
        "set_inertia",
        "set_wind",
        "set_tethers",
        "set_phase_configs 3",
        "set_solver_frequency",
    ];
    for call in expected {
        assert!(calls.iter().any(|c| c == call), "missing {call}: {calls:?}");
    }
    assert!(calls.iter().any(|c| c.starts_with("set_gravity")));
}

#[test]
fn bridge_step_pushes_steps_waits_pulls() {
    let (particles, indices) = grid_particles();
    let (calls, solver) = recording();
    let mut bridge = SimulationBridge::new(solver);
    bridge.create(&particles, &indices, &ClothSettings::default()).unwrap();
    calls.lock().unwrap().clear();

    let mut buffer = particles.clone();
    let report = bridge.step_and_retrieve(&mut buffer, 1.0 / 60.0).unwrap();
    assert!(report.is_some());

    let calls = calls.lock().unwrap().clone();
    assert_eq!(calls, vec!["write_particles", "step", "wait"]);
    for (after, before) in buffer.iter().zip(&particles) {
        assert_eq!(after.position.y, before.position.y + 1.0);
        assert_eq!(after.inverse_mass, before.inverse_mass);
    }
}

#[test]
fn bridge_recreate_releases_previous_instance() {
    let (particles, indices) = grid_particles();
    let (concrete, solver) = ballistic();
    let mut bridge = SimulationBridge::new(solver);
    bridge.create(&particles, &indices, &ClothSettings::default()).unwrap();
    bridge.create(&particles, &indices, &ClothSettings::default()).unwrap();
    assert_eq!(concrete.lock().unwrap().instance_count(), 1);

    bridge.destroy();
    assert!(!bridge.is_ready());
    assert_eq!(concrete.lock().unwrap().instance_count(), 0);
}

#[test]
fn bridge_push_pull_round_trip() {
    let (particles, indices) = grid_particles();
    let (_, solver) = ballistic();
    let mut bridge = SimulationBridge::new(solver);
    bridge.create(&particles, &indices, &ClothSettings::default()).unwrap();

    let mut pushed = particles.clone();
    pushed[1].position.z = 3.0;
    pushed[1].inverse_mass = 0.0;
    assert!(bridge.push(&pushed).unwrap());

    let mut pulled = particles.clone();
    assert!(bridge.pull(&mut pulled).unwrap());
    assert_eq!(pulled, pushed);
}

#[test]
fn bridge_tunables_reach_ballistic_solver() {
    let (particles, indices) = grid_particles();
    let (concrete, solver) = ballistic();
    let mut bridge = SimulationBridge::new(solver);
    let settings = ClothSettings {
        solver_frequency: 120.0,
        tether: TetherConfig {
            scale: 1.2,
            stiffness: 0.5,
        },
        ..Default::default()
    };
    bridge.create(&particles, &indices, &settings).unwrap();
    let instance = bridge.handle().unwrap().instance();

    let s = concrete.lock().unwrap();
    assert_eq!(s.solver_frequency(instance), Some(120.0));
    assert_eq!(s.tether_config(instance).unwrap().stiffness, 0.5);
    assert_eq!(s.phase_configs(instance).unwrap().len(), 3);
}

#[test]
fn ballistic_wind_lift_is_perpendicular_to_wind() {
    let (particles, indices) = grid_particles();
    let mut solver = BallisticSolver::new();
    let fabric = solver.create_fabric(&particles, &indices, Vec3::ZERO).unwrap();
    let instance = solver.create_instance(fabric, &particles).unwrap();
    solver.add_to_solver(instance);
    let wind = Vec3::new(5.0, 0.0, 5.0);
    solver.set_wind(
        instance,
        WindConfig {
            velocity: wind,
            drag: 0.0,
            lift: 1.0,
        },
    );

    solver.step(0.1).unwrap();
    let current = solver.current_particles(instance).unwrap();
    for (now, before) in current.iter().zip(&particles) {
        let moved = now.position - before.position;
        assert!(moved.length() > 1e-4);
        assert!(moved.dot(wind).abs() < 1e-4);
    }
}
