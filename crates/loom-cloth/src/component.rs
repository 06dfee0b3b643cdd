//! Cloth component — one simulated garment.
//!
//! Owns the particle graph built from a skinned mesh, the weight field and
//! attachment specs that decide which particles are pinned, and a
//! [`SimulationBridge`] into an injected solver. Each tick runs strictly
//! in order:
//!
//! ```text
//! weights ─► ParticleState ─► bind_states(pose) ─► resolve_particles
//!        ─► step_and_retrieve (blocks on the solver) ─► write_back ─► RenderSink
//! ```
//!
//! Nothing in the per-tick path returns an error. Failures are logged,
//! emitted as telemetry, and skip that frame's effect.

use std::path::Path;

use loom_math::{Ray, Vec3};
use loom_mesh::{
    build_particles, Particle, ParticleGraph, ParticleTopology, Reconstructor, RenderVertex, SkinnedMesh,
};
use loom_rig::{bind_states, resolve_particles, AttachReport, AttachmentSpec, ParticleState, SkeletonPose};
use loom_solver::{ClothSettings, SharedSolver, SimulationBridge};
use loom_telemetry::{ClothEvent, EventBus, EventKind};
use loom_types::{LoomError, LoomResult, ParticleId};
use loom_weights::{BrushState, PaintTarget, PickHit, StrokeSummary, WeightAsset, WeightField, WeightPaintTool};

use crate::render::RenderSink;

/// Result of one simulated tick.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TickReport {
    /// Particles pinned to bones this tick.
    pub attached: usize,
    /// Bones named by attachments but absent from the pose.
    pub missing_bones: Vec<String>,
    /// Wall-clock time spent in the solver (seconds).
    pub wall_time: f64,
}

/// Everything derived from one source mesh.
struct ClothBuild {
    mesh: SkinnedMesh,
    graph: ParticleGraph,
    topology: ParticleTopology,
    particles: Vec<Particle>,
    states: Vec<ParticleState>,
    /// Particle positions after the last tick; what the brush paints on.
    positions: Vec<Vec3>,
    vertices: Vec<RenderVertex>,
}

impl ClothBuild {
    fn refresh_positions(&mut self) {
        self.positions.clear();
        self.positions.extend(self.particles.iter().map(|p| p.position));
    }
}

/// A cloth instance bound to a shared solver.
///
/// Starts uninitialized; [`rebuild_from_mesh`](Self::rebuild_from_mesh)
/// creates the particle graph and solver instance. Until that succeeds,
/// ticks and brush strokes are no-ops.
pub struct ClothComponent {
    settings: ClothSettings,
    bridge: SimulationBridge,
    build: Option<ClothBuild>,
    weights: WeightField,
    attachments: Vec<AttachmentSpec>,
    paint: WeightPaintTool,
    reconstructor: Reconstructor,
    render: Option<Box<dyn RenderSink>>,
    events: Option<EventBus>,
    frame: u64,
}

impl ClothComponent {
    /// Creates an uninitialized component on `solver`.
    pub fn new(solver: SharedSolver, settings: ClothSettings) -> LoomResult<Self> {
        settings.validate()?;
        Ok(Self {
            reconstructor: Reconstructor::new(settings.recompute_normals),
            settings,
            bridge: SimulationBridge::new(solver),
            build: None,
            weights: WeightField::default(),
            attachments: Vec::new(),
            paint: WeightPaintTool::default(),
            render: None,
            events: None,
            frame: 0,
        })
    }

    /// Routes telemetry into `bus`.
    pub fn with_events(mut self, bus: EventBus) -> Self {
        self.events = Some(bus);
        self
    }

    /// Sends reconstructed vertices to `sink` after every rebuild and tick.
    pub fn set_render_sink(&mut self, sink: impl RenderSink + 'static) {
        self.render = Some(Box::new(sink));
    }

    pub fn solver(&self) -> &SharedSolver {
        self.bridge.solver()
    }

    pub fn settings(&self) -> &ClothSettings {
        &self.settings
    }

    /// Replaces the tunables and pushes them to the solver instance.
    ///
    /// `weld_epsilon` only takes effect on the next rebuild.
    pub fn set_settings(&mut self, settings: ClothSettings) -> LoomResult<()> {
        settings.validate()?;
        self.reconstructor.recompute_normals = settings.recompute_normals;
        self.bridge.apply_settings(&settings);
        self.settings = settings;
        Ok(())
    }

    /// True once a rebuild has succeeded and the solver instance exists.
    pub fn is_initialized(&self) -> bool {
        self.build.is_some() && self.bridge.is_ready()
    }

    /// Number of completed ticks.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn particle_count(&self) -> usize {
        self.build.as_ref().map_or(0, |b| b.graph.particle_count())
    }

    pub fn graph(&self) -> Option<&ParticleGraph> {
        self.build.as_ref().map(|b| &b.graph)
    }

    pub fn topology(&self) -> Option<&ParticleTopology> {
        self.build.as_ref().map(|b| &b.topology)
    }

    /// Solver particles as of the last tick (empty when uninitialized).
    pub fn particles(&self) -> &[Particle] {
        self.build.as_ref().map(|b| b.particles.as_slice()).unwrap_or_default()
    }

    /// Per-particle state used for the last tick.
    pub fn states(&self) -> &[ParticleState] {
        self.build.as_ref().map(|b| b.states.as_slice()).unwrap_or_default()
    }

    /// The reconstructed render vertices (empty when uninitialized).
    pub fn vertices(&self) -> &[RenderVertex] {
        self.build.as_ref().map(|b| b.vertices.as_slice()).unwrap_or_default()
    }

    // ─── Setup ───────────────────────────────────────────────

    /// Builds the particle graph for `mesh` and (re)creates the solver
    /// instance.
    ///
    /// Refused while a weight stroke is in progress; the current build is
    /// left untouched in that case. Any other failure leaves the component
    /// uninitialized. The weight field survives when the new particle
    /// count matches the old one; otherwise it is resized and entries past
    /// the new end are dropped.
    pub fn rebuild_from_mesh(&mut self, mesh: &SkinnedMesh) -> LoomResult<()> {
        if self.paint.is_painting() {
            return Err(self.setup_failed(LoomError::SetupFailure(
                "cannot rebuild while a weight stroke is in progress".into(),
            )));
        }

        let build = match self.create_build(mesh) {
            Ok(build) => build,
            Err(e) => {
                self.build = None;
                self.bridge.destroy();
                return Err(self.setup_failed(e));
            }
        };

        let particle_count = build.graph.particle_count();
        if self.weights.len() != particle_count {
            if self.weights.painted_count() > 0 {
                tracing::warn!(
                    old = self.weights.len(),
                    new = particle_count,
                    "particle count changed; dropping out-of-range weights"
                );
            }
            self.weights.resize(particle_count);
        }

        tracing::debug!(
            mesh = %mesh.name,
            particles = particle_count,
            vertices = build.graph.vertex_count(),
            triangles = build.graph.triangle_count(),
            merged = build.graph.merged_vertex_count(),
            skipped_triangles = build.graph.skipped_triangles,
            "cloth rebuilt"
        );
        self.emit(EventKind::ClothRebuilt {
            particles: particle_count as u32,
            vertices: build.graph.vertex_count() as u32,
            triangles: build.graph.triangle_count() as u32,
        });

        if let Some(sink) = self.render.as_mut() {
            sink.update_vertex_buffer(&build.vertices);
        }
        self.build = Some(build);
        self.flush_events();
        Ok(())
    }

    fn create_build(&mut self, mesh: &SkinnedMesh) -> LoomResult<ClothBuild> {
        // Welding skips out-of-range triangles but not a ragged index list.
        if mesh.indices.len() % 3 != 0 {
            return Err(LoomError::SetupFailure(format!(
                "index count {} is not a multiple of 3",
                mesh.indices.len()
            )));
        }

        let weld = self.settings.weld_config();
        weld.validate()?;

        let graph = build_particles(&mesh.positions(), &mesh.indices, &weld);
        if graph.triangle_count() == 0 {
            return Err(LoomError::SetupFailure(
                "mesh produced no particle triangles".into(),
            ));
        }
        if graph.skipped_triangles > 0 {
            tracing::warn!(
                mesh = %mesh.name,
                skipped = graph.skipped_triangles,
                "triangles with out-of-range indices skipped"
            );
        }
        let topology = ParticleTopology::build(&graph);

        // Weights and attachments are resolved on the first tick.
        let particles: Vec<Particle> = graph
            .particles
            .iter()
            .map(|p| Particle::new(p.position, self.settings.base_inverse_mass))
            .collect();

        self.bridge
            .create(&particles, &graph.indices, &self.settings)
            .map_err(|e| LoomError::SetupFailure(format!("solver rejected cloth: {e}")))?;

        Ok(ClothBuild {
            mesh: mesh.clone(),
            topology,
            states: vec![ParticleState::Free; particles.len()],
            positions: graph.positions(),
            vertices: mesh.vertices.clone(),
            particles,
            graph,
        })
    }

    fn setup_failed(&mut self, error: LoomError) -> LoomError {
        tracing::warn!(error = %error, "cloth setup failed");
        self.emit(EventKind::SetupFailed {
            reason: error.to_string(),
        });
        self.flush_events();
        error
    }

    /// Releases the solver instance and drops the particle graph. Weights
    /// and attachments are kept.
    pub fn teardown(&mut self) {
        self.paint.cancel();
        self.build = None;
        self.bridge.destroy();
    }

    // ─── Attachments ─────────────────────────────────────────

    pub fn attachments(&self) -> &[AttachmentSpec] {
        &self.attachments
    }

    pub fn set_attachments(&mut self, specs: Vec<AttachmentSpec>) {
        self.attachments = specs;
    }

    pub fn add_attachment(&mut self, spec: AttachmentSpec) {
        self.attachments.push(spec);
    }

    /// Binds the particle closest to `world_position` to `bone_name`.
    ///
    /// The local offset is taken from the bone's current transform so the
    /// particle stays where it is at bind time. Returns the bound particle,
    /// or `None` if uninitialized or the bone is missing.
    pub fn attach_nearest(
        &mut self,
        bone_name: &str,
        world_position: Vec3,
        pose: &dyn SkeletonPose,
    ) -> Option<ParticleId> {
        let build = self.build.as_ref()?;
        let bone = pose.find_bone_index(bone_name)?;
        let world = pose.bone_world_transform(bone)?;

        let (index, position) = build
            .positions
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| {
                a.distance_squared(world_position)
                    .total_cmp(&b.distance_squared(world_position))
            })
            .map(|(i, &p)| (i, p))?;

        let local_offset = world.inverse().transform_point3(position);
        let particle = ParticleId(index as u32);
        self.attachments
            .push(AttachmentSpec::new(bone_name, local_offset, particle));
        Some(particle)
    }

    // ─── Simulation ──────────────────────────────────────────

    /// Runs one attach → step → reconstruct cycle.
    ///
    /// Returns `None` without side effects when uninitialized, and `None`
    /// after logging when the solver step fails.
    pub fn tick(&mut self, dt: f32, pose: &dyn SkeletonPose) -> Option<TickReport> {
        let attach = self.stage(pose)?;
        let build = self.build.as_mut()?;

        let step = match self.bridge.step_and_retrieve(&mut build.particles, dt) {
            Ok(Some(step)) => step,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(error = %e, "cloth step failed; frame skipped");
                return None;
            }
        };

        Some(self.finish(dt, attach, step.wall_time))
    }

    /// Resolves weights and attachments into the particle buffer.
    pub(crate) fn stage(&mut self, pose: &dyn SkeletonPose) -> Option<AttachReport> {
        let build = self.build.as_mut()?;

        for (i, state) in build.states.iter_mut().enumerate() {
            *state = ParticleState::from_weight(self.weights.get(ParticleId(i as u32)));
        }
        let report = bind_states(&mut build.states, &self.attachments, pose);
        resolve_particles(&build.states, &mut build.particles, self.settings.base_inverse_mass);

        for bone in &report.missing_bones {
            tracing::warn!(bone = %bone, "attachment bone not found in pose");
            self.emit(EventKind::AttachmentMissed { bone: bone.clone() });
        }
        if report.invalid_particles > 0 {
            tracing::warn!(
                count = report.invalid_particles,
                "attachments reference particles outside the cloth"
            );
        }
        Some(report)
    }

    /// Pushes the staged particle buffer to the solver without stepping.
    pub(crate) fn push_staged(&mut self) -> LoomResult<bool> {
        match self.build.as_ref() {
            Some(build) => self.bridge.push(&build.particles),
            None => Ok(false),
        }
    }

    /// Reads solver results back after a batch step.
    pub(crate) fn pull_results(&mut self) -> LoomResult<bool> {
        match self.build.as_mut() {
            Some(build) => self.bridge.pull(&mut build.particles),
            None => Ok(false),
        }
    }

    /// Rebuilds render vertices from the stepped particles.
    pub(crate) fn finish(&mut self, dt: f32, attach: AttachReport, wall_time: f64) -> TickReport {
        if let Some(build) = self.build.as_mut() {
            build.refresh_positions();
            self.reconstructor.write_back_into(
                &build.positions,
                &build.graph,
                &build.mesh.vertices,
                &mut build.vertices,
            );
            if let Some(sink) = self.render.as_mut() {
                sink.update_vertex_buffer(&build.vertices);
            }
        }

        self.frame += 1;
        self.emit(EventKind::TickCompleted {
            dt,
            attached: attach.attached as u32,
            wall_time,
        });
        self.flush_events();

        TickReport {
            attached: attach.attached,
            missing_bones: attach.missing_bones,
            wall_time,
        }
    }

    // ─── Weights ─────────────────────────────────────────────

    pub fn weights(&self) -> &WeightField {
        &self.weights
    }

    /// Sets the weight of `particle`, clamped to `[0, 1]`. Returns false
    /// for an out-of-range particle.
    pub fn set_vertex_weight(&mut self, particle: ParticleId, weight: f32) -> bool {
        self.weights.set(particle, weight)
    }

    /// Weight of `particle`; unpainted particles are free (1.0).
    pub fn get_vertex_weight(&self, particle: ParticleId) -> f32 {
        self.weights.get(particle)
    }

    /// Resets every particle to `default`, clamped to `[0, 1]`.
    pub fn clear_weights(&mut self, default: f32) {
        self.weights.clear(default);
    }

    pub fn brush(&self) -> &BrushState {
        &self.paint.brush
    }

    pub fn brush_mut(&mut self) -> &mut BrushState {
        &mut self.paint.brush
    }

    /// Applies the current brush at `center` over the current particle
    /// positions. Returns the number of particles inside the brush.
    pub fn apply_brush(&mut self, center: Vec3) -> usize {
        let Some(build) = self.build.as_ref() else {
            return 0;
        };
        loom_weights::apply_brush(
            &mut self.weights,
            center,
            &build.positions,
            &self.paint.brush,
            Some(&build.topology),
        )
    }

    /// True while a stroke is in progress.
    pub fn is_painting(&self) -> bool {
        self.paint.is_painting()
    }

    /// Where the brush last landed.
    pub fn brush_hit(&self) -> Option<PickHit> {
        self.paint.last_hit()
    }

    /// Starts a stroke and paints the first dab where `ray` lands.
    /// Ignored when uninitialized.
    pub fn begin_stroke(&mut self, ray: &Ray) -> Option<PickHit> {
        let build = self.build.as_ref()?;
        let target = PaintTarget {
            positions: &build.positions,
            indices: &build.graph.indices,
            topology: Some(&build.topology),
        };
        let hit = self.paint.mouse_down(ray, target, &mut self.weights);
        self.emit(EventKind::StrokeBegin);
        self.flush_events();
        hit
    }

    /// Continues the stroke. Ignored when no stroke is in progress.
    pub fn drag(&mut self, ray: &Ray) -> Option<PickHit> {
        let build = self.build.as_ref()?;
        let target = PaintTarget {
            positions: &build.positions,
            indices: &build.graph.indices,
            topology: Some(&build.topology),
        };
        self.paint.mouse_move(ray, target, &mut self.weights)
    }

    /// Ends the stroke. Returns `None` if none was in progress.
    pub fn end_stroke(&mut self) -> Option<StrokeSummary> {
        let summary = self.paint.mouse_up()?;
        self.emit(EventKind::StrokeEnd {
            applications: summary.applications,
        });
        self.flush_events();
        Some(summary)
    }

    /// Abandons the stroke without reporting it.
    pub fn cancel_stroke(&mut self) {
        self.paint.cancel();
    }

    // ─── Weight Assets ───────────────────────────────────────

    /// Snapshot of the painted weights as a sparse asset.
    pub fn weight_asset(&self, skeletal_mesh_path: &str) -> WeightAsset {
        let name = self
            .build
            .as_ref()
            .map_or("cloth", |b| b.mesh.name.as_str());
        WeightAsset::from_field(name, skeletal_mesh_path, &self.weights)
    }

    /// Saves the weights to `path`. Returns false (after logging) on failure.
    pub fn save_weights(&self, path: impl AsRef<Path>, skeletal_mesh_path: &str) -> bool {
        self.weight_asset(skeletal_mesh_path).try_save(path)
    }

    /// Replaces the weights with the asset at `path`.
    ///
    /// Refused while a stroke is in progress. Before the first rebuild the
    /// field is sized from the asset so the weights survive a rebuild onto
    /// a mesh with that many particles. Returns false (after logging) on
    /// failure; the weights are untouched in that case.
    pub fn load_weights(&mut self, path: impl AsRef<Path>) -> bool {
        if self.paint.is_painting() {
            self.setup_failed(LoomError::SetupFailure(
                "cannot load weights while a weight stroke is in progress".into(),
            ));
            return false;
        }

        let path = path.as_ref();
        let asset = match WeightAsset::load(path) {
            Ok(asset) => asset,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to load weight asset");
                return false;
            }
        };

        if self.build.is_none() {
            self.weights = WeightField::new(asset.vertex_count);
        }
        let report = asset.apply_to_field(&mut self.weights);
        tracing::debug!(
            path = %path.display(),
            applied = report.applied,
            skipped = report.skipped,
            "weights loaded"
        );
        self.emit(EventKind::WeightsLoaded {
            entries: report.applied as u32,
            skipped: report.skipped as u32,
        });
        self.flush_events();
        true
    }

    // ─── Telemetry ───────────────────────────────────────────

    fn emit(&self, kind: EventKind) {
        if let Some(bus) = &self.events {
            bus.emit(ClothEvent::new(self.frame, kind));
        }
    }

    fn flush_events(&mut self) {
        if let Some(bus) = self.events.as_mut() {
            bus.flush();
        }
    }
}
