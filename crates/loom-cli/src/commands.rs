//! CLI command implementations.

use std::path::Path;

use loom_cloth::ClothComponent;
use loom_math::{Mat4, Vec3};
use loom_mesh::generators::quad_grid;
use loom_mesh::{build_particles, ParticleTopology, SkinnedMesh, WeldConfig};
use loom_rig::{AttachmentSpec, Pose};
use loom_solver::{shared, BallisticSolver, ClothSettings};
use loom_telemetry::{EventBus, TracingSink};
use loom_types::constants::DEFAULT_DT;
use loom_types::ParticleId;
use loom_weights::{WeightAsset, WeightField};

type CliResult = Result<(), Box<dyn std::error::Error>>;

fn load_mesh(path: &str) -> Result<SkinnedMesh, Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(path)?;
    let mesh: SkinnedMesh = serde_json::from_str(&content)?;
    Ok(mesh)
}

/// Weld a mesh and print particle statistics.
pub fn weld(path: &str, epsilon: f32) -> CliResult {
    println!("loom Weld");
    println!("─────────");
    println!();

    let config = WeldConfig::new(epsilon)?;
    let mesh = load_mesh(path)?;
    let graph = build_particles(&mesh.positions(), &mesh.indices, &config);
    let topology = ParticleTopology::build(&graph);

    println!("Mesh:              {}", if mesh.name.is_empty() { path } else { mesh.name.as_str() });
    println!("Epsilon:           {epsilon}");
    println!("Vertices:          {}", graph.vertex_count());
    println!("Particles:         {}", graph.particle_count());
    println!("Merged vertices:   {}", graph.merged_vertex_count());
    println!("Triangles:         {}", graph.triangle_count());
    println!("Skipped triangles: {}", graph.skipped_triangles);
    println!("Edges:             {}", topology.edges.len());
    println!("Boundary edges:    {}", topology.boundary_edge_count());
    println!("Non-manifold:      {}", topology.non_manifold_edge_count());

    Ok(())
}

/// Hang a procedural sheet from its top edge and simulate it on the
/// ballistic solver.
pub fn simulate(settings_path: Option<&str>, frames: u32, grid: usize, output: Option<&str>) -> CliResult {
    println!("loom Simulation");
    println!("═══════════════");
    println!();

    let settings = match settings_path {
        Some(path) => ClothSettings::load(path)?,
        None => ClothSettings::default(),
    };
    let dt = DEFAULT_DT;

    let mesh = quad_grid(grid, grid, 1.0, 1.0);
    let solver = shared(BallisticSolver::new());
    let mut cloth = ClothComponent::new(solver, settings)?.with_events(EventBus::with_sink(TracingSink::new()));
    cloth.rebuild_from_mesh(&mesh)?;

    // Pin the top edge to a root bone at the origin.
    let mut pose = Pose::new();
    pose.add_bone("Root", Mat4::IDENTITY);
    let top = cloth
        .particles()
        .iter()
        .map(|p| p.position.y)
        .fold(f32::NEG_INFINITY, f32::max);
    let pinned: Vec<AttachmentSpec> = cloth
        .particles()
        .iter()
        .enumerate()
        .filter(|(_, p)| (p.position.y - top).abs() < 1e-5)
        .map(|(i, p)| AttachmentSpec::new("Root", p.position, ParticleId(i as u32)))
        .collect();
    let pinned_count = pinned.len();
    cloth.set_attachments(pinned);

    let start: Vec<Vec3> = cloth.particles().iter().map(|p| p.position).collect();

    println!("Particles: {}", cloth.particle_count());
    println!("Pinned:    {pinned_count}");
    println!("Frames:    {frames}");
    println!();

    let mut solver_time = 0.0;
    let mut stepped = 0u32;
    for _ in 0..frames {
        if let Some(report) = cloth.tick(dt, &pose) {
            solver_time += report.wall_time;
            stepped += 1;
        }
    }

    let max_displacement = cloth
        .particles()
        .iter()
        .zip(&start)
        .map(|(p, s)| p.position.distance(*s))
        .fold(0.0f32, f32::max);
    let min_y = cloth
        .particles()
        .iter()
        .map(|p| p.position.y)
        .fold(f32::INFINITY, f32::min);

    println!("Stepped:       {stepped}/{frames}");
    println!("Sim time:      {:.3}s", stepped as f32 * dt);
    println!("Avg step:      {:.3}ms", solver_time * 1000.0 / f64::from(stepped.max(1)));
    println!("Max displace:  {max_displacement:.4}m");
    println!("Lowest point:  {min_y:.4}m");

    if let Some(path) = output {
        let result = SkinnedMesh {
            name: format!("{}_simulated", mesh.name),
            vertices: cloth.vertices().to_vec(),
            indices: mesh.indices.clone(),
        };
        std::fs::write(path, serde_json::to_string_pretty(&result)?)?;
        println!();
        println!("Mesh written to: {path}");
    }

    Ok(())
}

/// Print a weight asset summary.
pub fn weights_inspect(path: &str) -> CliResult {
    println!("loom Weight Asset");
    println!("─────────────────");
    println!();

    let asset = WeightAsset::load(path)?;
    println!("Name:          {}", asset.name);
    println!("Skeletal mesh: {}", asset.skeletal_mesh_path);
    println!("Particles:     {}", asset.vertex_count);
    println!("Painted:       {}", asset.vertex_weights.len());

    let out_of_range = asset
        .vertex_weights
        .iter()
        .filter(|e| e.index as usize >= asset.vertex_count)
        .count();
    if out_of_range > 0 {
        println!("Out of range:  {out_of_range}");
    }

    if !asset.vertex_weights.is_empty() {
        let weights = asset.vertex_weights.iter().map(|e| e.weight);
        let min = weights.clone().fold(f32::INFINITY, f32::min);
        let max = weights.clone().fold(f32::NEG_INFINITY, f32::max);
        let mean = weights.sum::<f32>() / asset.vertex_weights.len() as f32;
        let fixed = asset.vertex_weights.iter().filter(|e| e.weight == 0.0).count();
        println!("Weight range:  [{min:.4}, {max:.4}]");
        println!("Mean painted:  {mean:.4}");
        println!("Fully fixed:   {fixed}");
    }

    Ok(())
}

/// Write an asset assigning `value` to every one of `count` particles.
pub fn weights_fill(path: &str, count: usize, value: f32, skeletal_mesh_path: &str) -> CliResult {
    if !(0.0..=1.0).contains(&value) {
        return Err(format!("weight must be in [0, 1], got {value}").into());
    }

    let mut field = WeightField::new(count);
    field.clear(value);

    let name = Path::new(path)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("weights");
    let asset = WeightAsset::from_field(name, skeletal_mesh_path, &field);
    asset.save(path)?;

    println!("Wrote {} entries to {path}", asset.vertex_weights.len());
    Ok(())
}

/// Validate settings or a mesh.
pub fn validate(path: &str) -> CliResult {
    println!("loom Validator");
    println!("──────────────");
    println!();

    if path.ends_with(".toml") {
        println!("Validating settings: {path}");
        match ClothSettings::load(path) {
            Ok(_) => println!("✅ Settings are valid."),
            Err(e) => println!("❌ Settings validation failed: {e}"),
        }
    } else if path.ends_with(".json") {
        println!("Validating mesh: {path}");
        let mesh = load_mesh(path)?;
        match mesh.validate() {
            Ok(()) => println!(
                "✅ Mesh is valid ({} verts, {} tris).",
                mesh.vertex_count(),
                mesh.triangle_count()
            ),
            Err(e) => println!("❌ Mesh validation failed: {e}"),
        }
    } else {
        println!("Unsupported file format. Use .toml (settings) or .json (mesh).");
    }

    Ok(())
}
