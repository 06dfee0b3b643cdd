//! Procedural mesh generators for tests and the CLI.
//!
//! These generators produce deterministic meshes with correct winding
//! order and UV coordinates.

use loom_math::{Vec2, Vec3};

use crate::mesh::{RenderVertex, SkinnedMesh};

/// Generates a flat rectangular quad grid in the XY plane.
///
/// The grid spans `[-width/2, width/2]` in X and `[-height/2, height/2]` in Y,
/// centered at the origin at Z=0. Vertices are shared between quads, so
/// welding it yields one particle per vertex.
///
/// # Example
/// ```
/// use loom_mesh::generators::quad_grid;
/// let mesh = quad_grid(2, 2, 1.0, 1.0);
/// assert_eq!(mesh.vertex_count(), 9);  // 3×3 vertices
/// assert_eq!(mesh.triangle_count(), 8); // 2×2 quads × 2 tris each
/// ```
pub fn quad_grid(cols: usize, rows: usize, width: f32, height: f32) -> SkinnedMesh {
    let cols = cols.max(1);
    let rows = rows.max(1);
    let verts_x = cols + 1;
    let verts_y = rows + 1;

    let half_w = width / 2.0;
    let half_h = height / 2.0;

    let mut vertices = Vec::with_capacity(verts_x * verts_y);
    for j in 0..verts_y {
        for i in 0..verts_x {
            let u = i as f32 / cols as f32;
            let v = j as f32 / rows as f32;
            let position = Vec3::new(-half_w + u * width, half_h - v * height, 0.0); // Top to bottom
            vertices.push(RenderVertex::at(position).with_uv(Vec2::new(u, v)));
        }
    }

    let mut indices = Vec::with_capacity(cols * rows * 6);
    for j in 0..rows {
        for i in 0..cols {
            let top_left = (j * verts_x + i) as u32;
            let top_right = top_left + 1;
            let bot_left = top_left + verts_x as u32;
            let bot_right = bot_left + 1;

            indices.extend_from_slice(&[top_left, bot_left, top_right]);
            indices.extend_from_slice(&[top_right, bot_left, bot_right]);
        }
    }

    SkinnedMesh {
        name: format!("quad_grid_{cols}x{rows}"),
        vertices,
        indices,
    }
}

/// Generates a single unit-scaled quad split along its diagonal, with each
/// triangle owning its own UV island.
///
/// The two corners on the diagonal are duplicated (6 vertices for 4
/// physical corners), the way an exporter splits vertices along a UV seam.
pub fn seamed_quad(size: f32) -> SkinnedMesh {
    let a = Vec3::new(0.0, 0.0, 0.0);
    let b = Vec3::new(size, 0.0, 0.0);
    let c = Vec3::new(size, size, 0.0);
    let d = Vec3::new(0.0, size, 0.0);

    let vertices = vec![
        // Island 1: A B C
        RenderVertex::at(a).with_uv(Vec2::new(0.0, 0.0)),
        RenderVertex::at(b).with_uv(Vec2::new(0.5, 0.0)),
        RenderVertex::at(c).with_uv(Vec2::new(0.5, 0.5)),
        // Island 2: A' C' D
        RenderVertex::at(a).with_uv(Vec2::new(0.5, 0.5)),
        RenderVertex::at(c).with_uv(Vec2::new(1.0, 1.0)),
        RenderVertex::at(d).with_uv(Vec2::new(0.5, 1.0)),
    ];

    SkinnedMesh {
        name: "seamed_quad".into(),
        vertices,
        indices: vec![0, 1, 2, 3, 4, 5],
    }
}

/// Quad grid whose every quad has its own four vertices, so every interior
/// grid point is duplicated up to four times. Welds back to [`quad_grid`].
pub fn split_quad_grid(cols: usize, rows: usize, width: f32, height: f32) -> SkinnedMesh {
    let shared = quad_grid(cols, rows, width, height);
    let mut vertices = Vec::with_capacity(shared.indices.len());
    let mut indices = Vec::with_capacity(shared.indices.len());

    for &v in &shared.indices {
        indices.push(vertices.len() as u32);
        vertices.push(shared.vertices[v as usize]);
    }

    SkinnedMesh {
        name: format!("split_quad_grid_{cols}x{rows}"),
        vertices,
        indices,
    }
}
