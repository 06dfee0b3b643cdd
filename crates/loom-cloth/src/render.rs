//! Render-side consumer of reconstructed vertices.

use loom_mesh::RenderVertex;

/// Receives the rebuilt vertex buffer after every tick (GPU upload lives
/// behind this).
pub trait RenderSink: Send {
    fn update_vertex_buffer(&mut self, vertices: &[RenderVertex]);
}

/// Keeps the latest buffer.
impl RenderSink for Vec<RenderVertex> {
    fn update_vertex_buffer(&mut self, vertices: &[RenderVertex]) {
        self.clear();
        self.extend_from_slice(vertices);
    }
}
