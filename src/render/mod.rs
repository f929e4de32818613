pub mod mesh_renderer;
pub mod offscreen;

pub use mesh_renderer::MeshRenderer;
pub use offscreen::OffscreenTarget;
