pub mod gpu_context;
pub mod input_adapter;
pub mod surface;

pub use gpu_context::GpuContext;
pub use input_adapter::OrbitInput;
pub use surface::WindowSurface;
