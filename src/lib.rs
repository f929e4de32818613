pub mod app;
pub mod camera;
pub mod cli;
pub mod config;
pub mod controls;
pub mod core;
pub mod error;
pub mod frame;
pub mod loaders;
pub mod math;
pub mod model;
pub mod overlay;
pub mod params;
pub mod post;
pub mod render;
pub mod scene;
pub mod types;
pub mod viewer;

pub use error::{Result, ViewerError};
pub use model::{Model, ModelId};
pub use scene::{ModelDisposer, SceneContainer};
pub use viewer::ViewerContext;
