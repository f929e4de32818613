// cli.rs - Command-line interface configuration
use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug, Clone, Default)]
#[command(name = "ascii-viewer")]
#[command(about = "3D model viewer with an ASCII post-process", long_about = None)]
pub struct Cli {
    /// Model to show instead of the built-in torus knot (.gltf, .glb, .obj)
    #[arg(long, value_name = "PATH")]
    pub model: Option<PathBuf>,

    /// Glyph cell size in pixels (4-32)
    #[arg(long)]
    pub char_size: Option<f32>,

    /// Brightness multiplier (0-3)
    #[arg(long)]
    pub brightness: Option<f32>,

    /// Contrast around mid-gray (0-3)
    #[arg(long)]
    pub contrast: Option<f32>,

    /// Start with auto-rotation off
    #[arg(long = "no-auto-rotate", default_value = "false")]
    pub no_auto_rotate: bool,

    /// Radians added to the model's Y rotation each frame
    #[arg(long)]
    pub rotation_step: Option<f32>,

    /// Initial window width
    #[arg(long)]
    pub width: Option<u32>,

    /// Initial window height
    #[arg(long)]
    pub height: Option<u32>,

    /// Hide the control panel
    #[arg(long = "no-ui", default_value = "false")]
    pub no_ui: bool,

    /// JSON settings file; flags given here override it
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}
