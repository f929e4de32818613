//! Startup configuration.
//!
//! Values come from built-in defaults, then an optional JSON file, then
//! command-line flags, each layer overriding the previous one. The effect
//! values are clamped to the control panel's slider ranges afterwards.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::cli::Cli;
use crate::params::{DEFAULT_ROTATION_STEP, EffectParams, Viewport, ViewerSettings};

pub const DEFAULT_WIDTH: u32 = 1280;
pub const DEFAULT_HEIGHT: u32 = 720;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Model loaded at startup in place of the torus knot
    pub model: Option<PathBuf>,
    /// Glyph cell size in pixels
    pub char_size: f32,
    pub brightness: f32,
    pub contrast: f32,
    pub auto_rotate: bool,
    /// Radians per frame
    pub rotation_step: f32,
    pub width: u32,
    pub height: u32,
    pub show_ui: bool,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            model: None,
            char_size: 8.0,
            brightness: 1.0,
            contrast: 1.0,
            auto_rotate: true,
            rotation_step: DEFAULT_ROTATION_STEP,
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            show_ui: true,
        }
    }
}

impl ViewerConfig {
    /// Read a JSON settings file. Missing keys keep their defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Self = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    /// Resolve the final configuration for a command line
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let mut config = match &cli.config {
            Some(path) => {
                log::info!("Loading config from {}", path.display());
                Self::from_file(path)?
            }
            None => Self::default(),
        };
        config.apply_cli(cli);
        config.clamp();
        Ok(config)
    }

    /// Overwrite every field the command line sets explicitly
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(model) = &cli.model {
            self.model = Some(model.clone());
        }
        if let Some(v) = cli.char_size {
            self.char_size = v;
        }
        if let Some(v) = cli.brightness {
            self.brightness = v;
        }
        if let Some(v) = cli.contrast {
            self.contrast = v;
        }
        if cli.no_auto_rotate {
            self.auto_rotate = false;
        }
        if let Some(v) = cli.rotation_step {
            self.rotation_step = v;
        }
        if let Some(v) = cli.width {
            self.width = v;
        }
        if let Some(v) = cli.height {
            self.height = v;
        }
        if cli.no_ui {
            self.show_ui = false;
        }
    }

    /// Pull effect values into slider ranges and keep the window non-empty
    pub fn clamp(&mut self) {
        let mut params = self.effect_params(Viewport::new(self.width, self.height));
        params.clamp_to_ranges();
        self.char_size = params.char_size;
        self.brightness = params.brightness;
        self.contrast = params.contrast;

        if !self.rotation_step.is_finite() {
            log::warn!("Ignoring non-finite rotation step");
            self.rotation_step = DEFAULT_ROTATION_STEP;
        }
        self.width = self.width.max(1);
        self.height = self.height.max(1);
    }

    pub fn effect_params(&self, viewport: Viewport) -> EffectParams {
        EffectParams {
            char_size: self.char_size,
            brightness: self.brightness,
            contrast: self.contrast,
            ..EffectParams::new(viewport)
        }
    }

    pub fn settings(&self) -> ViewerSettings {
        ViewerSettings {
            auto_rotate: self.auto_rotate,
            rotation_step: self.rotation_step,
            show_ui: self.show_ui,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn defaults_match_control_panel() {
        let config = ViewerConfig::default();
        assert_eq!(config.char_size, 8.0);
        assert_eq!(config.brightness, 1.0);
        assert_eq!(config.contrast, 1.0);
        assert!(config.auto_rotate);
        assert_eq!(config.rotation_step, 0.01);
        assert!(config.show_ui);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config: ViewerConfig = serde_json::from_str(r#"{ "char_size": 16.0 }"#).unwrap();
        assert_eq!(config.char_size, 16.0);
        assert_eq!(config.brightness, 1.0);
        assert_eq!(config.width, DEFAULT_WIDTH);
    }

    #[test]
    fn cli_overrides_file_values() {
        let mut config: ViewerConfig =
            serde_json::from_str(r#"{ "brightness": 2.0, "contrast": 2.0 }"#).unwrap();
        let cli = Cli::try_parse_from(["ascii-viewer", "--contrast", "0.5", "--no-auto-rotate"]).unwrap();
        config.apply_cli(&cli);

        assert_eq!(config.brightness, 2.0);
        assert_eq!(config.contrast, 0.5);
        assert!(!config.auto_rotate);
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let cli = Cli::try_parse_from([
            "ascii-viewer",
            "--char-size",
            "100",
            "--brightness=-2",
            "--height",
            "0",
        ])
        .unwrap();
        let config = ViewerConfig::from_cli(&cli).unwrap();
        assert_eq!(config.char_size, 32.0);
        assert_eq!(config.brightness, 0.0);
        assert_eq!(config.height, 1);
    }

    #[test]
    fn missing_config_file_is_an_error() {
        let result = ViewerConfig::from_file("/nonexistent/ascii-viewer.json");
        assert!(result.is_err());
    }
}
