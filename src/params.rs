use std::ops::RangeInclusive;

pub const CHAR_SIZE_RANGE: RangeInclusive<f32> = 4.0..=32.0;
pub const BRIGHTNESS_RANGE: RangeInclusive<f32> = 0.0..=3.0;
pub const CONTRAST_RANGE: RangeInclusive<f32> = 0.0..=3.0;

/// Radians added to the model's Y rotation on every frame
pub const DEFAULT_ROTATION_STEP: f32 = 0.01;

/// Viewport size in physical pixels
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }

    /// Zero-sized viewports (minimized windows) are never rendered
    pub fn is_renderable(&self) -> bool {
        self.width > 0 && self.height > 0
    }
}

/// Knobs of the ASCII post-process, written by the UI and read every frame
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct EffectParams {
    /// Glyph cell edge in pixels
    pub char_size: f32,
    pub brightness: f32,
    pub contrast: f32,
    /// Viewport size the cell grid is laid over
    pub resolution: [f32; 2],
}

impl EffectParams {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            char_size: 8.0,
            brightness: 1.0,
            contrast: 1.0,
            resolution: [viewport.width as f32, viewport.height as f32],
        }
    }

    pub fn set_resolution(&mut self, viewport: Viewport) {
        self.resolution = [viewport.width as f32, viewport.height as f32];
    }

    /// Pull every knob back into its slider range
    pub fn clamp_to_ranges(&mut self) {
        self.char_size = self
            .char_size
            .clamp(*CHAR_SIZE_RANGE.start(), *CHAR_SIZE_RANGE.end());
        self.brightness = self
            .brightness
            .clamp(*BRIGHTNESS_RANGE.start(), *BRIGHTNESS_RANGE.end());
        self.contrast = self
            .contrast
            .clamp(*CONTRAST_RANGE.start(), *CONTRAST_RANGE.end());
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ViewerSettings {
    pub auto_rotate: bool,
    /// Per frame, not per second: faster displays spin the model faster
    pub rotation_step: f32,
    pub show_ui: bool,
}

impl Default for ViewerSettings {
    fn default() -> Self {
        Self {
            auto_rotate: true,
            rotation_step: DEFAULT_ROTATION_STEP,
            show_ui: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_initial_controls() {
        let params = EffectParams::new(Viewport::new(800, 600));
        assert_eq!(params.char_size, 8.0);
        assert_eq!(params.brightness, 1.0);
        assert_eq!(params.contrast, 1.0);
        assert_eq!(params.resolution, [800.0, 600.0]);
    }

    #[test]
    fn clamp_pulls_values_into_range() {
        let mut params = EffectParams::new(Viewport::new(1, 1));
        params.char_size = 1.0;
        params.brightness = 10.0;
        params.contrast = -1.0;
        params.clamp_to_ranges();
        assert_eq!(params.char_size, 4.0);
        assert_eq!(params.brightness, 3.0);
        assert_eq!(params.contrast, 0.0);
    }

    #[test]
    fn zero_height_aspect_does_not_divide_by_zero() {
        let viewport = Viewport::new(640, 0);
        assert!(viewport.aspect().is_finite());
        assert!(!viewport.is_renderable());
    }
}
