//! Host-side mirror of `ascii.wgsl`.
//!
//! The render path never calls these; they pin down the quantization the
//! shader performs so it can be tested and benchmarked without a GPU. Keep
//! the two in step.

use glam::{Vec2, Vec3};

use crate::params::EffectParams;

/// Rec. 601 luma weights
pub const LUMA_WEIGHTS: Vec3 = Vec3::new(0.299, 0.587, 0.114);

/// Adjusted luminance is spread over this many character steps
pub const CHAR_LEVELS: f32 = 9.0;

/// Density buckets, darkest first
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Glyph {
    Empty,
    Dot,
    Dash,
    Plus,
    Hash,
    Full,
}

impl Glyph {
    pub fn from_char_index(char_index: f32) -> Self {
        if char_index < 1.0 {
            Glyph::Empty
        } else if char_index < 2.0 {
            Glyph::Dot
        } else if char_index < 4.0 {
            Glyph::Dash
        } else if char_index < 6.0 {
            Glyph::Plus
        } else if char_index < 8.0 {
            Glyph::Hash
        } else {
            Glyph::Full
        }
    }

    pub fn bucket(self) -> usize {
        self as usize
    }

    /// Green intensity for a fragment at `in_cell` (0..1 within its cell)
    pub fn pattern(self, in_cell: Vec2) -> f32 {
        let d = in_cell - Vec2::splat(0.5);
        let box_dist = d.x.abs().max(d.y.abs());
        match self {
            Glyph::Empty => 0.0,
            Glyph::Dot => step(0.5, d.length()) * 0.3,
            Glyph::Dash => step(0.45, d.x.abs()) * 0.5,
            Glyph::Plus => step(0.3, box_dist) * 0.7,
            Glyph::Hash => step(0.2, box_dist) * 0.85,
            Glyph::Full => 1.0,
        }
    }
}

/// GLSL/WGSL `step`
fn step(edge: f32, x: f32) -> f32 {
    if x < edge { 0.0 } else { 1.0 }
}

pub fn luminance(rgb: [f32; 3]) -> f32 {
    Vec3::from_array(rgb).dot(LUMA_WEIGHTS)
}

/// Contrast about 0.5, then brightness, then clamp to [0, 1]
pub fn adjust(gray: f32, params: &EffectParams) -> f32 {
    (((gray - 0.5) * params.contrast + 0.5) * params.brightness).clamp(0.0, 1.0)
}

pub fn char_index(gray: f32, params: &EffectParams) -> f32 {
    adjust(gray, params) * CHAR_LEVELS
}

pub fn glyph_for(gray: f32, params: &EffectParams) -> Glyph {
    Glyph::from_char_index(char_index(gray, params))
}

fn cell_size(params: &EffectParams) -> Vec2 {
    Vec2::splat(params.char_size) / Vec2::from_array(params.resolution)
}

/// Texture coordinate sampled for the cell containing `uv`
pub fn cell_sample_uv(uv: Vec2, params: &EffectParams) -> Vec2 {
    let cell = cell_size(params);
    (uv / cell).floor() * cell + cell * 0.5
}

/// Position of `uv` inside its cell, each axis in [0, 1)
pub fn in_cell_uv(uv: Vec2, params: &EffectParams) -> Vec2 {
    let v = uv * Vec2::from_array(params.resolution) / params.char_size;
    v - v.floor()
}

/// Full fragment computation: RGBA output for `uv` given a color lookup
pub fn shade<F>(uv: Vec2, params: &EffectParams, sample: F) -> [f32; 4]
where
    F: Fn(Vec2) -> [f32; 3],
{
    let gray = luminance(sample(cell_sample_uv(uv, params)));
    let pattern = glyph_for(gray, params).pattern(in_cell_uv(uv, params));
    [0.0, pattern, 0.0, 1.0]
}

/// Uniform block of the ASCII shader
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct AsciiUniforms {
    pub resolution: [f32; 2],
    pub char_size: f32,
    pub brightness: f32,
    pub contrast: f32,
    pub _pad: [f32; 3],
}

impl From<&EffectParams> for AsciiUniforms {
    fn from(params: &EffectParams) -> Self {
        Self {
            resolution: params.resolution,
            char_size: params.char_size,
            brightness: params.brightness,
            contrast: params.contrast,
            _pad: [0.0; 3],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::Viewport;

    fn params() -> EffectParams {
        EffectParams::new(Viewport::new(800, 600))
    }

    #[test]
    fn luma_of_primaries() {
        assert!((luminance([1.0, 0.0, 0.0]) - 0.299).abs() < 1e-6);
        assert!((luminance([0.0, 1.0, 0.0]) - 0.587).abs() < 1e-6);
        assert!((luminance([0.0, 0.0, 1.0]) - 0.114).abs() < 1e-6);
        assert!((luminance([1.0, 1.0, 1.0]) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn midpoint_is_fixed_by_contrast() {
        let mut p = params();
        p.contrast = 2.5;
        assert!((adjust(0.5, &p) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn bucket_edges() {
        assert_eq!(Glyph::from_char_index(0.99), Glyph::Empty);
        assert_eq!(Glyph::from_char_index(1.0), Glyph::Dot);
        assert_eq!(Glyph::from_char_index(3.99), Glyph::Dash);
        assert_eq!(Glyph::from_char_index(4.0), Glyph::Plus);
        assert_eq!(Glyph::from_char_index(7.99), Glyph::Hash);
        assert_eq!(Glyph::from_char_index(9.0), Glyph::Full);
    }

    #[test]
    fn cell_sampling_snaps_to_center() {
        let p = params();
        let uv = cell_sample_uv(Vec2::new(1.0 / 800.0, 1.0 / 600.0), &p);
        assert!(uv.abs_diff_eq(Vec2::new(4.0 / 800.0, 4.0 / 600.0), 1e-6));
    }

    #[test]
    fn patterns_light_cell_edges_not_centers() {
        let center = Vec2::splat(0.5);
        let corner = Vec2::new(0.02, 0.02);
        for glyph in [Glyph::Dot, Glyph::Plus, Glyph::Hash] {
            assert_eq!(glyph.pattern(center), 0.0, "{:?}", glyph);
            assert!(glyph.pattern(corner) > 0.0, "{:?}", glyph);
        }
        assert_eq!(Glyph::Full.pattern(center), 1.0);
        assert_eq!(Glyph::Empty.pattern(corner), 0.0);
    }

    #[test]
    fn shade_outputs_green_only() {
        let p = params();
        let out = shade(Vec2::new(0.001, 0.001), &p, |_| [1.0, 1.0, 1.0]);
        assert_eq!(out, [0.0, 1.0, 0.0, 1.0]);
    }

    #[test]
    fn uniform_block_is_32_bytes() {
        assert_eq!(std::mem::size_of::<AsciiUniforms>(), 32);
        let u = AsciiUniforms::from(&params());
        assert_eq!(u.resolution, [800.0, 600.0]);
        assert_eq!(u.char_size, 8.0);
    }
}
