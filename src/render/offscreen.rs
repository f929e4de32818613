use wgpu::{Device, Texture, TextureView};

use crate::params::Viewport;

pub const COLOR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Per-frame color + depth target the scene is drawn into before the
/// post-process reads it back as a texture
pub struct OffscreenTarget {
    color: Texture,
    color_view: TextureView,
    depth: Texture,
    depth_view: TextureView,
}

impl OffscreenTarget {
    pub fn new(device: &Device, viewport: Viewport) -> Self {
        let size = wgpu::Extent3d {
            width: viewport.width.max(1),
            height: viewport.height.max(1),
            depth_or_array_layers: 1,
        };

        let color = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Offscreen Color"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: COLOR_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });

        let depth = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Offscreen Depth"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });

        let color_view = color.create_view(&wgpu::TextureViewDescriptor::default());
        let depth_view = depth.create_view(&wgpu::TextureViewDescriptor::default());

        Self {
            color,
            color_view,
            depth,
            depth_view,
        }
    }

    pub fn color_view(&self) -> &TextureView {
        &self.color_view
    }

    pub fn depth_view(&self) -> &TextureView {
        &self.depth_view
    }

    /// Free the GPU memory now instead of waiting for the drop. Call only
    /// after the commands using it were submitted.
    pub fn release(self) {
        self.color.destroy();
        self.depth.destroy();
    }
}
