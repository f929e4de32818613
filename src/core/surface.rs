use wgpu::{Adapter, Surface, SurfaceConfiguration, SurfaceError, SurfaceTexture, TextureFormat};

use super::gpu_context::GpuContext;
use crate::params::Viewport;

/// The window's swapchain plus its current configuration
pub struct WindowSurface {
    surface: Surface<'static>,
    config: SurfaceConfiguration,
}

impl WindowSurface {
    /// Configure `surface` for the given size
    pub fn new(surface: Surface<'static>, adapter: &Adapter, gpu: &GpuContext, viewport: Viewport) -> Self {
        let caps = surface.get_capabilities(adapter);

        // Prefer a linear format so shader outputs land on screen unchanged
        let format = caps
            .formats
            .iter()
            .find(|f| !f.is_srgb())
            .copied()
            .unwrap_or(caps.formats[0]);

        let config = SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: viewport.width.max(1),
            height: viewport.height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };

        surface.configure(gpu.device(), &config);
        log::debug!("Surface configured: {:?} {}x{}", format, config.width, config.height);

        Self { surface, config }
    }

    pub fn format(&self) -> TextureFormat {
        self.config.format
    }

    /// Resize the swapchain. Zero sizes are ignored.
    pub fn resize(&mut self, gpu: &GpuContext, viewport: Viewport) {
        if !viewport.is_renderable() {
            return;
        }

        self.config.width = viewport.width;
        self.config.height = viewport.height;
        self.surface.configure(gpu.device(), &self.config);
    }

    /// Next swapchain image. An outdated or lost surface is reconfigured
    /// once; any other failure is returned.
    pub fn acquire(&mut self, gpu: &GpuContext) -> Result<SurfaceTexture, SurfaceError> {
        match self.surface.get_current_texture() {
            Ok(texture) => Ok(texture),
            Err(SurfaceError::Outdated | SurfaceError::Lost) => {
                log::warn!("Surface outdated, reconfiguring");
                self.surface.configure(gpu.device(), &self.config);
                self.surface.get_current_texture()
            }
            Err(e) => Err(e),
        }
    }
}
