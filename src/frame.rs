use std::time::Instant;

use wgpu::SurfaceError;

use crate::core::{GpuContext, WindowSurface};
use crate::post::AsciiPass;
use crate::render::{MeshRenderer, OffscreenTarget};
use crate::viewer::ViewerContext;

/// Averages frame times over roughly one second
#[derive(Debug, Default)]
struct FpsCounter {
    frames: u32,
    elapsed: f32,
}

impl FpsCounter {
    /// Returns the average FPS each time a full second has accumulated
    fn record(&mut self, delta: f32) -> Option<f32> {
        self.frames += 1;
        self.elapsed += delta;
        if self.elapsed < 1.0 {
            return None;
        }

        let fps = self.frames as f32 / self.elapsed;
        *self = Self::default();
        Some(fps)
    }
}

/// Runs the per-frame sequence: controls, auto-rotate, scene pass into a
/// fresh offscreen target, ASCII pass onto the surface, overlay, present.
pub struct FrameDriver {
    last_frame: Instant,
    fps: FpsCounter,
}

impl FrameDriver {
    pub fn new() -> Self {
        Self {
            last_frame: Instant::now(),
            fps: FpsCounter::default(),
        }
    }

    /// Seconds since the previous call
    fn elapsed(&mut self) -> f32 {
        let now = Instant::now();
        let delta = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;
        delta
    }

    /// Draw one frame. `overlay` records UI drawing onto the surface view
    /// after the ASCII pass.
    #[allow(clippy::too_many_arguments)]
    pub fn tick<F>(
        &mut self,
        ctx: &mut ViewerContext,
        renderer: &mut MeshRenderer,
        ascii: &mut AsciiPass,
        gpu: &GpuContext,
        surface: &mut WindowSurface,
        overlay: F,
    ) -> Result<(), SurfaceError>
    where
        F: FnOnce(&mut ViewerContext, &mut wgpu::CommandEncoder, &wgpu::TextureView),
    {
        let delta = self.elapsed();
        if let Some(fps) = self.fps.record(delta) {
            log::debug!("{:.1} fps", fps);
        }

        ctx.advance_frame();

        let output = surface.acquire(gpu)?;
        let surface_view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = gpu
            .device()
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });

        let target = OffscreenTarget::new(gpu.device(), ctx.viewport());
        renderer.render(&mut encoder, &target, &ctx.scene);
        ascii.render(gpu, &mut encoder, target.color_view(), &surface_view, &ctx.params);

        overlay(ctx, &mut encoder, &surface_view);

        gpu.queue().submit(std::iter::once(encoder.finish()));
        target.release();
        output.present();

        Ok(())
    }
}

impl Default for FrameDriver {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elapsed_measures_from_previous_call() {
        let mut driver = FrameDriver::new();
        std::thread::sleep(std::time::Duration::from_millis(5));
        let before = Instant::now();
        assert!(driver.elapsed() >= 0.005);
        assert!(driver.last_frame >= before);
    }

    #[test]
    fn fps_reported_once_per_second() {
        let mut fps = FpsCounter::default();
        for _ in 0..59 {
            assert!(fps.record(1.0 / 60.0).is_none());
        }
        let reported = fps.record(1.0 / 60.0 + 1e-3).unwrap();
        assert!((reported - 60.0).abs() < 0.5);
        assert_eq!(fps.frames, 0);
    }
}
