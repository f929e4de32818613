use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use anyhow::{Context, Result};
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::ActiveEventLoop,
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use crate::config::ViewerConfig;
use crate::controls::{ControlAction, ControlPanel};
use crate::core::{GpuContext, OrbitInput, WindowSurface};
use crate::error::ViewerError;
use crate::frame::FrameDriver;
use crate::loaders::{self, ModelFormat};
use crate::model::Model;
use crate::overlay::EguiOverlay;
use crate::params::Viewport;
use crate::post::AsciiPass;
use crate::render::MeshRenderer;
use crate::viewer::ViewerContext;

/// A model file being read and parsed off the event-loop thread
struct UploadTask {
    path: PathBuf,
    receiver: Receiver<crate::error::Result<Model>>,
}

impl UploadTask {
    fn spawn(path: PathBuf) -> std::io::Result<Self> {
        let (sender, receiver) = mpsc::channel();
        let worker_path = path.clone();

        thread::Builder::new()
            .name("model-upload".to_string())
            .spawn(move || {
                let result = loaders::load_file(&worker_path);
                // Receiver is gone only when the app is shutting down
                let _ = sender.send(result);
            })?;

        Ok(Self { path, receiver })
    }

    /// Finished result, if any
    fn poll(&self) -> Option<crate::error::Result<Model>> {
        match self.receiver.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(ViewerError::Io {
                path: self.path.clone(),
                source: std::io::Error::other("upload worker exited without a result"),
            })),
        }
    }
}

/// Everything that exists once the window and GPU are up
struct AppState {
    window: Arc<Window>,
    gpu: GpuContext,
    surface: WindowSurface,
    renderer: MeshRenderer,
    ascii: AsciiPass,
    overlay: EguiOverlay,
    controls: ControlPanel,
    viewer: ViewerContext,
    input: OrbitInput,
    driver: FrameDriver,
    upload: Option<UploadTask>,
}

impl AppState {
    async fn new(window: Arc<Window>, config: &ViewerConfig) -> Result<Self> {
        let size = window.inner_size();
        let viewport = Viewport::new(size.width.max(1), size.height.max(1));

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .context("Failed to create window surface")?;
        let (gpu, adapter) = GpuContext::new_with_surface(&instance, &surface).await?;
        let surface = WindowSurface::new(surface, &adapter, &gpu, viewport);

        let renderer = MeshRenderer::new(&gpu);
        let ascii = AsciiPass::new(surface.format());
        let overlay = EguiOverlay::new(&window, &gpu, surface.format());
        let viewer = ViewerContext::new(config, viewport);

        log::info!("Viewer initialized at {}x{}", viewport.width, viewport.height);

        Ok(Self {
            window,
            gpu,
            surface,
            renderer,
            ascii,
            overlay,
            controls: ControlPanel::new(),
            viewer,
            input: OrbitInput::new(),
            driver: FrameDriver::new(),
            upload: None,
        })
    }

    /// Start reading `path` on a worker thread
    fn start_upload(&mut self, path: PathBuf) {
        if let Some(pending) = &self.upload {
            log::info!(
                "Ignoring {}: still loading {}",
                path.display(),
                pending.path.display()
            );
            return;
        }

        if !is_candidate(&path) {
            log::debug!("Ignoring unsupported file {}", path.display());
            return;
        }

        log::info!("Loading {}", path.display());
        match UploadTask::spawn(path) {
            Ok(task) => self.upload = Some(task),
            Err(e) => log::error!("Failed to start upload worker: {}", e),
        }
    }

    /// Install a finished upload, if there is one
    fn poll_upload(&mut self) {
        let Some(result) = self.upload.as_ref().and_then(UploadTask::poll) else {
            return;
        };
        self.upload = None;
        self.viewer.install_upload(result, &mut self.renderer);
    }

    fn handle_action(&mut self, action: ControlAction) {
        match action {
            ControlAction::LoadPath(path) => self.start_upload(path),
            ControlAction::ResetModel => {
                if !self.viewer.restore_default(&mut self.renderer) {
                    log::debug!("Built-in model already active");
                }
            }
        }
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.viewer.resize(width, height);
        self.surface.resize(&self.gpu, Viewport::new(width, height));
    }

    fn is_drawable(&self) -> bool {
        is_drawable_size(self.window.inner_size())
    }

    fn redraw(&mut self) -> Result<()> {
        self.poll_upload();

        let loading = self.upload.is_some();
        let mut actions = Vec::new();

        let Self {
            window,
            gpu,
            surface,
            renderer,
            ascii,
            overlay,
            controls,
            viewer,
            driver,
            ..
        } = self;

        driver
            .tick(viewer, renderer, ascii, gpu, surface, |viewer, encoder, view| {
                let viewport = viewer.viewport();
                overlay.draw(window, gpu, encoder, view, viewport, |ctx| {
                    actions.extend(controls.show(ctx, viewer, loading));
                });
            })
            .context("Failed to render frame")?;

        for action in actions {
            self.handle_action(action);
        }

        Ok(())
    }
}

/// False while minimized; the swapchain cannot be acquired at zero size
fn is_drawable_size(size: PhysicalSize<u32>) -> bool {
    Viewport::new(size.width, size.height).is_renderable()
}

/// Names without an extension are sniffed later; anything else must carry
/// a known extension
fn is_candidate(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    path.extension().is_none() || ModelFormat::for_name(name).is_some()
}

/// winit application: owns the window, the GPU state and the upload worker
pub struct App {
    config: ViewerConfig,
    state: Option<AppState>,
    error: Option<anyhow::Error>,
}

impl App {
    pub fn new(config: ViewerConfig) -> Self {
        Self {
            config,
            state: None,
            error: None,
        }
    }

    /// Fatal error that stopped the event loop, if any
    pub fn take_error(&mut self) -> Option<anyhow::Error> {
        self.error.take()
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: anyhow::Error) {
        log::error!("{:#}", error);
        self.error = Some(error);
        event_loop.exit();
    }

    fn init(&self, event_loop: &ActiveEventLoop) -> Result<AppState> {
        let window = event_loop
            .create_window(
                Window::default_attributes()
                    .with_title("ASCII Viewer")
                    .with_inner_size(winit::dpi::LogicalSize::new(
                        self.config.width,
                        self.config.height,
                    )),
            )
            .context("Failed to create window")?;

        pollster::block_on(AppState::new(Arc::new(window), &self.config))
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }

        match self.init(event_loop) {
            Ok(mut state) => {
                if let Some(path) = self.config.model.clone() {
                    state.start_upload(path);
                }
                self.state = Some(state);
            }
            Err(e) => self.fail(event_loop, e),
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(state) = &mut self.state else {
            return;
        };

        state.input.track_release(&event);

        // Let egui handle the event first
        if state.overlay.handle_event(&state.window, &event) {
            return;
        }

        match event {
            WindowEvent::CloseRequested
            | WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        ..
                    },
                ..
            } => event_loop.exit(),
            WindowEvent::Resized(size) => state.resize(size.width, size.height),
            WindowEvent::DroppedFile(path) => state.start_upload(path),
            WindowEvent::RedrawRequested if !state.is_drawable() => {
                log::trace!("Skipping redraw while minimized");
            }
            WindowEvent::RedrawRequested => {
                if let Err(e) = state.redraw() {
                    self.fail(event_loop, e);
                }
            }
            other => {
                let height = state.viewer.viewport().height as f32;
                state
                    .input
                    .process_event(&other, &mut state.viewer.scene.camera, height);
            }
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(state) = self.state.as_ref().filter(|s| s.is_drawable()) {
            state.window.request_redraw();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn candidate_filter_uses_extension() {
        assert!(is_candidate(Path::new("/models/duck.GLB")));
        assert!(is_candidate(Path::new("scene.gltf")));
        assert!(is_candidate(Path::new("mesh.obj")));
        assert!(is_candidate(Path::new("README")));
        assert!(!is_candidate(Path::new("photo.png")));
    }

    #[test]
    fn minimized_window_is_not_drawn() {
        assert!(!is_drawable_size(PhysicalSize::new(0, 0)));
        assert!(!is_drawable_size(PhysicalSize::new(1280, 0)));
        assert!(!is_drawable_size(PhysicalSize::new(0, 720)));
        assert!(is_drawable_size(PhysicalSize::new(1, 1)));
    }

    #[test]
    fn upload_task_reports_missing_file() {
        let task = UploadTask::spawn(PathBuf::from("/nonexistent/model.obj")).unwrap();
        let result = loop {
            if let Some(result) = task.poll() {
                break result;
            }
            thread::yield_now();
        };
        assert!(matches!(result, Err(ViewerError::Io { .. })));
    }
}
