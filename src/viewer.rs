use crate::config::ViewerConfig;
use crate::error::Result;
use crate::loaders::{self, ModelFormat};
use crate::model::{Model, load_default};
use crate::params::{EffectParams, Viewport, ViewerSettings};
use crate::scene::{ModelDisposer, SceneContainer};

/// Everything the frame driver and the UI handlers share: the scene, the
/// effect parameters, the viewport and the viewer settings.
pub struct ViewerContext {
    pub scene: SceneContainer,
    pub params: EffectParams,
    pub settings: ViewerSettings,
    viewport: Viewport,
    alert: Option<String>,
}

impl ViewerContext {
    /// Context showing the built-in model
    pub fn new(config: &ViewerConfig, viewport: Viewport) -> Self {
        Self::with_model(load_default(), config, viewport)
    }

    pub fn with_model(model: Model, config: &ViewerConfig, viewport: Viewport) -> Self {
        Self {
            scene: SceneContainer::new(model, viewport.aspect()),
            params: config.effect_params(viewport),
            settings: config.settings(),
            viewport,
            alert: None,
        }
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Update camera aspect and effect resolution together
    pub fn resize(&mut self, width: u32, height: u32) {
        let viewport = Viewport::new(width, height);
        if !viewport.is_renderable() {
            log::debug!("Ignoring resize to {}x{}", width, height);
            return;
        }

        self.viewport = viewport;
        self.scene.camera.set_aspect(viewport.aspect());
        self.params.set_resolution(viewport);
    }

    /// Per-frame state update: orbit damping, then auto-rotation
    pub fn advance_frame(&mut self) {
        self.scene.camera.update();

        if self.settings.auto_rotate {
            let step = self.settings.rotation_step;
            if let Some(model) = self.scene.active_model_mut() {
                model.transform.rotation.y += step;
            }
        }
    }

    /// Parse an upload and install it synchronously. Returns whether the
    /// active model changed.
    pub fn apply_upload(
        &mut self,
        name: &str,
        bytes: &[u8],
        disposer: &mut dyn ModelDisposer,
    ) -> bool {
        let result = ModelFormat::detect(name, bytes)
            .and_then(|format| loaders::load_from_bytes(name, bytes, format));
        self.install_upload(result, disposer)
    }

    /// Install the outcome of a parse. Failures leave the current model in
    /// place; reportable ones raise an alert.
    pub fn install_upload(
        &mut self,
        result: Result<Model>,
        disposer: &mut dyn ModelDisposer,
    ) -> bool {
        match result {
            Ok(model) => {
                self.scene.set_active_model(model, disposer);
                true
            }
            Err(e) if e.is_reportable() => {
                log::error!("Error loading file: {}", e);
                self.alert = Some(format!("Error loading file: {}", e));
                false
            }
            Err(e) => {
                log::debug!("Ignoring upload: {}", e);
                false
            }
        }
    }

    /// Swap the built-in model back in
    pub fn restore_default(&mut self, disposer: &mut dyn ModelDisposer) -> bool {
        self.scene.restore_default(disposer)
    }

    pub fn alert(&self) -> Option<&str> {
        self.alert.as_deref()
    }

    pub fn dismiss_alert(&mut self) {
        self.alert = None;
    }
}
