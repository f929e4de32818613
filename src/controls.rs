use std::path::PathBuf;

use crate::params::{BRIGHTNESS_RANGE, CHAR_SIZE_RANGE, CONTRAST_RANGE};
use crate::viewer::ViewerContext;

/// Requests from the panel that need more than a field write
#[derive(Debug, Clone, PartialEq)]
pub enum ControlAction {
    LoadPath(PathBuf),
    ResetModel,
}

/// Side panel with the effect sliders, auto-rotate toggle and model
/// loading, plus the modal error window
#[derive(Debug, Default)]
pub struct ControlPanel {
    path_input: String,
}

impl ControlPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show(
        &mut self,
        ctx: &egui::Context,
        viewer: &mut ViewerContext,
        loading: bool,
    ) -> Vec<ControlAction> {
        let mut actions = Vec::new();

        if viewer.settings.show_ui {
            egui::SidePanel::left("controls")
                .resizable(false)
                .default_width(220.0)
                .show(ctx, |ui| {
                    self.effect_controls(ui, viewer);
                    ui.separator();
                    self.model_controls(ui, viewer, loading, &mut actions);
                });
        }

        if let Some(message) = viewer.alert().map(str::to_owned) {
            let mut dismissed = false;
            egui::Window::new("Error")
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                .show(ctx, |ui| {
                    ui.label(message);
                    ui.add_space(8.0);
                    dismissed = ui.button("OK").clicked();
                });
            if dismissed {
                viewer.dismiss_alert();
            }
        }

        actions
    }

    fn effect_controls(&mut self, ui: &mut egui::Ui, viewer: &mut ViewerContext) {
        ui.heading("ASCII");

        let params = &mut viewer.params;
        labelled_slider(ui, "Char size", &mut params.char_size, CHAR_SIZE_RANGE, 0);
        labelled_slider(ui, "Brightness", &mut params.brightness, BRIGHTNESS_RANGE, 2);
        labelled_slider(ui, "Contrast", &mut params.contrast, CONTRAST_RANGE, 2);

        ui.add_space(4.0);
        ui.checkbox(&mut viewer.settings.auto_rotate, "Auto rotate");
    }

    fn model_controls(
        &mut self,
        ui: &mut egui::Ui,
        viewer: &ViewerContext,
        loading: bool,
        actions: &mut Vec<ControlAction>,
    ) {
        ui.heading("Model");

        if let Some(model) = viewer.scene.active_model() {
            ui.monospace(model.name());
            ui.monospace(format!("{} triangles", model.triangle_count()));
        }

        ui.add_space(4.0);
        ui.label("Drop a .gltf, .glb or .obj file, or enter a path:");
        let response = ui.text_edit_singleline(&mut self.path_input);
        let submitted = response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));

        ui.horizontal(|ui| {
            let load_clicked = ui
                .add_enabled(!loading, egui::Button::new("Load"))
                .clicked();
            if load_clicked || (submitted && !loading) {
                if let Some(path) = load_request(&self.path_input) {
                    actions.push(ControlAction::LoadPath(path));
                }
            }

            if ui.button("Reset model").clicked() {
                actions.push(ControlAction::ResetModel);
            }
        });

        if loading {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label("Loading...");
            });
        }
    }
}

fn labelled_slider(
    ui: &mut egui::Ui,
    label: &str,
    value: &mut f32,
    range: std::ops::RangeInclusive<f32>,
    decimals: usize,
) {
    ui.horizontal(|ui| {
        ui.label(label);
        ui.label(format!("{:.*}", decimals, *value));
    });
    let step = if decimals == 0 { 1.0 } else { 0.01 };
    ui.add(egui::Slider::new(value, range).step_by(step).show_value(false));
}

/// Path typed into the panel, or `None` when blank
fn load_request(input: &str) -> Option<PathBuf> {
    let trimmed = input.trim().trim_matches('"');
    (!trimmed.is_empty()).then(|| PathBuf::from(trimmed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ViewerConfig;
    use crate::params::Viewport;

    fn run_frame(panel: &mut ControlPanel, viewer: &mut ViewerContext) -> Vec<ControlAction> {
        let ctx = egui::Context::default();
        let mut actions = Vec::new();
        let _ = ctx.run(egui::RawInput::default(), |ctx| {
            actions = panel.show(ctx, viewer, false);
        });
        actions
    }

    #[test]
    fn blank_path_is_not_a_request() {
        assert_eq!(load_request("   "), None);
        assert_eq!(load_request("\"/tmp/a b.obj\""), Some(PathBuf::from("/tmp/a b.obj")));
    }

    #[test]
    fn idle_frame_changes_nothing() {
        let mut viewer = ViewerContext::new(&ViewerConfig::default(), Viewport::new(800, 600));
        let before = viewer.params;
        let actions = run_frame(&mut ControlPanel::new(), &mut viewer);
        assert!(actions.is_empty());
        assert_eq!(viewer.params, before);
    }

    #[test]
    fn hidden_panel_still_shows_alert() {
        let mut config = ViewerConfig::default();
        config.show_ui = false;
        let mut viewer = ViewerContext::new(&config, Viewport::new(800, 600));
        viewer.apply_upload("bad.glb", b"glTF", &mut Discard);
        let actions = run_frame(&mut ControlPanel::new(), &mut viewer);
        assert!(actions.is_empty());
        assert!(viewer.alert().is_some());
    }

    struct Discard;

    impl crate::scene::ModelDisposer for Discard {
        fn dispose(&mut self, _model: crate::model::Model) {}
    }
}
