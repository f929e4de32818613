use ascii_viewer::config::ViewerConfig;
use ascii_viewer::params::Viewport;
use ascii_viewer::{Model, ModelDisposer, ModelId, ViewerContext};

#[derive(Default)]
struct CountingDisposer {
    count: usize,
}

impl ModelDisposer for CountingDisposer {
    fn dispose(&mut self, _model: Model) {
        self.count += 1;
    }
}

const TETRA_OBJ: &[u8] = b"\
o tetra
v 0 0 0
v 1 0 0
v 0 1 0
v 0 0 1
f 1 3 2
f 1 2 4
f 1 4 3
f 2 3 4
";

fn context() -> ViewerContext {
    ViewerContext::new(&ViewerConfig::default(), Viewport::new(800, 600))
}

#[test]
fn resize_updates_aspect_and_resolution_together() {
    let mut ctx = context();
    assert!((ctx.scene.camera.aspect - 800.0 / 600.0).abs() < 1e-6);
    assert_eq!(ctx.params.resolution, [800.0, 600.0]);

    ctx.resize(1920, 1080);

    assert!((ctx.scene.camera.aspect - 1920.0 / 1080.0).abs() < 1e-6);
    assert_eq!(ctx.params.resolution, [1920.0, 1080.0]);
    assert_eq!(ctx.viewport(), Viewport::new(1920, 1080));
}

#[test]
fn truncated_glb_keeps_previous_model() {
    let mut ctx = context();
    let mut disposer = CountingDisposer::default();

    assert!(ctx.apply_upload("tetra.obj", TETRA_OBJ, &mut disposer));
    let before = ctx.scene.active_model_id();

    let truncated = b"glTF\x02\x00\x00\x00\x40\x00\x00\x00\x10\x00";
    assert!(!ctx.apply_upload("scene.glb", truncated, &mut disposer));

    assert_eq!(ctx.scene.active_model_id(), before);
    assert_eq!(ctx.scene.attached_model_count(), 1);
    assert_eq!(disposer.count, 0);
    let alert = ctx.alert().unwrap();
    assert!(alert.starts_with("Error loading file:"), "{}", alert);
}

#[test]
fn failed_upload_over_default_keeps_default() {
    let mut ctx = context();
    assert!(!ctx.apply_upload("broken.obj", b"v 0 zero 0\nf 1 1 1\n", &mut CountingDisposer::default()));
    assert_eq!(ctx.scene.active_model_id(), Some(ModelId::DEFAULT));
    assert!(ctx.alert().is_some());
}

#[test]
fn successful_upload_replaces_and_disposes() {
    let mut ctx = context();
    let mut disposer = CountingDisposer::default();

    assert!(ctx.apply_upload("a.obj", TETRA_OBJ, &mut disposer));
    assert_eq!(disposer.count, 0, "built-in model is parked, not disposed");

    assert!(ctx.apply_upload("b.obj", TETRA_OBJ, &mut disposer));
    assert_eq!(disposer.count, 1);
    assert_eq!(ctx.scene.active_model().unwrap().name(), "b.obj");
}

#[test]
fn upload_resets_camera_and_rotation() {
    let mut ctx = context();
    ctx.scene.camera.zoom(-20.0);
    for _ in 0..50 {
        ctx.advance_frame();
    }

    assert!(ctx.apply_upload("a.obj", TETRA_OBJ, &mut CountingDisposer::default()));

    assert!((ctx.scene.camera.distance() - 5.0).abs() < 1e-5);
    assert_eq!(ctx.scene.active_model().unwrap().transform.rotation.y, 0.0);
}

#[test]
fn restore_default_after_upload() {
    let mut ctx = context();
    let mut disposer = CountingDisposer::default();
    ctx.apply_upload("a.obj", TETRA_OBJ, &mut disposer);

    assert!(ctx.restore_default(&mut disposer));
    assert_eq!(ctx.scene.active_model_id(), Some(ModelId::DEFAULT));
    assert_eq!(disposer.count, 1);
    assert!(!ctx.restore_default(&mut disposer));
}

#[test]
fn config_values_reach_context() {
    let config = ViewerConfig {
        char_size: 12.0,
        brightness: 2.0,
        contrast: 0.5,
        auto_rotate: false,
        rotation_step: 0.05,
        ..ViewerConfig::default()
    };
    let ctx = ViewerContext::new(&config, Viewport::new(1024, 768));

    assert_eq!(ctx.params.char_size, 12.0);
    assert_eq!(ctx.params.brightness, 2.0);
    assert_eq!(ctx.params.contrast, 0.5);
    assert_eq!(ctx.params.resolution, [1024.0, 768.0]);
    assert!(!ctx.settings.auto_rotate);
    assert_eq!(ctx.settings.rotation_step, 0.05);
}
