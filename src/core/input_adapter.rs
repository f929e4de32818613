use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};

use crate::camera::OrbitCamera;

/// Pixels of trackpad scroll per zoom step
const PIXELS_PER_ZOOM_STEP: f32 = 50.0;

/// Adapter that bridges winit pointer events to orbit camera motion:
/// left-drag orbits, wheel zooms
#[derive(Debug, Clone, Default)]
pub struct OrbitInput {
    /// Left button held down over the viewport
    dragging: bool,
    /// Current cursor position (relative to window)
    cursor: Option<(f32, f32)>,
}

impl OrbitInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ends a drag on any left-button release. Call it for every event,
    /// including the ones the UI consumed.
    pub fn track_release(&mut self, event: &WindowEvent) {
        if let WindowEvent::MouseInput {
            state: ElementState::Released,
            button: MouseButton::Left,
            ..
        } = event
        {
            self.dragging = false;
        }
    }

    /// Process a winit WindowEvent and forward motion to the camera.
    /// Returns true when the event was used.
    pub fn process_event(
        &mut self,
        event: &WindowEvent,
        camera: &mut OrbitCamera,
        viewport_height: f32,
    ) -> bool {
        match event {
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => {
                self.dragging = *state == ElementState::Pressed;
                true
            }
            WindowEvent::CursorMoved { position, .. } => {
                let new_pos = (position.x as f32, position.y as f32);
                if let (true, Some(old_pos)) = (self.dragging, self.cursor) {
                    camera.rotate(new_pos.0 - old_pos.0, new_pos.1 - old_pos.1, viewport_height);
                }
                self.cursor = Some(new_pos);
                self.dragging
            }
            WindowEvent::CursorLeft { .. } => {
                self.cursor = None;
                self.dragging = false;
                false
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let steps = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(p) => p.y as f32 / PIXELS_PER_ZOOM_STEP,
                };
                camera.zoom(steps);
                true
            }
            _ => false,
        }
    }
}
