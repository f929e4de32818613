use std::f32::consts::PI;

use glam::{Mat4, Vec3};

use crate::types::CameraUniform;

pub const DEFAULT_FOV_DEGREES: f32 = 75.0;
pub const NEAR_PLANE: f32 = 0.1;
pub const FAR_PLANE: f32 = 1000.0;
pub const HOME_POSITION: Vec3 = Vec3::new(0.0, 0.0, 5.0);
pub const DAMPING_FACTOR: f32 = 0.05;
pub const MIN_DISTANCE: f32 = 0.5;
pub const MAX_DISTANCE: f32 = 100.0;

const ZOOM_STEP: f32 = 0.95;
const POLE_EPSILON: f32 = 1e-3;

/// Perspective camera orbiting a target with damped rotation.
///
/// Position is kept in spherical coordinates around `target`:
/// `theta` turns about +Y starting from +Z, `phi` is the polar angle from +Y.
#[derive(Clone, Debug)]
pub struct OrbitCamera {
    pub target: Vec3,
    pub fov_y: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub damping_factor: f32,
    theta: f32,
    phi: f32,
    distance: f32,
    theta_delta: f32,
    phi_delta: f32,
}

impl OrbitCamera {
    pub fn new(aspect: f32) -> Self {
        let mut camera = Self {
            target: Vec3::ZERO,
            fov_y: DEFAULT_FOV_DEGREES.to_radians(),
            aspect,
            near: NEAR_PLANE,
            far: FAR_PLANE,
            damping_factor: DAMPING_FACTOR,
            theta: 0.0,
            phi: PI / 2.0,
            distance: HOME_POSITION.length(),
            theta_delta: 0.0,
            phi_delta: 0.0,
        };
        camera.look_from(HOME_POSITION);
        camera
    }

    /// Place the camera at `position`, keeping the current target
    pub fn look_from(&mut self, position: Vec3) {
        let offset = position - self.target;
        self.distance = offset.length().clamp(MIN_DISTANCE, MAX_DISTANCE);
        self.theta = offset.x.atan2(offset.z);
        self.phi = (offset.y / offset.length().max(f32::EPSILON))
            .clamp(-1.0, 1.0)
            .acos();
        self.theta_delta = 0.0;
        self.phi_delta = 0.0;
    }

    /// Back to (0, 0, 5) looking at the origin
    pub fn reset(&mut self) {
        self.target = Vec3::ZERO;
        self.look_from(HOME_POSITION);
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
    }

    /// Queue an orbit from a cursor drag measured in pixels
    pub fn rotate(&mut self, dx: f32, dy: f32, viewport_height: f32) {
        let height = viewport_height.max(1.0);
        self.theta_delta -= 2.0 * PI * dx / height;
        self.phi_delta -= 2.0 * PI * dy / height;
    }

    /// Positive `steps` move closer
    pub fn zoom(&mut self, steps: f32) {
        self.distance = (self.distance * ZOOM_STEP.powf(steps)).clamp(MIN_DISTANCE, MAX_DISTANCE);
    }

    /// Apply one frame of damped motion
    pub fn update(&mut self) {
        self.theta += self.theta_delta * self.damping_factor;
        self.phi = (self.phi + self.phi_delta * self.damping_factor)
            .clamp(POLE_EPSILON, PI - POLE_EPSILON);

        self.theta_delta *= 1.0 - self.damping_factor;
        self.phi_delta *= 1.0 - self.damping_factor;
    }

    pub fn is_settled(&self) -> bool {
        self.theta_delta.abs() < 1e-6 && self.phi_delta.abs() < 1e-6
    }

    pub fn distance(&self) -> f32 {
        self.distance
    }

    pub fn position(&self) -> Vec3 {
        let sin_phi = self.phi.sin();
        self.target
            + Vec3::new(
                self.distance * sin_phi * self.theta.sin(),
                self.distance * self.phi.cos(),
                self.distance * sin_phi * self.theta.cos(),
            )
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position(), self.target, Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect, self.near, self.far)
    }

    pub fn to_uniform(&self) -> CameraUniform {
        let eye = self.position();
        CameraUniform {
            view_proj: (self.projection_matrix() * self.view_matrix()).to_cols_array_2d(),
            eye: [eye.x, eye.y, eye.z, 1.0],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_home_position() {
        let camera = OrbitCamera::new(800.0 / 600.0);
        assert!(camera.position().abs_diff_eq(HOME_POSITION, 1e-5));
        assert_eq!(camera.target, Vec3::ZERO);
    }

    #[test]
    fn damping_spreads_rotation_over_frames() {
        let mut camera = OrbitCamera::new(1.0);
        camera.rotate(100.0, 0.0, 600.0);

        camera.update();
        let after_one = camera.position();
        assert!(!after_one.abs_diff_eq(HOME_POSITION, 1e-6));
        assert!(!camera.is_settled());

        for _ in 0..1000 {
            camera.update();
        }
        assert!(camera.is_settled());
        assert!((camera.position().length() - 5.0).abs() < 1e-4);
    }

    #[test]
    fn pitch_never_flips_over_the_pole() {
        let mut camera = OrbitCamera::new(1.0);
        camera.rotate(0.0, 100_000.0, 600.0);
        for _ in 0..500 {
            camera.update();
        }
        assert!(camera.position().y.abs() < 5.0);
    }

    #[test]
    fn zoom_is_clamped() {
        let mut camera = OrbitCamera::new(1.0);
        camera.zoom(1000.0);
        assert_eq!(camera.distance(), MIN_DISTANCE);
        camera.zoom(-10_000.0);
        assert_eq!(camera.distance(), MAX_DISTANCE);
    }

    #[test]
    fn reset_restores_target_and_position() {
        let mut camera = OrbitCamera::new(1.0);
        camera.target = Vec3::new(1.0, 2.0, 3.0);
        camera.rotate(50.0, 20.0, 600.0);
        camera.update();

        camera.reset();

        assert_eq!(camera.target, Vec3::ZERO);
        assert!(camera.position().abs_diff_eq(HOME_POSITION, 1e-5));
        assert!(camera.is_settled());
    }
}
