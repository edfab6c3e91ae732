//! Camera and orbit controls for the store map viewer

use nalgebra::{Matrix4, Perspective3, Point3, Vector3};
use std::f32::consts::PI;
use storemap_core::{CameraConfig, ControlsConfig};

const EPS: f32 = 1e-6;

/// Remap OpenGL clip depth (-1..1) to wgpu (0..1)
fn opengl_to_wgpu() -> Matrix4<f32> {
    #[rustfmt::skip]
    let m = Matrix4::new(
        1.0, 0.0, 0.0, 0.0,
        0.0, 1.0, 0.0, 0.0,
        0.0, 0.0, 0.5, 0.5,
        0.0, 0.0, 0.0, 1.0,
    );
    m
}

/// A perspective camera looking at a target point
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub position: Point3<f32>,
    pub target: Point3<f32>,
    pub up: Vector3<f32>,
    /// Vertical field of view in radians
    pub fov: f32,
    pub aspect_ratio: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    pub fn new(
        position: Point3<f32>,
        target: Point3<f32>,
        up: Vector3<f32>,
        fov: f32,
        aspect_ratio: f32,
        near: f32,
        far: f32,
    ) -> Self {
        Self {
            position,
            target,
            up,
            fov,
            aspect_ratio,
            near,
            far,
        }
    }

    pub fn from_config(config: &CameraConfig, aspect_ratio: f32) -> Self {
        Self::new(
            Point3::from(config.position),
            Point3::from(config.target),
            Vector3::y(),
            config.fov_degrees.to_radians(),
            aspect_ratio,
            config.near,
            config.far,
        )
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(&self.position, &self.target, &self.up)
    }

    /// Projection into wgpu clip space
    pub fn projection_matrix(&self) -> Matrix4<f32> {
        let perspective = Perspective3::new(self.aspect_ratio, self.fov, self.near, self.far);
        opengl_to_wgpu() * perspective.into_inner()
    }

    pub fn view_projection(&self) -> Matrix4<f32> {
        self.projection_matrix() * self.view_matrix()
    }

    pub fn set_aspect(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect_ratio = width as f32 / height as f32;
        }
    }

    pub fn distance(&self) -> f32 {
        (self.position - self.target).norm()
    }

    /// Camera right and up vectors in world space
    pub fn basis(&self) -> (Vector3<f32>, Vector3<f32>) {
        let forward = (self.target - self.position)
            .try_normalize(EPS)
            .unwrap_or_else(|| -Vector3::z());
        let right = forward
            .cross(&self.up)
            .try_normalize(EPS)
            .unwrap_or_else(Vector3::x);
        let up = right.cross(&forward);
        (right, up)
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::from_config(&CameraConfig::default(), 1200.0 / 800.0)
    }
}

/// Spherical coordinates around the Y axis
#[derive(Debug, Clone, Copy, PartialEq)]
struct Spherical {
    radius: f32,
    /// Azimuth measured from +Z towards +X
    theta: f32,
    /// Polar angle from +Y
    phi: f32,
}

impl Spherical {
    fn from_offset(offset: &Vector3<f32>) -> Self {
        let radius = offset.norm();
        if radius < EPS {
            return Self { radius: 0.0, theta: 0.0, phi: 0.0 };
        }
        Self {
            radius,
            theta: offset.x.atan2(offset.z),
            phi: (offset.y / radius).clamp(-1.0, 1.0).acos(),
        }
    }

    fn to_offset(self) -> Vector3<f32> {
        let sin_phi_radius = self.radius * self.phi.sin();
        Vector3::new(
            sin_phi_radius * self.theta.sin(),
            self.radius * self.phi.cos(),
            sin_phi_radius * self.theta.cos(),
        )
    }
}

/// Mouse-driven orbit, dolly and pan around a target.
///
/// Input calls accumulate deltas; [`OrbitControls::update`] applies them to
/// the camera once per frame. With damping the pending deltas decay by
/// `1 - damping_factor` per update instead of being consumed at once.
#[derive(Debug, Clone)]
pub struct OrbitControls {
    pub target: Point3<f32>,
    pub enable_damping: bool,
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub min_polar_angle: f32,
    pub max_polar_angle: f32,
    delta_theta: f32,
    delta_phi: f32,
    scale: f32,
    pan_offset: Vector3<f32>,
    saved_position: Point3<f32>,
    saved_target: Point3<f32>,
}

impl OrbitControls {
    /// Controls orbiting `camera.target`, saving the camera as the reset state
    pub fn new(camera: &Camera, config: &ControlsConfig) -> Self {
        Self {
            target: camera.target,
            enable_damping: config.enable_damping,
            damping_factor: config.damping_factor,
            rotate_speed: config.rotate_speed,
            zoom_speed: config.zoom_speed,
            pan_speed: config.pan_speed,
            min_distance: config.min_distance,
            max_distance: config.max_distance,
            min_polar_angle: 0.0,
            max_polar_angle: PI,
            delta_theta: 0.0,
            delta_phi: 0.0,
            scale: 1.0,
            pan_offset: Vector3::zeros(),
            saved_position: camera.position,
            saved_target: camera.target,
        }
    }

    /// Orbit by a pointer drag of `dx`, `dy` pixels
    pub fn rotate(&mut self, dx: f32, dy: f32, viewport_height: f32) {
        let height = viewport_height.max(1.0);
        self.delta_theta -= 2.0 * PI * dx / height * self.rotate_speed;
        self.delta_phi -= 2.0 * PI * dy / height * self.rotate_speed;
    }

    /// Dolly by wheel steps; positive steps move towards the target
    pub fn zoom(&mut self, steps: f32) {
        let step_scale = 0.95_f32.powf(self.zoom_speed);
        self.scale *= step_scale.powf(steps);
    }

    /// Move the target in screen space by a pointer drag of `dx`, `dy` pixels
    pub fn pan(&mut self, camera: &Camera, dx: f32, dy: f32, viewport_height: f32) {
        let height = viewport_height.max(1.0);
        let target_distance = (camera.position - self.target).norm() * (camera.fov / 2.0).tan();
        let left = 2.0 * dx * target_distance / height * self.pan_speed;
        let up = 2.0 * dy * target_distance / height * self.pan_speed;

        let (right_axis, up_axis) = camera.basis();
        self.pan_offset += -right_axis * left + up_axis * up;
    }

    /// Apply pending input to `camera`. Returns whether the camera moved.
    pub fn update(&mut self, camera: &mut Camera) -> bool {
        let factor = if self.enable_damping { self.damping_factor } else { 1.0 };

        let mut spherical = Spherical::from_offset(&(camera.position - self.target));
        spherical.theta += self.delta_theta * factor;
        spherical.phi += self.delta_phi * factor;
        spherical.phi = spherical
            .phi
            .clamp(self.min_polar_angle, self.max_polar_angle)
            .clamp(EPS, PI - EPS);
        spherical.radius = (spherical.radius * self.scale).clamp(self.min_distance, self.max_distance);

        self.target += self.pan_offset * factor;

        let previous = camera.position;
        camera.position = self.target + spherical.to_offset();
        camera.target = self.target;

        if self.enable_damping {
            self.delta_theta *= 1.0 - factor;
            self.delta_phi *= 1.0 - factor;
            self.pan_offset *= 1.0 - factor;
        } else {
            self.delta_theta = 0.0;
            self.delta_phi = 0.0;
            self.pan_offset = Vector3::zeros();
        }
        self.scale = 1.0;

        (camera.position - previous).norm_squared() > EPS
    }

    /// Remember the current camera as the reset state
    pub fn save_state(&mut self, camera: &Camera) {
        self.saved_position = camera.position;
        self.saved_target = self.target;
    }

    /// Restore the saved camera and drop pending motion
    pub fn reset(&mut self, camera: &mut Camera) {
        self.target = self.saved_target;
        camera.position = self.saved_position;
        camera.target = self.saved_target;
        self.delta_theta = 0.0;
        self.delta_phi = 0.0;
        self.scale = 1.0;
        self.pan_offset = Vector3::zeros();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn setup(enable_damping: bool) -> (Camera, OrbitControls) {
        let camera = Camera::default();
        let config = ControlsConfig {
            enable_damping,
            ..ControlsConfig::default()
        };
        let controls = OrbitControls::new(&camera, &config);
        (camera, controls)
    }

    fn azimuth(camera: &Camera) -> f32 {
        let offset = camera.position - camera.target;
        offset.x.atan2(offset.z)
    }

    #[test]
    fn test_default_camera_matches_config() {
        let camera = Camera::default();
        assert_eq!(camera.position, Point3::new(30.0, 30.0, 30.0));
        assert_eq!(camera.target, Point3::origin());
        assert_relative_eq!(camera.fov, 75.0_f32.to_radians());
        assert_relative_eq!(camera.aspect_ratio, 1.5);
    }

    #[test]
    fn test_projection_depth_range() {
        let camera = Camera::default();
        let proj = camera.projection_matrix();

        let near = proj * nalgebra::Vector4::new(0.0, 0.0, -camera.near, 1.0);
        let far = proj * nalgebra::Vector4::new(0.0, 0.0, -camera.far, 1.0);
        assert_relative_eq!(near.z / near.w, 0.0, epsilon = 1e-4);
        assert_relative_eq!(far.z / far.w, 1.0, epsilon = 1e-4);
    }

    #[test]
    fn test_rotate_without_damping_applies_fully() {
        let (mut camera, mut controls) = setup(false);
        let distance = camera.distance();

        // A quarter of the viewport height is a quarter turn
        controls.rotate(200.0, 0.0, 800.0);
        assert!(controls.update(&mut camera));

        assert_relative_eq!(azimuth(&camera), -PI / 4.0, epsilon = 1e-4);
        assert_relative_eq!(camera.distance(), distance, epsilon = 1e-3);
        assert!(!controls.update(&mut camera));
    }

    #[test]
    fn test_damping_spreads_rotation_over_frames() {
        let (mut camera, mut controls) = setup(true);
        controls.rotate(200.0, 0.0, 800.0);

        controls.update(&mut camera);
        let first_step = azimuth(&camera) - PI / 4.0;
        assert_relative_eq!(first_step, -PI / 2.0 * 0.05, epsilon = 1e-4);

        for _ in 0..600 {
            controls.update(&mut camera);
        }
        assert_relative_eq!(azimuth(&camera), -PI / 4.0, epsilon = 1e-3);
        assert!(!controls.update(&mut camera));
    }

    #[test]
    fn test_polar_angle_stays_off_the_pole() {
        let (mut camera, mut controls) = setup(false);
        controls.rotate(0.0, 10_000.0, 800.0);
        controls.update(&mut camera);

        let offset = camera.position - camera.target;
        assert!(offset.y > 0.0);
        assert!(offset.x.abs() + offset.z.abs() > 0.0);
        assert!(camera.position.iter().all(|c| c.is_finite()));
    }

    #[test]
    fn test_zoom_is_clamped_to_distance_limits() {
        let (mut camera, mut controls) = setup(false);

        controls.zoom(1000.0);
        controls.update(&mut camera);
        assert_relative_eq!(camera.distance(), 1.0, epsilon = 1e-4);

        controls.zoom(-1000.0);
        controls.update(&mut camera);
        assert_relative_eq!(camera.distance(), 500.0, epsilon = 1e-2);
    }

    #[test]
    fn test_zoom_in_moves_closer() {
        let (mut camera, mut controls) = setup(false);
        let before = camera.distance();
        controls.zoom(1.0);
        controls.update(&mut camera);
        assert_relative_eq!(camera.distance(), before * 0.95, epsilon = 1e-3);
    }

    #[test]
    fn test_pan_moves_target_and_camera_together() {
        let (mut camera, mut controls) = setup(false);
        let offset_before = camera.position - camera.target;

        controls.pan(&camera, 100.0, 50.0, 800.0);
        controls.update(&mut camera);

        assert!(camera.target != Point3::origin());
        let offset_after = camera.position - camera.target;
        assert_relative_eq!(offset_after, offset_before, epsilon = 1e-3);
        assert_eq!(controls.target, camera.target);
    }

    #[test]
    fn test_reset_restores_initial_camera() {
        let (mut camera, mut controls) = setup(true);
        let initial = camera.clone();

        controls.rotate(120.0, -40.0, 800.0);
        controls.zoom(3.0);
        controls.pan(&camera, 10.0, 10.0, 800.0);
        for _ in 0..10 {
            controls.update(&mut camera);
        }
        assert!(camera.position != initial.position);

        controls.reset(&mut camera);
        assert_eq!(camera.position, initial.position);
        assert_eq!(camera.target, initial.target);
        assert!(!controls.update(&mut camera));
    }

    #[test]
    fn test_aspect_ignores_zero_size() {
        let mut camera = Camera::default();
        camera.set_aspect(0, 600);
        assert_relative_eq!(camera.aspect_ratio, 1.5);
        camera.set_aspect(800, 800);
        assert_relative_eq!(camera.aspect_ratio, 1.0);
    }
}
