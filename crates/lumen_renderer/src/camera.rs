//! Thin-lens camera for ray generation.
//!
//! Built once per frame from a [`CameraConfig`]. Rays start on the camera
//! plane (a disk of the aperture's size around the eye) and aim at the
//! matching point of the focus plane, so only geometry at the focus distance
//! stays sharp.

use lumen_core::CameraConfig;
use lumen_math::{Quat, Ray, StructuralHash, Vec2, Vec3};

/// Pitch is kept away from the poles so the basis stays defined.
const MAX_PITCH_DEGREES: f32 = 89.0;

/// Immutable ray-generation basis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    origin: Vec3,
    forward: Vec3,
    right: Vec3,
    up: Vec3,

    // Focus plane, parametrized by (u, v) in [0, 1]
    lower_left: Vec3,
    horizontal: Vec3,
    vertical: Vec3,

    lens_radius: f32,
    config_hash: u32,
}

impl Camera {
    pub fn new(config: &CameraConfig) -> Self {
        let pitch = config.pitch.clamp(-MAX_PITCH_DEGREES, MAX_PITCH_DEGREES);
        let rotation =
            Quat::from_rotation_y(config.yaw.to_radians()) * Quat::from_rotation_x(pitch.to_radians());

        let forward = (rotation * Vec3::NEG_Z).normalize();
        let right = forward.cross(Vec3::Y).normalize();
        let up = right.cross(forward);

        let focus_distance = config.focus_distance.max(1e-3);
        let half_height = (config.field_of_view.to_radians() * 0.5).tan() * focus_distance;
        let half_width = half_height * config.aspect_ratio();

        let center = config.location + forward * focus_distance;
        let lower_left = center - right * half_width - up * half_height;

        Self {
            origin: config.location,
            forward,
            right,
            up,
            lower_left,
            horizontal: right * (2.0 * half_width),
            vertical: up * (2.0 * half_height),
            lens_radius: config.aperture.max(0.0) * 0.5,
            config_hash: config.structural_hash(),
        }
    }

    /// Ray through focus-plane coordinates `(u, v)`, with `(0, 0)` at the
    /// bottom left. `lens` is a point in the unit disk, ignored when the
    /// aperture is zero.
    pub fn get_ray(&self, u: f32, v: f32, lens: Vec2) -> Ray {
        let offset = (self.right * lens.x + self.up * lens.y) * self.lens_radius;
        let origin = self.origin + offset;
        let target = self.lower_left + self.horizontal * u + self.vertical * v;
        Ray::new(origin, (target - origin).normalize())
    }

    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    pub fn forward(&self) -> Vec3 {
        self.forward
    }

    pub fn right(&self) -> Vec3 {
        self.right
    }

    pub fn up(&self) -> Vec3 {
        self.up
    }

    pub fn has_depth_of_field(&self) -> bool {
        self.lens_radius > 0.0
    }

    /// Hash of the configuration this camera was built from.
    pub fn config_hash(&self) -> u32 {
        self.config_hash
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(&CameraConfig::default())
    }
}
