//! Camera and renderer settings.
//!
//! Both are plain values the caller owns and edits freely. The job
//! controller snapshots them when a frame starts and compares structural
//! hashes afterwards to tell whether a re-render is needed.

use lumen_math::hash::{self, StructuralHash};
use lumen_math::Vec3;
use serde::{Deserialize, Serialize};

/// Thin-lens camera settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Eye position
    pub location: Vec3,
    /// Rotation around +Y in degrees, 0 looks down -Z
    pub yaw: f32,
    /// Rotation around the camera's right axis in degrees, positive looks up
    pub pitch: f32,
    /// Vertical field of view in degrees
    pub field_of_view: f32,
    pub aspect_ratio_w: f32,
    pub aspect_ratio_h: f32,
    /// Lens diameter, 0 disables depth of field
    pub aperture: f32,
    /// Distance from the eye to the plane of perfect focus
    pub focus_distance: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            location: Vec3::ZERO,
            yaw: 0.0,
            pitch: 0.0,
            field_of_view: 70.0,
            aspect_ratio_w: 16.0,
            aspect_ratio_h: 9.0,
            aperture: 0.0,
            focus_distance: 1.0,
        }
    }
}

impl CameraConfig {
    pub fn new(location: Vec3, field_of_view: f32, aspect_ratio_w: f32, aspect_ratio_h: f32) -> Self {
        Self {
            location,
            field_of_view,
            aspect_ratio_w,
            aspect_ratio_h,
            ..Default::default()
        }
    }

    /// Set yaw and pitch in degrees.
    pub fn with_rotation(mut self, yaw: f32, pitch: f32) -> Self {
        self.yaw = yaw;
        self.pitch = pitch;
        self
    }

    /// Set lens settings.
    pub fn with_lens(mut self, aperture: f32, focus_distance: f32) -> Self {
        self.aperture = aperture;
        self.focus_distance = focus_distance;
        self
    }

    /// Width over height.
    pub fn aspect_ratio(&self) -> f32 {
        if self.aspect_ratio_h > 0.0 {
            self.aspect_ratio_w / self.aspect_ratio_h
        } else {
            1.0
        }
    }
}

impl StructuralHash for CameraConfig {
    fn structural_hash(&self) -> u32 {
        hash::combine_all(&[
            hash::of_vec3(self.location),
            hash::of_f32(self.yaw),
            hash::of_f32(self.pitch),
            hash::of_f32(self.field_of_view),
            hash::of_f32(self.aspect_ratio_w),
            hash::of_f32(self.aspect_ratio_h),
            hash::of_f32(self.aperture),
            hash::of_f32(self.focus_distance),
        ])
    }
}

/// Which frame renderer processes the job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RendererKind {
    /// Monte Carlo path tracer
    #[default]
    Reference,
    /// Single bounce toward the first light with hard shadows
    Preview,
    /// Surface normals as colors
    Normals,
    /// Flat color per object face
    Faces,
}

/// How the image is partitioned into parallel work items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChunkStrategy {
    /// Near-square tiles
    #[default]
    Rectangles,
    /// Full-height columns
    VerticalStripes,
}

/// Render settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    /// Samples per pixel for anti-aliasing
    pub samples_per_pixel: u32,
    /// Maximum number of bounces per path
    pub max_bounces: u32,
    pub resolution_horizontal: u32,
    pub resolution_vertical: u32,
    /// Draw into the same buffers between frames when the resolution holds
    pub reuse_buffer: bool,
    /// Brightest radiance mapped to white by tone mapping
    pub white_point: f32,
    pub kind: RendererKind,
    pub chunk_strategy: ChunkStrategy,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            samples_per_pixel: 20,
            max_bounces: 7,
            resolution_horizontal: 640,
            resolution_vertical: 360,
            reuse_buffer: true,
            white_point: 1.0,
            kind: RendererKind::Reference,
            chunk_strategy: ChunkStrategy::Rectangles,
        }
    }
}

impl RendererConfig {
    /// Set output resolution.
    pub fn with_resolution(mut self, width: u32, height: u32) -> Self {
        self.resolution_horizontal = width;
        self.resolution_vertical = height;
        self
    }

    /// Set quality settings.
    pub fn with_quality(mut self, samples_per_pixel: u32, max_bounces: u32) -> Self {
        self.samples_per_pixel = samples_per_pixel;
        self.max_bounces = max_bounces;
        self
    }

    pub fn with_kind(mut self, kind: RendererKind) -> Self {
        self.kind = kind;
        self
    }
}

impl StructuralHash for RendererConfig {
    /// `kind` and `chunk_strategy` are left out; see `is_renderer_type_different`.
    fn structural_hash(&self) -> u32 {
        hash::combine_all(&[
            self.samples_per_pixel,
            self.max_bounces,
            hash::of_bool(self.reuse_buffer),
            self.resolution_horizontal,
            self.resolution_vertical,
            hash::of_f32(self.white_point),
        ])
    }
}
