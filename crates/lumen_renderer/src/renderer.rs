//! Frame renderers.
//!
//! A frame renderer turns one job snapshot into pixels. The job controller
//! owns exactly one and drives it from its worker thread.

use std::sync::Arc;

use lumen_core::{CameraConfig, RendererConfig, RendererKind};
use lumen_math::StructuralHash;

use crate::camera::Camera;
use crate::frame::Frame;
use crate::integrator::ReferenceRenderer;
use crate::preview::{FacesRenderer, NormalsRenderer, PreviewRenderer};
use crate::scene::Scene;
use crate::stats::RayCounters;

/// Inputs of one frame, frozen when the frame is requested.
#[derive(Clone)]
pub struct JobSnapshot {
    pub scene: Arc<Scene>,
    pub camera: Camera,
    pub config: RendererConfig,
    pub scene_hash: u32,
    pub config_hash: u32,
}

impl JobSnapshot {
    pub fn new(scene: Arc<Scene>, camera: &CameraConfig, config: &RendererConfig) -> Self {
        Self {
            scene_hash: scene.structural_hash(),
            scene,
            camera: Camera::new(camera),
            config: *config,
            config_hash: config.structural_hash(),
        }
    }

    pub fn camera_hash(&self) -> u32 {
        self.camera.config_hash()
    }
}

/// Renders a whole frame.
pub trait FrameRenderer: Send {
    fn kind(&self) -> RendererKind;

    /// Fill `frame`, which already has the snapshot's resolution.
    fn render(&mut self, job: &JobSnapshot, frame: &mut Frame) -> RayCounters;
}

/// Instantiate the renderer for `kind`.
pub fn create_renderer(kind: RendererKind) -> Box<dyn FrameRenderer> {
    match kind {
        RendererKind::Reference => Box::new(ReferenceRenderer::new()),
        RendererKind::Preview => Box::new(PreviewRenderer::new()),
        RendererKind::Normals => Box::new(NormalsRenderer::new()),
        RendererKind::Faces => Box::new(FacesRenderer::new()),
    }
}

/// Focus-plane coordinates of image position `(x, y)` in pixels.
#[inline]
pub(crate) fn pixel_uv(x: f32, y: f32, width: u32, height: u32) -> (f32, f32) {
    (x / width.max(1) as f32, y / height.max(1) as f32)
}
