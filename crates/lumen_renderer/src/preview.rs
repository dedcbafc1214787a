//! Fast diagnostic renderers: one camera ray per pixel, no tone mapping.

use lumen_core::{Color, RendererKind};
use lumen_math::{Interval, Vec2};

use crate::chunk::render_chunks;
use crate::frame::Frame;
use crate::renderer::{pixel_uv, FrameRenderer, JobSnapshot};
use crate::stats::RayCounters;

/// Minimum distance for preview rays.
const PREVIEW_T_MIN: f32 = 0.01;

/// Lambert toward the first light with hard shadows.
#[derive(Debug, Default)]
pub struct PreviewRenderer;

impl PreviewRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl FrameRenderer for PreviewRenderer {
    fn kind(&self) -> RendererKind {
        RendererKind::Preview
    }

    fn render(&mut self, job: &JobSnapshot, frame: &mut Frame) -> RayCounters {
        let scene = &job.scene;
        let Some(light) = scene
            .query_lights()
            .first()
            .and_then(|&id| scene.object(id))
            .map(|object| object.shape.origin())
        else {
            log::error!("Preview needs at least one light source");
            return RayCounters::default();
        };

        let (width, height) = frame.resolution();
        let ray_t = Interval::new(PREVIEW_T_MIN, f32::INFINITY);
        render_chunks(frame, job.config.chunk_strategy, |ctx, x, y| {
            let (u, v) = pixel_uv(x as f32 + 0.5, y as f32 + 0.5, width, height);
            let mut ray = job.camera.get_ray(u, v, Vec2::ZERO);

            ctx.counters.rays += 1;
            let Some(hit) = scene.intersect(&ray, ray_t, &mut ctx.counters) else {
                return Color::ZERO;
            };

            let light_dir = (light - hit.record.p).normalize_or_zero();
            ray.origin = hit.record.p;
            ray.direction = light_dir;

            ctx.counters.rays += 1;
            let in_shadow = scene
                .intersect(&ray, ray_t, &mut ctx.counters)
                .is_some_and(|shadow| !scene.material(shadow.material).is_light());

            let color = scene.material(hit.material).color * hit.record.normal.dot(light_dir).max(0.2);
            if in_shadow {
                color * 0.9
            } else {
                color
            }
        })
    }
}

/// Surface normals mapped to colors.
#[derive(Debug, Default)]
pub struct NormalsRenderer;

impl NormalsRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl FrameRenderer for NormalsRenderer {
    fn kind(&self) -> RendererKind {
        RendererKind::Normals
    }

    fn render(&mut self, job: &JobSnapshot, frame: &mut Frame) -> RayCounters {
        let (width, height) = frame.resolution();
        let ray_t = Interval::new(PREVIEW_T_MIN, f32::INFINITY);
        render_chunks(frame, job.config.chunk_strategy, |ctx, x, y| {
            let (u, v) = pixel_uv(x as f32 + 0.5, y as f32 + 0.5, width, height);
            let ray = job.camera.get_ray(u, v, Vec2::ZERO);
            ctx.counters.rays += 1;
            match job.scene.intersect(&ray, ray_t, &mut ctx.counters) {
                Some(hit) => (hit.record.normal + Color::ONE) * 0.5,
                None => Color::ZERO,
            }
        })
    }
}

/// Colors cycled through by [`FacesRenderer`].
pub const FACE_PALETTE: [Color; 8] = [
    Color::new(1.0, 0.0, 0.0),
    Color::new(0.0, 1.0, 0.0),
    Color::new(0.0, 0.0, 1.0),
    Color::new(1.0, 1.0, 0.0),
    Color::new(0.0, 1.0, 1.0),
    Color::new(1.0, 0.0, 1.0),
    Color::new(1.0, 0.5, 0.0),
    Color::new(0.5, 0.7, 1.0),
];

/// Flat color per object face.
#[derive(Debug, Default)]
pub struct FacesRenderer;

impl FacesRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl FrameRenderer for FacesRenderer {
    fn kind(&self) -> RendererKind {
        RendererKind::Faces
    }

    fn render(&mut self, job: &JobSnapshot, frame: &mut Frame) -> RayCounters {
        let (width, height) = frame.resolution();
        let ray_t = Interval::new(PREVIEW_T_MIN, f32::INFINITY);
        render_chunks(frame, job.config.chunk_strategy, |ctx, x, y| {
            let (u, v) = pixel_uv(x as f32 + 0.5, y as f32 + 0.5, width, height);
            let ray = job.camera.get_ray(u, v, Vec2::ZERO);
            ctx.counters.rays += 1;
            match job.scene.intersect(&ray, ray_t, &mut ctx.counters) {
                Some(hit) => {
                    let index = (hit.object.0 as usize + hit.record.face_id as usize) % FACE_PALETTE.len();
                    FACE_PALETTE[index]
                }
                None => Color::ZERO,
            }
        })
    }
}
