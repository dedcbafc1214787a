//! Reference path tracer.
//!
//! Monte Carlo path tracing with:
//! - A universal material mixing diffuse, glossy and refractive bounces
//! - Emissive lights that terminate paths
//! - A sky gradient for rays leaving the scene
//! - Extended Reinhard tone mapping per pixel
//!
//! Paths whose throughput drops below [`MIN_THROUGHPUT_SQ`] stop early
//! without reweighting, which darkens the image slightly.

use lumen_core::{Color, Material, RendererKind};
use lumen_math::{lerp_vec3, reflect, refract, smoothstep, Interval, Ray, Vec2, Vec3};

use crate::chunk::{render_chunks, PixelContext};
use crate::frame::Frame;
use crate::renderer::{pixel_uv, FrameRenderer, JobSnapshot};
use crate::scene::Scene;
use crate::stats::RayCounters;
use crate::tonemap;

/// Squared throughput below which a path is abandoned.
pub const MIN_THROUGHPUT_SQ: f32 = 0.1;

const SKY_ZENITH: Color = Color::new(0.5, 0.7, 1.0);
const SKY_HORIZON: Color = Color::ONE;
const SKY_BRIGHTNESS: f32 = 0.4;

/// Sky color seen along `ray`.
pub fn environment_light(ray: &Ray) -> Color {
    let t = smoothstep(-0.6, 0.2, ray.direction().y);
    let light = lerp_vec3(SKY_HORIZON, SKY_ZENITH, t);
    light.clamp(Color::ZERO, Color::ONE) * SKY_BRIGHTNESS
}

/// The reference path tracer.
#[derive(Debug, Default)]
pub struct ReferenceRenderer;

impl ReferenceRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl FrameRenderer for ReferenceRenderer {
    fn kind(&self) -> RendererKind {
        RendererKind::Reference
    }

    fn render(&mut self, job: &JobSnapshot, frame: &mut Frame) -> RayCounters {
        let white_point = job.config.white_point;
        render_chunks(frame, job.config.chunk_strategy, |ctx, x, y| {
            let hdr = fragment(job, ctx, x, y);
            tonemap::reinhard_extended(hdr, white_point)
        })
    }
}

/// Average HDR radiance of pixel `(x, y)`.
pub fn fragment(job: &JobSnapshot, ctx: &mut PixelContext<'_>, x: u32, y: u32) -> Color {
    let (width, height) = (job.config.resolution_horizontal, job.config.resolution_vertical);
    let samples = job.config.samples_per_pixel.max(1);
    let seed = y.wrapping_mul(width).wrapping_add(x);

    let mut sum = Color::ZERO;
    for _ in 0..samples {
        // Anti-aliasing jitter
        let jx = ctx.rng.pcg(seed);
        let jy = ctx.rng.pcg(seed);
        let (u, v) = pixel_uv(x as f32 + jx, y as f32 + jy, width, height);

        let lens = if job.camera.has_depth_of_field() {
            ctx.cursor.in_unit_disk()
        } else {
            Vec2::ZERO
        };
        let ray = job.camera.get_ray(u, v, lens);
        sum += trace_ray(&job.scene, ray, job.config.max_bounces, ctx);
    }

    sum / samples as f32
}

/// Follow one path for up to `max_bounces` segments and return the radiance
/// it carries back.
pub fn trace_ray(scene: &Scene, mut ray: Ray, max_bounces: u32, ctx: &mut PixelContext<'_>) -> Color {
    // Product of surface colors along the path, [0, 1]
    let mut ray_color = Color::ONE;
    // Emitted light gathered along the path, unbounded
    let mut incoming_light = Color::ZERO;

    for _ in 0..max_bounces {
        ctx.counters.rays += 1;
        let Some(hit) = scene.intersect(&ray, Interval::forward(), &mut ctx.counters) else {
            incoming_light += environment_light(&ray) * ray_color;
            break;
        };

        let material: &Material = scene.material(hit.material);
        if material.is_light() {
            incoming_light += material.emitted_color * ray_color;
            break;
        }

        if ray_color.length_squared() < MIN_THROUGHPUT_SQ {
            break;
        }

        let rec = hit.record;
        let gloss = ctx.cursor.chance(material.gloss_probability);
        let refracts = ctx.cursor.chance(material.refraction_probability);
        let diffuse_dir = (rec.normal + ctx.cursor.unit_vector())
            .try_normalize()
            .unwrap_or(rec.normal);

        ray.origin = rec.p;

        if refracts && !gloss {
            let eta = if rec.front_face {
                1.0 / material.refraction_index
            } else {
                material.refraction_index
            };
            let refraction_dir = refract(ray.direction(), rec.normal, eta);
            let direction = refraction_dir + diffuse_dir * (1.0 - material.smoothness);
            ray.direction = direction.try_normalize().unwrap_or(refraction_dir);
            ray_color *= material.color;
            continue;
        }

        let specular_dir = reflect(ray.direction(), rec.normal);
        let blend = if material.gloss_probability > 0.0 {
            if gloss {
                material.smoothness
            } else {
                0.0
            }
        } else {
            material.smoothness
        };
        let direction = lerp_vec3(diffuse_dir, specular_dir, blend);
        ray.direction = direction.try_normalize().unwrap_or(rec.normal);

        incoming_light += material.emitted_color * ray_color;
        ray_color *= if gloss { material.gloss_color } else { material.color };
    }

    incoming_light
}
