use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use lumen_core::{load_scene, RendererConfig, RendererKind};
use lumen_math::Vec3;
use lumen_renderer::{RenderJob, Scene};

/// Render a JSON scene to a BMP file.
#[derive(Parser, Debug)]
#[command(name = "lumen", version, about)]
struct Args {
    /// Scene file (JSON)
    scene: PathBuf,

    /// Output image (BMP)
    #[arg(short, long, default_value = "render.bmp")]
    output: PathBuf,

    #[arg(long)]
    width: Option<u32>,

    #[arg(long)]
    height: Option<u32>,

    /// Samples per pixel
    #[arg(long)]
    spp: Option<u32>,

    /// Maximum path length
    #[arg(long)]
    bounces: Option<u32>,

    /// Radiance mapped to white
    #[arg(long)]
    white_point: Option<f32>,

    #[arg(short, long, value_enum)]
    kind: Option<KindArg>,

    /// Render on the calling thread instead of the worker
    #[arg(long)]
    sync: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum KindArg {
    Reference,
    Preview,
    Normals,
    Faces,
}

impl From<KindArg> for RendererKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Reference => RendererKind::Reference,
            KindArg::Preview => RendererKind::Preview,
            KindArg::Normals => RendererKind::Normals,
            KindArg::Faces => RendererKind::Faces,
        }
    }
}

impl Args {
    fn apply(&self, mut config: RendererConfig) -> RendererConfig {
        if let Some(width) = self.width {
            config.resolution_horizontal = width;
        }
        if let Some(height) = self.height {
            config.resolution_vertical = height;
        }
        if let Some(spp) = self.spp {
            config.samples_per_pixel = spp;
        }
        if let Some(bounces) = self.bounces {
            config.max_bounces = bounces;
        }
        if let Some(white_point) = self.white_point {
            config.white_point = white_point;
        }
        if let Some(kind) = self.kind {
            config.kind = kind.into();
        }
        config
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let args = Args::parse();

    let description =
        load_scene(&args.scene).with_context(|| format!("Failed to load scene {:?}", args.scene))?;
    let config = args.apply(description.renderer);
    if config.resolution_horizontal == 0 || config.resolution_vertical == 0 {
        bail!(
            "Invalid resolution {}x{}",
            config.resolution_horizontal,
            config.resolution_vertical
        );
    }

    // Keep the camera's image aspect in step with the output size
    let mut camera = description.camera;
    camera.aspect_ratio_w = config.resolution_horizontal as f32;
    camera.aspect_ratio_h = config.resolution_vertical as f32;

    let scene = Arc::new(Scene::from_description(&description));
    log::info!(
        "Rendering {:?} with {} objects from camera at {}",
        args.scene,
        scene.len(),
        fmt_vec(camera.location)
    );

    let job = if args.sync {
        RenderJob::new_sync(config.kind)
    } else {
        RenderJob::new(config.kind).context("Failed to start render worker")?
    };
    job.render_frame(&scene, &camera, &config);
    job.wait_for_idle(None);

    let stats = job.stats().context("Render job still busy")?;
    if job.frames_rendered() == 0 {
        bail!("No frame was rendered");
    }

    let start = Instant::now();
    job.save(&args.output)
        .with_context(|| format!("Failed to write {:?}", args.output))?;
    log::info!("Saved {:?}", args.output);

    log::info!(
        "Done: render {:.2?}, save {:.2?}, {} rays ({} object, {} box, {} triangle tests)",
        stats.render_time,
        start.elapsed(),
        stats.counters.rays,
        stats.counters.ray_object,
        stats.counters.ray_box,
        stats.counters.ray_triangle
    );
    Ok(())
}

fn fmt_vec(v: Vec3) -> String {
    format!("({:.2}, {:.2}, {:.2})", v.x, v.y, v.z)
}
