//! Simple path tracer example.
//!
//! Renders a small Cornell-style box through the asynchronous job
//! controller and saves it as `output.bmp`.

use std::sync::Arc;
use std::time::Instant;

use lumen_renderer::{
    AxisAlignedRect, CameraConfig, Color, Material, RenderJob, RendererConfig, RendererKind, Scene,
    Sphere, Vec3,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let start = Instant::now();
    let scene = Arc::new(build_scene());
    log::info!("Scene built in {:?}", start.elapsed());

    let config = RendererConfig::default()
        .with_resolution(400, 300)
        .with_quality(64, 8)
        .with_kind(RendererKind::Reference);
    let camera = CameraConfig::new(Vec3::new(0.0, 1.0, 3.4), 45.0, 4.0, 3.0);

    let job = RenderJob::new(config.kind)?;
    job.set_output_path(Some("output.bmp".into()));
    job.render_frame(&scene, &camera, &config);

    // A viewer would poll once per UI tick instead
    job.wait_for_idle(None);

    if let Some(stats) = job.stats() {
        log::info!(
            "Rendered in {:?}, saved in {:?}, {} rays",
            stats.render_time,
            stats.save_time,
            stats.counters.rays
        );
    }
    Ok(())
}

fn build_scene() -> Scene {
    let mut scene = Scene::new();

    let white = scene.add_material(Material::diffuse("white", Color::splat(0.73)));
    let red = scene.add_material(Material::diffuse("red", Color::new(0.65, 0.05, 0.05)));
    let green = scene.add_material(Material::diffuse("green", Color::new(0.12, 0.45, 0.15)));
    let lamp = scene.add_material(Material::light("lamp", Color::splat(6.0)));
    let glass = scene.add_material(
        Material::diffuse("glass", Color::splat(0.95))
            .with_refraction(0.9, 1.5)
            .with_smoothness(1.0),
    );
    let chrome = scene.add_material(
        Material::diffuse("chrome", Color::splat(0.8))
            .with_gloss(Color::ONE, 0.6)
            .with_smoothness(0.95),
    );

    // Box spanning [-1, 1] x [0, 2] x [-1, 1], open toward the camera
    scene.add("floor", AxisAlignedRect::xz(-1.0, 1.0, -1.0, 1.0, 0.0), white);
    scene.add("ceiling", AxisAlignedRect::xz(-1.0, 1.0, -1.0, 1.0, 2.0), white);
    scene.add("back", AxisAlignedRect::xy(-1.0, 1.0, 0.0, 2.0, -1.0), white);
    scene.add("left", AxisAlignedRect::yz(0.0, 2.0, -1.0, 1.0, -1.0), red);
    scene.add("right", AxisAlignedRect::yz(0.0, 2.0, -1.0, 1.0, 1.0), green);
    scene.add("lamp", AxisAlignedRect::xz(-0.3, 0.3, -0.3, 0.3, 1.99), lamp);

    scene.add("glass ball", Sphere::new(Vec3::new(-0.4, 0.35, 0.1), 0.35), glass);
    scene.add("chrome ball", Sphere::new(Vec3::new(0.45, 0.3, -0.3), 0.3), chrome);

    scene
}
