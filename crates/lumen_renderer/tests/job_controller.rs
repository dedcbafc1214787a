//! Worker-thread behavior of the render job controller.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{unbounded, Receiver, Sender};
use lumen_renderer::{
    CameraConfig, Color, Frame, FrameRenderer, JobSnapshot, Material, RayCounters, RenderJob,
    RendererConfig, RendererKind, Scene, Sphere, StructuralHash, Vec3,
};

const TIMEOUT: Duration = Duration::from_secs(10);

/// Blocks inside `render` until the test opens the gate.
struct GatedRenderer {
    started: Sender<u32>,
    gate: Receiver<()>,
}

impl FrameRenderer for GatedRenderer {
    fn kind(&self) -> RendererKind {
        RendererKind::Preview
    }

    fn render(&mut self, job: &JobSnapshot, frame: &mut Frame) -> RayCounters {
        let _ = self.started.send(job.camera_hash());
        let _ = self.gate.recv();
        frame.put_pixel(0, 0, Color::ONE);
        RayCounters {
            rays: 1,
            ..Default::default()
        }
    }
}

fn gated_job() -> (RenderJob, Receiver<u32>, Sender<()>) {
    let (started_tx, started_rx) = unbounded();
    let (gate_tx, gate_rx) = unbounded();
    let renderer = GatedRenderer {
        started: started_tx,
        gate: gate_rx,
    };
    let job = RenderJob::with_renderer(Box::new(renderer)).unwrap();
    (job, started_rx, gate_tx)
}

fn scene() -> Arc<Scene> {
    let mut scene = Scene::new();
    let lamp = scene.add_material(Material::light("lamp", Color::ONE));
    scene.add("lamp", Sphere::new(Vec3::new(0.0, 0.0, -5.0), 1.0), lamp);
    Arc::new(scene)
}

fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
    let start = Instant::now();
    while !condition() {
        if start.elapsed() > TIMEOUT {
            return false;
        }
        thread::sleep(Duration::from_millis(1));
    }
    true
}

#[test]
fn second_request_while_working_is_dropped() {
    let (job, started, gate) = gated_job();
    assert!(job.is_async());
    let scene = scene();
    let config = RendererConfig::default().with_resolution(4, 4);
    let first = CameraConfig::new(Vec3::ZERO, 60.0, 1.0, 1.0);
    let second = first.with_rotation(30.0, 0.0);

    job.render_frame(&scene, &first, &config);
    started.recv_timeout(TIMEOUT).unwrap();

    assert!(job.is_working());
    assert!(job.stats().is_none());
    assert!(job.with_frame(|frame| frame.resolution()).is_none());
    assert!(job.save(std::env::temp_dir().join("lumen-busy.bmp")).is_err());

    // Ignored: the snapshot keeps the first camera
    job.render_frame(&scene, &second, &config);
    job.set_job_state(&scene, &second, &config.with_resolution(8, 8));

    gate.send(()).unwrap();
    assert!(job.wait_for_idle(Some(TIMEOUT)));

    assert_eq!(job.frames_rendered(), 1);
    assert!(!job.is_camera_setting_dirty(&first));
    assert!(job.is_camera_setting_dirty(&second));
    assert_eq!(job.with_frame(|frame| frame.resolution()), Some((4, 4)));
    assert_eq!(job.stats().unwrap().counters.rays, 1);

    // The worker did not start another frame on its own
    assert!(started.recv_timeout(Duration::from_millis(100)).is_err());
}

#[test]
fn worker_renders_again_after_idle() {
    let (job, started, gate) = gated_job();
    let scene = scene();
    let config = RendererConfig::default().with_resolution(2, 2);
    let first = CameraConfig::default();
    let second = first.with_rotation(90.0, 0.0);

    job.render_frame(&scene, &first, &config);
    assert_eq!(started.recv_timeout(TIMEOUT).unwrap(), first.structural_hash());
    gate.send(()).unwrap();
    assert!(job.wait_for_idle(Some(TIMEOUT)));

    job.render_frame(&scene, &second, &config);
    assert_eq!(started.recv_timeout(TIMEOUT).unwrap(), second.structural_hash());
    gate.send(()).unwrap();
    assert!(job.wait_for_idle(Some(TIMEOUT)));

    assert_eq!(job.frames_rendered(), 2);
    assert!(!job.is_camera_setting_dirty(&second));
}

#[test]
fn wait_for_idle_blocks_until_frame_finishes() {
    let (job, started, gate) = gated_job();
    let scene = scene();
    let camera = CameraConfig::default();
    let config = RendererConfig::default().with_resolution(2, 2);

    // Idle job: returns at once, even with a zero timeout
    assert!(job.wait_for_idle(Some(Duration::ZERO)));

    job.render_frame(&scene, &camera, &config);
    started.recv_timeout(TIMEOUT).unwrap();
    assert!(!job.wait_for_idle(Some(Duration::from_millis(50))));

    thread::scope(|s| {
        let waiter = s.spawn(|| job.wait_for_idle(None));
        thread::sleep(Duration::from_millis(20));
        assert!(!waiter.is_finished());
        gate.send(()).unwrap();
        assert!(waiter.join().unwrap());
    });
    assert!(!job.is_working());

    // The token left by the first frame must not end the next wait early
    job.render_frame(&scene, &camera.with_rotation(45.0, 0.0), &config);
    started.recv_timeout(TIMEOUT).unwrap();
    assert!(!job.wait_for_idle(Some(Duration::from_millis(50))));
    gate.send(()).unwrap();
    assert!(job.wait_for_idle(Some(TIMEOUT)));
    assert_eq!(job.frames_rendered(), 2);
}

#[test]
fn cancel_between_frames_terminates_worker() {
    let job = RenderJob::new(RendererKind::Normals).unwrap();
    let scene = scene();
    let camera = CameraConfig::default();
    let config = RendererConfig::default().with_resolution(8, 8);

    job.cancel();
    assert!(job.is_cancelled());
    assert!(!job.is_terminated());

    // The wake is consumed by the stop check, not by a frame
    job.render_frame(&scene, &camera, &config);
    assert!(wait_until(|| job.is_terminated()));
    assert!(!job.is_working());
    assert_eq!(job.frames_rendered(), 0);

    // Nobody is listening any more
    job.render_frame(&scene, &camera, &config);
    assert!(!job.is_working());
    assert_eq!(job.frames_rendered(), 0);
}

#[test]
fn drop_joins_idle_worker() {
    let job = RenderJob::new(RendererKind::Faces).unwrap();
    job.render_frame(&scene(), &CameraConfig::default(), &RendererConfig::default().with_resolution(8, 8));
    assert!(job.wait_for_idle(Some(TIMEOUT)));
    assert_eq!(job.frames_rendered(), 1);
    drop(job);
}

#[test]
fn shutdown_marks_terminated() {
    let mut job = RenderJob::new(RendererKind::Preview).unwrap();
    job.shutdown();
    assert!(job.is_terminated());
    assert!(job.is_cancelled());
}
