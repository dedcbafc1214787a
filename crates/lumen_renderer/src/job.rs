//! Asynchronous render job controller.
//!
//! A [`RenderJob`] owns one frame renderer, the frame buffers and, in
//! asynchronous mode, a dedicated worker thread parked on a single-slot wake
//! channel. At most one frame is in flight at a time:
//!
//! - The caller snapshots scene, camera and settings with `render_frame`,
//!   which wakes the worker. Requests made while a frame is in flight are
//!   dropped, not queued.
//! - While `is_working()` is true the worker is the only writer of the job
//!   state and every read accessor returns `None`.
//! - `cancel()` is only observed between frames; a running frame always
//!   completes.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use lumen_core::{CameraConfig, RendererConfig, RendererKind};
use lumen_math::StructuralHash;
use parking_lot::Mutex;

use crate::bmp::save_bmp;
use crate::error::{RenderError, RenderResult};
use crate::frame::Frame;
use crate::renderer::{create_renderer, FrameRenderer, JobSnapshot};
use crate::scene::Scene;
use crate::stats::RenderStats;

/// Worker-owned part of the job.
struct JobState {
    snapshot: Option<JobSnapshot>,
    frame: Frame,
    stats: RenderStats,
}

struct JobShared {
    working: AtomicBool,
    stop_requested: AtomicBool,
    terminated: AtomicBool,
    has_snapshot: AtomicBool,
    scene_hash: AtomicU32,
    camera_hash: AtomicU32,
    config_hash: AtomicU32,
    frames_rendered: AtomicU64,
    output_path: Mutex<Option<PathBuf>>,
    state: Mutex<JobState>,
    renderer: Mutex<Box<dyn FrameRenderer>>,
    // Signalled each time `working` is cleared
    done_tx: Sender<()>,
    done_rx: Receiver<()>,
}

impl JobShared {
    fn new(renderer: Box<dyn FrameRenderer>) -> Self {
        let (done_tx, done_rx) = bounded(1);
        Self {
            working: AtomicBool::new(false),
            stop_requested: AtomicBool::new(false),
            terminated: AtomicBool::new(false),
            has_snapshot: AtomicBool::new(false),
            scene_hash: AtomicU32::new(0),
            camera_hash: AtomicU32::new(0),
            config_hash: AtomicU32::new(0),
            frames_rendered: AtomicU64::new(0),
            output_path: Mutex::new(None),
            state: Mutex::new(JobState {
                snapshot: None,
                frame: Frame::default(),
                stats: RenderStats::default(),
            }),
            renderer: Mutex::new(renderer),
            done_tx,
            done_rx,
        }
    }

    /// Clear `working` and wake a `wait_for_idle` caller.
    fn finish(&self) {
        self.working.store(false, Ordering::Release);
        // Full: a token is already pending
        let _ = self.done_tx.try_send(());
    }

    /// Render the current snapshot, optionally save it, then clear `working`.
    fn run_frame(&self) {
        {
            let mut guard = self.state.lock();
            let state = &mut *guard;
            match state.snapshot.as_ref() {
                Some(snapshot) => {
                    let mut renderer = self.renderer.lock();
                    state.stats = RenderStats::default();

                    log::info!(
                        "Rendering {}x{} frame ({:?}, {} spp, {} bounces)",
                        state.frame.width(),
                        state.frame.height(),
                        renderer.kind(),
                        snapshot.config.samples_per_pixel,
                        snapshot.config.max_bounces
                    );
                    let start = Instant::now();
                    let counters = renderer.render(snapshot, &mut state.frame);
                    state.stats.render_time = start.elapsed();
                    state.stats.counters = counters;
                    log::info!(
                        "Frame done in {:.2?}: {} rays, {} object / {} box / {} triangle tests",
                        state.stats.render_time,
                        counters.rays,
                        counters.ray_object,
                        counters.ray_box,
                        counters.ray_triangle
                    );

                    let output_path = self.output_path.lock().clone();
                    if let Some(path) = output_path {
                        let start = Instant::now();
                        match save_bmp(&state.frame, &path) {
                            Ok(()) => {
                                state.stats.save_time = start.elapsed();
                                log::info!("Saved frame to {:?} in {:.2?}", path, state.stats.save_time);
                            }
                            Err(err) => log::error!("Failed to save frame to {:?}: {}", path, err),
                        }
                    }

                    self.frames_rendered.fetch_add(1, Ordering::AcqRel);
                }
                None => log::warn!("Frame requested before any job state was set"),
            }
        }
        self.finish();
    }
}

fn worker_loop(shared: Arc<JobShared>, wake: Receiver<()>) {
    log::debug!("Render worker started");
    loop {
        // Sender dropped: the controller is gone
        if wake.recv().is_err() {
            break;
        }
        if shared.stop_requested.load(Ordering::Acquire) {
            log::debug!("Render worker stopping");
            break;
        }
        if shared.working.load(Ordering::Acquire) {
            shared.run_frame();
        }
    }
    // Later wakes must see a disconnected channel once `terminated` is set
    drop(wake);
    shared.finish();
    shared.terminated.store(true, Ordering::Release);
}

/// Owner of a frame renderer, its buffers and its worker thread.
pub struct RenderJob {
    shared: Arc<JobShared>,
    kind: RendererKind,
    wake: Option<Sender<()>>,
    worker: Option<JoinHandle<()>>,
}

impl RenderJob {
    /// Create an asynchronous job for a built-in renderer.
    pub fn new(kind: RendererKind) -> RenderResult<Self> {
        Self::with_renderer(create_renderer(kind))
    }

    /// Create a job that renders on the caller's thread.
    pub fn new_sync(kind: RendererKind) -> Self {
        Self::with_renderer_sync(create_renderer(kind))
    }

    /// Create an asynchronous job around any frame renderer.
    pub fn with_renderer(renderer: Box<dyn FrameRenderer>) -> RenderResult<Self> {
        let kind = renderer.kind();
        let shared = Arc::new(JobShared::new(renderer));
        let (wake_tx, wake_rx) = bounded::<()>(1);

        let worker_shared = Arc::clone(&shared);
        let name = format!("lumen-render-{:?}", kind).to_lowercase();
        let worker = thread::Builder::new()
            .name(name)
            .spawn(move || worker_loop(worker_shared, wake_rx))?;

        Ok(Self {
            shared,
            kind,
            wake: Some(wake_tx),
            worker: Some(worker),
        })
    }

    /// Create a synchronous job around any frame renderer.
    pub fn with_renderer_sync(renderer: Box<dyn FrameRenderer>) -> Self {
        let kind = renderer.kind();
        Self {
            shared: Arc::new(JobShared::new(renderer)),
            kind,
            wake: None,
            worker: None,
        }
    }

    pub fn is_async(&self) -> bool {
        self.wake.is_some()
    }

    /// Snapshot the inputs of the next frame. No-op while working.
    ///
    /// The frame buffers are reallocated only when the resolution changes or
    /// `reuse_buffer` is off.
    pub fn set_job_state(&self, scene: &Arc<Scene>, camera: &CameraConfig, config: &RendererConfig) {
        if self.is_working() {
            return;
        }

        let mut state = self.shared.state.lock();
        let resolution = (config.resolution_horizontal, config.resolution_vertical);
        if state.frame.resolution() != resolution || !config.reuse_buffer {
            log::debug!(
                "Allocating {}x{} frame buffers (previous {}x{})",
                resolution.0,
                resolution.1,
                state.frame.width(),
                state.frame.height()
            );
            state.frame = Frame::new(resolution.0, resolution.1);
        }

        if scene.query_lights().is_empty() {
            log::warn!("Scene has no lights, rendering with environment light only");
        }

        let snapshot = JobSnapshot::new(Arc::clone(scene), camera, config);
        self.shared.scene_hash.store(snapshot.scene_hash, Ordering::Release);
        self.shared.camera_hash.store(snapshot.camera_hash(), Ordering::Release);
        self.shared.config_hash.store(snapshot.config_hash, Ordering::Release);
        self.shared.has_snapshot.store(true, Ordering::Release);
        state.snapshot = Some(snapshot);
    }

    /// Snapshot the inputs and start a frame, unless one is in flight.
    pub fn render_frame(&self, scene: &Arc<Scene>, camera: &CameraConfig, config: &RendererConfig) {
        if self.is_working() {
            log::debug!("Frame already in flight, ignoring render request");
            return;
        }
        self.set_job_state(scene, camera, config);

        if self
            .shared
            .working
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            log::debug!("Frame already in flight, ignoring render request");
            return;
        }

        match &self.wake {
            Some(wake) => match wake.try_send(()) {
                // Full: a wake is already pending
                Ok(()) | Err(TrySendError::Full(())) => {}
                Err(TrySendError::Disconnected(())) => {
                    log::warn!("Render worker has exited, frame not rendered");
                    self.shared.finish();
                }
            },
            None => self.shared.run_frame(),
        }
    }

    /// Ask the worker to exit. Takes effect between frames only.
    pub fn cancel(&self) {
        self.shared.stop_requested.store(true, Ordering::Release);
    }

    pub fn is_working(&self) -> bool {
        self.shared.working.load(Ordering::Acquire)
    }

    pub fn is_cancelled(&self) -> bool {
        self.shared.stop_requested.load(Ordering::Acquire)
    }

    /// True once the worker thread has exited.
    pub fn is_terminated(&self) -> bool {
        self.shared.terminated.load(Ordering::Acquire)
    }

    /// Frames completed since creation.
    pub fn frames_rendered(&self) -> u64 {
        self.shared.frames_rendered.load(Ordering::Acquire)
    }

    /// Block until no frame is in flight. Returns false on timeout.
    ///
    /// Meant for a single waiting thread: each finished frame wakes one
    /// waiter.
    pub fn wait_for_idle(&self, timeout: Option<Duration>) -> bool {
        let deadline = timeout.map(|t| Instant::now() + t);
        // A token left over from an earlier frame only causes a recheck
        while self.is_working() {
            match deadline {
                Some(deadline) => {
                    let remaining = deadline.saturating_duration_since(Instant::now());
                    if remaining.is_zero() {
                        return false;
                    }
                    let _ = self.shared.done_rx.recv_timeout(remaining);
                }
                None => {
                    let _ = self.shared.done_rx.recv();
                }
            }
        }
        true
    }

    /// Whether `scene` differs from the last snapshot.
    pub fn is_world_dirty(&self, scene: &Scene) -> bool {
        self.is_dirty(&self.shared.scene_hash, scene.structural_hash())
    }

    /// Whether `config` differs from the last snapshot. Ignores the renderer kind.
    pub fn is_renderer_setting_dirty(&self, config: &RendererConfig) -> bool {
        self.is_dirty(&self.shared.config_hash, config.structural_hash())
    }

    /// Whether `camera` differs from the last snapshot.
    pub fn is_camera_setting_dirty(&self, camera: &CameraConfig) -> bool {
        self.is_dirty(&self.shared.camera_hash, camera.structural_hash())
    }

    /// Whether `config` asks for another kind of renderer than this job runs.
    pub fn is_renderer_type_different(&self, config: &RendererConfig) -> bool {
        config.kind != self.kind
    }

    fn is_dirty(&self, stored: &AtomicU32, current: u32) -> bool {
        !self.shared.has_snapshot.load(Ordering::Acquire) || stored.load(Ordering::Acquire) != current
    }

    pub fn kind(&self) -> RendererKind {
        self.kind
    }

    /// Write every completed frame to `path` as BMP, or stop saving with `None`.
    pub fn set_output_path(&self, path: Option<PathBuf>) {
        *self.shared.output_path.lock() = path;
    }

    pub fn output_path(&self) -> Option<PathBuf> {
        self.shared.output_path.lock().clone()
    }

    /// Read the frame buffers. `None` while working.
    pub fn with_frame<R>(&self, f: impl FnOnce(&Frame) -> R) -> Option<R> {
        if self.is_working() {
            return None;
        }
        let state = self.shared.state.lock();
        Some(f(&state.frame))
    }

    /// Statistics of the last frame. `None` while working.
    pub fn stats(&self) -> Option<RenderStats> {
        if self.is_working() {
            return None;
        }
        Some(self.shared.state.lock().stats)
    }

    /// Write the last frame to `path` as BMP.
    pub fn save(&self, path: impl AsRef<Path>) -> RenderResult<()> {
        if self.is_working() {
            return Err(RenderError::NoFrame);
        }
        let state = self.shared.state.lock();
        if state.snapshot.is_none() {
            return Err(RenderError::NoFrame);
        }
        save_bmp(&state.frame, path)
    }

    /// Stop the worker and wait for it to exit. Called on drop.
    pub fn shutdown(&mut self) {
        self.cancel();
        if let Some(wake) = self.wake.take() {
            let _ = wake.try_send(());
        }
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                log::error!("Render worker panicked");
            }
        }
    }
}

impl Drop for RenderJob {
    fn drop(&mut self) {
        self.shutdown();
    }
}
