//! Lumen Renderer - CPU Path Tracing
//!
//! A Monte Carlo path tracer driven by an asynchronous job controller.
//!
//! - **Geometry**: spheres, axis-aligned rectangles and triangle meshes
//! - **Renderers**: the reference path tracer plus preview, normals and
//!   faces diagnostics
//! - **Jobs**: [`RenderJob`] renders one frame at a time on a worker thread
//!   and hands out the RGBA display buffer and BMP output
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use lumen_renderer::{RenderJob, Scene};
//!
//! let description = lumen_core::load_scene("cornell.json")?;
//! let scene = Arc::new(Scene::from_description(&description));
//! let job = RenderJob::new(description.renderer.kind)?;
//! job.render_frame(&scene, &description.camera, &description.renderer);
//! job.wait_for_idle(None);
//! job.save("cornell.bmp")?;
//! ```

mod bmp;
mod camera;
mod chunk;
mod error;
mod frame;
mod hittable;
mod integrator;
mod job;
mod preview;
mod rect;
mod renderer;
mod sampling;
mod scene;
mod sphere;
mod stats;
pub mod tonemap;
mod triangle;

pub use bmp::{save_bmp, write_bmp};
pub use camera::Camera;
pub use chunk::{default_chunk_count, generate_chunks, render_chunks, Chunk, PixelContext, CHUNKS_PER_THREAD};
pub use error::{RenderError, RenderResult};
pub use frame::{to_byte, Frame};
pub use hittable::{HitRecord, Hittable, Shape};
pub use integrator::{environment_light, fragment, trace_ray, ReferenceRenderer, MIN_THROUGHPUT_SQ};
pub use job::RenderJob;
pub use preview::{FacesRenderer, NormalsRenderer, PreviewRenderer, FACE_PALETTE};
pub use rect::AxisAlignedRect;
pub use renderer::{create_renderer, FrameRenderer, JobSnapshot};
pub use sampling::{CacheCursor, RandomCache, SeedRng, DIRECTION_CACHE_SIZE, FLOAT_CACHE_SIZE};
pub use scene::{MaterialId, MaterialLibrary, ObjectId, Scene, SceneHit, SceneObject};
pub use sphere::Sphere;
pub use stats::{RayCounters, RenderStats};
pub use triangle::{intersect_triangle, TriangleMesh};

/// Re-export scene inputs and math types
pub use lumen_core::{CameraConfig, ChunkStrategy, Color, Material, RendererConfig, RendererKind};
pub use lumen_math::{Aabb, Interval, Ray, StructuralHash, Vec2, Vec3};
