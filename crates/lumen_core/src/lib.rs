//! Lumen Core - renderer-agnostic scene description.
//!
//! This crate provides:
//!
//! - **Materials**: `Material`, `MaterialKind`
//! - **Configuration**: `CameraConfig`, `RendererConfig`, `RendererKind`, `ChunkStrategy`
//! - **Scene files**: `SceneDescription` and the JSON loader
//!
//! # Example
//!
//! ```ignore
//! use lumen_core::load_scene;
//!
//! let description = load_scene("cornell.json")?;
//! println!("Loaded {} materials, {} objects",
//!     description.materials.len(),
//!     description.objects.len());
//! ```

pub mod config;
pub mod description;
pub mod material;

// Re-export commonly used types
pub use config::{CameraConfig, ChunkStrategy, RendererConfig, RendererKind};
pub use description::{
    load_scene, load_scene_from_str, LoadError, LoadResult, ObjectDescription, RectPlane,
    SceneDescription, ShapeDescription, TriangleFace,
};
pub use material::{Color, Material, MaterialKind};
