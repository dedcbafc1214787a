//! JSON scene files.
//!
//! A scene file bundles everything needed to render one image: camera and
//! renderer settings, a material list and the objects referencing those
//! materials by name. Name resolution happens when the renderer builds its
//! scene, so an object may name a material the file does not define.

use std::path::Path;

use lumen_math::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{CameraConfig, RendererConfig};
use crate::material::Material;

/// Errors that can occur during scene loading.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid scene: {0}")]
    InvalidScene(String),
}

/// Result type for loading operations.
pub type LoadResult<T> = Result<T, LoadError>;

/// Orientation of an axis-aligned rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RectPlane {
    /// Spans X and Y, offset along Z
    Xy,
    /// Spans X and Z, offset along Y
    Xz,
    /// Spans Y and Z, offset along X
    Yz,
}

/// One mesh triangle. Normals and UVs may be omitted.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TriangleFace {
    pub vertices: [Vec3; 3],
    pub normals: [Vec3; 3],
    pub uvs: [Vec2; 3],
}

impl TriangleFace {
    pub fn new(v0: Vec3, v1: Vec3, v2: Vec3) -> Self {
        let normal = (v1 - v0).cross(v2 - v0).normalize_or_zero();
        Self {
            vertices: [v0, v1, v2],
            normals: [normal; 3],
            uvs: [Vec2::ZERO, Vec2::X, Vec2::Y],
        }
    }
}

/// Geometry of a scene object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ShapeDescription {
    Sphere {
        center: Vec3,
        radius: f32,
    },
    /// Rectangle spanning `[a0, a1] x [b0, b1]` on the plane's two axes,
    /// at offset `k` on the third.
    Rect {
        plane: RectPlane,
        a0: f32,
        a1: f32,
        b0: f32,
        b1: f32,
        k: f32,
    },
    Mesh {
        faces: Vec<TriangleFace>,
    },
}

/// A scene object: geometry plus a material name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectDescription {
    #[serde(default)]
    pub name: String,
    pub shape: ShapeDescription,
    #[serde(default)]
    pub material: String,
}

/// Contents of a scene file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneDescription {
    pub camera: CameraConfig,
    pub renderer: RendererConfig,
    pub materials: Vec<Material>,
    pub objects: Vec<ObjectDescription>,
}

impl SceneDescription {
    /// Check geometry and clamp material parameters.
    pub fn validate(mut self) -> LoadResult<Self> {
        for object in &self.objects {
            match &object.shape {
                ShapeDescription::Sphere { radius, .. } => {
                    if !(*radius > 0.0) {
                        return Err(LoadError::InvalidScene(format!(
                            "object '{}': sphere radius must be positive, got {}",
                            object.name, radius
                        )));
                    }
                }
                ShapeDescription::Rect { a0, a1, b0, b1, .. } => {
                    if !(a0 < a1 && b0 < b1) {
                        return Err(LoadError::InvalidScene(format!(
                            "object '{}': rectangle bounds must be increasing",
                            object.name
                        )));
                    }
                }
                ShapeDescription::Mesh { faces } => {
                    if faces.is_empty() {
                        log::warn!("Object '{}' is a mesh without faces", object.name);
                    }
                }
            }
        }

        self.materials = self.materials.into_iter().map(Material::sanitized).collect();
        Ok(self)
    }
}

/// Load and validate a scene file.
pub fn load_scene(path: impl AsRef<Path>) -> LoadResult<SceneDescription> {
    let path = path.as_ref();
    log::info!("Loading scene from: {:?}", path);
    let text = std::fs::read_to_string(path)?;
    load_scene_from_str(&text)
}

/// Parse and validate a scene from JSON text.
pub fn load_scene_from_str(text: &str) -> LoadResult<SceneDescription> {
    let description: SceneDescription = serde_json::from_str(text)?;
    let description = description.validate()?;
    log::info!(
        "Scene has {} materials, {} objects",
        description.materials.len(),
        description.objects.len()
    );
    Ok(description)
}
