//! Surface material definition.
//!
//! A single "universal" material models diffuse, glossy and refractive
//! surfaces by mixing probabilities, so the integrator needs no per-kind
//! dispatch besides the light check.

use lumen_math::hash::{self, StructuralHash};
use lumen_math::Vec3;
use serde::{Deserialize, Serialize};

/// Color type alias (linear RGB, 0-1 for reflectance, unbounded for emission)
pub type Color = Vec3;

/// What a material is used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaterialKind {
    /// Placeholder, shaded like a universal material.
    None,
    /// Diffuse / glossy / refractive surface.
    #[default]
    Universal,
    /// Emitter. Paths terminate on it.
    Light,
}

/// Surface material. Immutable while a render job is in flight.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Material {
    /// Material name, used for lookups from scene objects
    pub name: String,

    pub kind: MaterialKind,

    /// Diffuse/albedo color (RGB, 0-1)
    pub color: Color,

    /// Emitted color. Mostly for lights, but any material may glow a little.
    pub emitted_color: Color,

    /// Color applied on a glossy bounce
    pub gloss_color: Color,

    /// Chance of a glossy bounce, [0, 1]
    pub gloss_probability: f32,

    /// Chance of refracting instead of reflecting, [0, 1]
    pub refraction_probability: f32,

    /// Index of refraction (>= 1)
    pub refraction_index: f32,

    /// 0 = fully diffuse, 1 = mirror-like
    pub smoothness: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            name: String::new(),
            kind: MaterialKind::Universal,
            color: Color::new(0.5, 0.5, 0.5), // Grey default
            emitted_color: Color::ZERO,
            gloss_color: Color::ONE,
            gloss_probability: 0.0,
            refraction_probability: 0.0,
            refraction_index: 1.0,
            smoothness: 0.0,
        }
    }
}

impl Material {
    /// Create a new diffuse material with a name and albedo color.
    pub fn diffuse(name: impl Into<String>, color: Color) -> Self {
        Self {
            name: name.into(),
            color,
            ..Default::default()
        }
    }

    /// Create a light emitting `emitted_color`.
    pub fn light(name: impl Into<String>, emitted_color: Color) -> Self {
        Self {
            name: name.into(),
            kind: MaterialKind::Light,
            color: Color::ONE,
            emitted_color,
            ..Default::default()
        }
    }

    /// Add a glossy lobe.
    pub fn with_gloss(mut self, gloss_color: Color, gloss_probability: f32) -> Self {
        self.gloss_color = gloss_color;
        self.gloss_probability = gloss_probability;
        self.sanitized()
    }

    /// Make the material refract with the given probability and index.
    pub fn with_refraction(mut self, refraction_probability: f32, refraction_index: f32) -> Self {
        self.refraction_probability = refraction_probability;
        self.refraction_index = refraction_index;
        self.sanitized()
    }

    pub fn with_smoothness(mut self, smoothness: f32) -> Self {
        self.smoothness = smoothness;
        self.sanitized()
    }

    pub fn with_emission(mut self, emitted_color: Color) -> Self {
        self.emitted_color = emitted_color;
        self
    }

    /// Clamp probabilities and smoothness to [0, 1], refraction index to >= 1.
    ///
    /// NaN inputs collapse to the lower bound.
    pub fn sanitized(mut self) -> Self {
        fn unit(x: f32) -> f32 {
            if x.is_nan() {
                0.0
            } else {
                x.clamp(0.0, 1.0)
            }
        }
        self.gloss_probability = unit(self.gloss_probability);
        self.refraction_probability = unit(self.refraction_probability);
        self.smoothness = unit(self.smoothness);
        self.refraction_index = if self.refraction_index.is_nan() {
            1.0
        } else {
            self.refraction_index.max(1.0)
        };
        self
    }

    /// Check if this material is a light source.
    pub fn is_light(&self) -> bool {
        self.kind == MaterialKind::Light
    }

    /// Check if this material can refract.
    pub fn can_refract(&self) -> bool {
        self.refraction_probability > 0.0
    }
}

impl StructuralHash for Material {
    fn structural_hash(&self) -> u32 {
        hash::combine_all(&[
            self.kind as u32,
            hash::of_vec3(self.color),
            hash::of_vec3(self.emitted_color),
            hash::of_vec3(self.gloss_color),
            hash::of_f32(self.gloss_probability),
            hash::of_f32(self.refraction_probability),
            hash::of_f32(self.refraction_index),
            hash::of_f32(self.smoothness),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitized_clamps_ranges() {
        let mat = Material {
            gloss_probability: 1.5,
            refraction_probability: -0.2,
            refraction_index: 0.5,
            smoothness: f32::NAN,
            ..Default::default()
        }
        .sanitized();

        assert_eq!(mat.gloss_probability, 1.0);
        assert_eq!(mat.refraction_probability, 0.0);
        assert_eq!(mat.refraction_index, 1.0);
        assert_eq!(mat.smoothness, 0.0);
    }

    #[test]
    fn test_light_constructor() {
        let light = Material::light("sun", Color::splat(4.0));
        assert!(light.is_light());
        assert_eq!(light.emitted_color, Color::splat(4.0));
        assert!(!Material::diffuse("grey", Color::splat(0.5)).is_light());
    }

    #[test]
    fn test_hash_ignores_name() {
        let a = Material::diffuse("a", Color::splat(0.5));
        let b = Material::diffuse("b", Color::splat(0.5));
        assert_eq!(a.structural_hash(), b.structural_hash());

        let c = a.clone().with_smoothness(0.3);
        assert_ne!(a.structural_hash(), c.structural_hash());
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let json = r#"{ "name": "glass", "refraction_probability": 1.0, "refraction_index": 1.5 }"#;
        let mat: Material = serde_json::from_str(json).unwrap();
        assert_eq!(mat.kind, MaterialKind::Universal);
        assert_eq!(mat.color, Color::splat(0.5));
        assert!(mat.can_refract());
    }
}
