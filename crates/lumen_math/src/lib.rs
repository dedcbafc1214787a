// Re-export glam for convenience
pub use glam::*;

// Lumen math types
mod aabb;
pub mod hash;
mod interval;
mod onb;
mod ray;
mod scalar;

pub use aabb::Aabb;
pub use hash::StructuralHash;
pub use interval::Interval;
pub use onb::Onb;
pub use ray::Ray;
pub use scalar::{lerp_vec3, reflect, refract, smoothstep};
