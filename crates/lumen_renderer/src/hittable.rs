//! Hittable trait and HitRecord for ray-object intersection.

use lumen_math::hash::{self, StructuralHash};
use lumen_math::{Aabb, Interval, Ray, Vec3};

use crate::rect::AxisAlignedRect;
use crate::sampling::CacheCursor;
use crate::sphere::Sphere;
use crate::stats::RayCounters;
use crate::triangle::TriangleMesh;

/// Record of a ray-object intersection.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HitRecord {
    /// Parameter t where the intersection occurs
    pub t: f32,
    /// Point of intersection
    pub p: Vec3,
    /// Surface normal at intersection (always points against ray)
    pub normal: Vec3,
    /// Whether the ray hit the front face (outside) of the surface
    pub front_face: bool,
    /// UV texture coordinates
    pub u: f32,
    pub v: f32,
    /// Triangle index for meshes, 0 otherwise
    pub face_id: u32,
}

impl HitRecord {
    /// Set the face normal based on ray direction and outward normal.
    ///
    /// The normal is always stored pointing against the ray direction,
    /// so we need to track whether we hit the front or back face.
    pub fn set_face_normal(&mut self, ray: &Ray, outward_normal: Vec3) {
        self.front_face = ray.direction().dot(outward_normal) < 0.0;
        self.normal = if self.front_face {
            outward_normal
        } else {
            -outward_normal
        };
    }
}

/// Capabilities every scene shape provides.
///
/// The light-sampling helpers (`random_point`, `pdf_value`,
/// `pdf_direction`, `area`) are available for importance sampling of area
/// lights; the path tracer does not use them yet.
pub trait Hittable: Send + Sync {
    /// Test if a ray hits this object within the given interval.
    fn hit(&self, ray: &Ray, ray_t: Interval, counters: &mut RayCounters) -> Option<HitRecord>;

    /// Get the axis-aligned bounding box of this object.
    fn bounding_box(&self) -> Aabb;

    /// Random point on the surface.
    fn random_point(&self, cursor: &mut CacheCursor<'_>) -> Vec3;

    /// Solid-angle density of sampling `direction` from `origin` toward
    /// this shape. Zero when the direction misses.
    fn pdf_value(&self, origin: Vec3, direction: Vec3) -> f32;

    /// Random direction from `origin` toward this shape.
    fn pdf_direction(&self, origin: Vec3, cursor: &mut CacheCursor<'_>) -> Vec3 {
        self.random_point(cursor) - origin
    }

    /// Surface area.
    fn area(&self) -> f32;
}

/// Density for a shape sampled uniformly by area, converted to solid angle.
pub(crate) fn area_pdf(shape: &dyn Hittable, origin: Vec3, direction: Vec3) -> f32 {
    let mut scratch = RayCounters::default();
    let ray = Ray::new(origin, direction);
    let Some(rec) = shape.hit(&ray, Interval::forward(), &mut scratch) else {
        return 0.0;
    };

    let length_squared = direction.length_squared();
    let distance_squared = rec.t * rec.t * length_squared;
    let cosine = (direction.dot(rec.normal) / length_squared.sqrt()).abs();
    let area = shape.area();
    if cosine <= f32::EPSILON || area <= 0.0 {
        return 0.0;
    }
    distance_squared / (cosine * area)
}

/// Closed set of shapes a scene can hold.
pub enum Shape {
    Sphere(Sphere),
    Rect(AxisAlignedRect),
    Mesh(TriangleMesh),
}

impl Shape {
    fn as_hittable(&self) -> &dyn Hittable {
        match self {
            Shape::Sphere(s) => s,
            Shape::Rect(r) => r,
            Shape::Mesh(m) => m,
        }
    }

    /// Representative position, used as the light origin by the preview renderer.
    pub fn origin(&self) -> Vec3 {
        match self {
            Shape::Sphere(s) => s.center(),
            _ => self.bounding_box().centroid(),
        }
    }
}

impl Hittable for Shape {
    fn hit(&self, ray: &Ray, ray_t: Interval, counters: &mut RayCounters) -> Option<HitRecord> {
        self.as_hittable().hit(ray, ray_t, counters)
    }

    fn bounding_box(&self) -> Aabb {
        self.as_hittable().bounding_box()
    }

    fn random_point(&self, cursor: &mut CacheCursor<'_>) -> Vec3 {
        self.as_hittable().random_point(cursor)
    }

    fn pdf_value(&self, origin: Vec3, direction: Vec3) -> f32 {
        self.as_hittable().pdf_value(origin, direction)
    }

    fn pdf_direction(&self, origin: Vec3, cursor: &mut CacheCursor<'_>) -> Vec3 {
        self.as_hittable().pdf_direction(origin, cursor)
    }

    fn area(&self) -> f32 {
        self.as_hittable().area()
    }
}

impl StructuralHash for Shape {
    fn structural_hash(&self) -> u32 {
        match self {
            Shape::Sphere(s) => hash::combine(1, s.structural_hash()),
            Shape::Rect(r) => hash::combine(2, r.structural_hash()),
            Shape::Mesh(m) => hash::combine(3, m.structural_hash()),
        }
    }
}

impl From<Sphere> for Shape {
    fn from(sphere: Sphere) -> Self {
        Shape::Sphere(sphere)
    }
}

impl From<AxisAlignedRect> for Shape {
    fn from(rect: AxisAlignedRect) -> Self {
        Shape::Rect(rect)
    }
}

impl From<TriangleMesh> for Shape {
    fn from(mesh: TriangleMesh) -> Self {
        Shape::Mesh(mesh)
    }
}
