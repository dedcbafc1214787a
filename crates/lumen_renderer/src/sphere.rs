//! Sphere primitive for ray tracing.

use std::f32::consts::PI;

use lumen_math::hash::{self, StructuralHash};
use lumen_math::{Aabb, Interval, Onb, Ray, Vec3};

use crate::hittable::{HitRecord, Hittable};
use crate::sampling::CacheCursor;
use crate::stats::RayCounters;

/// A sphere primitive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    center: Vec3,
    radius: f32,
    bbox: Aabb,
}

impl Sphere {
    /// Create a new sphere. Negative radii are clamped to zero.
    pub fn new(center: Vec3, radius: f32) -> Self {
        let radius = radius.max(0.0);
        let rvec = Vec3::splat(radius);
        let bbox = Aabb::from_points(center - rvec, center + rvec);

        Self {
            center,
            radius,
            bbox,
        }
    }

    pub fn center(&self) -> Vec3 {
        self.center
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Get the UV coordinates for a point on the unit sphere.
    fn get_sphere_uv(p: Vec3) -> (f32, f32) {
        // theta: angle down from +Y
        // phi: angle around Y axis from +X
        let theta = (-p.y).clamp(-1.0, 1.0).acos();
        let phi = (-p.z).atan2(p.x) + PI;

        (phi / (2.0 * PI), theta / PI)
    }
}

impl Hittable for Sphere {
    fn hit(&self, ray: &Ray, ray_t: Interval, _counters: &mut RayCounters) -> Option<HitRecord> {
        let oc = self.center - ray.origin();
        let a = ray.direction().length_squared();
        let h = ray.direction().dot(oc);
        let c = oc.length_squared() - self.radius * self.radius;

        let discriminant = h * h - a * c;
        if discriminant < 0.0 || a == 0.0 {
            return None;
        }

        let sqrtd = discriminant.sqrt();

        // Find the nearest root in the acceptable range
        let mut root = (h - sqrtd) / a;
        if !ray_t.surrounds(root) {
            root = (h + sqrtd) / a;
            if !ray_t.surrounds(root) {
                return None;
            }
        }

        let mut rec = HitRecord {
            t: root,
            p: ray.at(root),
            ..Default::default()
        };
        let outward_normal = (rec.p - self.center) / self.radius;
        rec.set_face_normal(ray, outward_normal);
        (rec.u, rec.v) = Self::get_sphere_uv(outward_normal);

        Some(rec)
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }

    fn random_point(&self, cursor: &mut CacheCursor<'_>) -> Vec3 {
        self.center + cursor.unit_vector() * self.radius
    }

    fn pdf_value(&self, origin: Vec3, direction: Vec3) -> f32 {
        let mut scratch = RayCounters::default();
        if self
            .hit(&Ray::new(origin, direction), Interval::forward(), &mut scratch)
            .is_none()
        {
            return 0.0;
        }

        let distance_squared = (self.center - origin).length_squared();
        let cos_theta_max = (1.0 - self.radius * self.radius / distance_squared).max(0.0).sqrt();
        let solid_angle = 2.0 * PI * (1.0 - cos_theta_max);
        if solid_angle <= 0.0 {
            return 0.0;
        }
        1.0 / solid_angle
    }

    fn pdf_direction(&self, origin: Vec3, cursor: &mut CacheCursor<'_>) -> Vec3 {
        let direction = self.center - origin;
        let distance_squared = direction.length_squared();
        let basis = Onb::from_w(direction);
        basis.local(cursor.in_sphere(self.radius, distance_squared))
    }

    fn area(&self) -> f32 {
        4.0 * PI * self.radius * self.radius
    }
}

impl StructuralHash for Sphere {
    fn structural_hash(&self) -> u32 {
        hash::combine(hash::of_vec3(self.center), hash::of_f32(self.radius))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampling::RandomCache;

    fn hit(sphere: &Sphere, ray: &Ray, ray_t: Interval) -> Option<HitRecord> {
        sphere.hit(ray, ray_t, &mut RayCounters::default())
    }

    #[test]
    fn test_sphere_hit() {
        let sphere = Sphere::new(Vec3::new(0.0, 0.0, -1.0), 0.5);
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));

        let rec = hit(&sphere, &ray, Interval::forward()).unwrap();
        assert!((rec.t - 0.5).abs() < 0.001); // Should hit at t=0.5
        assert!(rec.front_face);
        assert!((rec.normal - Vec3::Z).length() < 1e-5);
    }

    #[test]
    fn test_sphere_miss() {
        let sphere = Sphere::new(Vec3::new(0.0, 0.0, -1.0), 0.5);

        // Ray pointing away from sphere
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 1.0, 0.0));
        assert!(hit(&sphere, &ray, Interval::forward()).is_none());
    }

    #[test]
    fn test_both_roots_through_center() {
        let d = 5.0;
        let r = 1.5;
        let sphere = Sphere::new(Vec3::new(0.0, 0.0, -d), r);
        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);

        let near = hit(&sphere, &ray, Interval::forward()).unwrap();
        assert!((near.t - (d - r)).abs() < 1e-4);

        // Excluding the near root selects the far one, seen from inside
        let far = hit(&sphere, &ray, Interval::new(d - r + 0.01, f32::INFINITY)).unwrap();
        assert!((far.t - (d + r)).abs() < 1e-4);
        assert!(!far.front_face);

        assert!(hit(&sphere, &ray, Interval::new(0.001, d - r - 0.01)).is_none());
    }

    #[test]
    fn test_sphere_uv_range() {
        let sphere = Sphere::new(Vec3::ZERO, 1.0);
        let ray = Ray::new(Vec3::new(0.3, 0.2, 5.0), Vec3::NEG_Z);
        let rec = hit(&sphere, &ray, Interval::forward()).unwrap();
        assert!((0.0..=1.0).contains(&rec.u));
        assert!((0.0..=1.0).contains(&rec.v));
    }

    #[test]
    fn test_sphere_light_sampling() {
        let sphere = Sphere::new(Vec3::new(0.0, 0.0, -10.0), 1.0);
        assert!((sphere.area() - 4.0 * PI).abs() < 1e-4);

        let pdf = sphere.pdf_value(Vec3::ZERO, Vec3::NEG_Z);
        assert!(pdf > 0.0);
        assert_eq!(sphere.pdf_value(Vec3::ZERO, Vec3::Z), 0.0);

        let cache = RandomCache::with_sizes(5, 4096, 16);
        let mut cursor = cache.cursor(0);
        for _ in 0..50 {
            let dir = sphere.pdf_direction(Vec3::ZERO, &mut cursor);
            assert!(sphere.pdf_value(Vec3::ZERO, dir) > 0.0);
            let p = sphere.random_point(&mut cursor);
            assert!(((p - sphere.center()).length() - 1.0).abs() < 1e-4);
        }
    }
}
