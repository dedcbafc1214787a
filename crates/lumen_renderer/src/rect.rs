//! Axis-aligned rectangles.
//!
//! One type covers the three orientations. A rectangle spans `[a0, a1]` on
//! its first in-plane axis and `[b0, b1]` on the second, at offset `k` on
//! the remaining axis. The outward normal points along that axis.

use lumen_core::RectPlane;
use lumen_math::hash::{self, StructuralHash};
use lumen_math::{Aabb, Interval, Ray, Vec3};

use crate::hittable::{area_pdf, HitRecord, Hittable};
use crate::sampling::CacheCursor;
use crate::stats::RayCounters;

/// An axis-aligned rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisAlignedRect {
    plane: RectPlane,
    a0: f32,
    a1: f32,
    b0: f32,
    b1: f32,
    k: f32,
}

impl AxisAlignedRect {
    pub fn new(plane: RectPlane, a0: f32, a1: f32, b0: f32, b1: f32, k: f32) -> Self {
        Self {
            plane,
            a0: a0.min(a1),
            a1: a0.max(a1),
            b0: b0.min(b1),
            b1: b0.max(b1),
            k,
        }
    }

    pub fn xy(x0: f32, x1: f32, y0: f32, y1: f32, z: f32) -> Self {
        Self::new(RectPlane::Xy, x0, x1, y0, y1, z)
    }

    pub fn xz(x0: f32, x1: f32, z0: f32, z1: f32, y: f32) -> Self {
        Self::new(RectPlane::Xz, x0, x1, z0, z1, y)
    }

    pub fn yz(y0: f32, y1: f32, z0: f32, z1: f32, x: f32) -> Self {
        Self::new(RectPlane::Yz, y0, y1, z0, z1, x)
    }

    pub fn plane(&self) -> RectPlane {
        self.plane
    }

    /// Axis indices: (first in-plane, second in-plane, normal).
    fn axes(&self) -> (usize, usize, usize) {
        match self.plane {
            RectPlane::Xy => (0, 1, 2),
            RectPlane::Xz => (0, 2, 1),
            RectPlane::Yz => (1, 2, 0),
        }
    }

    fn point(&self, a: f32, b: f32) -> Vec3 {
        let (ia, ib, ik) = self.axes();
        let mut p = Vec3::ZERO;
        p[ia] = a;
        p[ib] = b;
        p[ik] = self.k;
        p
    }

    fn outward_normal(&self) -> Vec3 {
        match self.plane {
            RectPlane::Xy => Vec3::Z,
            RectPlane::Xz => Vec3::Y,
            RectPlane::Yz => Vec3::X,
        }
    }
}

impl Hittable for AxisAlignedRect {
    fn hit(&self, ray: &Ray, ray_t: Interval, _counters: &mut RayCounters) -> Option<HitRecord> {
        let (ia, ib, ik) = self.axes();

        // Parallel to the plane
        let dk = ray.direction[ik];
        if dk.abs() < 1e-8 {
            return None;
        }

        let t = (self.k - ray.origin[ik]) / dk;
        if !ray_t.contains(t) {
            return None;
        }

        let a = ray.origin[ia] + t * ray.direction[ia];
        let b = ray.origin[ib] + t * ray.direction[ib];
        if a < self.a0 || a > self.a1 || b < self.b0 || b > self.b1 {
            return None;
        }

        let mut rec = HitRecord {
            t,
            p: ray.at(t),
            u: (a - self.a0) / (self.a1 - self.a0),
            v: (b - self.b0) / (self.b1 - self.b0),
            ..Default::default()
        };
        rec.set_face_normal(ray, self.outward_normal());
        Some(rec)
    }

    fn bounding_box(&self) -> Aabb {
        // from_points pads the flat axis
        Aabb::from_points(self.point(self.a0, self.b0), self.point(self.a1, self.b1))
    }

    fn random_point(&self, cursor: &mut CacheCursor<'_>) -> Vec3 {
        let a = cursor.float_m_n(self.a0, self.a1);
        let b = cursor.float_m_n(self.b0, self.b1);
        self.point(a, b)
    }

    fn pdf_value(&self, origin: Vec3, direction: Vec3) -> f32 {
        area_pdf(self, origin, direction)
    }

    fn area(&self) -> f32 {
        (self.a1 - self.a0) * (self.b1 - self.b0)
    }
}

impl StructuralHash for AxisAlignedRect {
    fn structural_hash(&self) -> u32 {
        hash::combine_all(&[
            self.plane as u32,
            hash::of_f32(self.a0),
            hash::of_f32(self.a1),
            hash::of_f32(self.b0),
            hash::of_f32(self.b1),
            hash::of_f32(self.k),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampling::RandomCache;

    fn hit(rect: &AxisAlignedRect, ray: &Ray) -> Option<HitRecord> {
        rect.hit(ray, Interval::forward(), &mut RayCounters::default())
    }

    #[test]
    fn test_xy_rect_hit() {
        let rect = AxisAlignedRect::xy(-1.0, 1.0, -1.0, 1.0, -2.0);
        let rec = hit(&rect, &Ray::new(Vec3::new(0.5, 0.0, 0.0), Vec3::NEG_Z)).unwrap();
        assert!((rec.t - 2.0).abs() < 1e-5);
        assert!((rec.u - 0.75).abs() < 1e-5);
        assert!((rec.v - 0.5).abs() < 1e-5);
        // Ray travels -Z, outward +Z faces it
        assert!(rec.front_face);
        assert_eq!(rec.normal, Vec3::Z);
    }

    #[test]
    fn test_rect_orientations() {
        let floor = AxisAlignedRect::xz(-1.0, 1.0, -1.0, 1.0, 0.0);
        let rec = hit(&floor, &Ray::new(Vec3::new(0.0, 3.0, 0.0), Vec3::NEG_Y)).unwrap();
        assert_eq!(rec.normal, Vec3::Y);
        assert!((rec.p.y).abs() < 1e-6);

        let wall = AxisAlignedRect::yz(0.0, 2.0, -1.0, 1.0, 4.0);
        let rec = hit(&wall, &Ray::new(Vec3::new(0.0, 1.0, 0.0), Vec3::X)).unwrap();
        assert!(!rec.front_face);
        assert_eq!(rec.normal, Vec3::NEG_X);
    }

    #[test]
    fn test_rect_misses() {
        let rect = AxisAlignedRect::xy(-1.0, 1.0, -1.0, 1.0, -2.0);
        // Outside the bounds
        assert!(hit(&rect, &Ray::new(Vec3::new(3.0, 0.0, 0.0), Vec3::NEG_Z)).is_none());
        // Parallel to the plane
        assert!(hit(&rect, &Ray::new(Vec3::new(0.0, 0.0, -2.0), Vec3::X)).is_none());
        // Behind the origin
        assert!(hit(&rect, &Ray::new(Vec3::ZERO, Vec3::Z)).is_none());
    }

    #[test]
    fn test_rect_bounding_box_is_padded() {
        let rect = AxisAlignedRect::xz(-1.0, 1.0, -1.0, 1.0, 5.0);
        let bbox = rect.bounding_box();
        assert!(bbox.maximum.y > bbox.minimum.y);
        assert!(bbox.hit(&Ray::new(Vec3::new(0.0, 10.0, 0.0), Vec3::NEG_Y), Interval::forward()));
    }

    #[test]
    fn test_rect_light_sampling() {
        let rect = AxisAlignedRect::xz(-1.0, 1.0, -1.0, 1.0, 2.0);
        assert_eq!(rect.area(), 4.0);

        // Straight below the center: dist^2 / (cos * area) = 4 / 4
        let pdf = rect.pdf_value(Vec3::ZERO, Vec3::Y);
        assert!((pdf - 1.0).abs() < 1e-4);
        assert_eq!(rect.pdf_value(Vec3::ZERO, Vec3::NEG_Y), 0.0);

        let cache = RandomCache::with_sizes(4, 4096, 16);
        let mut cursor = cache.cursor(0);
        for _ in 0..50 {
            let p = rect.random_point(&mut cursor);
            assert_eq!(p.y, 2.0);
            assert!((-1.0..=1.0).contains(&p.x) && (-1.0..=1.0).contains(&p.z));
        }
    }
}
