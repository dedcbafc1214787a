//! Triangle meshes.
//!
//! Ray-triangle tests use a barycentric determinant test in the spirit of
//! Möller-Trumbore. Shading uses the face normal; vertex normals are kept
//! for completeness but not interpolated.

use lumen_core::TriangleFace;
use lumen_math::hash::{self, StructuralHash};
use lumen_math::{Aabb, Interval, Ray, Vec3};

use crate::hittable::{area_pdf, HitRecord, Hittable};
use crate::sampling::CacheCursor;
use crate::stats::RayCounters;

/// Determinant threshold below which a ray counts as parallel.
const PARALLEL_EPSILON: f32 = 1e-8;

/// Intersect one triangle.
///
/// With `drop_backface` set, hits on the back side are discarded. Otherwise
/// they are reported with `front_face == false` and a flipped normal, which
/// lets refractive meshes be entered and exited.
pub fn intersect_triangle(
    ray: &Ray,
    ray_t: Interval,
    face: &TriangleFace,
    drop_backface: bool,
) -> Option<HitRecord> {
    let [v0, v1, v2] = face.vertices;
    let w = ray.direction();
    let e1 = v1 - v0;
    let e2 = v2 - v0;

    let mut normal = e1.cross(e2).try_normalize()?;
    let front_face = normal.dot(w) < 0.0;
    if !front_face {
        if drop_backface {
            return None;
        }
        normal = -normal;
    }

    let q = w.cross(e2);
    let a = e1.dot(q);
    if a.abs() <= PARALLEL_EPSILON {
        return None;
    }

    let s = (ray.origin() - v0) / a;
    let r = s.cross(e1);

    let b0 = s.dot(q);
    let b1 = r.dot(w);
    let b2 = 1.0 - b0 - b1;
    if b0 < 0.0 || b1 < 0.0 || b2 < 0.0 {
        return None;
    }

    let t = e2.dot(r);
    if !ray_t.surrounds(t) {
        return None;
    }

    let uv = b2 * face.uvs[0] + b0 * face.uvs[1] + b1 * face.uvs[2];
    Some(HitRecord {
        t,
        p: ray.at(t),
        normal,
        front_face,
        u: uv.x,
        v: uv.y,
        face_id: 0,
    })
}

/// A list of triangles sharing one material.
#[derive(Debug, Clone, PartialEq)]
pub struct TriangleMesh {
    faces: Vec<TriangleFace>,
    bbox: Aabb,
    area: f32,
    drop_backface: bool,
}

impl TriangleMesh {
    /// Create a mesh. Backfaces are culled until told otherwise.
    pub fn new(faces: Vec<TriangleFace>) -> Self {
        let bbox = faces
            .iter()
            .map(|face| {
                let [v0, v1, v2] = face.vertices;
                Aabb::from_points(v0.min(v1).min(v2), v0.max(v1).max(v2))
            })
            .fold(Aabb::UNSET, |acc, b| Aabb::merge(&acc, &b));
        let area = faces.iter().map(face_area).sum();

        Self {
            faces,
            bbox,
            area,
            drop_backface: true,
        }
    }

    pub fn faces(&self) -> &[TriangleFace] {
        &self.faces
    }

    pub fn drop_backface(&self) -> bool {
        self.drop_backface
    }

    pub fn set_drop_backface(&mut self, drop_backface: bool) {
        self.drop_backface = drop_backface;
    }
}

fn face_area(face: &TriangleFace) -> f32 {
    let [v0, v1, v2] = face.vertices;
    0.5 * (v1 - v0).cross(v2 - v0).length()
}

impl Hittable for TriangleMesh {
    fn hit(&self, ray: &Ray, ray_t: Interval, counters: &mut RayCounters) -> Option<HitRecord> {
        let mut closest: Option<HitRecord> = None;
        let mut closest_so_far = ray_t.max;

        for (face_id, face) in self.faces.iter().enumerate() {
            counters.ray_triangle += 1;
            if let Some(mut rec) =
                intersect_triangle(ray, ray_t.with_max(closest_so_far), face, self.drop_backface)
            {
                rec.face_id = face_id as u32;
                closest_so_far = rec.t;
                closest = Some(rec);
            }
        }

        closest
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }

    fn random_point(&self, cursor: &mut CacheCursor<'_>) -> Vec3 {
        if self.faces.is_empty() {
            return self.bbox.centroid();
        }

        // Uniform over the whole surface: pick a face by area, then a point on it.
        let mut target = cursor.float_0_1() * self.area;
        let mut chosen = &self.faces[self.faces.len() - 1];
        for face in &self.faces {
            let area = face_area(face);
            if target <= area {
                chosen = face;
                break;
            }
            target -= area;
        }

        let mut r1 = cursor.float_0_1();
        let mut r2 = cursor.float_0_1();
        if r1 + r2 > 1.0 {
            r1 = 1.0 - r1;
            r2 = 1.0 - r2;
        }
        let [v0, v1, v2] = chosen.vertices;
        v0 + r1 * (v1 - v0) + r2 * (v2 - v0)
    }

    fn pdf_value(&self, origin: Vec3, direction: Vec3) -> f32 {
        area_pdf(self, origin, direction)
    }

    fn area(&self) -> f32 {
        self.area
    }
}

impl StructuralHash for TriangleMesh {
    fn structural_hash(&self) -> u32 {
        self.faces.iter().fold(hash::of_bool(self.drop_backface), |acc, face| {
            let vertices = face.vertices.iter().map(|v| hash::of_vec3(*v));
            let uvs = face.uvs.iter().map(|uv| hash::of_vec2(*uv));
            vertices.chain(uvs).fold(acc, hash::combine)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampling::RandomCache;
    use lumen_math::Vec2;

    fn facing_z() -> TriangleFace {
        // Counter-clockwise seen from +Z, so the face normal is +Z
        TriangleFace::new(
            Vec3::new(-1.0, -1.0, -1.0),
            Vec3::new(1.0, -1.0, -1.0),
            Vec3::new(0.0, 1.0, -1.0),
        )
    }

    #[test]
    fn test_triangle_hit() {
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        let rec = intersect_triangle(&ray, Interval::forward(), &facing_z(), true).unwrap();

        assert!((rec.t - 1.0).abs() < 0.001);
        assert!(rec.front_face);
        assert!((rec.normal - Vec3::Z).length() < 1e-5);
    }

    #[test]
    fn test_triangle_miss() {
        // Ray pointing away
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, 1.0));
        assert!(intersect_triangle(&ray, Interval::forward(), &facing_z(), false).is_none());

        // Outside the edges
        let ray = Ray::new(Vec3::new(5.0, 0.0, 0.0), Vec3::NEG_Z);
        assert!(intersect_triangle(&ray, Interval::forward(), &facing_z(), false).is_none());
    }

    #[test]
    fn test_backface_handling() {
        // From behind the triangle, travelling +Z
        let ray = Ray::new(Vec3::new(0.0, 0.0, -3.0), Vec3::Z);

        assert!(intersect_triangle(&ray, Interval::forward(), &facing_z(), true).is_none());

        let rec = intersect_triangle(&ray, Interval::forward(), &facing_z(), false).unwrap();
        assert!(!rec.front_face);
        assert!((rec.normal - Vec3::NEG_Z).length() < 1e-5);
        assert!((rec.t - 2.0).abs() < 1e-4);
    }

    #[test]
    fn test_triangle_uv_interpolation() {
        let mut face = TriangleFace::new(Vec3::ZERO, Vec3::X, Vec3::Y);
        face.uvs = [Vec2::ZERO, Vec2::new(1.0, 0.0), Vec2::new(0.0, 1.0)];

        // Barycentric weights (0.5, 0.25, 0.25) on (v0, v1, v2)
        let ray = Ray::new(Vec3::new(0.25, 0.25, 1.0), Vec3::NEG_Z);
        let rec = intersect_triangle(&ray, Interval::forward(), &face, true).unwrap();
        assert!((rec.u - 0.25).abs() < 1e-5);
        assert!((rec.v - 0.25).abs() < 1e-5);
    }

    #[test]
    fn test_mesh_picks_nearest_face_and_counts() {
        let near = facing_z();
        let mut far = facing_z();
        for v in far.vertices.iter_mut() {
            v.z = -4.0;
        }
        let mesh = TriangleMesh::new(vec![far, near]);

        let mut counters = RayCounters::default();
        let rec = mesh
            .hit(&Ray::new(Vec3::ZERO, Vec3::NEG_Z), Interval::forward(), &mut counters)
            .unwrap();
        assert!((rec.t - 1.0).abs() < 1e-4);
        assert_eq!(rec.face_id, 1);
        assert_eq!(counters.ray_triangle, 2);
    }

    #[test]
    fn test_mesh_area_and_samples() {
        let mesh = TriangleMesh::new(vec![TriangleFace::new(Vec3::ZERO, Vec3::X, Vec3::Y)]);
        assert!((mesh.area() - 0.5).abs() < 1e-6);

        let cache = RandomCache::with_sizes(8, 4096, 16);
        let mut cursor = cache.cursor(0);
        for _ in 0..50 {
            let p = mesh.random_point(&mut cursor);
            assert!(p.x >= 0.0 && p.y >= 0.0 && p.x + p.y <= 1.0 + 1e-5);
        }

        assert!(mesh.pdf_value(Vec3::new(0.2, 0.2, 1.0), Vec3::NEG_Z) > 0.0);
    }
}
