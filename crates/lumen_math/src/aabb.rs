use crate::{Interval, Ray, Vec3};

/// Axis-Aligned Bounding Box used to reject rays before precise shape tests.
///
/// The all-zero box (`Aabb::UNSET`, also the `Default`) is a sentinel for
/// "no bounds computed" and never reports a hit.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct Aabb {
    pub minimum: Vec3,
    pub maximum: Vec3,
}

impl Aabb {
    /// Sentinel for an unset box.
    pub const UNSET: Aabb = Aabb {
        minimum: Vec3::ZERO,
        maximum: Vec3::ZERO,
    };

    /// Create an AABB from its corners, taken as given.
    pub const fn new(minimum: Vec3, maximum: Vec3) -> Self {
        Self { minimum, maximum }
    }

    /// Create an AABB from two arbitrary corner points.
    ///
    /// Flat dimensions are padded so the slab test never sees a zero-width box.
    pub fn from_points(a: Vec3, b: Vec3) -> Self {
        let mut aabb = Self::new(a.min(b), a.max(b));
        aabb.pad_to_minimums();
        aabb
    }

    /// Create an AABB that surrounds two other AABBs.
    ///
    /// Merging with an unset box returns the other box unchanged.
    pub fn merge(box0: &Aabb, box1: &Aabb) -> Self {
        if box0.is_unset() {
            return *box1;
        }
        if box1.is_unset() {
            return *box0;
        }
        Self::new(box0.minimum.min(box1.minimum), box0.maximum.max(box1.maximum))
    }

    /// True for the all-zero sentinel.
    pub fn is_unset(&self) -> bool {
        self.minimum == Vec3::ZERO && self.maximum == Vec3::ZERO
    }

    /// Test if a ray intersects this AABB within the given interval.
    ///
    /// Slab method. A zero direction component divides to a signed infinity,
    /// which the min/max folding below tolerates (a NaN from `0 * inf` loses
    /// against the running bound).
    pub fn hit(&self, ray: &Ray, ray_t: Interval) -> bool {
        if self.is_unset() {
            return false;
        }

        let mut t_min = ray_t.min;
        let mut t_max = ray_t.max;
        for axis in 0..3 {
            let origin = ray.origin[axis];
            let d_inv = 1.0 / ray.direction[axis];
            let a = (self.minimum[axis] - origin) * d_inv;
            let b = (self.maximum[axis] - origin) * d_inv;
            t_min = a.min(b).max(t_min);
            t_max = a.max(b).min(t_max);
            if t_max <= t_min {
                return false;
            }
        }
        true
    }

    /// Returns the center point of the bounding box.
    pub fn centroid(&self) -> Vec3 {
        (self.minimum + self.maximum) * 0.5
    }

    /// Pad flat extents to avoid zero-width AABBs (axis aligned rects, flat triangles).
    fn pad_to_minimums(&mut self) {
        let delta = 0.0001;
        for axis in 0..3 {
            if self.maximum[axis] - self.minimum[axis] < delta {
                self.minimum[axis] -= delta * 0.5;
                self.maximum[axis] += delta * 0.5;
            }
        }
    }
}
