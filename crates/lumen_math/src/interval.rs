/// A closed range of ray parameters `[min, max]`.
///
/// Intersection routines receive the accepted `t` range as an interval and
/// shrink its upper end as closer hits are found.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    pub min: f32,
    pub max: f32,
}

impl Interval {
    /// Smallest accepted hit distance for secondary rays, avoids self-intersection.
    pub const T_MIN: f32 = 0.001;

    /// Create a new interval given min and max values.
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// The default range for scene queries: `[T_MIN, +inf]`.
    pub const fn forward() -> Self {
        Self::new(Self::T_MIN, f32::INFINITY)
    }

    /// Returns true if x is within the interval [min, max] (inclusive).
    pub fn contains(&self, x: f32) -> bool {
        self.min <= x && x <= self.max
    }

    /// Returns true if x is strictly within the interval (min, max) (exclusive).
    pub fn surrounds(&self, x: f32) -> bool {
        self.min < x && x < self.max
    }

    /// Same lower bound, new upper bound.
    pub fn with_max(&self, max: f32) -> Interval {
        Interval::new(self.min, max)
    }
}

impl Default for Interval {
    fn default() -> Self {
        Self::forward()
    }
}
