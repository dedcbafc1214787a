//! Ray and intersection statistics.
//!
//! Every chunk worker owns a `RayCounters` and bumps it without
//! synchronization; the totals are summed once the frame is done.

use std::ops::{Add, AddAssign};
use std::time::Duration;

/// Work counters for one chunk, or a whole frame once summed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RayCounters {
    /// Rays traced (camera rays and bounces)
    pub rays: u64,
    /// Precise object tests that passed the bounding box pre-test
    pub ray_object: u64,
    /// Bounding box tests
    pub ray_box: u64,
    /// Ray-triangle tests
    pub ray_triangle: u64,
}

impl Add for RayCounters {
    type Output = RayCounters;

    fn add(self, other: RayCounters) -> RayCounters {
        RayCounters {
            rays: self.rays + other.rays,
            ray_object: self.ray_object + other.ray_object,
            ray_box: self.ray_box + other.ray_box,
            ray_triangle: self.ray_triangle + other.ray_triangle,
        }
    }
}

impl AddAssign for RayCounters {
    fn add_assign(&mut self, other: RayCounters) {
        *self = *self + other;
    }
}

/// Statistics of the last completed frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub render_time: Duration,
    /// Zero when the frame was not written to disk
    pub save_time: Duration,
    pub counters: RayCounters,
}
