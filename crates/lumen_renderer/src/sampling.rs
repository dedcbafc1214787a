//! Random number sources for the integrator.
//!
//! Two kinds of randomness are used:
//!
//! - [`SeedRng`]: cheap integer-hash generators keyed by a per-pixel seed.
//!   Each draw folds the previous output back into the seed, so calling it
//!   twice with the same seed still yields different values.
//! - [`RandomCache`]: a large table of pre-generated floats and cosine
//!   directions, read through a [`CacheCursor`] that walks it cyclically.
//!
//! Every chunk worker owns its `SeedRng` and its cursor. Nothing here is
//! shared mutably between threads.

use std::f32::consts::PI;
use std::sync::OnceLock;

use lumen_math::{Vec2, Vec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Number of floats in the shared cache.
pub const FLOAT_CACHE_SIZE: usize = 500_000;

/// Number of cosine-weighted directions in the shared cache.
pub const DIRECTION_CACHE_SIZE: usize = 50_000;

/// Seed-rotating hash generators.
///
/// Not a pure function of the seed: the last output is carried in `last`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedRng {
    last: u32,
}

impl SeedRng {
    pub fn new() -> Self {
        Self::default()
    }

    /// PCG-style hash, returns a value in [0, 1].
    pub fn pcg(&mut self, seed: u32) -> f32 {
        let state = seed
            .wrapping_add(self.last)
            .wrapping_mul(747_796_405)
            .wrapping_add(2_891_336_453);
        let word = ((state >> ((state >> 28) + 4)) ^ state).wrapping_mul(277_803_737);
        let result = (word >> 22) ^ word;
        self.last = result;
        result as f32 / u32::MAX as f32
    }

    /// Integer hash (Inigo Quilez), returns a value in [0, 1].
    pub fn iqint(&mut self, seed: u32) -> f32 {
        let mut state = seed.wrapping_add(self.last);
        state = (state << 13) ^ state;
        state = state
            .wrapping_mul(
                state
                    .wrapping_mul(state)
                    .wrapping_mul(15_731)
                    .wrapping_add(789_221),
            )
            .wrapping_add(1_376_312_589);
        self.last = state;
        state as f32 / u32::MAX as f32
    }
}

/// Pre-generated random values.
pub struct RandomCache {
    /// Uniform in [-1, 1]
    floats: Vec<f32>,
    /// Cosine-weighted around +Z
    directions: Vec<Vec3>,
}

impl RandomCache {
    /// Build a full-size cache from a seed.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_sizes(seed, FLOAT_CACHE_SIZE, DIRECTION_CACHE_SIZE)
    }

    /// Build a cache of a custom size. Both sizes are raised to at least 1.
    pub fn with_sizes(seed: u64, float_count: usize, direction_count: usize) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let floats: Vec<f32> = (0..float_count.max(1))
            .map(|_| rng.gen_range(-1.0..=1.0))
            .collect();

        let mut cache = Self {
            floats,
            directions: Vec::new(),
        };

        // Directions are derived from the float table itself.
        let mut cursor = cache.cursor(0);
        let directions = (0..direction_count.max(1))
            .map(|_| cursor.fresh_cosine_direction())
            .collect();
        cache.directions = directions;
        cache
    }

    /// The process-wide cache, filled on first use.
    pub fn global() -> &'static RandomCache {
        static CACHE: OnceLock<RandomCache> = OnceLock::new();
        CACHE.get_or_init(|| {
            log::debug!(
                "Filling random cache ({} floats, {} directions)",
                FLOAT_CACHE_SIZE,
                DIRECTION_CACHE_SIZE
            );
            RandomCache::with_seed(rand::random())
        })
    }

    /// A cursor starting `offset` entries into the tables.
    pub fn cursor(&self, offset: usize) -> CacheCursor<'_> {
        CacheCursor {
            cache: self,
            float_index: offset % self.floats.len(),
            direction_index: offset % self.directions.len().max(1),
        }
    }

    pub fn float_count(&self) -> usize {
        self.floats.len()
    }

    pub fn direction_count(&self) -> usize {
        self.directions.len()
    }
}

/// Cyclic reader over a [`RandomCache`].
#[derive(Clone)]
pub struct CacheCursor<'a> {
    cache: &'a RandomCache,
    float_index: usize,
    direction_index: usize,
}

impl<'a> CacheCursor<'a> {
    /// Next float in [-1, 1].
    #[inline]
    pub fn float(&mut self) -> f32 {
        self.float_index += 1;
        if self.float_index == self.cache.floats.len() {
            self.float_index = 0;
        }
        self.cache.floats[self.float_index]
    }

    /// Next float in [0, 1].
    #[inline]
    pub fn float_0_1(&mut self) -> f32 {
        self.float().abs()
    }

    /// Next float between `m` and `n`, in either order.
    pub fn float_m_n(&mut self, m: f32, n: f32) -> f32 {
        let (lo, hi) = if m < n { (m, n) } else { (n, m) };
        lo + self.float_0_1() * (hi - lo)
    }

    /// Each component in [-1, 1].
    pub fn vec3(&mut self) -> Vec3 {
        Vec3::new(self.float(), self.float(), self.float())
    }

    /// Bernoulli draw. A zero probability never succeeds.
    #[inline]
    pub fn chance(&mut self, probability: f32) -> bool {
        probability > 0.0 && probability >= self.float_0_1()
    }

    /// Uniformly distributed unit vector.
    pub fn unit_vector(&mut self) -> Vec3 {
        for _ in 0..16 {
            let p = self.vec3();
            let len_sq = p.length_squared();
            if len_sq > 1e-6 && len_sq <= 1.0 {
                return p / len_sq.sqrt();
            }
        }
        self.vec3().try_normalize().unwrap_or(Vec3::Y)
    }

    /// Unit vector in the hemisphere around `normal`.
    pub fn unit_in_hemisphere(&mut self, normal: Vec3) -> Vec3 {
        let dir = self.unit_vector();
        if dir.dot(normal) < 0.0 {
            -dir
        } else {
            dir
        }
    }

    /// Point in the unit disk.
    pub fn in_unit_disk(&mut self) -> Vec2 {
        let r = self.float_0_1().sqrt();
        let theta = 2.0 * PI * self.float_0_1();
        Vec2::new(r * theta.cos(), r * theta.sin())
    }

    /// Direction toward a sphere of `radius` seen from `distance_squared`
    /// away, in a frame where the sphere center lies on +Z.
    pub fn in_sphere(&mut self, radius: f32, distance_squared: f32) -> Vec3 {
        let r1 = self.float_0_1();
        let r2 = self.float_0_1();
        let cos_max = (1.0 - radius * radius / distance_squared).max(0.0).sqrt();
        let z = 1.0 + r2 * (cos_max - 1.0);

        let phi = 2.0 * PI * r1;
        let sin_theta = (1.0 - z * z).max(0.0).sqrt();
        Vec3::new(phi.cos() * sin_theta, phi.sin() * sin_theta, z)
    }

    /// Next cached cosine-weighted direction around +Z.
    pub fn cosine_direction(&mut self) -> Vec3 {
        self.direction_index += 1;
        if self.direction_index >= self.cache.directions.len() {
            self.direction_index = 0;
        }
        self.cache.directions[self.direction_index]
    }

    fn fresh_cosine_direction(&mut self) -> Vec3 {
        let r1 = self.float_0_1();
        let r2 = self.float_0_1();
        let phi = 2.0 * PI * r1;
        let r = r2.sqrt();
        Vec3::new(phi.cos() * r, phi.sin() * r, (1.0 - r2).sqrt())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pcg_rotates_state() {
        let mut rng = SeedRng::new();
        let a = rng.pcg(42);
        let b = rng.pcg(42);
        assert_ne!(a, b);
        assert!((0.0..=1.0).contains(&a));
        assert!((0.0..=1.0).contains(&b));

        // Same history, same sequence
        let mut other = SeedRng::new();
        assert_eq!(other.pcg(42), a);
    }

    #[test]
    fn test_iqint_range() {
        let mut rng = SeedRng::new();
        for seed in 0..1000 {
            let x = rng.iqint(seed);
            assert!((0.0..=1.0).contains(&x));
        }
    }

    #[test]
    fn test_cursor_wraps() {
        let cache = RandomCache::with_sizes(7, 4, 2);
        let mut cursor = cache.cursor(0);
        let first: Vec<f32> = (0..4).map(|_| cursor.float()).collect();
        let second: Vec<f32> = (0..4).map(|_| cursor.float()).collect();
        assert_eq!(first, second);
        assert!(first.iter().all(|x| (-1.0..=1.0).contains(x)));
    }

    #[test]
    fn test_cosine_directions_are_unit_and_up() {
        let cache = RandomCache::with_sizes(3, 1000, 100);
        let mut cursor = cache.cursor(5);
        for _ in 0..200 {
            let d = cursor.cosine_direction();
            assert!((d.length() - 1.0).abs() < 1e-4);
            assert!(d.z >= 0.0);
        }
    }

    #[test]
    fn test_unit_vector_and_hemisphere() {
        let cache = RandomCache::with_sizes(11, 10_000, 10);
        let mut cursor = cache.cursor(0);
        for _ in 0..500 {
            let v = cursor.unit_vector();
            assert!((v.length() - 1.0).abs() < 1e-4);
            let h = cursor.unit_in_hemisphere(Vec3::Y);
            assert!(h.y >= 0.0);
        }
    }

    #[test]
    fn test_chance_extremes() {
        let cache = RandomCache::with_sizes(1, 1000, 10);
        let mut cursor = cache.cursor(0);
        for _ in 0..100 {
            assert!(!cursor.chance(0.0));
            assert!(cursor.chance(1.0));
        }
    }

    #[test]
    fn test_float_m_n_order() {
        let cache = RandomCache::with_sizes(9, 1000, 10);
        let mut cursor = cache.cursor(0);
        for _ in 0..100 {
            let x = cursor.float_m_n(5.0, 2.0);
            assert!((2.0..=5.0).contains(&x));
        }
    }

    #[test]
    fn test_in_unit_disk() {
        let cache = RandomCache::with_sizes(2, 1000, 10);
        let mut cursor = cache.cursor(0);
        for _ in 0..100 {
            assert!(cursor.in_unit_disk().length() <= 1.0 + 1e-5);
        }
    }
}
