//! Structural hashing used for dirty detection.
//!
//! These hashes only answer "did anything that affects the image change since
//! the last render?". They are not identities and collisions are tolerated.

use crate::{Vec2, Vec3};

/// Types whose rendered appearance can be summarised by a 32-bit hash.
pub trait StructuralHash {
    fn structural_hash(&self) -> u32;
}

/// Mix two 32-bit values (Bob Jenkins' 96-bit mix with a golden ratio seed).
pub fn combine(a: u32, b: u32) -> u32 {
    let mut a = a;
    let mut b = b;
    let mut c: u32 = 0x9e37_79b9;

    a = a.wrapping_sub(b);
    a = a.wrapping_sub(c);
    a ^= c >> 13;
    b = b.wrapping_sub(c);
    b = b.wrapping_sub(a);
    b ^= a << 8;
    c = c.wrapping_sub(a);
    c = c.wrapping_sub(b);
    c ^= b >> 13;
    a = a.wrapping_sub(b);
    a = a.wrapping_sub(c);
    a ^= c >> 12;
    b = b.wrapping_sub(c);
    b = b.wrapping_sub(a);
    b ^= a << 16;
    c = c.wrapping_sub(a);
    c = c.wrapping_sub(b);
    c ^= b >> 5;
    a = a.wrapping_sub(b);
    a = a.wrapping_sub(c);
    a ^= c >> 3;
    b = b.wrapping_sub(c);
    b = b.wrapping_sub(a);
    b ^= a << 10;
    c = c.wrapping_sub(a);
    c = c.wrapping_sub(b);
    c ^= b >> 15;

    c
}

/// Fold any number of values into one hash, left to right.
pub fn combine_all(values: &[u32]) -> u32 {
    values.iter().fold(0, |acc, &v| combine(acc, v))
}

#[inline]
pub fn of_f32(value: f32) -> u32 {
    value.to_bits()
}

#[inline]
pub fn of_bool(value: bool) -> u32 {
    value as u32
}

pub fn of_vec2(value: Vec2) -> u32 {
    combine(of_f32(value.x), of_f32(value.y))
}

pub fn of_vec3(value: Vec3) -> u32 {
    combine_all(&[of_f32(value.x), of_f32(value.y), of_f32(value.z)])
}
