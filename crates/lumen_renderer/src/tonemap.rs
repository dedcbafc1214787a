//! HDR to LDR tone mapping operators.
//!
//! All operators take and return linear radiance. `reinhard` is meant for
//! luminance and is not bounded per channel on raw RGB the way it is on
//! luminance.

use lumen_core::Color;
use lumen_math::Vec3;

/// Rec. 709 luminance weights.
const LUMINANCE_WEIGHTS: Vec3 = Vec3::new(0.2126, 0.7152, 0.0722);

/// Clamp each channel to [0, 1].
pub fn trivial(v: Color) -> Color {
    v.clamp(Color::ZERO, Color::ONE)
}

/// `v / (1 + v)`.
pub fn reinhard(v: Color) -> Color {
    v / (Color::ONE + v)
}

/// Reinhard with a configurable white point: radiance equal to
/// `white_point` maps to 1.
pub fn reinhard_extended(v: Color, white_point: f32) -> Color {
    let white_sq = white_point * white_point;
    let numerator = v * (Color::ONE + v / white_sq);
    numerator / (Color::ONE + v)
}

/// Perceptual luminance.
pub fn luminance(v: Color) -> f32 {
    v.dot(LUMINANCE_WEIGHTS)
}

/// Scale `c_in` so its luminance becomes `l_out`. Black stays black.
pub fn change_luminance(c_in: Color, l_out: f32) -> Color {
    let l_in = luminance(c_in);
    if l_in == 0.0 {
        return Color::ZERO;
    }
    c_in * (l_out / l_in)
}

/// `reinhard_extended` applied to luminance, keeping chrominance.
pub fn reinhard_extended_luminance(v: Color, white_point: f32) -> Color {
    let l_old = luminance(v);
    let numerator = l_old * (1.0 + l_old / (white_point * white_point));
    let l_new = numerator / (1.0 + l_old);
    change_luminance(v, l_new)
}
