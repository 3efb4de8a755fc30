//! Utility functions.
//!
//! Small numeric helpers shared by the FM engine: table interpolation,
//! one-pole smoothing, phase wrapping and denormal handling.

pub mod filter;
pub mod parameter_interpolator;
pub mod random;
pub mod units;

#[allow(unused_imports)]
use num_traits::float::Float;

/// Magnitude below which filter states are rounded to zero.
pub const DENORMAL_THRESHOLD: f32 = 1.0e-20;

/// Linearly interpolated lookup of `table` at `index` in `0.0..=1.0`.
///
/// `table` must hold `size + 1` entries, the last one being a guard point.
#[inline]
pub fn interpolate(table: &[f32], mut index: f32, size: f32) -> f32 {
    index = index.clamp(0.0, 1.0);
    index *= size;
    let index_integral = (index as usize).min(table.len().saturating_sub(2));
    let index_fractional = index - (index_integral as f32);
    let a = table[index_integral];
    let b = table[index_integral + 1];

    a + (b - a) * index_fractional
}

/// Lookup of a single-cycle table with guard point at a phase in `0.0..1.0`.
#[inline]
pub fn interpolate_wave(table: &[f32], phase: f32) -> f32 {
    let size = table.len() - 1;
    let index = phase * size as f32;
    let index_integral = (index as usize).min(size - 1);
    let index_fractional = index - (index_integral as f32);
    let a = table[index_integral];
    let b = table[index_integral + 1];

    a + (b - a) * index_fractional
}

/// Wraps any phase into `0.0..1.0`. Non-finite input restarts the cycle.
#[inline]
pub fn wrap_phase(phase: f32) -> f32 {
    let wrapped = phase - phase.floor();
    if (0.0..1.0).contains(&wrapped) {
        wrapped
    } else {
        0.0
    }
}

#[inline]
pub fn one_pole(out: &mut f32, in_: f32, coefficient: f32) {
    *out += coefficient * (in_ - *out);
}

/// Crossfade that returns `a` for `fade == 0.0` and `b` for `fade == 1.0`
/// without rounding residue.
#[inline]
pub fn crossfade(a: f32, b: f32, fade: f32) -> f32 {
    a * (1.0 - fade) + b * fade
}

#[inline]
pub fn flush_denormal(x: f32) -> f32 {
    if x.abs() < DENORMAL_THRESHOLD {
        0.0
    } else {
        x
    }
}

/// Replaces non-finite values with `fallback` and clamps into `min..=max`.
#[inline]
pub fn sanitize(value: f32, min: f32, max: f32, fallback: f32) -> f32 {
    if value.is_finite() {
        value.clamp(min, max)
    } else {
        fallback
    }
}
