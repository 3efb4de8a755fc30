//! Unit conversions and fast exponential/logarithm approximations.
//!
//! The fast variants trade exactness for speed with a bounded error:
//! - `pow_2_fast`: relative error below 1.5e-4, strictly increasing.
//! - `log_2_fast`: absolute error below 1.1e-3 for positive normal input,
//!   strictly increasing.

#[allow(unused_imports)]
use num_traits::float::Float;

const LOG2_C1: f32 = 1.4208645;
const LOG2_C2: f32 = -0.57725065;
const LOG2_C3: f32 = 1.0 - LOG2_C1 - LOG2_C2;

/// Computes 2^x with a cubic approximation of 2^frac(x) and direct
/// manipulation of the IEEE 754 exponent for int(x).
#[inline]
pub fn pow_2_fast(x: f32) -> f32 {
    let x = x.clamp(-126.0, 127.0);
    let x_integral = x.floor();
    let x_fractional = x - x_integral;

    let mantissa = 1.0 + x_fractional * (0.6958 + x_fractional * (0.2251 + x_fractional * 0.0791));
    let bits = mantissa.to_bits() as i32 + ((x_integral as i32) << 23);

    f32::from_bits(bits as u32)
}

/// Computes log2(x) from the IEEE 754 exponent plus a cubic approximation of
/// log2 on the mantissa. Non-positive input yields -127.
#[inline]
pub fn log_2_fast(x: f32) -> f32 {
    if x <= 0.0 || x.is_nan() {
        return -127.0;
    }
    let bits = x.to_bits();
    let exponent = ((bits >> 23) & 0xff) as i32 - 127;
    let mantissa = f32::from_bits((bits & 0x007f_ffff) | 0x3f80_0000) - 1.0;

    exponent as f32 + mantissa * (LOG2_C1 + mantissa * (LOG2_C2 + mantissa * LOG2_C3))
}

#[inline]
pub fn semitones_to_ratio(semitones: f32) -> f32 {
    pow_2_fast(semitones * (1.0 / 12.0))
}

/// Exact conversion, used where symmetry matters more than speed.
#[inline]
pub fn ratio_to_octaves(ratio: f32) -> f32 {
    ratio.log2()
}

#[inline]
pub fn octaves_to_ratio(octaves: f32) -> f32 {
    octaves.exp2()
}

#[inline]
pub fn ms_to_frames(ms: f32, sample_rate: f32) -> f32 {
    ms * sample_rate * 0.001
}
