//! Lookup tables.
//!
//! Waveform tables depend on the engine configuration and are owned by a
//! [`WaveLibrary`]. Envelope shapes and the velocity curve are the same for
//! every configuration and are computed once per process.

pub mod shapes;
pub mod waves;

pub use shapes::{apply_shape, shape_table, NUM_SHAPES, SHAPE_TABLE_SIZE};
pub use waves::{WaveLibrary, Waveform, NUM_WAVES};

use alloc::vec::Vec;

#[allow(unused_imports)]
use num_traits::float::Float;
use spin::Once;

pub const VELOCITY_CURVE_SIZE: usize = 256;

static LUT_VELOCITY_CURVE: Once<Vec<f32>> = Once::new();

/// Velocity response table indexed by quantized velocity.
pub fn velocity_curve() -> &'static [f32] {
    LUT_VELOCITY_CURVE.call_once(|| {
        (0..VELOCITY_CURVE_SIZE)
            .map(|i| (i as f32 / (VELOCITY_CURVE_SIZE - 1) as f32).powf(1.6))
            .collect()
    })
}

/// Velocity scaling for a quantized velocity. Out-of-range indices are clamped.
#[inline]
pub fn velocity_scale(velocity: u8, sensitivity: f32) -> f32 {
    let curve = velocity_curve();
    let index = (velocity as usize).min(curve.len() - 1);
    let sensitivity = sensitivity.clamp(0.0, 1.0);

    1.0 - sensitivity + sensitivity * curve[index]
}
