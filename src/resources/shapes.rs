//! Envelope segment shapes.
//!
//! Each table falls monotonically from exactly 1.0 at t = 0 to exactly 0.0
//! at t = 1. Shape parameter -1.0 gives a logarithmic-looking curve (slow
//! start), 0.0 a straight line and 1.0 an exponential-looking curve (fast
//! start).

use alloc::vec::Vec;

#[allow(unused_imports)]
use num_traits::float::Float;
use spin::Once;

use crate::utils::interpolate;

pub const SHAPE_TABLE_SIZE: usize = 2048;
pub const NUM_SHAPES: usize = 33;

const SHAPE_STEEPNESS: f32 = 8.0;

static LUT_SHAPES: Once<Vec<f32>> = Once::new();

fn build_shapes() -> Vec<f32> {
    let stride = SHAPE_TABLE_SIZE + 1;
    let mut tables = Vec::with_capacity(NUM_SHAPES * stride);

    for s in 0..NUM_SHAPES {
        let curve = (s as f32 / (NUM_SHAPES - 1) as f32) * 2.0 - 1.0;
        let k = (curve * SHAPE_STEEPNESS) as f64;
        let floor = (-k).exp();

        for i in 0..stride {
            let t = i as f64 / SHAPE_TABLE_SIZE as f64;
            let value = if i == 0 {
                1.0
            } else if i == SHAPE_TABLE_SIZE {
                0.0
            } else if k.abs() < 1.0e-6 {
                1.0 - t
            } else {
                ((-k * t).exp() - floor) / (1.0 - floor)
            };
            tables.push(value as f32);
        }
    }

    tables
}

/// Table for a shape parameter in `-1.0..=1.0`, quantized to the nearest of
/// [`NUM_SHAPES`] curves.
pub fn shape_table(shape: f32) -> &'static [f32] {
    let tables = LUT_SHAPES.call_once(build_shapes);
    let shape = if shape.is_finite() { shape } else { 0.0 };
    let position = (shape.clamp(-1.0, 1.0) + 1.0) * 0.5 * (NUM_SHAPES - 1) as f32;
    let index = (position.round() as usize).min(NUM_SHAPES - 1);
    let stride = SHAPE_TABLE_SIZE + 1;

    &tables[index * stride..(index + 1) * stride]
}

/// Remaining fraction of a segment at progress `t` in `0.0..=1.0`.
#[inline]
pub fn apply_shape(table: &[f32], t: f32) -> f32 {
    interpolate(table, t, SHAPE_TABLE_SIZE as f32)
}
