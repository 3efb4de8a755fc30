//! Log-domain gain.
//!
//! Scales a sample by adding log2 gains and looking the sum up in an exp2
//! table, in place of a chain of multiplications. Sums below [`LOGMUL_MIN`]
//! are treated as silence.
//!
//! Accuracy against plain multiplication is bounded by the fast log2 of the
//! sample (absolute error below 1.1e-3 octaves) plus the table interpolation,
//! for a relative error below 2e-3 over the whole table range.

use alloc::vec::Vec;

#[allow(unused_imports)]
use num_traits::float::Float;
use spin::Once;

use crate::utils::interpolate;
use crate::utils::units::log_2_fast;

/// Smallest log2 gain that still produces output. Tunable; lower values
/// widen the dynamic range at the cost of table resolution.
pub const LOGMUL_MIN: f32 = -24.0;

/// Largest log2 gain covered by the table. Larger sums saturate.
///
/// The range spans 64 octaves so every 1/64 octave, unity gain included,
/// falls on a table point.
pub const LOGMUL_MAX: f32 = 40.0;

pub const EXP2_TABLE_SIZE: usize = 4096;

/// Relative error bound against direct multiplication.
pub const LOGMUL_TOLERANCE: f32 = 2.0e-3;

static LUT_EXP2: Once<Vec<f32>> = Once::new();

fn exp2_table() -> &'static [f32] {
    LUT_EXP2.call_once(|| {
        let span = (LOGMUL_MAX - LOGMUL_MIN) as f64;
        (0..=EXP2_TABLE_SIZE)
            .map(|i| {
                let x = LOGMUL_MIN as f64 + span * i as f64 / EXP2_TABLE_SIZE as f64;
                x.exp2() as f32
            })
            .collect()
    })
}

/// Table exp2 on `LOGMUL_MIN..=LOGMUL_MAX`. Zero below the range.
#[inline]
pub fn exp2_lut(x: f32) -> f32 {
    if x.is_nan() || x < LOGMUL_MIN {
        return 0.0;
    }
    let index = (x - LOGMUL_MIN) / (LOGMUL_MAX - LOGMUL_MIN);

    interpolate(exp2_table(), index, EXP2_TABLE_SIZE as f32)
}

/// Converts a linear gain to the log domain. Non-positive gains map far
/// below [`LOGMUL_MIN`].
#[inline]
pub fn to_log(gain: f32) -> f32 {
    log_2_fast(gain)
}

/// `sample * 2^log_gain`, computed by addition in the log domain.
#[inline]
pub fn multiply(sample: f32, log_gain: f32) -> f32 {
    if sample == 0.0 {
        return 0.0;
    }
    let magnitude = exp2_lut(log_2_fast(sample.abs()) + log_gain);

    if sample < 0.0 {
        -magnitude
    } else {
        magnitude
    }
}
