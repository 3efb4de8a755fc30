//! Modules for the 4+1 operator FM stack.

pub mod config;
pub mod downsampler;
pub mod envelope;
pub mod log_mul;
pub mod matrix;
pub mod mod_group;
pub mod operator;
pub mod params;
pub mod variation;
pub mod voice;

/// Oscillator operators.
pub const NUM_OPS: usize = 4;

/// Oscillator operators plus the audio-input operator.
pub const NUM_OPERATORS: usize = NUM_OPS + 1;

/// Index of the operator driven by the host input signal.
pub const AUDIO_INPUT_OP: usize = NUM_OPS;

pub const NUM_VARIATIONS: usize = 8;
pub const NUM_MOD_GROUPS: usize = 8;
pub const NUM_MOD_INPUTS: usize = 8;
