//! Single-cycle operator waveforms.

use alloc::vec::Vec;

#[allow(unused_imports)]
use num_traits::float::Float;

use core::f64::consts::TAU;

pub const NUM_WAVES: usize = 8;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    #[default]
    Sine,

    HalfSine,
    AbsSine,
    PulseSine,
    Triangle,
    Saw,
    Square,
    Pulse,
}

impl Waveform {
    pub const ALL: [Waveform; NUM_WAVES] = [
        Waveform::Sine,
        Waveform::HalfSine,
        Waveform::AbsSine,
        Waveform::PulseSine,
        Waveform::Triangle,
        Waveform::Saw,
        Waveform::Square,
        Waveform::Pulse,
    ];

    /// Value at `phase` in `0.0..1.0`, computed exactly.
    pub fn evaluate(self, phase: f64) -> f64 {
        let sine = (TAU * phase).sin();
        match self {
            Waveform::Sine => sine,
            Waveform::HalfSine => sine.max(0.0),
            Waveform::AbsSine => sine.abs(),
            Waveform::PulseSine => {
                if phase < 0.5 {
                    (TAU * 2.0 * phase).sin()
                } else {
                    0.0
                }
            }
            Waveform::Triangle => {
                if phase < 0.25 {
                    4.0 * phase
                } else if phase < 0.75 {
                    2.0 - 4.0 * phase
                } else {
                    4.0 * phase - 4.0
                }
            }
            Waveform::Saw => {
                if phase < 0.5 {
                    2.0 * phase
                } else {
                    2.0 * phase - 2.0
                }
            }
            Waveform::Square => {
                if phase < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
            Waveform::Pulse => {
                if phase < 0.25 {
                    1.0
                } else {
                    -1.0 / 3.0
                }
            }
        }
    }
}

impl From<usize> for Waveform {
    fn from(value: usize) -> Self {
        Waveform::ALL[value.min(NUM_WAVES - 1)]
    }
}

/// Waveform tables at one resolution. Each table holds `size + 1` samples,
/// the last one repeating the first for interpolation.
#[derive(Debug, Clone)]
pub struct WaveLibrary {
    size: usize,
    tables: Vec<Vec<f32>>,
}

impl WaveLibrary {
    pub fn new(size: usize) -> Self {
        let size = size.max(4);
        let tables = Waveform::ALL
            .iter()
            .map(|waveform| {
                let mut table: Vec<f32> = (0..size)
                    .map(|i| waveform.evaluate(i as f64 / size as f64) as f32)
                    .collect();
                table.push(table[0]);
                table
            })
            .collect();

        Self { size, tables }
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn wave(&self, waveform: Waveform) -> &[f32] {
        &self.tables[waveform as usize]
    }

    /// Table for a raw waveform index; out-of-range indices are clamped.
    #[inline]
    pub fn wave_by_index(&self, index: usize) -> &[f32] {
        self.wave(Waveform::from(index))
    }
}
