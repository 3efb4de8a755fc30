//! Oversampling decimator.
//!
//! Sub-samples pass a one-pole low-pass running at the oversampled rate and
//! are box-averaged down to one output sample. The filter state lives in the
//! voice; the downsampler borrows it for a block and writes it back on drop.

#[allow(unused_imports)]
use num_traits::float::Float;

use crate::utils::{flush_denormal, one_pole};

/// Low-pass cutoff relative to the output sample rate.
pub const CUTOFF: f32 = 0.45;

#[derive(Debug)]
pub struct Downsampler<'a> {
    factor: usize,
    scale: f32,
    coefficient: f32,
    lp: f32,
    sum: f32,
    state: &'a mut f32,
}

impl<'a> Downsampler<'a> {
    pub fn new(state: &'a mut f32, factor: usize, coefficient: f32) -> Self {
        let factor = factor.max(1);
        Self {
            factor,
            scale: 1.0 / factor as f32,
            coefficient,
            lp: *state,
            sum: 0.0,
            state,
        }
    }

    /// Filter coefficient for an oversampling factor.
    pub fn coefficient(factor: usize) -> f32 {
        let f = CUTOFF / factor.max(1) as f32;
        1.0 - (-core::f32::consts::TAU * f).exp()
    }

    #[inline]
    pub fn accumulate(&mut self, sample: f32) {
        if self.factor == 1 {
            self.sum = sample;
            return;
        }
        one_pole(&mut self.lp, sample, self.coefficient);
        self.sum += self.lp;
    }

    #[inline]
    pub fn read(&mut self) -> f32 {
        let value = self.sum * self.scale;
        self.sum = 0.0;

        value
    }
}

impl Drop for Downsampler<'_> {
    fn drop(&mut self) {
        *self.state = flush_denormal(self.lp);
    }
}
