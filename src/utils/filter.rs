//! DC blocker.

use super::flush_denormal;

/// Cutoff of the voice output DC blocker.
pub const DC_BLOCKER_CUTOFF_HZ: f32 = 5.0;

/// One-pole high-pass: `y(n) = x(n) - x(n-1) + pole * y(n-1)`.
#[derive(Debug, Default, Clone)]
pub struct DcBlocker {
    pole: f32,
    x: f32,
    y: f32,
}

impl DcBlocker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn init(&mut self, pole: f32) {
        self.x = 0.0;
        self.y = 0.0;
        self.pole = pole;
    }

    /// Pole for a given cutoff frequency.
    pub fn pole_for(cutoff_hz: f32, sample_rate: f32) -> f32 {
        (1.0 - core::f32::consts::TAU * cutoff_hz / sample_rate).clamp(0.0, 0.99999)
    }

    #[inline]
    pub fn process_sample(&mut self, sample: f32) -> f32 {
        let old_x = self.x;
        self.x = sample;
        self.y = flush_denormal(self.y * self.pole + sample - old_x);
        self.y
    }
}
