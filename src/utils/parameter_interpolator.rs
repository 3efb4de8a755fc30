//! Linear interpolation of parameters in rendering loops.

/// Block-rate target with per-sample linear interpolation.
///
/// `next()` yields the value at the start of the block first, so the last
/// sample of a block sits one increment before the target. Setting a new
/// target snaps to the previous one to keep rounding from drifting.
#[derive(Debug, Default, Copy, Clone)]
pub struct Ramp {
    value: f32,
    target: f32,
    increment: f32,
}

impl Ramp {
    pub fn new(value: f32) -> Self {
        Self {
            value,
            target: value,
            increment: 0.0,
        }
    }

    /// Jumps straight to `value` without interpolation.
    #[inline]
    pub fn reset(&mut self, value: f32) {
        self.value = value;
        self.target = value;
        self.increment = 0.0;
    }

    /// Interpolates towards `target` over `size` samples. A size of zero
    /// seeds the ramp instead.
    #[inline]
    pub fn set_target(&mut self, target: f32, size: usize) {
        if size == 0 {
            self.reset(target);
            return;
        }
        self.value = self.target;
        self.target = target;
        self.increment = (target - self.value) / (size as f32);
    }

    #[inline]
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> f32 {
        let value = self.value;
        self.value += self.increment;
        value
    }

    /// Stops interpolation at the current target.
    #[inline]
    pub fn finish(&mut self) {
        self.value = self.target;
        self.increment = 0.0;
    }
}
