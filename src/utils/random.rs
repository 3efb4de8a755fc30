//! Fast linear congruential pseudo random number generator.
//!
//! Each voice owns one instance; nothing here is global.

#[derive(Debug, Clone)]
pub struct Rng {
    seed: u32,
    state: u32,
}

impl Rng {
    pub fn new(seed: u32) -> Self {
        Self { seed, state: seed }
    }

    /// Restarts the sequence from the seed given at construction.
    #[inline]
    pub fn reset(&mut self) {
        self.state = self.seed;
    }

    #[inline]
    pub fn get_word(&mut self) -> u32 {
        self.state = self.state.wrapping_mul(1664525).wrapping_add(1013904223);
        self.state
    }

    /// Uniform value in `0.0..1.0`.
    #[inline]
    pub fn get_float(&mut self) -> f32 {
        // 24 significant bits so the result never rounds up to 1.0.
        (self.get_word() >> 8) as f32 / 16777216.0
    }
}

impl Default for Rng {
    fn default() -> Self {
        Self::new(0x21)
    }
}
