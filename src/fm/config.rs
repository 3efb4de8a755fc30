//! Engine configuration.
//!
//! One engine serves every fidelity level. What used to differ between build
//! variants (table resolution, oversampling, envelope resolution and the
//! level multiplication path) is selected at runtime through [`EngineConfig`].

use thiserror::Error;

pub const MIN_WAVE_TABLE_SIZE: usize = 64;
pub const MAX_WAVE_TABLE_SIZE: usize = 65536;
pub const MAX_OVERSAMPLING: usize = 32;
pub const MIN_SAMPLE_RATE: f32 = 1000.0;
pub const MAX_SAMPLE_RATE: f32 = 768000.0;

#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum ConfigError {
    #[error("wave table size {0} is not a power of two in 64..=65536")]
    WaveTableSize(usize),

    #[error("oversampling factor {0} is not one of 1, 2, 4, 8, 16, 32")]
    Oversampling(usize),

    #[error("sample rate {0} Hz is outside 1000..=768000")]
    SampleRate(f32),
}

/// How often the amplitude envelopes are evaluated.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeResolution {
    /// Once per block, linearly interpolated in between.
    #[default]
    Block,

    /// Once per output sample.
    Sample,
}

/// How the oscillator output is scaled by envelope and level.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum LevelMode {
    /// Plain floating point multiplication.
    #[default]
    Direct,

    /// Addition in the log2 domain followed by a table exp2.
    LogDomain,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    pub wave_table_size: usize,
    pub oversampling: usize,
    pub envelope_resolution: EnvelopeResolution,
    pub level_mode: LevelMode,
}

impl EngineConfig {
    pub const fn new(
        wave_table_size: usize,
        oversampling: usize,
        envelope_resolution: EnvelopeResolution,
        level_mode: LevelMode,
    ) -> Self {
        Self {
            wave_table_size,
            oversampling,
            envelope_resolution,
            level_mode,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.wave_table_size.is_power_of_two()
            || !(MIN_WAVE_TABLE_SIZE..=MAX_WAVE_TABLE_SIZE).contains(&self.wave_table_size)
        {
            return Err(ConfigError::WaveTableSize(self.wave_table_size));
        }

        if !self.oversampling.is_power_of_two() || self.oversampling > MAX_OVERSAMPLING {
            return Err(ConfigError::Oversampling(self.oversampling));
        }

        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Fidelity::Standard.config()
    }
}

pub fn validate_sample_rate(sample_rate: f32) -> Result<f32, ConfigError> {
    if sample_rate.is_finite() && (MIN_SAMPLE_RATE..=MAX_SAMPLE_RATE).contains(&sample_rate) {
        Ok(sample_rate)
    } else {
        Err(ConfigError::SampleRate(sample_rate))
    }
}

/// The shipped build variants, from cheapest to most accurate.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Fidelity {
    Lofi,

    #[default]
    Standard,

    High,
    Ultra,
    Extreme,
}

impl Fidelity {
    pub const ALL: [Fidelity; 5] = [
        Fidelity::Lofi,
        Fidelity::Standard,
        Fidelity::High,
        Fidelity::Ultra,
        Fidelity::Extreme,
    ];

    pub const fn config(self) -> EngineConfig {
        match self {
            Fidelity::Lofi => {
                EngineConfig::new(256, 1, EnvelopeResolution::Block, LevelMode::LogDomain)
            }
            Fidelity::Standard => {
                EngineConfig::new(2048, 1, EnvelopeResolution::Block, LevelMode::Direct)
            }
            Fidelity::High => {
                EngineConfig::new(4096, 2, EnvelopeResolution::Sample, LevelMode::Direct)
            }
            Fidelity::Ultra => {
                EngineConfig::new(8192, 8, EnvelopeResolution::Sample, LevelMode::Direct)
            }
            Fidelity::Extreme => {
                EngineConfig::new(16384, 32, EnvelopeResolution::Sample, LevelMode::Direct)
            }
        }
    }
}
