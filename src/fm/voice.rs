//! FM stack voice.
//!
//! Four oscillator operators and one audio-input operator. Per block the voice
//! resolves the variation blend, the modulation groups and the matrix, then
//! renders oversampled sub-samples, decimates, removes DC and writes
//! interleaved stereo.
//!
//! The host calls, per block: `note_on`/`note_off` as needed, `set_mod_value`,
//! `prepare_block`, then `process_replace`. A `prepare_block` with zero frames
//! seeds the interpolators without producing audio.

#[allow(unused_imports)]
use num_traits::float::Float;

use log::{debug, trace, warn};

use super::config::{validate_sample_rate, ConfigError, EnvelopeResolution, LevelMode};
use super::downsampler::Downsampler;
use super::matrix::ModMatrix;
use super::mod_group;
use super::operator::{BlockContext, ModMode, Operator, INPUT_RANGE};
use super::params::{GlobalParam, VarField};
use super::variation::VariationBlend;
use super::{AUDIO_INPUT_OP, NUM_MOD_INPUTS, NUM_OPERATORS};
use crate::plugin::Shared;
use crate::resources::WaveLibrary;
use crate::utils::filter::{DcBlocker, DC_BLOCKER_CUTOFF_HZ};
use crate::utils::parameter_interpolator::Ramp;
use crate::utils::random::Rng;
use crate::utils::units::ms_to_frames;
use crate::utils::{flush_denormal, sanitize};

/// Lowest pitch the glide works with.
pub const MIN_FREQUENCY_HZ: f32 = 0.01;

/// Largest host volume factor.
pub const MAX_VOLUME: f32 = 4.0;

/// Pitch and envelope behaviour of a note on.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Glide {
    /// Hard restart of phases, envelopes and the random generator; the pitch
    /// jumps to the new note.
    #[default]
    Off,

    /// Keeps envelopes and phases running and glides to the new pitch. A
    /// silent voice restarts its envelopes as with `Retrigger`.
    Legato,

    /// Glides to the new pitch and restarts the envelopes from their current
    /// level.
    Retrigger,
}

impl From<i32> for Glide {
    fn from(value: i32) -> Self {
        match value {
            1 => Glide::Legato,
            2 => Glide::Retrigger,
            _ => Glide::Off,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Voice {
    sample_rate: f32,
    oversampling: usize,
    envelope_resolution: EnvelopeResolution,
    level_mode: LevelMode,

    operators: [Operator; NUM_OPERATORS],
    rng: Rng,

    velocity: f32,
    velocity_u8: u8,
    glide: Glide,
    pitch_initialized: bool,
    log2_frequency: f32,

    mod_values: [f32; NUM_MOD_INPUTS],
    blend: VariationBlend,

    volume: Ramp,
    prepared_frames: usize,

    downsampler_state: f32,
    downsampler_coefficient: f32,
    dc_blocker: DcBlocker,
}

impl Voice {
    pub fn new(shared: &Shared, sample_rate: f32, seed: u32) -> Result<Self, ConfigError> {
        let sample_rate = validate_sample_rate(sample_rate)?;
        let config = shared.config();

        let mut dc_blocker = DcBlocker::new();
        dc_blocker.init(DcBlocker::pole_for(DC_BLOCKER_CUTOFF_HZ, sample_rate));

        debug!(
            "Voice at {} Hz, {}x oversampling, seed {:#x}",
            sample_rate, config.oversampling, seed
        );

        Ok(Self {
            sample_rate,
            oversampling: config.oversampling,
            envelope_resolution: config.envelope_resolution,
            level_mode: config.level_mode,

            operators: core::array::from_fn(Operator::new),
            rng: Rng::new(seed),

            velocity: 0.0,
            velocity_u8: 0,
            glide: Glide::Off,
            pitch_initialized: false,
            log2_frequency: 0.0,

            mod_values: [0.0; NUM_MOD_INPUTS],
            blend: VariationBlend::default(),

            volume: Ramp::default(),
            prepared_frames: 0,

            downsampler_state: 0.0,
            downsampler_coefficient: Downsampler::coefficient(config.oversampling),
            dc_blocker,
        })
    }

    /// Starts a note. `velocity` is in `0..=1`.
    pub fn note_on(&mut self, shared: &Shared, velocity: f32, glide: Glide) {
        self.velocity = sanitize(velocity, 0.0, 1.0, 0.0);
        self.velocity_u8 = (self.velocity * 255.0).round() as u8;
        self.glide = glide;

        trace!("Note on: velocity {}, glide {:?}", self.velocity, glide);

        match glide {
            Glide::Off => {
                let params = shared.params();
                let blend = VariationBlend::select(params, self.mod_values[0]);
                let rand_mask = params.global_int(GlobalParam::PhaseRandMask);

                self.rng.reset();
                self.pitch_initialized = false;

                for operator in self.operators.iter_mut() {
                    let op = operator.index();
                    let start_phase = blend.get(params, op, VarField::Phase);
                    operator.note_on(&mut self.rng, start_phase, rand_mask & (1 << op) != 0);
                }
            }
            Glide::Legato if self.is_active() => {}
            Glide::Legato | Glide::Retrigger => {
                for operator in self.operators.iter_mut() {
                    operator.retrigger();
                }
            }
        }
    }

    /// Releases every envelope from its current level.
    pub fn note_off(&mut self) {
        trace!("Note off");

        for operator in self.operators.iter_mut() {
            operator.note_off();
        }
    }

    /// Sets live modulation input `index`. Input 0 moves the variation
    /// position; the others add to the matching modulation group amount.
    pub fn set_mod_value(&mut self, index: usize, value: f32) {
        match self.mod_values.get_mut(index) {
            Some(slot) => *slot = sanitize(value, -1.0, 1.0, 0.0),
            None => warn!("Ignoring modulation input {}", index),
        }
    }

    #[inline]
    pub fn mod_value(&self, index: usize) -> f32 {
        self.mod_values.get(index).copied().unwrap_or(0.0)
    }

    /// Resolves block parameters for the next `num_frames` output frames.
    /// `pan` is accepted for the host interface; the output is mono.
    pub fn prepare_block(
        &mut self,
        shared: &Shared,
        num_frames: usize,
        freq_hz: f32,
        note: f32,
        vol: f32,
        pan: f32,
    ) {
        let _ = (note, pan);
        let params = shared.params();

        self.blend = VariationBlend::select(params, self.mod_values[0]);
        let modifiers = mod_group::resolve(params, &self.mod_values);

        let frequency = self.glide_to(freq_hz, params.global(GlobalParam::GlideTime), num_frames);
        let modfm_mask = params.global_int(GlobalParam::ModFmMask);

        let ctx = BlockContext {
            params,
            blend: &self.blend,
            sample_rate: self.sample_rate,
            oversampling: self.oversampling,
            frames: num_frames,
            frequency,
            velocity: self.velocity_u8,
            envelope_resolution: self.envelope_resolution,
        };

        for (operator, modifier) in self.operators.iter_mut().zip(modifiers.iter()) {
            let mode = ModMode::from_mask(modfm_mask, operator.index());
            operator.prepare(&ctx, modifier, mode);
        }

        let active: [bool; NUM_OPERATORS] = core::array::from_fn(|op| self.operators[op].is_active());
        let matrix = ModMatrix::resolve(params, &self.blend, &modifiers, &active);
        let sub_frames = num_frames * self.oversampling;

        for (op, operator) in self.operators.iter_mut().enumerate() {
            operator.set_matrix(matrix.row(op), matrix.output(op), &active, sub_frames);
        }

        let volume = sanitize(vol, 0.0, MAX_VOLUME, 0.0) * params.global(GlobalParam::Volume);
        self.volume.set_target(volume, num_frames);
        self.prepared_frames = num_frames;
    }

    /// One-pole glide in log2 frequency, advanced once per block.
    fn glide_to(&mut self, freq_hz: f32, glide_ms: f32, num_frames: usize) -> f32 {
        let nyquist = self.sample_rate * 0.5;
        let target = sanitize(freq_hz, MIN_FREQUENCY_HZ, nyquist, MIN_FREQUENCY_HZ).log2();
        let glide_frames = ms_to_frames(glide_ms, self.sample_rate);

        if !self.pitch_initialized || self.glide == Glide::Off || glide_frames <= 0.0 {
            self.log2_frequency = target;
            self.pitch_initialized = true;
        } else {
            let coefficient = 1.0 - (-(num_frames as f32) / glide_frames).exp();
            self.log2_frequency += coefficient * (target - self.log2_frequency);
        }

        self.log2_frequency.exp2()
    }

    /// Renders `num_frames` interleaved stereo frames into `samples_out`.
    ///
    /// `samples_in` holds the audio-input operator's signal, mono when
    /// `mono_in` is set and interleaved stereo otherwise. Missing input reads
    /// as silence. Frames that do not fit into `samples_out` are dropped.
    pub fn process_replace(
        &mut self,
        shared: &Shared,
        mono_in: bool,
        samples_in: Option<&[f32]>,
        samples_out: &mut [f32],
        num_frames: usize,
    ) {
        let frames = num_frames.min(samples_out.len() / 2);
        if frames < num_frames {
            warn!(
                "Output buffer holds {} frames, {} requested",
                samples_out.len() / 2,
                num_frames
            );
        }
        if frames > self.prepared_frames {
            warn!(
                "Rendering {} frames with {} prepared",
                frames, self.prepared_frames
            );
        }

        let waves = shared.waves();
        let oversampling = self.oversampling;
        let level_mode = self.level_mode;
        let env_step = match self.envelope_resolution {
            EnvelopeResolution::Block => None,
            EnvelopeResolution::Sample => Some(1.0 / oversampling as f32),
        };

        let Self {
            operators,
            volume,
            prepared_frames,
            downsampler_state,
            downsampler_coefficient,
            dc_blocker,
            ..
        } = self;

        let mut downsampler =
            Downsampler::new(downsampler_state, oversampling, *downsampler_coefficient);

        for (frame, out) in samples_out.chunks_exact_mut(2).take(frames).enumerate() {
            if frame == *prepared_frames {
                for operator in operators.iter_mut() {
                    operator.finish_ramps();
                }
                volume.finish();
            }

            let input = read_input(samples_in, mono_in, frame);
            for _ in 0..oversampling {
                downsampler.accumulate(render_sub_sample(
                    operators, waves, input, level_mode, env_step,
                ));
            }

            let sample = flush_denormal(dc_blocker.process_sample(downsampler.read()));
            let sample = sample * volume.next();
            out[0] = sample;
            out[1] = sample;
        }

        *prepared_frames = prepared_frames.saturating_sub(frames);
    }

    /// False once every sounding operator has finished its release.
    pub fn is_active(&self) -> bool {
        self.operators
            .iter()
            .any(|operator| operator.is_active() && !operator.is_done())
    }

    #[inline]
    pub fn operator(&self, op: usize) -> Option<&Operator> {
        self.operators.get(op)
    }

    #[inline]
    pub fn blend(&self) -> &VariationBlend {
        &self.blend
    }

    #[inline]
    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    /// Current glided pitch.
    #[inline]
    pub fn frequency(&self) -> f32 {
        self.log2_frequency.exp2()
    }

    #[inline]
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }
}

#[inline]
fn read_input(samples_in: Option<&[f32]>, mono_in: bool, frame: usize) -> f32 {
    let Some(samples) = samples_in else {
        return 0.0;
    };
    let sample = if mono_in {
        samples.get(frame).copied().unwrap_or(0.0)
    } else {
        let left = samples.get(2 * frame).copied().unwrap_or(0.0);
        let right = samples.get(2 * frame + 1).copied().unwrap_or(0.0);
        (left + right) * 0.5
    };

    sanitize(sample, -INPUT_RANGE, INPUT_RANGE, 0.0)
}

/// Renders one sub-sample of every active operator from a snapshot of the
/// previous outputs and mixes them to the voice output.
#[inline]
fn render_sub_sample(
    operators: &mut [Operator; NUM_OPERATORS],
    waves: &WaveLibrary,
    input: f32,
    level_mode: LevelMode,
    env_step: Option<f32>,
) -> f32 {
    let prev: [f32; NUM_OPERATORS] = core::array::from_fn(|op| operators[op].last_out());
    let mut mix = 0.0;

    for operator in operators.iter_mut() {
        if !operator.is_active() {
            continue;
        }
        if operator.index() == AUDIO_INPUT_OP {
            operator.calc_out_audio_input(&prev, input, level_mode, env_step);
        } else {
            operator.calc_out(&prev, waves, level_mode, env_step);
        }
        mix += operator.output();
    }

    mix
}
