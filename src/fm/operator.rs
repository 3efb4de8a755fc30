//! FM operator.
//!
//! One oscillator with an amplitude and a pitch envelope. Block parameters are
//! resolved in [`Operator::prepare`] and interpolated per sample; the render
//! functions read the previous sub-sample output of every operator, so the
//! order in which a voice calls them does not matter.

use alloc::vec::Vec;

#[allow(unused_imports)]
use num_traits::float::Float;
use spin::Once;

use super::config::{EnvelopeResolution, LevelMode};
use super::envelope::{Envelope, EnvelopeParams, ShapeSet};
use super::log_mul;
use super::mod_group::{EnvelopeScale, OperatorModifier};
use super::params::{OpField, Params, VarField, MAX_LEVEL};
use super::variation::VariationBlend;
use super::NUM_OPERATORS;
use crate::resources::{velocity_scale, WaveLibrary, NUM_WAVES};
use crate::utils::parameter_interpolator::Ramp;
use crate::utils::random::Rng;
use crate::utils::units::{ms_to_frames, pow_2_fast, semitones_to_ratio};
use crate::utils::{crossfade, interpolate, interpolate_wave, sanitize, wrap_phase};

/// Bound of the ModFM exponent. The exponential table covers
/// `-MODFM_RANGE..=MODFM_RANGE`; larger sums are clamped to its ends.
pub const MODFM_RANGE: f32 = 16.0;
pub const MODFM_TABLE_SIZE: usize = 4096;

/// Full scale of the audio-input operator's host signal.
pub const INPUT_RANGE: f32 = 1.0;

static LUT_MODFM: Once<Vec<f32>> = Once::new();

/// Table `e^x` on `-MODFM_RANGE..=MODFM_RANGE`.
#[inline]
pub fn modfm_exp(x: f32) -> f32 {
    let table = LUT_MODFM.call_once(|| {
        let range = MODFM_RANGE as f64;
        (0..=MODFM_TABLE_SIZE)
            .map(|i| (-range + 2.0 * range * i as f64 / MODFM_TABLE_SIZE as f64).exp() as f32)
            .collect()
    });
    let index = (sanitize(x, -MODFM_RANGE, MODFM_RANGE, 0.0) + MODFM_RANGE) / (2.0 * MODFM_RANGE);

    interpolate(table, index, MODFM_TABLE_SIZE as f32)
}

/// How incoming modulation acts on an operator.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ModMode {
    /// Sources offset the lookup phase.
    #[default]
    Pm,

    /// Sources scale the output by `exp(sum(amount * (source - 1)))`.
    ModFm,
}

impl ModMode {
    /// Mode of operator `op` given the per-operator ModFM bit mask.
    #[inline]
    pub fn from_mask(mask: usize, op: usize) -> Self {
        if mask & (1 << op) != 0 {
            ModMode::ModFm
        } else {
            ModMode::Pm
        }
    }
}

/// Block inputs shared by every operator of a voice.
#[derive(Debug, Clone, Copy)]
pub struct BlockContext<'a> {
    pub params: &'a Params,
    pub blend: &'a VariationBlend,
    pub sample_rate: f32,
    pub oversampling: usize,
    pub frames: usize,
    pub frequency: f32,
    pub velocity: u8,
    pub envelope_resolution: EnvelopeResolution,
}

#[derive(Debug, Clone)]
pub struct Operator {
    index: usize,

    phase: f32,
    phase_offset: f32,
    speed: Ramp,
    pitch_ratio: Ramp,

    wave_a: usize,
    wave_b: usize,
    wave_mix: Ramp,

    level: Ramp,
    log_level: Ramp,
    amp_level: Ramp,

    mode: ModMode,
    mod_amounts: [Ramp; NUM_OPERATORS],
    out_amount: Ramp,

    amp_env: Envelope,
    pitch_env: Envelope,
    amp_params: EnvelopeParams,
    pitch_params: EnvelopeParams,

    active: bool,
    last_out: f32,
}

impl Operator {
    pub fn new(index: usize) -> Self {
        Self {
            index: index.min(NUM_OPERATORS - 1),

            phase: 0.0,
            phase_offset: 0.0,
            speed: Ramp::default(),
            pitch_ratio: Ramp::new(1.0),

            wave_a: 0,
            wave_b: 0,
            wave_mix: Ramp::default(),

            level: Ramp::default(),
            log_level: Ramp::new(log_mul::to_log(0.0)),
            amp_level: Ramp::default(),

            mode: ModMode::Pm,
            mod_amounts: [Ramp::default(); NUM_OPERATORS],
            out_amount: Ramp::default(),

            amp_env: Envelope::new(),
            pitch_env: Envelope::new(),
            amp_params: EnvelopeParams::default(),
            pitch_params: EnvelopeParams::default(),

            active: false,
            last_out: 0.0,
        }
    }

    /// Hard restart: phase, envelopes and interpolators. The phase starts at
    /// `start_phase`, or at a value drawn from `rng` when `randomize` is set.
    pub fn note_on(&mut self, rng: &mut Rng, start_phase: f32, randomize: bool) {
        self.phase = if randomize {
            rng.get_float()
        } else {
            wrap_phase(start_phase)
        };
        self.amp_env.note_on();
        self.pitch_env.note_on();
        self.amp_level.reset(0.0);
        self.last_out = 0.0;

        // Assume the operator sounds until the next block says otherwise.
        self.active = true;
    }

    /// Restarts both envelopes from their current level.
    pub fn retrigger(&mut self) {
        self.amp_env.retrigger();
        self.pitch_env.retrigger();
    }

    pub fn note_off(&mut self) {
        self.amp_env.note_off();
        self.pitch_env.note_off();
    }

    /// Resolves the block parameters and sets up the per-sample ramps.
    pub fn prepare(&mut self, ctx: &BlockContext, modifier: &OperatorModifier, mode: ModMode) {
        let params = ctx.params;
        let blend = ctx.blend;
        let op = self.index;

        self.mode = mode;
        self.amp_params = envelope_params(
            ctx,
            op,
            [
                VarField::AmpAttack,
                VarField::AmpHold,
                VarField::AmpDecay,
                VarField::AmpSustain,
                VarField::AmpRelease,
            ],
            &modifier.amp_env,
        );
        self.pitch_params = envelope_params(
            ctx,
            op,
            [
                VarField::PitchAttack,
                VarField::PitchHold,
                VarField::PitchDecay,
                VarField::PitchSustain,
                VarField::PitchRelease,
            ],
            &modifier.pitch_env,
        );

        if self.amp_env.needs_shapes() {
            self.amp_env.set_shapes(ShapeSet::new(
                params.op(op, OpField::AmpAttackShape),
                params.op(op, OpField::AmpDecayShape),
                params.op(op, OpField::AmpReleaseShape),
            ));
        }
        if self.pitch_env.needs_shapes() {
            self.pitch_env.set_shapes(ShapeSet::new(
                params.op(op, OpField::PitchAttackShape),
                params.op(op, OpField::PitchDecayShape),
                params.op(op, OpField::PitchReleaseShape),
            ));
        }

        let level = params.op(op, OpField::Level) * modifier.level;
        let sensitivity = params.op(op, OpField::VelSens) * modifier.velocity_sens;
        let gain = level / MAX_LEVEL * velocity_scale(ctx.velocity, sensitivity);
        self.active = level > 0.0;

        // Inactive operators are not rendered, so their ramps jump straight to
        // the new targets.
        let frames = if self.active {
            ctx.frames * ctx.oversampling
        } else {
            0
        };

        let per_sample = ctx.envelope_resolution == EnvelopeResolution::Sample && self.active;
        let amp = if per_sample {
            self.amp_env.step(&self.amp_params, 0.0)
        } else {
            self.amp_env.step(&self.amp_params, ctx.frames as f32)
        };
        self.amp_level.set_target(amp, frames);

        let pitch = self.pitch_env.step(&self.pitch_params, ctx.frames as f32);
        let pitch_ratio = if params.op(op, OpField::PitchEnvOn) >= 0.5 {
            let depth = params.op(op, OpField::PitchEnvDepth) * modifier.pitch_env_depth;
            pow_2_fast(depth * pitch * (1.0 / 12.0))
        } else {
            1.0
        };
        self.pitch_ratio.set_target(pitch_ratio, frames);

        let ratio = blend.get_coarse(params, op, VarField::Ratio) * modifier.ratio;
        let semitones = params.op(op, OpField::Fine) + modifier.pitch + modifier.fine;
        let speed = ctx.frequency * ratio * semitones_to_ratio(semitones)
            / (ctx.sample_rate * ctx.oversampling as f32);
        self.speed.set_target(sanitize(speed, -0.5, 0.5, 0.0), frames);

        self.wave_a = wave_index(blend.get(params, op, VarField::WaveA) + modifier.wave_a);
        self.wave_b = wave_index(blend.get(params, op, VarField::WaveB) + modifier.wave_b);
        let wave_mix = blend.get(params, op, VarField::WaveMix) + modifier.wave_mix;
        self.wave_mix.set_target(sanitize(wave_mix, 0.0, 1.0, 0.0), frames);
        self.phase_offset = modifier.phase_offset;

        self.level.set_target(gain, frames);
        self.log_level.set_target(log_mul::to_log(gain), frames);

        if !self.active {
            self.last_out = 0.0;
        }
    }

    /// Loads this operator's matrix row and output amount for the block.
    /// Amounts from inactive sources are zeroed without interpolation.
    pub fn set_matrix(
        &mut self,
        row: &[f32; NUM_OPERATORS],
        output: f32,
        sources_active: &[bool; NUM_OPERATORS],
        frames: usize,
    ) {
        let frames = if self.active { frames } else { 0 };

        for ((ramp, &amount), &active) in self
            .mod_amounts
            .iter_mut()
            .zip(row.iter())
            .zip(sources_active.iter())
        {
            if active {
                ramp.set_target(amount, frames);
            } else {
                ramp.reset(0.0);
            }
        }
        self.out_amount.set_target(output, frames);
    }

    /// Advances the phase accumulator and returns the new phase.
    #[inline]
    pub fn advance(&mut self, increment: f32) -> f32 {
        self.phase = wrap_phase(self.phase + increment);
        self.phase
    }

    /// Renders one sub-sample of an oscillator operator. `env_step` is the
    /// envelope advance per sub-sample when envelopes run per sample.
    #[inline]
    pub fn calc_out(
        &mut self,
        prev: &[f32; NUM_OPERATORS],
        waves: &WaveLibrary,
        level_mode: LevelMode,
        env_step: Option<f32>,
    ) -> f32 {
        let (pm, exponent) = self.modulation(prev);

        let increment = self.speed.next() * self.pitch_ratio.next();
        let phase = wrap_phase(self.advance(increment) + pm + self.phase_offset);

        let mix = self.wave_mix.next();
        let a = interpolate_wave(waves.wave_by_index(self.wave_a), phase);
        let wave = if mix > 0.0 {
            crossfade(a, interpolate_wave(waves.wave_by_index(self.wave_b), phase), mix)
        } else {
            a
        };

        self.last_out = self.apply_gain(wave, exponent, level_mode, env_step);
        self.last_out
    }

    /// Renders one sub-sample of the audio-input operator, whose oscillator is
    /// the host input signal.
    #[inline]
    pub fn calc_out_audio_input(
        &mut self,
        prev: &[f32; NUM_OPERATORS],
        input: f32,
        level_mode: LevelMode,
        env_step: Option<f32>,
    ) -> f32 {
        let (pm, exponent) = self.modulation(prev);
        let input = sanitize(input, -INPUT_RANGE, INPUT_RANGE, 0.0);

        self.last_out = self.apply_gain(input + pm, exponent, level_mode, env_step);
        self.last_out
    }

    /// Contribution to the voice output.
    #[inline]
    pub fn output(&mut self) -> f32 {
        self.last_out * self.out_amount.next()
    }

    /// Phase offset and ModFM exponent from the previous sub-sample outputs.
    #[inline]
    fn modulation(&mut self, prev: &[f32; NUM_OPERATORS]) -> (f32, f32) {
        let amounts = self.mod_amounts.iter_mut().zip(prev.iter());
        match self.mode {
            ModMode::Pm => (amounts.map(|(amount, &x)| x * amount.next()).sum::<f32>(), 0.0),
            ModMode::ModFm => (
                0.0,
                amounts
                    .map(|(amount, &x)| amount.next() * (x - 1.0))
                    .sum::<f32>(),
            ),
        }
    }

    #[inline]
    fn apply_gain(
        &mut self,
        signal: f32,
        exponent: f32,
        level_mode: LevelMode,
        env_step: Option<f32>,
    ) -> f32 {
        let env = match env_step {
            Some(step) => {
                let level = self.amp_env.level();
                self.amp_env.step(&self.amp_params, step);
                level
            }
            None => self.amp_level.next(),
        };

        match level_mode {
            LevelMode::Direct => {
                let signal = match self.mode {
                    ModMode::Pm => signal,
                    ModMode::ModFm => signal * modfm_exp(exponent),
                };
                signal * env * self.level.next()
            }
            LevelMode::LogDomain => {
                let exponent = sanitize(exponent, -MODFM_RANGE, MODFM_RANGE, 0.0);
                let log_gain = self.log_level.next()
                    + log_mul::to_log(env)
                    + exponent * core::f32::consts::LOG2_E;
                log_mul::multiply(signal, log_gain)
            }
        }
    }

    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// True once the amplitude envelope has finished its release.
    #[inline]
    pub fn is_done(&self) -> bool {
        self.amp_env.is_done()
    }

    #[inline]
    pub fn phase(&self) -> f32 {
        self.phase
    }

    #[inline]
    pub fn last_out(&self) -> f32 {
        self.last_out
    }

    #[inline]
    pub fn mode(&self) -> ModMode {
        self.mode
    }

    #[inline]
    pub fn amp_env(&self) -> &Envelope {
        &self.amp_env
    }

    #[inline]
    pub fn pitch_env(&self) -> &Envelope {
        &self.pitch_env
    }

    /// Stops every ramp at its target.
    pub fn finish_ramps(&mut self) {
        self.speed.finish();
        self.pitch_ratio.finish();
        self.wave_mix.finish();
        self.level.finish();
        self.log_level.finish();
        self.amp_level.finish();
        self.out_amount.finish();
        for ramp in self.mod_amounts.iter_mut() {
            ramp.finish();
        }
    }
}

#[inline]
fn wave_index(value: f32) -> usize {
    sanitize(value, 0.0, (NUM_WAVES - 1) as f32, 0.0).round() as usize
}

fn envelope_params(
    ctx: &BlockContext,
    op: usize,
    fields: [VarField; 5],
    scale: &EnvelopeScale,
) -> EnvelopeParams {
    let [attack, hold, decay, sustain, release] = fields;
    let frames = |field: VarField, scale: f32| {
        ms_to_frames(ctx.blend.get(ctx.params, op, field) * scale, ctx.sample_rate)
    };

    EnvelopeParams::new(
        frames(attack, scale.attack),
        frames(hold, scale.hold),
        frames(decay, scale.decay),
        ctx.blend.get(ctx.params, op, sustain) * scale.sustain,
        frames(release, scale.release),
    )
}
