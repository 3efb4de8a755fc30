//! Modulation groups.
//!
//! A modulation group is a macro control that reshapes one field across a
//! chosen set of operators. Group 1 positions the variation crossfade and is
//! handled by the variation blender; groups 2 to 8 are folded here into one
//! immutable [`OperatorModifier`] per operator, once per block.

#[allow(unused_imports)]
use num_traits::float::Float;

use super::params::{MgrpField, Params};
use super::{NUM_MOD_GROUPS, NUM_MOD_INPUTS, NUM_OPERATORS};
use crate::resources::NUM_WAVES;
use crate::utils::sanitize;

pub const NUM_DESTINATIONS: usize = 26;

/// Largest divisor and multiplier of a scaling destination.
pub const SCALE_DIVISOR: f32 = 64.0;
pub const SCALE_MULTIPLIER: f32 = 4.0;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    #[default]
    None,

    Level,
    Output,
    MatrixDstAmount,
    AmpAttack,
    AmpHold,
    AmpDecay,
    AmpSustain,
    AmpRelease,
    AmpTime,
    PitchAttack,
    PitchHold,
    PitchDecay,
    PitchSustain,
    PitchRelease,
    PitchTime,
    PitchEnvDepth,
    Ratio,
    Pitch,
    Fine,
    PhaseOffset,
    WaveMix,
    WaveA,
    WaveB,
    VelocitySens,
    SourceAmount,
}

impl Destination {
    pub const ALL: [Destination; NUM_DESTINATIONS] = [
        Destination::None,
        Destination::Level,
        Destination::Output,
        Destination::MatrixDstAmount,
        Destination::AmpAttack,
        Destination::AmpHold,
        Destination::AmpDecay,
        Destination::AmpSustain,
        Destination::AmpRelease,
        Destination::AmpTime,
        Destination::PitchAttack,
        Destination::PitchHold,
        Destination::PitchDecay,
        Destination::PitchSustain,
        Destination::PitchRelease,
        Destination::PitchTime,
        Destination::PitchEnvDepth,
        Destination::Ratio,
        Destination::Pitch,
        Destination::Fine,
        Destination::PhaseOffset,
        Destination::WaveMix,
        Destination::WaveA,
        Destination::WaveB,
        Destination::VelocitySens,
        Destination::SourceAmount,
    ];

    /// Destination for a raw parameter value, rounded and clamped.
    pub fn from_param(value: f32) -> Self {
        let index = sanitize(value, 0.0, (NUM_DESTINATIONS - 1) as f32, 0.0).round() as usize;
        Self::ALL[index.min(NUM_DESTINATIONS - 1)]
    }

    /// Offset range for additive destinations, `None` for scaling ones.
    fn offset_range(self) -> Option<f32> {
        match self {
            Destination::Pitch => Some(48.0),
            Destination::Fine => Some(1.0),
            Destination::PhaseOffset => Some(1.0),
            Destination::WaveMix => Some(1.0),
            Destination::WaveA | Destination::WaveB => Some((NUM_WAVES - 1) as f32),
            _ => None,
        }
    }
}

/// Maps a bipolar amount to a multiplicative scale in
/// `1/SCALE_DIVISOR..=SCALE_MULTIPLIER`, passing through 1.0 at zero.
#[inline]
pub fn bipolar_to_scale(amount: f32) -> f32 {
    let amount = sanitize(amount, -1.0, 1.0, 0.0);
    if amount >= 0.0 {
        SCALE_MULTIPLIER.powf(amount)
    } else {
        SCALE_DIVISOR.powf(amount)
    }
}

/// Envelope scale factors, one per timed segment plus the sustain level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvelopeScale {
    pub attack: f32,
    pub hold: f32,
    pub decay: f32,
    pub sustain: f32,
    pub release: f32,
}

impl EnvelopeScale {
    pub const IDENTITY: Self = Self {
        attack: 1.0,
        hold: 1.0,
        decay: 1.0,
        sustain: 1.0,
        release: 1.0,
    };

    fn times(self, scale: f32) -> Self {
        Self {
            attack: self.attack * scale,
            hold: self.hold * scale,
            decay: self.decay * scale,
            release: self.release * scale,
            ..self
        }
    }
}

/// Per-operator modification of block parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OperatorModifier {
    pub level: f32,
    pub output: f32,
    pub matrix_dst_amount: f32,
    pub source_amount: f32,
    pub amp_env: EnvelopeScale,
    pub pitch_env: EnvelopeScale,
    pub pitch_env_depth: f32,
    pub ratio: f32,
    pub velocity_sens: f32,
    /// Semitones.
    pub pitch: f32,
    /// Semitones.
    pub fine: f32,
    /// Cycles.
    pub phase_offset: f32,
    pub wave_mix: f32,
    pub wave_a: f32,
    pub wave_b: f32,
}

impl OperatorModifier {
    pub const IDENTITY: Self = Self {
        level: 1.0,
        output: 1.0,
        matrix_dst_amount: 1.0,
        source_amount: 1.0,
        amp_env: EnvelopeScale::IDENTITY,
        pitch_env: EnvelopeScale::IDENTITY,
        pitch_env_depth: 1.0,
        ratio: 1.0,
        velocity_sens: 1.0,
        pitch: 0.0,
        fine: 0.0,
        phase_offset: 0.0,
        wave_mix: 0.0,
        wave_a: 0.0,
        wave_b: 0.0,
    };

    /// Returns a copy with one group's contribution folded in.
    pub fn with(self, destination: Destination, amount: f32) -> Self {
        if let Some(range) = destination.offset_range() {
            let offset = amount * range;
            return match destination {
                Destination::Pitch => Self {
                    pitch: self.pitch + offset,
                    ..self
                },
                Destination::Fine => Self {
                    fine: self.fine + offset,
                    ..self
                },
                Destination::PhaseOffset => Self {
                    phase_offset: self.phase_offset + offset,
                    ..self
                },
                Destination::WaveMix => Self {
                    wave_mix: self.wave_mix + offset,
                    ..self
                },
                Destination::WaveA => Self {
                    wave_a: self.wave_a + offset,
                    ..self
                },
                Destination::WaveB => Self {
                    wave_b: self.wave_b + offset,
                    ..self
                },
                _ => self,
            };
        }

        let scale = bipolar_to_scale(amount);
        let mut amp_env = self.amp_env;
        let mut pitch_env = self.pitch_env;

        match destination {
            Destination::None => return self,
            Destination::Level => {
                return Self {
                    level: self.level * scale,
                    ..self
                }
            }
            Destination::Output => {
                return Self {
                    output: self.output * scale,
                    ..self
                }
            }
            Destination::MatrixDstAmount => {
                return Self {
                    matrix_dst_amount: self.matrix_dst_amount * scale,
                    ..self
                }
            }
            Destination::SourceAmount => {
                return Self {
                    source_amount: self.source_amount * scale,
                    ..self
                }
            }
            Destination::PitchEnvDepth => {
                return Self {
                    pitch_env_depth: self.pitch_env_depth * scale,
                    ..self
                }
            }
            Destination::Ratio => {
                return Self {
                    ratio: self.ratio * scale,
                    ..self
                }
            }
            Destination::VelocitySens => {
                return Self {
                    velocity_sens: self.velocity_sens * scale,
                    ..self
                }
            }
            Destination::AmpAttack => amp_env.attack *= scale,
            Destination::AmpHold => amp_env.hold *= scale,
            Destination::AmpDecay => amp_env.decay *= scale,
            Destination::AmpSustain => amp_env.sustain *= scale,
            Destination::AmpRelease => amp_env.release *= scale,
            Destination::AmpTime => amp_env = amp_env.times(scale),
            Destination::PitchAttack => pitch_env.attack *= scale,
            Destination::PitchHold => pitch_env.hold *= scale,
            Destination::PitchDecay => pitch_env.decay *= scale,
            Destination::PitchSustain => pitch_env.sustain *= scale,
            Destination::PitchRelease => pitch_env.release *= scale,
            Destination::PitchTime => pitch_env = pitch_env.times(scale),
            Destination::Pitch
            | Destination::Fine
            | Destination::PhaseOffset
            | Destination::WaveMix
            | Destination::WaveA
            | Destination::WaveB => return self,
        }

        Self {
            amp_env,
            pitch_env,
            ..self
        }
    }
}

impl Default for OperatorModifier {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// One modulation group as read for the current block.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct ModGroup {
    pub amount: f32,
    pub destination: Destination,
    pub op_mask: u8,
}

impl ModGroup {
    /// Reads group `group` (0-based, group 0 being the variation macro) and
    /// adds its live modulation input.
    pub fn read(params: &Params, group: usize, mod_values: &[f32; NUM_MOD_INPUTS]) -> Self {
        let live = mod_values.get(group).copied().unwrap_or(0.0);
        let amount = sanitize(params.mgrp(group, MgrpField::Amount) + live, -1.0, 1.0, 0.0);
        let op_mask = params.mgrp(group, MgrpField::OpMask).round() as u8 & 0x1f;

        Self {
            amount,
            destination: Destination::from_param(params.mgrp(group, MgrpField::Destination)),
            op_mask,
        }
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.destination != Destination::None && self.op_mask != 0
    }

    #[inline]
    pub fn targets(&self, op: usize) -> bool {
        op < NUM_OPERATORS && self.op_mask & (1 << op) != 0
    }
}

/// Folds groups 2 to 8 into one modifier per operator.
pub fn resolve(
    params: &Params,
    mod_values: &[f32; NUM_MOD_INPUTS],
) -> [OperatorModifier; NUM_OPERATORS] {
    let mut groups = [ModGroup::default(); NUM_MOD_GROUPS];
    for (index, group) in groups.iter_mut().enumerate().skip(1) {
        *group = ModGroup::read(params, index, mod_values);
    }

    resolve_groups(&groups[1..])
}

/// Folds the given groups into one modifier per operator.
pub fn resolve_groups(groups: &[ModGroup]) -> [OperatorModifier; NUM_OPERATORS] {
    core::array::from_fn(|op| {
        groups
            .iter()
            .filter(|group| group.is_active() && group.targets(op))
            .fold(OperatorModifier::IDENTITY, |modifier, group| {
                modifier.with(group.destination, group.amount)
            })
    })
}
