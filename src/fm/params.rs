//! Flat parameter array and its layout.
//!
//! The host sees one `f32` array. Sections:
//! - globals at `0`
//! - modulation groups at [`PARAM_MGRP_BASE`], [`MGRP_STRIDE`] per group
//! - per-operator settings at [`PARAM_OP_BASE`], [`OP_STRIDE`] per operator
//! - variations at [`PARAM_VAR_BASE`], [`VAR_STRIDE`] per variation and
//!   [`VAR_OP_STRIDE`] per operator inside a variation
//!
//! Every read is clamped to the parameter's range; non-finite values read as
//! the default.

use alloc::vec::Vec;

#[allow(unused_imports)]
use num_traits::float::Float;

use super::{NUM_MOD_GROUPS, NUM_OPERATORS, NUM_VARIATIONS};
use crate::resources::NUM_WAVES;
use crate::utils::sanitize;

pub const PARAM_MGRP_BASE: usize = 8;
pub const MGRP_STRIDE: usize = 4;
pub const PARAM_OP_BASE: usize = 40;
pub const OP_STRIDE: usize = 16;
pub const PARAM_VAR_BASE: usize = 128;
pub const VAR_STRIDE: usize = 256;
pub const VAR_OP_STRIDE: usize = 32;
pub const PARAM_COUNT: usize = PARAM_VAR_BASE + NUM_VARIATIONS * VAR_STRIDE;

/// Operator level at which the oscillator plays at full scale.
pub const MAX_LEVEL: f32 = 64.0;
pub const MIN_RATIO: f32 = 1.0 / 64.0;
pub const MAX_RATIO: f32 = 64.0;
pub const MAX_SEGMENT_MS: f32 = 20000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlobalParam {
    Volume,
    NumVariations,
    VarLock,
    VarEdit,
    ModFmMask,
    GlideTime,
    PhaseRandMask,
}

impl GlobalParam {
    pub const ALL: [GlobalParam; 7] = [
        GlobalParam::Volume,
        GlobalParam::NumVariations,
        GlobalParam::VarLock,
        GlobalParam::VarEdit,
        GlobalParam::ModFmMask,
        GlobalParam::GlideTime,
        GlobalParam::PhaseRandMask,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }

    fn spec(self) -> ParamSpec {
        match self {
            GlobalParam::Volume => ParamSpec::new("volume", 0.0, 2.0, 1.0),
            GlobalParam::NumVariations => {
                ParamSpec::integer("num_variations", 1.0, NUM_VARIATIONS as f32, 8.0)
            }
            GlobalParam::VarLock => ParamSpec::integer("var_lock", 0.0, 1.0, 0.0),
            GlobalParam::VarEdit => {
                ParamSpec::integer("var_edit", 0.0, (NUM_VARIATIONS - 1) as f32, 0.0)
            }
            GlobalParam::ModFmMask => ParamSpec::integer("modfm_mask", 0.0, 31.0, 0.0),
            GlobalParam::GlideTime => ParamSpec::new("glide_time", 0.0, 5000.0, 50.0),
            GlobalParam::PhaseRandMask => ParamSpec::integer("phase_rand_mask", 0.0, 31.0, 0.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MgrpField {
    Amount,
    Destination,
    OpMask,
}

impl MgrpField {
    pub const ALL: [MgrpField; 3] = [MgrpField::Amount, MgrpField::Destination, MgrpField::OpMask];

    fn spec(self, group: usize) -> ParamSpec {
        match self {
            // Group 1 positions the variation crossfade.
            MgrpField::Amount if group == 0 => ParamSpec::new("variation", 0.0, 1.0, 0.0),
            MgrpField::Amount => ParamSpec::new("amount", -1.0, 1.0, 0.0),
            MgrpField::Destination => ParamSpec::integer(
                "destination",
                0.0,
                (super::mod_group::NUM_DESTINATIONS - 1) as f32,
                0.0,
            ),
            MgrpField::OpMask => ParamSpec::integer("op_mask", 0.0, 31.0, 0.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpField {
    Level,
    VelSens,
    Fine,
    PitchEnvDepth,
    PitchEnvOn,
    AmpAttackShape,
    AmpDecayShape,
    AmpReleaseShape,
    PitchAttackShape,
    PitchDecayShape,
    PitchReleaseShape,
}

impl OpField {
    pub const ALL: [OpField; 11] = [
        OpField::Level,
        OpField::VelSens,
        OpField::Fine,
        OpField::PitchEnvDepth,
        OpField::PitchEnvOn,
        OpField::AmpAttackShape,
        OpField::AmpDecayShape,
        OpField::AmpReleaseShape,
        OpField::PitchAttackShape,
        OpField::PitchDecayShape,
        OpField::PitchReleaseShape,
    ];

    fn spec(self, op: usize) -> ParamSpec {
        match self {
            OpField::Level => {
                ParamSpec::new("level", 0.0, MAX_LEVEL, if op == 0 { MAX_LEVEL } else { 0.0 })
            }
            OpField::VelSens => ParamSpec::new("vel_sens", 0.0, 1.0, 0.5),
            OpField::Fine => ParamSpec::new("fine", -12.0, 12.0, 0.0),
            OpField::PitchEnvDepth => ParamSpec::new("pitch_env_depth", -48.0, 48.0, 0.0),
            OpField::PitchEnvOn => ParamSpec::integer("pitch_env_on", 0.0, 1.0, 0.0),
            OpField::AmpAttackShape => ParamSpec::new("amp_atk_shape", -1.0, 1.0, 0.0),
            OpField::AmpDecayShape => ParamSpec::new("amp_dcy_shape", -1.0, 1.0, 0.0),
            OpField::AmpReleaseShape => ParamSpec::new("amp_rls_shape", -1.0, 1.0, 0.0),
            OpField::PitchAttackShape => ParamSpec::new("pitch_atk_shape", -1.0, 1.0, 0.0),
            OpField::PitchDecayShape => ParamSpec::new("pitch_dcy_shape", -1.0, 1.0, 0.0),
            OpField::PitchReleaseShape => ParamSpec::new("pitch_rls_shape", -1.0, 1.0, 0.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarField {
    Phase,
    Ratio,
    WaveA,
    WaveB,
    WaveMix,
    AmpAttack,
    AmpHold,
    AmpDecay,
    AmpSustain,
    AmpRelease,
    PitchAttack,
    PitchHold,
    PitchDecay,
    PitchSustain,
    PitchRelease,
    Out,
    /// Amount of modulation this operator receives from operator `n`.
    ModFrom(usize),
}

impl VarField {
    const MOD_FROM_OFFSET: usize = 16;
    const NUM_FIELDS: usize = Self::MOD_FROM_OFFSET + NUM_OPERATORS;

    pub const fn offset(self) -> usize {
        match self {
            VarField::Phase => 0,
            VarField::Ratio => 1,
            VarField::WaveA => 2,
            VarField::WaveB => 3,
            VarField::WaveMix => 4,
            VarField::AmpAttack => 5,
            VarField::AmpHold => 6,
            VarField::AmpDecay => 7,
            VarField::AmpSustain => 8,
            VarField::AmpRelease => 9,
            VarField::PitchAttack => 10,
            VarField::PitchHold => 11,
            VarField::PitchDecay => 12,
            VarField::PitchSustain => 13,
            VarField::PitchRelease => 14,
            VarField::Out => 15,
            VarField::ModFrom(source) => {
                let source = if source < NUM_OPERATORS {
                    source
                } else {
                    NUM_OPERATORS - 1
                };
                Self::MOD_FROM_OFFSET + source
            }
        }
    }

    fn from_offset(offset: usize) -> Option<Self> {
        Some(match offset {
            0 => VarField::Phase,
            1 => VarField::Ratio,
            2 => VarField::WaveA,
            3 => VarField::WaveB,
            4 => VarField::WaveMix,
            5 => VarField::AmpAttack,
            6 => VarField::AmpHold,
            7 => VarField::AmpDecay,
            8 => VarField::AmpSustain,
            9 => VarField::AmpRelease,
            10 => VarField::PitchAttack,
            11 => VarField::PitchHold,
            12 => VarField::PitchDecay,
            13 => VarField::PitchSustain,
            14 => VarField::PitchRelease,
            15 => VarField::Out,
            n if n < Self::NUM_FIELDS => VarField::ModFrom(n - Self::MOD_FROM_OFFSET),
            _ => return None,
        })
    }

    fn spec(self, op: usize) -> ParamSpec {
        let max_wave = (NUM_WAVES - 1) as f32;
        match self {
            VarField::Phase => ParamSpec::new("phase", 0.0, 1.0, 0.0),
            VarField::Ratio => ParamSpec::new("ratio", MIN_RATIO, MAX_RATIO, 1.0),
            VarField::WaveA => ParamSpec::new("wave_a", 0.0, max_wave, 0.0),
            VarField::WaveB => ParamSpec::new("wave_b", 0.0, max_wave, 0.0),
            VarField::WaveMix => ParamSpec::new("wave_mix", 0.0, 1.0, 0.0),
            VarField::AmpAttack => ParamSpec::new("amp_atk", 0.0, MAX_SEGMENT_MS, 5.0),
            VarField::AmpHold => ParamSpec::new("amp_hld", 0.0, MAX_SEGMENT_MS, 0.0),
            VarField::AmpDecay => ParamSpec::new("amp_dcy", 0.0, MAX_SEGMENT_MS, 300.0),
            VarField::AmpSustain => ParamSpec::new("amp_sus", 0.0, 1.0, 0.7),
            VarField::AmpRelease => ParamSpec::new("amp_rls", 0.0, MAX_SEGMENT_MS, 200.0),
            VarField::PitchAttack => ParamSpec::new("pitch_atk", 0.0, MAX_SEGMENT_MS, 0.0),
            VarField::PitchHold => ParamSpec::new("pitch_hld", 0.0, MAX_SEGMENT_MS, 0.0),
            VarField::PitchDecay => ParamSpec::new("pitch_dcy", 0.0, MAX_SEGMENT_MS, 0.0),
            VarField::PitchSustain => ParamSpec::new("pitch_sus", 0.0, 1.0, 0.0),
            VarField::PitchRelease => ParamSpec::new("pitch_rls", 0.0, MAX_SEGMENT_MS, 0.0),
            VarField::Out => {
                ParamSpec::new("out", -1.0, 1.0, if op == 0 { 1.0 / 16.0 } else { 0.0 })
            }
            VarField::ModFrom(_) => ParamSpec::new("mod_from", -1.0, 1.0, 0.0),
        }
    }
}

/// Range and default of one parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub min: f32,
    pub max: f32,
    pub default: f32,

    /// Counts, indices, switches and bit masks; stored rounded to nearest.
    pub integer: bool,
}

impl ParamSpec {
    const fn new(name: &'static str, min: f32, max: f32, default: f32) -> Self {
        Self {
            name,
            min,
            max,
            default,
            integer: false,
        }
    }

    const fn integer(name: &'static str, min: f32, max: f32, default: f32) -> Self {
        Self {
            integer: true,
            ..Self::new(name, min, max, default)
        }
    }

    #[inline]
    pub fn clamp(&self, value: f32) -> f32 {
        let value = sanitize(value, self.min, self.max, self.default);
        if self.integer {
            value.round()
        } else {
            value
        }
    }
}

/// Where a parameter index lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamLocation {
    Global(GlobalParam),
    ModGroup { group: usize, field: MgrpField },
    Operator { op: usize, field: OpField },
    Variation { variation: usize, op: usize, field: VarField },
}

/// Reflection data for a parameter index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamInfo {
    pub location: ParamLocation,
    pub spec: ParamSpec,
}

pub const fn global_index(param: GlobalParam) -> usize {
    param.index()
}

pub const fn mgrp_index(group: usize, field: MgrpField) -> usize {
    PARAM_MGRP_BASE + group * MGRP_STRIDE + field as usize
}

pub const fn op_index(op: usize, field: OpField) -> usize {
    PARAM_OP_BASE + op * OP_STRIDE + field as usize
}

pub const fn var_index(variation: usize, op: usize, field: VarField) -> usize {
    PARAM_VAR_BASE + variation * VAR_STRIDE + op * VAR_OP_STRIDE + field.offset()
}

/// Decodes an index into its location. Unused slots inside a stride yield `None`.
pub fn locate(index: usize) -> Option<ParamLocation> {
    if index < PARAM_MGRP_BASE {
        return GlobalParam::ALL.get(index).copied().map(ParamLocation::Global);
    }
    if index < PARAM_OP_BASE {
        let relative = index - PARAM_MGRP_BASE;
        let group = relative / MGRP_STRIDE;
        return MgrpField::ALL
            .get(relative % MGRP_STRIDE)
            .filter(|_| group < NUM_MOD_GROUPS)
            .map(|&field| ParamLocation::ModGroup { group, field });
    }
    if index < PARAM_VAR_BASE {
        let relative = index - PARAM_OP_BASE;
        let op = relative / OP_STRIDE;
        return OpField::ALL
            .get(relative % OP_STRIDE)
            .filter(|_| op < NUM_OPERATORS)
            .map(|&field| ParamLocation::Operator { op, field });
    }
    if index < PARAM_COUNT {
        let relative = index - PARAM_VAR_BASE;
        let variation = relative / VAR_STRIDE;
        let within = relative % VAR_STRIDE;
        let op = within / VAR_OP_STRIDE;
        if op >= NUM_OPERATORS {
            return None;
        }
        return VarField::from_offset(within % VAR_OP_STRIDE).map(|field| {
            ParamLocation::Variation {
                variation,
                op,
                field,
            }
        });
    }

    None
}

pub fn param_info(index: usize) -> Option<ParamInfo> {
    locate(index).map(|location| ParamInfo {
        location,
        spec: spec_of(location),
    })
}

fn spec_of(location: ParamLocation) -> ParamSpec {
    match location {
        ParamLocation::Global(param) => param.spec(),
        ParamLocation::ModGroup { group, field } => field.spec(group),
        ParamLocation::Operator { op, field } => field.spec(op),
        ParamLocation::Variation { op, field, .. } => field.spec(op),
    }
}

/// The parameter array with clamped accessors.
#[derive(Debug, Clone)]
pub struct Params {
    values: Vec<f32>,
}

impl Params {
    /// Creates an array filled with defaults.
    pub fn new() -> Self {
        let values = (0..PARAM_COUNT)
            .map(|index| param_info(index).map_or(0.0, |info| info.spec.default))
            .collect();

        Self { values }
    }

    /// Raw slot access as the host wrote it.
    #[inline]
    pub fn raw(&self, index: usize) -> f32 {
        self.values.get(index).copied().unwrap_or(0.0)
    }

    /// Stores `value` clamped to the parameter's range. Returns `false` for an
    /// index that names no parameter.
    pub fn set(&mut self, index: usize, value: f32) -> bool {
        match param_info(index) {
            Some(info) => {
                self.values[index] = info.spec.clamp(value);
                true
            }
            None => false,
        }
    }

    #[inline]
    fn read(&self, index: usize, spec: ParamSpec) -> f32 {
        spec.clamp(self.raw(index))
    }

    #[inline]
    pub fn global(&self, param: GlobalParam) -> f32 {
        self.read(global_index(param), param.spec())
    }

    /// Integer-valued globals (counts, indices, masks), rounded to nearest.
    #[inline]
    pub fn global_int(&self, param: GlobalParam) -> usize {
        self.global(param).round() as usize
    }

    #[inline]
    pub fn mgrp(&self, group: usize, field: MgrpField) -> f32 {
        let group = group.min(NUM_MOD_GROUPS - 1);
        self.read(mgrp_index(group, field), field.spec(group))
    }

    #[inline]
    pub fn op(&self, op: usize, field: OpField) -> f32 {
        let op = op.min(NUM_OPERATORS - 1);
        self.read(op_index(op, field), field.spec(op))
    }

    #[inline]
    pub fn var(&self, variation: usize, op: usize, field: VarField) -> f32 {
        let variation = variation.min(NUM_VARIATIONS - 1);
        let op = op.min(NUM_OPERATORS - 1);
        self.read(var_index(variation, op, field), field.spec(op))
    }

    pub fn set_global(&mut self, param: GlobalParam, value: f32) {
        self.set(global_index(param), value);
    }

    pub fn set_mgrp(&mut self, group: usize, field: MgrpField, value: f32) {
        if group < NUM_MOD_GROUPS {
            self.set(mgrp_index(group, field), value);
        }
    }

    pub fn set_op(&mut self, op: usize, field: OpField, value: f32) {
        if op < NUM_OPERATORS {
            self.set(op_index(op, field), value);
        }
    }

    pub fn set_var(&mut self, variation: usize, op: usize, field: VarField, value: f32) {
        if variation < NUM_VARIATIONS && op < NUM_OPERATORS {
            self.set(var_index(variation, op, field), value);
        }
    }

    /// Writes the same value into every variation slot.
    pub fn set_var_all(&mut self, op: usize, field: VarField, value: f32) {
        for variation in 0..NUM_VARIATIONS {
            self.set_var(variation, op, field, value);
        }
    }
}

impl Default for Params {
    fn default() -> Self {
        Self::new()
    }
}
