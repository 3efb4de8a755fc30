//! Variation selection and blending.
//!
//! Every variation-scoped parameter exists once per slot. A voice always reads
//! a blend of two adjacent slots; the blend position comes from the variation
//! macro (modulation group 1) plus its live modulation input, or is pinned to
//! the edited slot while the lock flag is set.

#[allow(unused_imports)]
use num_traits::float::Float;

use super::params::{GlobalParam, MgrpField, Params, VarField, MAX_RATIO, MIN_RATIO};
use super::NUM_VARIATIONS;
use crate::utils::{crossfade, sanitize};
use crate::utils::units::{octaves_to_ratio, ratio_to_octaves};

/// The pair of slots in use and the position between them.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct VariationBlend {
    a: usize,
    b: usize,
    fraction: f32,
}

impl VariationBlend {
    /// Blend between slots `a` and `b`. Slot indices are clamped and the
    /// fraction is clamped to `0..=1`.
    pub fn new(a: usize, b: usize, fraction: f32) -> Self {
        Self {
            a: a.min(NUM_VARIATIONS - 1),
            b: b.min(NUM_VARIATIONS - 1),
            fraction: sanitize(fraction, 0.0, 1.0, 0.0),
        }
    }

    /// Resolves the slot pair for the current block. `modulation` is the live
    /// input of the variation macro.
    pub fn select(params: &Params, modulation: f32) -> Self {
        if params.global(GlobalParam::VarLock) >= 0.5 {
            let edit = params.global_int(GlobalParam::VarEdit);
            return Self::new(edit, edit, 0.0);
        }

        let count = params
            .global_int(GlobalParam::NumVariations)
            .clamp(1, NUM_VARIATIONS);
        let macro_value = params.mgrp(0, MgrpField::Amount) + sanitize(modulation, -1.0, 1.0, 0.0);
        let position = macro_value.clamp(0.0, 1.0) * count as f32;
        let integral = position.floor();

        let a = (integral as usize) % count;
        let b = (a + 1) % count;

        Self::new(a, b, position - integral)
    }

    #[inline]
    pub fn slots(&self) -> (usize, usize) {
        (self.a, self.b)
    }

    #[inline]
    pub fn fraction(&self) -> f32 {
        self.fraction
    }

    /// Linear blend of a variation-scoped parameter. Returns slot A's value
    /// unchanged at fraction 0 and slot B's at fraction 1.
    pub fn get(&self, params: &Params, op: usize, field: VarField) -> f32 {
        let a = params.var(self.a, op, field);
        if self.fraction <= 0.0 {
            return a;
        }
        let b = params.var(self.b, op, field);
        if self.fraction >= 1.0 {
            return b;
        }

        crossfade(a, b, self.fraction)
    }

    /// Blend of a frequency ratio in octave space, so that sweeping between
    /// 0.5 and 2.0 passes through 1.0 halfway.
    pub fn get_coarse(&self, params: &Params, op: usize, field: VarField) -> f32 {
        let a = params.var(self.a, op, field);
        if self.fraction <= 0.0 {
            return a;
        }
        let b = params.var(self.b, op, field);
        if self.fraction >= 1.0 {
            return b;
        }

        blend_ratio(a, b, self.fraction)
    }
}

/// Interpolates two ratios in log2 space. Result is clamped to the valid
/// ratio range.
#[inline]
pub fn blend_ratio(a: f32, b: f32, fraction: f32) -> f32 {
    let a = a.clamp(MIN_RATIO, MAX_RATIO);
    let b = b.clamp(MIN_RATIO, MAX_RATIO);
    let octaves = crossfade(ratio_to_octaves(a), ratio_to_octaves(b), fraction);

    octaves_to_ratio(octaves).clamp(MIN_RATIO, MAX_RATIO)
}
