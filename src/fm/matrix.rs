//! Operator to operator modulation matrix.
//!
//! Resolved once per block from the variation blend and the per-operator
//! modifiers. Amounts are bipolar. An inactive operator neither sends nor
//! receives modulation and has no output amount.

use super::mod_group::OperatorModifier;
use super::params::{Params, VarField};
use super::variation::VariationBlend;
use super::NUM_OPERATORS;

/// Stored matrix and output amounts are in `-1..=1`; this maps them to
/// phase-modulation depth and output gain.
pub const MATRIX_SCALE: f32 = 16.0;

#[derive(Debug, Default, Clone, PartialEq)]
pub struct ModMatrix {
    /// `amounts[dst][src]`.
    amounts: [[f32; NUM_OPERATORS]; NUM_OPERATORS],
    outputs: [f32; NUM_OPERATORS],
}

impl ModMatrix {
    pub fn resolve(
        params: &Params,
        blend: &VariationBlend,
        modifiers: &[OperatorModifier; NUM_OPERATORS],
        active: &[bool; NUM_OPERATORS],
    ) -> Self {
        let amounts = core::array::from_fn(|dst| {
            core::array::from_fn(|src| {
                if !active[src] || !active[dst] {
                    return 0.0;
                }
                blend.get(params, dst, VarField::ModFrom(src))
                    * MATRIX_SCALE
                    * modifiers[dst].matrix_dst_amount
                    * modifiers[src].source_amount
            })
        });

        let outputs = core::array::from_fn(|op| {
            if !active[op] {
                return 0.0;
            }
            blend.get(params, op, VarField::Out) * MATRIX_SCALE * modifiers[op].output
        });

        Self { amounts, outputs }
    }

    #[inline]
    pub fn amount(&self, dst: usize, src: usize) -> f32 {
        self.amounts[dst][src]
    }

    /// Amounts received by `dst`, indexed by source.
    #[inline]
    pub fn row(&self, dst: usize) -> &[f32; NUM_OPERATORS] {
        &self.amounts[dst]
    }

    #[inline]
    pub fn output(&self, op: usize) -> f32 {
        self.outputs[op]
    }
}
