//! Tests for variation selection and blending.

use fm_stack_dsp::fm::params::{GlobalParam, MgrpField, Params, VarField};
use fm_stack_dsp::fm::variation::{blend_ratio, VariationBlend};
use fm_stack_dsp::fm::NUM_OPERATORS;

const FIELDS: [VarField; 8] = [
    VarField::Phase,
    VarField::WaveA,
    VarField::WaveMix,
    VarField::AmpAttack,
    VarField::AmpSustain,
    VarField::PitchRelease,
    VarField::Out,
    VarField::ModFrom(2),
];

fn two_slots() -> Params {
    let mut params = Params::new();
    for op in 0..NUM_OPERATORS {
        let o = op as f32;
        params.set_var(0, op, VarField::Phase, 0.1 + 0.01 * o);
        params.set_var(1, op, VarField::Phase, 0.7 - 0.03 * o);
        params.set_var(0, op, VarField::WaveA, 1.0);
        params.set_var(1, op, VarField::WaveA, 6.0);
        params.set_var(0, op, VarField::WaveMix, 0.123);
        params.set_var(1, op, VarField::WaveMix, 0.987);
        params.set_var(0, op, VarField::AmpAttack, 13.7 + o);
        params.set_var(1, op, VarField::AmpAttack, 1234.5 - o);
        params.set_var(0, op, VarField::AmpSustain, 0.333);
        params.set_var(1, op, VarField::AmpSustain, 0.777);
        params.set_var(0, op, VarField::PitchRelease, 42.1);
        params.set_var(1, op, VarField::PitchRelease, 4.21);
        params.set_var(0, op, VarField::Out, -0.3);
        params.set_var(1, op, VarField::Out, 0.9);
        params.set_var(0, op, VarField::ModFrom(2), 0.17);
        params.set_var(1, op, VarField::ModFrom(2), -0.61);
        params.set_var(0, op, VarField::Ratio, 0.5);
        params.set_var(1, op, VarField::Ratio, 2.0);
    }
    params
}

#[test]
fn blend_endpoints_are_exact() {
    let params = two_slots();
    let at_a = VariationBlend::new(0, 1, 0.0);
    let at_b = VariationBlend::new(0, 1, 1.0);

    for op in 0..NUM_OPERATORS {
        for field in FIELDS {
            let a = params.var(0, op, field);
            let b = params.var(1, op, field);
            assert_eq!(at_a.get(&params, op, field).to_bits(), a.to_bits());
            assert_eq!(at_b.get(&params, op, field).to_bits(), b.to_bits());
        }

        assert_eq!(at_a.get_coarse(&params, op, VarField::Ratio), 0.5);
        assert_eq!(at_b.get_coarse(&params, op, VarField::Ratio), 2.0);
    }
}

#[test]
fn blend_is_linear_in_between() {
    let params = two_slots();
    let blend = VariationBlend::new(0, 1, 0.25);
    let value = blend.get(&params, 0, VarField::Out);

    assert!((value - (-0.3 * 0.75 + 0.9 * 0.25)).abs() < 1.0e-6);
}

#[test]
fn coarse_ratio_blends_in_octaves() {
    let params = two_slots();
    let blend = VariationBlend::new(0, 1, 0.5);

    let ratio = blend.get_coarse(&params, 0, VarField::Ratio);
    assert!((ratio - 1.0).abs() < 1.0e-6, "{ratio}");

    let linear = blend.get(&params, 0, VarField::Ratio);
    assert!((linear - 1.25).abs() < 1.0e-6);

    let quarter = blend_ratio(0.5, 2.0, 0.25);
    let three_quarters = blend_ratio(0.5, 2.0, 0.75);
    assert!((quarter * three_quarters - 1.0).abs() < 1.0e-5);
}

#[test]
fn selection_follows_macro() {
    let mut params = Params::new();
    params.set_global(GlobalParam::NumVariations, 4.0);

    params.set_mgrp(0, MgrpField::Amount, 0.3);
    let blend = VariationBlend::select(&params, 0.0);
    assert_eq!(blend.slots(), (1, 2));
    assert!((blend.fraction() - 0.2).abs() < 1.0e-5);

    params.set_mgrp(0, MgrpField::Amount, 0.0);
    let blend = VariationBlend::select(&params, 0.0);
    assert_eq!(blend.slots(), (0, 1));
    assert_eq!(blend.fraction(), 0.0);

    // The last slot blends back into the first one.
    params.set_mgrp(0, MgrpField::Amount, 0.9);
    let blend = VariationBlend::select(&params, 0.0);
    assert_eq!(blend.slots(), (3, 0));

    params.set_mgrp(0, MgrpField::Amount, 1.0);
    let blend = VariationBlend::select(&params, 0.0);
    assert_eq!(blend.slots(), (0, 1));
    assert_eq!(blend.fraction(), 0.0);
}

#[test]
fn selection_adds_live_modulation() {
    let mut params = Params::new();
    params.set_global(GlobalParam::NumVariations, 8.0);
    params.set_mgrp(0, MgrpField::Amount, 0.25);

    let blend = VariationBlend::select(&params, 0.25);
    assert_eq!(blend.slots(), (4, 5));

    let blend = VariationBlend::select(&params, -1.0);
    assert_eq!(blend.slots(), (0, 1));
    assert_eq!(blend.fraction(), 0.0);

    let blend = VariationBlend::select(&params, f32::NAN);
    assert_eq!(blend.slots(), (2, 3));
}

#[test]
fn lock_pins_edited_slot() {
    let mut params = Params::new();
    params.set_global(GlobalParam::VarLock, 1.0);
    params.set_global(GlobalParam::VarEdit, 5.0);
    params.set_mgrp(0, MgrpField::Amount, 0.6);

    let blend = VariationBlend::select(&params, 0.3);
    assert_eq!(blend.slots(), (5, 5));
    assert_eq!(blend.fraction(), 0.0);
}

#[test]
fn single_variation_never_blends_elsewhere() {
    let mut params = Params::new();
    params.set_global(GlobalParam::NumVariations, 1.0);

    for amount in [0.0, 0.4, 0.99, 1.0] {
        params.set_mgrp(0, MgrpField::Amount, amount);
        let blend = VariationBlend::select(&params, 0.0);
        assert_eq!(blend.slots(), (0, 0));
    }
}
