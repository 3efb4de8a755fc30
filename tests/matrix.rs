//! Tests for the modulation matrix.

use fm_stack_dsp::fm::matrix::{ModMatrix, MATRIX_SCALE};
use fm_stack_dsp::fm::mod_group::{resolve, Destination};
use fm_stack_dsp::fm::params::{MgrpField, Params, VarField};
use fm_stack_dsp::fm::variation::VariationBlend;
use fm_stack_dsp::fm::{NUM_MOD_INPUTS, NUM_OPERATORS};

const ALL_ACTIVE: [bool; NUM_OPERATORS] = [true; NUM_OPERATORS];

fn assign(params: &mut Params, group: usize, destination: Destination, amount: f32, mask: u8) {
    params.set_mgrp(group, MgrpField::Destination, destination as usize as f32);
    params.set_mgrp(group, MgrpField::Amount, amount);
    params.set_mgrp(group, MgrpField::OpMask, mask as f32);
}

fn matrix(params: &Params, active: &[bool; NUM_OPERATORS]) -> ModMatrix {
    let blend = VariationBlend::new(0, 1, 0.0);
    let modifiers = resolve(params, &[0.0; NUM_MOD_INPUTS]);
    ModMatrix::resolve(params, &blend, &modifiers, active)
}

/// Operators 1 and 2 modulating each other.
fn cross_wired() -> Params {
    let mut params = Params::new();
    params.set_var_all(0, VarField::ModFrom(1), 0.25);
    params.set_var_all(1, VarField::ModFrom(0), 0.25);
    params
}

#[test]
fn stored_amounts_are_scaled_by_sixteen() {
    let mut params = cross_wired();
    params.set_var_all(2, VarField::ModFrom(3), -0.5);
    let m = matrix(&params, &ALL_ACTIVE);

    assert_eq!(MATRIX_SCALE, 16.0);
    assert_eq!(m.amount(0, 1), 4.0);
    assert_eq!(m.amount(1, 0), 4.0);
    assert_eq!(m.amount(2, 3), -8.0);
    assert_eq!(m.amount(3, 2), 0.0);
    assert_eq!(m.row(2)[3], m.amount(2, 3));
}

#[test]
fn destination_scale_follows_the_receiver() {
    let mut params = cross_wired();
    assign(&mut params, 1, Destination::MatrixDstAmount, 0.5, 0b00001);
    let m = matrix(&params, &ALL_ACTIVE);

    // Operator 1 receives twice as much; what it sends is unchanged.
    assert!((m.amount(0, 1) - 8.0).abs() < 1.0e-3, "{}", m.amount(0, 1));
    assert_eq!(m.amount(1, 0), 4.0);
}

#[test]
fn source_scale_follows_the_sender() {
    let mut params = cross_wired();
    assign(&mut params, 2, Destination::SourceAmount, -1.0, 0b00010);
    let m = matrix(&params, &ALL_ACTIVE);

    assert!((m.amount(0, 1) - 4.0 / 64.0).abs() < 1.0e-4, "{}", m.amount(0, 1));
    assert_eq!(m.amount(1, 0), 4.0);
}

#[test]
fn output_amounts_are_scaled() {
    let mut params = Params::new();
    params.set_var_all(1, VarField::Out, 0.5);
    params.set_var_all(2, VarField::Out, -0.25);

    let m = matrix(&params, &ALL_ACTIVE);
    assert_eq!(m.output(0), 1.0);
    assert_eq!(m.output(1), 8.0);
    assert_eq!(m.output(2), -4.0);
    assert_eq!(m.output(3), 0.0);

    assign(&mut params, 3, Destination::Output, 1.0, 0b00001);
    let m = matrix(&params, &ALL_ACTIVE);
    assert!((m.output(0) - 4.0).abs() < 1.0e-4);
    assert_eq!(m.output(1), 8.0);
}

#[test]
fn inactive_operators_are_cut_out() {
    let mut params = Params::new();
    for dst in 0..NUM_OPERATORS {
        params.set_var_all(dst, VarField::Out, 0.5);
        for src in 0..NUM_OPERATORS {
            params.set_var_all(dst, VarField::ModFrom(src), 0.5);
        }
    }

    let active = [true, false, true, false, true];
    let m = matrix(&params, &active);

    for dst in 0..NUM_OPERATORS {
        for src in 0..NUM_OPERATORS {
            let expected = if active[dst] && active[src] { 8.0 } else { 0.0 };
            assert_eq!(m.amount(dst, src), expected, "{src} -> {dst}");
        }
        let expected = if active[dst] { 8.0 } else { 0.0 };
        assert_eq!(m.output(dst), expected);
    }
}

#[test]
fn amounts_follow_the_variation_blend() {
    let mut params = Params::new();
    params.set_var(0, 0, VarField::ModFrom(1), 0.5);
    params.set_var(1, 0, VarField::ModFrom(1), -0.5);

    let modifiers = resolve(&params, &[0.0; NUM_MOD_INPUTS]);
    let at = |fraction| {
        let blend = VariationBlend::new(0, 1, fraction);
        ModMatrix::resolve(&params, &blend, &modifiers, &ALL_ACTIVE).amount(0, 1)
    };

    assert_eq!(at(0.0), 8.0);
    assert_eq!(at(1.0), -8.0);
    assert!((at(0.25) - 4.0).abs() < 1.0e-5);
}
