//! Tests for modulation group resolution.

use fm_stack_dsp::fm::mod_group::{
    bipolar_to_scale, resolve, resolve_groups, Destination, ModGroup, OperatorModifier,
    NUM_DESTINATIONS,
};
use fm_stack_dsp::fm::params::{MgrpField, Params};
use fm_stack_dsp::fm::{NUM_MOD_INPUTS, NUM_OPERATORS};

const NO_MODULATION: [f32; NUM_MOD_INPUTS] = [0.0; NUM_MOD_INPUTS];

fn assign(params: &mut Params, group: usize, destination: Destination, amount: f32, mask: u8) {
    params.set_mgrp(group, MgrpField::Destination, destination as usize as f32);
    params.set_mgrp(group, MgrpField::Amount, amount);
    params.set_mgrp(group, MgrpField::OpMask, mask as f32);
}

#[test]
fn scale_is_continuous_through_identity() {
    assert_eq!(bipolar_to_scale(0.0), 1.0);
    assert!((bipolar_to_scale(1.0) - 4.0).abs() < 1.0e-5);
    assert!((bipolar_to_scale(-1.0) - 1.0 / 64.0).abs() < 1.0e-7);
    assert!((bipolar_to_scale(1.0e-4) - 1.0).abs() < 1.0e-3);
    assert!((bipolar_to_scale(-1.0e-4) - 1.0).abs() < 1.0e-3);

    // Out of range and non-finite amounts are clamped.
    assert!((bipolar_to_scale(7.0) - 4.0).abs() < 1.0e-5);
    assert_eq!(bipolar_to_scale(f32::NAN), 1.0);

    let mut previous = 0.0;
    for i in -100..=100 {
        let scale = bipolar_to_scale(i as f32 / 100.0);
        assert!(scale > previous);
        previous = scale;
    }
}

#[test]
fn destinations_round_trip_through_params() {
    assert_eq!(Destination::ALL.len(), NUM_DESTINATIONS);
    for (index, destination) in Destination::ALL.iter().enumerate() {
        assert_eq!(Destination::from_param(index as f32), *destination);
    }
    assert_eq!(Destination::from_param(-3.0), Destination::None);
    assert_eq!(Destination::from_param(1000.0), Destination::SourceAmount);
    assert_eq!(Destination::from_param(f32::NAN), Destination::None);
}

#[test]
fn defaults_resolve_to_identity() {
    let params = Params::new();
    let modifiers = resolve(&params, &NO_MODULATION);

    for modifier in modifiers.iter() {
        assert_eq!(*modifier, OperatorModifier::IDENTITY);
    }
}

#[test]
fn mask_selects_operators() {
    let mut params = Params::new();
    assign(&mut params, 1, Destination::Level, 1.0, 0b00101);

    let modifiers = resolve(&params, &NO_MODULATION);
    for (op, modifier) in modifiers.iter().enumerate() {
        if op == 0 || op == 2 {
            assert!((modifier.level - 4.0).abs() < 1.0e-5);
        } else {
            assert_eq!(modifier.level, 1.0);
        }
        assert_eq!(modifier.output, 1.0);
    }
}

#[test]
fn scales_multiply_and_offsets_add() {
    let mut params = Params::new();
    assign(&mut params, 1, Destination::Ratio, 0.5, 0b11111);
    assign(&mut params, 2, Destination::Ratio, 0.5, 0b00001);
    assign(&mut params, 3, Destination::Pitch, 0.25, 0b00001);
    assign(&mut params, 4, Destination::Pitch, 0.25, 0b00011);
    assign(&mut params, 5, Destination::WaveA, -1.0, 0b00010);

    let modifiers = resolve(&params, &NO_MODULATION);

    assert!((modifiers[0].ratio - 4.0).abs() < 1.0e-4);
    assert!((modifiers[1].ratio - 2.0).abs() < 1.0e-4);
    assert!((modifiers[0].pitch - 24.0).abs() < 1.0e-4);
    assert!((modifiers[1].pitch - 12.0).abs() < 1.0e-4);
    assert!((modifiers[1].wave_a + 7.0).abs() < 1.0e-4);
    assert_eq!(modifiers[2].pitch, 0.0);
}

#[test]
fn group_order_does_not_matter() {
    let groups = [
        ModGroup {
            amount: 0.3,
            destination: Destination::AmpTime,
            op_mask: 0b11111,
        },
        ModGroup {
            amount: -0.6,
            destination: Destination::AmpDecay,
            op_mask: 0b00110,
        },
        ModGroup {
            amount: 0.8,
            destination: Destination::Fine,
            op_mask: 0b01010,
        },
    ];
    let mut reversed = groups;
    reversed.reverse();

    let forward = resolve_groups(&groups);
    let backward = resolve_groups(&reversed);

    for op in 0..NUM_OPERATORS {
        let a = forward[op];
        let b = backward[op];
        assert!((a.amp_env.decay - b.amp_env.decay).abs() < 1.0e-6);
        assert!((a.amp_env.attack - b.amp_env.attack).abs() < 1.0e-6);
        assert!((a.fine - b.fine).abs() < 1.0e-6);
    }
}

#[test]
fn envelope_time_scales_every_segment_but_sustain() {
    let mut params = Params::new();
    assign(&mut params, 6, Destination::PitchTime, -1.0, 0b10000);

    let modifiers = resolve(&params, &NO_MODULATION);
    let scale = modifiers[4].pitch_env;

    for value in [scale.attack, scale.hold, scale.decay, scale.release] {
        assert!((value - 1.0 / 64.0).abs() < 1.0e-6);
    }
    assert_eq!(scale.sustain, 1.0);
    assert_eq!(modifiers[4].amp_env.attack, 1.0);
}

#[test]
fn first_group_is_never_a_destination() {
    let mut params = Params::new();
    assign(&mut params, 0, Destination::Level, 1.0, 0b11111);

    let modifiers = resolve(&params, &NO_MODULATION);
    for modifier in modifiers.iter() {
        assert_eq!(modifier.level, 1.0);
    }
}

#[test]
fn live_input_adds_to_amount() {
    let mut params = Params::new();
    assign(&mut params, 3, Destination::Output, 0.0, 0b00001);

    let mut mod_values = NO_MODULATION;
    mod_values[3] = 0.5;
    let modifiers = resolve(&params, &mod_values);
    assert!((modifiers[0].output - 2.0).abs() < 1.0e-5);

    // The sum saturates at the end of the range.
    params.set_mgrp(3, MgrpField::Amount, 1.0);
    mod_values[3] = 1.0;
    let modifiers = resolve(&params, &mod_values);
    assert!((modifiers[0].output - 4.0).abs() < 1.0e-5);
}

#[test]
fn none_destination_is_ignored() {
    let group = ModGroup {
        amount: 1.0,
        destination: Destination::None,
        op_mask: 0b11111,
    };
    assert!(!group.is_active());

    let modifiers = resolve_groups(&[group]);
    assert_eq!(modifiers[0], OperatorModifier::IDENTITY);
}
