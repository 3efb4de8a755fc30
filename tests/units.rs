//! Tests for the fast math approximations and the log-domain gain path.

use fm_stack_dsp::fm::log_mul::{
    exp2_lut, multiply, to_log, LOGMUL_MAX, LOGMUL_MIN, LOGMUL_TOLERANCE,
};
use fm_stack_dsp::utils::units::{log_2_fast, pow_2_fast, semitones_to_ratio};
use fm_stack_dsp::utils::{interpolate_wave, wrap_phase};

#[test]
fn pow_2_fast_error_is_bounded() {
    let mut previous = 0.0;
    for i in -2000..=2000 {
        let x = i as f32 * 0.01;
        let approx = pow_2_fast(x);
        let exact = (x as f64).exp2();
        let error = ((approx as f64 - exact) / exact).abs();

        assert!(error < 1.5e-4, "2^{x}: {approx} vs {exact}");
        assert!(approx > previous, "not increasing at {x}");
        previous = approx;
    }
}

#[test]
fn pow_2_fast_is_exact_on_integers() {
    for i in -20..=20 {
        assert_eq!(pow_2_fast(i as f32), (i as f32).exp2());
    }
    assert_eq!(semitones_to_ratio(0.0), 1.0);
    assert_eq!(semitones_to_ratio(12.0), 2.0);
}

#[test]
fn log_2_fast_error_is_bounded() {
    let mut previous = f32::NEG_INFINITY;
    let mut x = 1.0e-6_f32;
    while x < 1.0e6 {
        let approx = log_2_fast(x);
        let exact = (x as f64).log2();

        assert!((approx as f64 - exact).abs() < 1.1e-3, "log2({x}): {approx} vs {exact}");
        assert!(approx > previous, "not increasing at {x}");
        previous = approx;
        x *= 1.01;
    }
}

#[test]
fn log_2_fast_handles_non_positive_input() {
    assert_eq!(log_2_fast(0.0), -127.0);
    assert_eq!(log_2_fast(-1.0), -127.0);
    assert_eq!(log_2_fast(f32::NAN), -127.0);
}

#[test]
fn log_domain_multiply_matches_direct() {
    let samples = [1.0, -1.0, 0.731, -0.25, 0.01, -0.0031, 0.5];
    let gains = [1.0, 0.5, 0.999, 0.125, 0.0173, 1.0 / 64.0, 3.7];

    for sample in samples {
        for gain in gains {
            for envelope in [1.0, 0.42, 0.05] {
                let direct = sample * gain * envelope;
                let log = multiply(sample, to_log(gain) + to_log(envelope));
                let error = ((log - direct) / direct).abs();

                assert!(
                    error < LOGMUL_TOLERANCE,
                    "{sample} * {gain} * {envelope}: {log} vs {direct}"
                );
                assert_eq!(log.is_sign_negative(), direct.is_sign_negative());
            }
        }
    }
}

#[test]
fn log_domain_floor_is_silence() {
    assert_eq!(multiply(0.0, 0.0), 0.0);
    assert_eq!(multiply(0.5, to_log(0.0)), 0.0);
    assert_eq!(exp2_lut(LOGMUL_MIN - 0.5), 0.0);
    assert_eq!(exp2_lut(f32::NAN), 0.0);
    assert_eq!(exp2_lut(0.0), 1.0);
}

#[test]
fn exp2_table_is_exact_on_whole_octaves() {
    for octave in -24..40 {
        assert_eq!(exp2_lut(octave as f32), 2.0_f32.powi(octave), "2^{octave}");
    }
    assert_eq!(exp2_lut(LOGMUL_MAX + 3.0), exp2_lut(LOGMUL_MAX));
}

#[test]
fn exp2_table_interpolation_error_is_bounded() {
    let mut worst = 0.0_f64;
    let mut x = LOGMUL_MIN + 0.01;
    while x < LOGMUL_MAX {
        let exact = (x as f64).exp2();
        let error = ((exp2_lut(x) as f64 - exact) / exact).abs();
        worst = worst.max(error);
        x += 0.0371;
    }
    assert!(worst < 2.0e-5, "worst relative error {worst}");
}

#[test]
fn phase_wraps_into_unit_interval() {
    for phase in [
        0.0, 0.5, 0.999_999, 1.0, 1.5, -0.25, -1.0e-9, 123.456, -98765.4, f32::NAN,
        f32::INFINITY, f32::NEG_INFINITY,
    ] {
        let wrapped = wrap_phase(phase);
        assert!((0.0..1.0).contains(&wrapped), "{phase} -> {wrapped}");
    }
    assert!((wrap_phase(1.25) - 0.25).abs() < 1.0e-6);
    assert!((wrap_phase(-0.25) - 0.75).abs() < 1.0e-6);
}

#[test]
fn wave_lookup_uses_guard_point() {
    let table = [0.0, 1.0, 0.0, -1.0, 0.0];

    assert_eq!(interpolate_wave(&table, 0.0), 0.0);
    assert_eq!(interpolate_wave(&table, 0.25), 1.0);
    assert!((interpolate_wave(&table, 0.125) - 0.5).abs() < 1.0e-6);
    assert!((interpolate_wave(&table, 0.999) + 0.004).abs() < 1.0e-3);
}
