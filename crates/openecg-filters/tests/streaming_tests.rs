//! Streaming Behaviour Tests
//!
//! Sample-at-a-time filtering must match batch filtering of the concatenated
//! input, and the filter chain must do what it is designed for on realistic
//! signals.

use approx::assert_abs_diff_eq;
use openecg_filters::prelude::*;
use openecg_test_helpers::prelude::*;
use std::f64::consts::PI;

fn sine(freq_hz: f64, fs: f64, n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| (2.0 * PI * freq_hz * i as f64 / fs).sin())
        .collect()
}

fn rms(xs: &[f64]) -> f64 {
    (xs.iter().map(|x| x * x).sum::<f64>() / xs.len() as f64).sqrt()
}

#[test]
fn streaming_matches_batch_per_channel() -> TestResult {
    let config = FilterConfig::default();
    let design = config.design()?;
    let mut engine = FilterEngine::new(config)?;

    let ecg = SyntheticEcg {
        mains_amplitude: 0.2,
        wander_amplitude: 0.5,
        ..SyntheticEcg::default()
    };
    let samples = ecg.electrode_samples(12.0);

    let streamed: Vec<[f64; 3]> = samples.iter().map(|(s, _)| engine.filter(*s)).collect();

    for ch in 0..CHANNELS {
        let input: Vec<f64> = samples.iter().map(|(s, _)| s[ch]).collect();
        let mut bp_state = SosState::step_response_steady(&design.bandpass);
        let mut notch_state = SosState::step_response_steady(&design.notch);
        let band = design.bandpass.filter_batch(&input, &mut bp_state);
        let batch = design.notch.filter_batch(&band, &mut notch_state);

        assert_eq!(batch.len(), streamed.len());
        for (s, b) in streamed.iter().map(|o| o[ch]).zip(batch) {
            assert_abs_diff_eq!(s, b, epsilon = 1e-12);
        }
    }
    Ok(())
}

#[test]
fn streaming_in_chunks_matches_single_pass() -> TestResult {
    let design = FilterConfig::default().design()?;
    let input = sine(7.0, 100.0, 500);

    let mut whole_state = SosState::step_response_steady(&design.bandpass);
    let whole = design.bandpass.filter_batch(&input, &mut whole_state);

    let mut state = SosState::step_response_steady(&design.bandpass);
    let mut chunked = Vec::with_capacity(input.len());
    for chunk in input.chunks(37) {
        chunked.extend(design.bandpass.filter_batch(chunk, &mut state));
    }

    for (a, b) in whole.iter().zip(&chunked) {
        assert_abs_diff_eq!(a, b, epsilon = 1e-12);
    }
    assert_eq!(whole_state, state);
    Ok(())
}

#[test]
fn baseline_offset_is_removed() -> TestResult {
    let mut engine = FilterEngine::new(FilterConfig::default())?;
    let mut last = [0.0; 3];
    for _ in 0..3000 {
        last = engine.filter([2.0, -1.5, 0.75]);
    }
    for v in last {
        assert_abs_diff_eq!(v, 0.0, epsilon = 1e-3);
    }
    Ok(())
}

#[test]
fn folded_mains_is_attenuated() -> TestResult {
    // At 100 Hz sampling, 60 Hz mains lands on 40 Hz.
    let mut engine = FilterEngine::new(FilterConfig::default())?;
    let input = sine(40.0, 100.0, 2000);
    let output: Vec<f64> = input.iter().map(|x| engine.filter([*x; 3])[0]).collect();
    let settled = output.get(1000..).ok_or("too few samples")?;
    assert!(rms(settled) < 0.05 * rms(&input), "rms {}", rms(settled));
    Ok(())
}

#[test]
fn passband_tone_survives() -> TestResult {
    let config = FilterConfig {
        sample_rate_hz: 500.0,
        notch_hz: 50.0,
        ..FilterConfig::default()
    };
    let mut engine = FilterEngine::new(config)?;
    let input = sine(10.0, 500.0, 5000);
    let output: Vec<f64> = input.iter().map(|x| engine.filter([*x; 3])[1]).collect();
    let settled = output.get(2500..).ok_or("too few samples")?;
    assert_approx_eq!(rms(settled), rms(&input), 0.05);
    Ok(())
}
