//! Filter design
//!
//! Digital Butterworth bandpass and IIR notch designs, returned as
//! second-order-section cascades.
//!
//! The bandpass follows the classic analog route: Butterworth prototype,
//! lowpass-to-bandpass transform at pre-warped band edges, bilinear transform
//! in zero-pole-gain form, then grouping into sections.

use num_complex::Complex64;
use openecg_errors::ValidationError;
use std::f64::consts::PI;

use crate::sos::{Biquad, SosFilter};

/// Highest supported Butterworth prototype order.
pub const MAX_ORDER: usize = 8;

/// Bilinear transform constant for a sample rate normalized to 2.
const BILINEAR_K: f64 = 4.0;

/// Imaginary parts below this are treated as real poles.
const REAL_POLE_TOL: f64 = 1e-10;

fn check_sample_rate(fs: f64) -> Result<(), ValidationError> {
    if !fs.is_finite() || fs <= 0.0 {
        return Err(ValidationError::out_of_range(
            "sample_rate_hz",
            fs,
            0.0,
            f64::MAX,
        ));
    }
    Ok(())
}

/// Design a digital Butterworth bandpass.
///
/// `order` is the prototype order; the resulting filter has `2 * order`
/// poles arranged in `order` sections. Each section carries one zero at
/// `z = 1` and one at `z = -1`, and the overall gain sits on the first
/// section. Sections are ordered from the pole pair farthest from the unit
/// circle to the closest.
///
/// # Errors
///
/// Returns a [`ValidationError`] if `fs` is not positive, the band edges are
/// not `0 < low < high < fs / 2`, or `order` is outside `1..=MAX_ORDER`.
pub fn butterworth_bandpass(
    order: usize,
    low_hz: f64,
    high_hz: f64,
    fs: f64,
) -> Result<SosFilter, ValidationError> {
    check_sample_rate(fs)?;
    if !(1..=MAX_ORDER).contains(&order) {
        return Err(ValidationError::out_of_range("order", order, 1, MAX_ORDER));
    }
    let nyquist = fs / 2.0;
    for (field, f) in [("bandpass_low_hz", low_hz), ("bandpass_high_hz", high_hz)] {
        if !f.is_finite() || f <= 0.0 || f >= nyquist {
            return Err(ValidationError::out_of_range(field, f, 0.0, nyquist));
        }
    }
    if low_hz >= high_hz {
        return Err(ValidationError::constraint(format!(
            "bandpass_low_hz ({low_hz}) must be below bandpass_high_hz ({high_hz})"
        )));
    }

    let warp = |f: f64| BILINEAR_K * (PI * (f / nyquist) / 2.0).tan();
    let w1 = warp(low_hz);
    let w2 = warp(high_hz);
    let bw = w2 - w1;
    let wo_sq = Complex64::new(w1 * w2, 0.0);

    let n = order as f64;
    let mut analog_poles = Vec::with_capacity(2 * order);
    for i in 0..order {
        let m = 2.0 * i as f64 - n + 1.0;
        let proto = -Complex64::from_polar(1.0, PI * m / (2.0 * n));
        let p_lp = proto * (bw / 2.0);
        let root = (p_lp * p_lp - wo_sq).sqrt();
        analog_poles.push(p_lp + root);
        analog_poles.push(p_lp - root);
    }
    let analog_gain = bw.powi(order as i32);

    // The analog bandpass has `order` zeros at s = 0, which map to z = 1.
    // The bilinear transform adds `order` more at z = -1.
    let k = Complex64::new(BILINEAR_K, 0.0);
    let den: Complex64 = analog_poles.iter().map(|p| k - p).product();
    let gain = analog_gain * (k.powu(order as u32) / den).re;
    let poles: Vec<Complex64> = analog_poles.iter().map(|p| (k + p) / (k - p)).collect();

    let mut sections = group_poles(&poles);
    if let Some(first) = sections.first_mut() {
        for c in &mut first.b {
            *c *= gain;
        }
    }
    Ok(SosFilter::new(sections))
}

/// Pair poles into sections with the bandpass zero layout `[1, 0, -1]`.
fn group_poles(poles: &[Complex64]) -> Vec<Biquad> {
    let mut pairs: Vec<(Complex64, Option<Complex64>)> = poles
        .iter()
        .filter(|p| p.im > REAL_POLE_TOL)
        .map(|p| (*p, Some(p.conj())))
        .collect();

    let mut real: Vec<f64> = poles
        .iter()
        .filter(|p| p.im.abs() <= REAL_POLE_TOL)
        .map(|p| p.re)
        .collect();
    real.sort_by(|a, b| a.total_cmp(b));
    for chunk in real.chunks(2) {
        match *chunk {
            [p1, p2] => pairs.push((Complex64::new(p1, 0.0), Some(Complex64::new(p2, 0.0)))),
            [p1] => pairs.push((Complex64::new(p1, 0.0), None)),
            _ => {}
        }
    }

    // Closest-to-unit-circle pair goes last.
    pairs.sort_by(|(a, _), (b, _)| (1.0 - b.norm()).abs().total_cmp(&(1.0 - a.norm()).abs()));

    pairs
        .into_iter()
        .map(|(p1, p2)| match p2 {
            Some(p2) => {
                let sum = p1 + p2;
                let prod = p1 * p2;
                Biquad {
                    b: [1.0, 0.0, -1.0],
                    a: [1.0, -sum.re, prod.re],
                }
            }
            None => Biquad {
                b: [1.0, -1.0, 0.0],
                a: [1.0, -p1.re, 0.0],
            },
        })
        .collect()
}

/// Map a frequency to the baseband alias seen when sampling at `fs`.
///
/// Frequencies already inside `[0, fs / 2]` are returned unchanged.
pub fn alias_frequency(freq_hz: f64, fs: f64) -> f64 {
    (freq_hz - fs * (freq_hz / fs).round()).abs()
}

/// Design a second-order IIR notch.
///
/// `freq_hz` above Nyquist is folded to its alias first. The -3 dB
/// bandwidth is `freq / q` around the (folded) notch frequency.
///
/// # Errors
///
/// Returns a [`ValidationError`] for a non-positive `fs` or `q`, or a notch
/// that folds onto 0 Hz or Nyquist.
pub fn iir_notch(freq_hz: f64, q: f64, fs: f64) -> Result<SosFilter, ValidationError> {
    check_sample_rate(fs)?;
    if !q.is_finite() || q <= 0.0 {
        return Err(ValidationError::out_of_range("notch_q", q, 0.0, f64::MAX));
    }
    if !freq_hz.is_finite() || freq_hz <= 0.0 {
        return Err(ValidationError::out_of_range("notch_hz", freq_hz, 0.0, f64::MAX));
    }

    let nyquist = fs / 2.0;
    let folded = alias_frequency(freq_hz, fs);
    if folded <= f64::EPSILON * fs || folded >= nyquist - f64::EPSILON * fs {
        return Err(ValidationError::constraint(format!(
            "notch_hz {freq_hz} aliases to {folded} Hz, which is 0 or Nyquist at {fs} Hz"
        )));
    }

    let w0_norm = folded / nyquist;
    let w0 = w0_norm * PI;
    let bw = (w0_norm / q) * PI;
    let gain = 1.0 / (1.0 + (bw / 2.0).tan());
    let cos_w0 = w0.cos();

    let section = Biquad::new(
        [gain, -2.0 * gain * cos_w0, gain],
        [1.0, -2.0 * gain * cos_w0, 2.0 * gain - 1.0],
    )
    .ok_or_else(|| ValidationError::constraint("notch design produced non-finite coefficients"))?;

    Ok(SosFilter::new(vec![section]))
}
