//! Synthetic signal fixtures.
//!
//! A crude but deterministic ECG: each beat is a narrow Gaussian R wave with
//! smaller P and T waves around it, sampled on a fixed grid. The T wave stays
//! below typical R-peak prominence thresholds. Good enough to exercise peak
//! detection and the full processing chain without a device.

use std::f64::consts::PI;

/// Parameters for a synthetic ECG trace.
#[derive(Debug, Clone, Copy)]
pub struct SyntheticEcg {
    /// Sample rate (Hz)
    pub sample_rate_hz: f64,
    /// Heart rate (beats per minute)
    pub bpm: f64,
    /// R-wave amplitude (mV)
    pub r_amplitude: f64,
    /// Mains interference amplitude (mV)
    pub mains_amplitude: f64,
    /// Mains frequency (Hz)
    pub mains_hz: f64,
    /// Baseline wander amplitude (mV), at 0.2 Hz
    pub wander_amplitude: f64,
    /// Timestamp of the first sample (s)
    pub start_time: f64,
}

impl Default for SyntheticEcg {
    fn default() -> Self {
        Self {
            sample_rate_hz: 100.0,
            bpm: 75.0,
            r_amplitude: 1.0,
            mains_amplitude: 0.0,
            mains_hz: 60.0,
            wander_amplitude: 0.0,
            start_time: 0.0,
        }
    }
}

impl SyntheticEcg {
    /// Fixture at the given rate with all other parameters defaulted.
    pub fn at_bpm(bpm: f64) -> Self {
        Self {
            bpm,
            ..Self::default()
        }
    }

    /// Beat period (s).
    pub fn period(&self) -> f64 {
        60.0 / self.bpm
    }

    /// Signal value at time `t` (seconds since `start_time`).
    pub fn value_at(&self, t: f64) -> f64 {
        let period = self.period();
        // Phase relative to the nearest R peak; the first one is at t = 0.
        let phase = (t + period / 2.0).rem_euclid(period) - period / 2.0;
        let wave = |centre: f64, width: f64, amp: f64| {
            amp * (-((phase - centre) / width).powi(2)).exp()
        };
        let beat = wave(-0.2, 0.025, 0.1 * self.r_amplitude)
            + wave(0.0, 0.012, self.r_amplitude)
            + wave(0.3, 0.05, 0.2 * self.r_amplitude);
        let mains = self.mains_amplitude * (2.0 * PI * self.mains_hz * t).sin();
        let wander = self.wander_amplitude * (2.0 * PI * 0.2 * t).sin();
        beat + mains + wander
    }

    /// `(value, timestamp)` pairs for `seconds` of signal.
    pub fn lead_samples(&self, seconds: f64) -> Vec<(f64, f64)> {
        let n = (seconds * self.sample_rate_hz).round() as usize;
        (0..n)
            .map(|i| {
                let t = i as f64 / self.sample_rate_hz;
                (self.value_at(t), self.start_time + t)
            })
            .collect()
    }

    /// Electrode triplets `[RA, LA, LL]` whose lead II equals the trace.
    pub fn electrode_samples(&self, seconds: f64) -> Vec<([f64; 3], f64)> {
        self.lead_samples(seconds)
            .into_iter()
            .map(|(v, ts)| ([-0.5 * v, 0.1 * v, 0.5 * v], ts))
            .collect()
    }

    /// The trace as a device feed: one `{"RA":..,"LA":..,"LL":..}` line per sample.
    pub fn json_lines(&self, seconds: f64) -> String {
        self.electrode_samples(seconds)
            .into_iter()
            .map(|([ra, la, ll], _)| {
                let mut line = serde_json::json!({ "RA": ra, "LA": la, "LL": ll }).to_string();
                line.push('\n');
                line
            })
            .collect()
    }

    /// Timestamps of the R peaks within `seconds`.
    pub fn r_peak_times(&self, seconds: f64) -> Vec<f64> {
        let period = self.period();
        let beats = (seconds / period).floor() as usize;
        (0..=beats)
            .map(|k| k as f64 * period)
            .filter(|t| *t < seconds)
            .map(|t| self.start_time + t)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_r_peak_is_maximum() {
        let ecg = SyntheticEcg::default();
        let peak = ecg.value_at(0.0);
        assert!((peak - 1.0).abs() < 0.01);
        assert!(ecg.value_at(0.1) < 0.5 * peak);
    }

    #[test]
    fn test_peak_times_follow_rate() {
        let ecg = SyntheticEcg::at_bpm(60.0);
        assert_eq!(ecg.r_peak_times(5.0), vec![0.0, 1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_json_lines_shape() {
        let ecg = SyntheticEcg::default();
        let feed = ecg.json_lines(0.05);
        assert_eq!(feed.lines().count(), 5);
        assert!(feed.lines().all(|l| l.contains("\"RA\"") && l.contains("\"LL\"")));
    }
}
