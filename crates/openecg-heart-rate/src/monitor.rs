//! Single-lead heart-rate monitor
//!
//! Keeps the last few seconds of one lead, looks for R peaks in the most
//! recent window on demand, and averages recent RR intervals into a rate.

use openecg_errors::ValidationError;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::buffer::CircularBuffer;
use crate::history::RPeakHistory;
use crate::peaks::{PeakCriteria, find_peaks};

/// Shortest plausible beat spacing (s); 200 BPM.
pub const REFRACTORY_S: f64 = 0.3;

/// Heart-rate monitor configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeartRateConfig {
    /// Sample rate of the monitored lead (Hz)
    pub sample_rate_hz: f64,
    /// Seconds of signal retained
    pub buffer_seconds: f64,
    /// RR intervals averaged into the estimate
    pub rr_buffer_size: usize,
    /// Minimum R-peak prominence (mV)
    pub prominence: f32,
    /// Peak height threshold as a fraction of the window maximum
    pub height_ratio: f32,
}

impl Default for HeartRateConfig {
    fn default() -> Self {
        Self {
            sample_rate_hz: 100.0,
            buffer_seconds: 10.0,
            rr_buffer_size: 8,
            prominence: 0.3,
            height_ratio: 0.5,
        }
    }
}

impl HeartRateConfig {
    /// Buffer capacity in samples.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn capacity(&self) -> usize {
        (self.sample_rate_hz * self.buffer_seconds) as usize
    }

    /// Minimum peak separation in samples.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn min_distance(&self) -> usize {
        (REFRACTORY_S * self.sample_rate_hz) as usize
    }

    /// Check every field.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] describing the first invalid field.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.sample_rate_hz.is_finite() || self.sample_rate_hz <= 0.0 {
            return Err(ValidationError::out_of_range(
                "sample_rate_hz",
                self.sample_rate_hz,
                0.0,
                f64::MAX,
            ));
        }
        if !self.buffer_seconds.is_finite() || self.buffer_seconds <= 0.0 {
            return Err(ValidationError::out_of_range(
                "buffer_seconds",
                self.buffer_seconds,
                0.0,
                f64::MAX,
            ));
        }
        if self.capacity() == 0 {
            return Err(ValidationError::constraint(
                "sample_rate_hz * buffer_seconds must hold at least one sample",
            ));
        }
        if self.rr_buffer_size < 2 {
            return Err(ValidationError::out_of_range(
                "rr_buffer_size",
                self.rr_buffer_size,
                2,
                usize::MAX,
            ));
        }
        if !self.prominence.is_finite() || self.prominence < 0.0 {
            return Err(ValidationError::out_of_range(
                "prominence",
                self.prominence,
                0.0,
                f32::MAX,
            ));
        }
        if !(0.0..=1.0).contains(&self.height_ratio) {
            return Err(ValidationError::out_of_range(
                "height_ratio",
                self.height_ratio,
                0.0,
                1.0,
            ));
        }
        Ok(())
    }
}

/// Streaming heart-rate estimator for one lead.
#[derive(Debug, Clone)]
pub struct HeartRateMonitor {
    config: HeartRateConfig,
    buffer: CircularBuffer,
    history: RPeakHistory,
}

impl HeartRateMonitor {
    /// Create a monitor with an empty buffer.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if `config` is invalid.
    pub fn new(config: HeartRateConfig) -> Result<Self, ValidationError> {
        config.validate()?;
        let min_separation = config.min_distance() as f64 / config.sample_rate_hz;
        Ok(Self {
            buffer: CircularBuffer::new(config.capacity()),
            history: RPeakHistory::new(config.rr_buffer_size, min_separation),
            config,
        })
    }

    /// Append one sample.
    pub fn append(&mut self, value: f32, timestamp: f64) {
        self.buffer.push(value, timestamp);
    }

    /// Samples currently buffered.
    pub fn size(&self) -> usize {
        self.buffer.len()
    }

    /// True once at least `window` samples are buffered.
    pub fn is_ready(&self, window: usize) -> bool {
        window > 0 && self.buffer.len() >= window
    }

    /// Detect R peaks in the newest `window` samples and update the estimate.
    ///
    /// Returns `None` without touching any state when fewer than `window`
    /// samples are buffered. Otherwise returns the current estimate, which is
    /// itself `None` until two RR intervals have been admitted. Peaks already
    /// seen in an earlier, overlapping window are recognised by timestamp and
    /// ignored.
    pub fn process_latest_window(&mut self, window: usize) -> Option<f64> {
        let (values, timestamps) = self.buffer.latest_window(window)?;

        let max = values.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        let criteria = PeakCriteria {
            height: Some(max * self.config.height_ratio),
            distance: Some(self.config.min_distance()),
            prominence: Some(self.config.prominence),
        };

        for idx in find_peaks(&values, &criteria) {
            let Some(&ts) = timestamps.get(idx) else {
                continue;
            };
            if self.history.record_peak(ts) {
                trace!(timestamp = ts, "R peak accepted");
            }
        }

        self.compute_bpm()
    }

    /// `60 / mean(RR)` over the admitted intervals, or `None` with fewer
    /// than two.
    pub fn compute_bpm(&self) -> Option<f64> {
        self.history.bpm()
    }

    /// Peak and interval history.
    pub fn history(&self) -> &RPeakHistory {
        &self.history
    }

    /// Active configuration.
    pub fn config(&self) -> &HeartRateConfig {
        &self.config
    }

    /// Drop all buffered samples and history.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.history.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    #[test]
    fn test_default_capacity_and_distance() {
        let config = HeartRateConfig::default();
        assert_eq!(config.capacity(), 1000);
        assert_eq!(config.min_distance(), 30);
    }

    #[test]
    fn test_not_ready_returns_none_without_state_change() -> TestResult {
        let mut monitor = HeartRateMonitor::new(HeartRateConfig::default())?;
        for i in 0..50u8 {
            monitor.append(f32::from(i % 2), f64::from(i) / 100.0);
        }
        assert!(!monitor.is_ready(100));
        assert_eq!(monitor.process_latest_window(100), None);
        assert_eq!(monitor.history().last_peak(), None);
        assert_eq!(monitor.size(), 50);
        Ok(())
    }

    #[test]
    fn test_invalid_configs() {
        let cases = [
            HeartRateConfig {
                sample_rate_hz: 0.0,
                ..HeartRateConfig::default()
            },
            HeartRateConfig {
                buffer_seconds: -1.0,
                ..HeartRateConfig::default()
            },
            HeartRateConfig {
                rr_buffer_size: 1,
                ..HeartRateConfig::default()
            },
            HeartRateConfig {
                height_ratio: 1.5,
                ..HeartRateConfig::default()
            },
        ];
        for config in cases {
            assert!(HeartRateMonitor::new(config).is_err(), "{config:?}");
        }
    }

    #[test]
    fn test_window_zero_is_never_ready() -> TestResult {
        let mut monitor = HeartRateMonitor::new(HeartRateConfig::default())?;
        monitor.append(1.0, 0.0);
        assert!(!monitor.is_ready(0));
        assert_eq!(monitor.process_latest_window(0), None);
        Ok(())
    }
}
