//! Three-channel streaming filter engine
//!
//! Each electrode channel passes through a Butterworth bandpass and then a
//! mains notch. The designs are shared across channels; every channel owns
//! its own delay lines, which persist for the life of the engine.

use openecg_errors::ValidationError;
use serde::{Deserialize, Serialize};

use crate::design::{alias_frequency, butterworth_bandpass, iir_notch};
use crate::sos::{SosFilter, SosState};

/// Number of electrode channels (RA, LA, LL).
pub const CHANNELS: usize = 3;

/// Butterworth prototype order used for the bandpass stage.
pub const BANDPASS_ORDER: usize = 2;

/// Filter configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Sample rate of the incoming stream (Hz)
    pub sample_rate_hz: f64,
    /// Lower bandpass edge (Hz)
    pub bandpass_low_hz: f64,
    /// Upper bandpass edge (Hz)
    pub bandpass_high_hz: f64,
    /// Mains frequency to reject (Hz); folded to baseband if above Nyquist.
    ///
    /// With the defaults the 60 Hz notch lands on its 40 Hz alias. Tooling
    /// that treats `notch_hz / sample_rate_hz` as a Nyquist-normalised
    /// frequency puts the same default at 30 Hz instead; set `notch_hz` to
    /// 30.0 to reproduce such a setup.
    pub notch_hz: f64,
    /// Notch quality factor
    pub notch_q: f64,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            sample_rate_hz: 100.0,
            bandpass_low_hz: 0.5,
            bandpass_high_hz: 40.0,
            notch_hz: 60.0,
            notch_q: 30.0,
        }
    }
}

impl FilterConfig {
    /// Nyquist frequency for this configuration.
    pub fn nyquist_hz(&self) -> f64 {
        self.sample_rate_hz / 2.0
    }

    /// Notch frequency after folding into `[0, nyquist]`.
    pub fn effective_notch_hz(&self) -> f64 {
        alias_frequency(self.notch_hz, self.sample_rate_hz)
    }

    /// Validate by attempting both designs.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] raised by either design.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.design().map(|_| ())
    }

    /// Design both stages.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if either stage cannot be designed.
    pub fn design(&self) -> Result<FilterDesign, ValidationError> {
        Ok(FilterDesign {
            bandpass: butterworth_bandpass(
                BANDPASS_ORDER,
                self.bandpass_low_hz,
                self.bandpass_high_hz,
                self.sample_rate_hz,
            )?,
            notch: iir_notch(self.notch_hz, self.notch_q, self.sample_rate_hz)?,
        })
    }
}

/// The coefficient tables for both stages.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterDesign {
    /// Bandpass cascade
    pub bandpass: SosFilter,
    /// Notch cascade
    pub notch: SosFilter,
}

/// Per-channel delay lines for both stages.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterState {
    bandpass: [SosState; CHANNELS],
    notch: [SosState; CHANNELS],
}

impl FilterState {
    /// Initial conditions: every channel settled on a unit step.
    pub fn initial(design: &FilterDesign) -> Self {
        Self {
            bandpass: core::array::from_fn(|_| SosState::step_response_steady(&design.bandpass)),
            notch: core::array::from_fn(|_| SosState::step_response_steady(&design.notch)),
        }
    }

    /// Bandpass delay lines for `channel`.
    pub fn bandpass(&self, channel: usize) -> Option<&SosState> {
        self.bandpass.get(channel)
    }

    /// Notch delay lines for `channel`.
    pub fn notch(&self, channel: usize) -> Option<&SosState> {
        self.notch.get(channel)
    }
}

/// Streaming bandpass + notch filter for three channels.
#[derive(Debug, Clone)]
pub struct FilterEngine {
    config: FilterConfig,
    design: FilterDesign,
    state: FilterState,
}

impl FilterEngine {
    /// Design the filters and initialize per-channel state.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if the configuration cannot be designed.
    pub fn new(config: FilterConfig) -> Result<Self, ValidationError> {
        let design = config.design()?;
        let state = FilterState::initial(&design);
        Ok(Self {
            config,
            design,
            state,
        })
    }

    /// Filter one `[RA, LA, LL]` sample.
    ///
    /// Advances every channel's state by exactly one step. Inputs are not
    /// checked here; callers reject non-finite samples first.
    pub fn filter(&mut self, sample: [f64; CHANNELS]) -> [f64; CHANNELS] {
        let FilterState { bandpass, notch } = &mut self.state;
        let mut out = [0.0; CHANNELS];
        for (((y, x), bp), nt) in out
            .iter_mut()
            .zip(sample)
            .zip(bandpass.iter_mut())
            .zip(notch.iter_mut())
        {
            let band = self.design.bandpass.step(x, bp);
            *y = self.design.notch.step(band, nt);
        }
        out
    }

    /// Reinitialize every channel's state.
    pub fn reset(&mut self) {
        self.state = FilterState::initial(&self.design);
    }

    /// Active configuration.
    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    /// Active coefficient tables.
    pub fn design(&self) -> &FilterDesign {
        &self.design
    }

    /// Current per-channel state.
    pub fn state(&self) -> &FilterState {
        &self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    #[test]
    fn test_default_config_is_valid() {
        assert!(FilterConfig::default().validate().is_ok());
    }

    #[test]
    fn test_effective_notch_folds_60hz_at_100hz() {
        let config = FilterConfig::default();
        assert!((config.effective_notch_hz() - 40.0).abs() < 1e-12);
    }

    #[test]
    fn test_notch_can_be_placed_at_30hz() -> TestResult {
        let config = FilterConfig {
            notch_hz: 30.0,
            ..FilterConfig::default()
        };
        assert!((config.effective_notch_hz() - 30.0).abs() < 1e-12);
        let design = config.design()?;
        assert!(design.notch.magnitude_at(30.0, config.sample_rate_hz) < 1e-9);
        assert!(design.notch.magnitude_at(40.0, config.sample_rate_hz) > 0.9);
        Ok(())
    }

    #[test]
    fn test_invalid_configs_fail_at_construction() {
        let cases = [
            FilterConfig {
                sample_rate_hz: 0.0,
                ..FilterConfig::default()
            },
            FilterConfig {
                bandpass_low_hz: 45.0,
                ..FilterConfig::default()
            },
            FilterConfig {
                bandpass_high_hz: 60.0,
                ..FilterConfig::default()
            },
            FilterConfig {
                notch_q: -1.0,
                ..FilterConfig::default()
            },
            FilterConfig {
                notch_hz: 100.0,
                ..FilterConfig::default()
            },
        ];
        for config in cases {
            assert!(FilterEngine::new(config).is_err(), "{config:?}");
        }
    }

    #[test]
    fn test_channels_are_independent() -> TestResult {
        let mut engine = FilterEngine::new(FilterConfig::default())?;
        let mut reference = FilterEngine::new(FilterConfig::default())?;
        for i in 0..50 {
            let x = (f64::from(i) * 0.3).sin();
            let both = engine.filter([x, 0.0, 0.0]);
            let alone = reference.filter([x, 0.0, 0.0]);
            assert!((both[0] - alone[0]).abs() < 1e-15);
            assert!((both[1] - both[2]).abs() < 1e-15);
        }
        Ok(())
    }

    #[test]
    fn test_reset_restores_initial_state() -> TestResult {
        let mut engine = FilterEngine::new(FilterConfig::default())?;
        let initial = engine.state().clone();
        for _ in 0..10 {
            engine.filter([0.1, 0.2, 0.3]);
        }
        assert_ne!(engine.state(), &initial);
        engine.reset();
        assert_eq!(engine.state(), &initial);
        Ok(())
    }

    #[test]
    fn test_config_serde_defaults() -> TestResult {
        let config: FilterConfig = serde_json::from_str(r#"{"notch_hz": 50.0}"#)?;
        assert!((config.notch_hz - 50.0).abs() < 1e-12);
        assert!((config.sample_rate_hz - 100.0).abs() < 1e-12);
        Ok(())
    }
}
