//! Raw electrode samples

use serde::{Deserialize, Serialize};

/// One acquisition tick: electrode potentials and the time they arrived.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawSample {
    /// `[RA, LA, LL]` potentials (mV)
    pub signal: [f32; 3],
    /// Receipt time (s since the Unix epoch, microsecond resolution)
    pub timestamp: f64,
}

impl RawSample {
    /// Create a sample.
    pub const fn new(signal: [f32; 3], timestamp: f64) -> Self {
        Self { signal, timestamp }
    }

    /// True if every potential and the timestamp are finite.
    pub fn is_finite(&self) -> bool {
        self.timestamp.is_finite() && self.signal.iter().all(|v| v.is_finite())
    }

    /// Potentials widened to `f64` for the filter chain.
    pub fn electrodes(&self) -> [f64; 3] {
        self.signal.map(f64::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finite_check() {
        assert!(RawSample::new([0.1, 0.2, 0.3], 1000.0).is_finite());
        assert!(!RawSample::new([f32::NAN, 0.2, 0.3], 1000.0).is_finite());
        assert!(!RawSample::new([0.1, f32::INFINITY, 0.3], 1000.0).is_finite());
        assert!(!RawSample::new([0.1, 0.2, 0.3], f64::NAN).is_finite());
    }

    #[test]
    fn test_electrodes_widen_exactly() {
        let sample = RawSample::new([0.1, 0.2, 0.3], 0.0);
        let [ra, la, ll] = sample.electrodes();
        assert_eq!(ra.to_bits(), f64::from(0.1f32).to_bits());
        assert_eq!(la.to_bits(), f64::from(0.2f32).to_bits());
        assert_eq!(ll.to_bits(), f64::from(0.3f32).to_bits());
    }
}
