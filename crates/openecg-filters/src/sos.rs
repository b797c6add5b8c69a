//! Second-Order Sections
//!
//! A filter is stored as an immutable cascade of biquads ([`SosFilter`]); the
//! delay lines live separately in an [`SosState`] owned by the caller. Every
//! evaluation takes the state by exclusive reference, so the same design can
//! drive any number of independent channels.
//!
//! Sections are evaluated in direct form II transposed, which keeps only two
//! delay elements per section and is well behaved at low cutoff/sample-rate
//! ratios.

use num_complex::Complex64;
use std::f64::consts::PI;

/// One second-order section, normalized so that `a[0] == 1`.
///
/// Transfer function: `(b0 + b1 z^-1 + b2 z^-2) / (1 + a1 z^-1 + a2 z^-2)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Biquad {
    /// Numerator coefficients `[b0, b1, b2]`
    pub b: [f64; 3],
    /// Denominator coefficients `[1, a1, a2]`
    pub a: [f64; 3],
}

impl Biquad {
    /// Build a section, normalizing by `a0`.
    ///
    /// Returns `None` if `a0` is zero or any coefficient is non-finite.
    pub fn new(b: [f64; 3], a: [f64; 3]) -> Option<Self> {
        let [a0, a1, a2] = a;
        if a0.abs() < f64::EPSILON || b.iter().chain(a.iter()).any(|c| !c.is_finite()) {
            return None;
        }
        Some(Self {
            b: [b[0] / a0, b[1] / a0, b[2] / a0],
            a: [1.0, a1 / a0, a2 / a0],
        })
    }

    /// Pass-through section.
    pub const fn identity() -> Self {
        Self {
            b: [1.0, 0.0, 0.0],
            a: [1.0, 0.0, 0.0],
        }
    }

    /// Advance the section by one sample (direct form II transposed).
    #[inline]
    pub fn step(&self, x: f64, z: &mut [f64; 2]) -> f64 {
        let [b0, b1, b2] = self.b;
        let [_, a1, a2] = self.a;
        let y = b0 * x + z[0];
        z[0] = b1 * x - a1 * y + z[1];
        z[1] = b2 * x - a2 * y;
        y
    }

    /// Gain of the section for a constant input.
    pub fn dc_gain(&self) -> f64 {
        let den: f64 = self.a.iter().sum();
        if den.abs() < f64::EPSILON {
            return f64::INFINITY;
        }
        self.b.iter().sum::<f64>() / den
    }

    /// Delay-line contents after settling on a unit-step input.
    ///
    /// Returns zeros for a section with a pole at `z = 1`, which has no
    /// steady state.
    pub fn step_steady_state(&self) -> [f64; 2] {
        let g = self.dc_gain();
        if !g.is_finite() {
            return [0.0, 0.0];
        }
        [g - self.b[0], self.b[2] - self.a[2] * g]
    }

    /// Complex frequency response at normalized angular frequency `w` (rad/sample).
    pub fn response(&self, w: f64) -> Complex64 {
        let z1 = Complex64::from_polar(1.0, -w);
        let z2 = z1 * z1;
        let num = self.b[0] + z1 * self.b[1] + z2 * self.b[2];
        let den = self.a[0] + z1 * self.a[1] + z2 * self.a[2];
        num / den
    }

    /// Check that both poles lie strictly inside the unit circle.
    pub fn is_stable(&self) -> bool {
        let [_, a1, a2] = self.a;
        // Stability triangle for a monic quadratic denominator.
        a2.abs() < 1.0 && a1.abs() < 1.0 + a2
    }
}

/// An immutable cascade of second-order sections.
#[derive(Debug, Clone, PartialEq)]
pub struct SosFilter {
    sections: Vec<Biquad>,
}

impl SosFilter {
    /// Create a filter from its sections.
    pub fn new(sections: Vec<Biquad>) -> Self {
        Self { sections }
    }

    /// The sections, in evaluation order.
    pub fn sections(&self) -> &[Biquad] {
        &self.sections
    }

    /// Number of sections.
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    /// True if the cascade has no sections (pass-through).
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Flatten to `[b0, b1, b2, a0, a1, a2]` rows, row-major.
    pub fn to_flat(&self) -> Vec<f64> {
        self.sections
            .iter()
            .flat_map(|s| s.b.into_iter().chain(s.a))
            .collect()
    }

    /// Filter one sample, carrying `state` forward.
    ///
    /// `state` must have been created for this filter; extra or missing
    /// sections in the state are ignored.
    #[inline]
    pub fn step(&self, x: f64, state: &mut SosState) -> f64 {
        self.sections
            .iter()
            .zip(state.delays.iter_mut())
            .fold(x, |acc, (section, z)| section.step(acc, z))
    }

    /// Filter a whole block, section by section, carrying `state` forward.
    ///
    /// Produces the same output as calling [`SosFilter::step`] once per
    /// sample; it exists to check streaming behaviour against a batch
    /// evaluation order.
    pub fn filter_batch(&self, input: &[f64], state: &mut SosState) -> Vec<f64> {
        let mut signal = input.to_vec();
        for (section, z) in self.sections.iter().zip(state.delays.iter_mut()) {
            for sample in signal.iter_mut() {
                *sample = section.step(*sample, z);
            }
        }
        signal
    }

    /// Magnitude response at `freq_hz` for sample rate `fs`.
    pub fn magnitude_at(&self, freq_hz: f64, fs: f64) -> f64 {
        let w = 2.0 * PI * freq_hz / fs;
        self.sections
            .iter()
            .map(|s| s.response(w))
            .fold(Complex64::new(1.0, 0.0), |acc, h| acc * h)
            .norm()
    }

    /// True if every section is stable.
    pub fn is_stable(&self) -> bool {
        self.sections.iter().all(Biquad::is_stable)
    }
}

/// Per-channel delay lines for one [`SosFilter`].
///
/// One `[f64; 2]` per section; the length always matches the filter it was
/// created for.
#[derive(Debug, Clone, PartialEq)]
pub struct SosState {
    delays: Vec<[f64; 2]>,
}

impl SosState {
    /// All delay lines at rest.
    pub fn zeroed(filter: &SosFilter) -> Self {
        Self {
            delays: vec![[0.0; 2]; filter.len()],
        }
    }

    /// Steady state of the cascade for a unit-step input.
    ///
    /// Each section is settled on the step as seen through the sections
    /// before it, so a constant input of 1.0 passes without a transient.
    pub fn step_response_steady(filter: &SosFilter) -> Self {
        let mut scale = 1.0;
        let delays = filter
            .sections()
            .iter()
            .map(|section| {
                let [z0, z1] = section.step_steady_state();
                let settled = [scale * z0, scale * z1];
                scale *= section.dc_gain();
                settled
            })
            .collect();
        Self { delays }
    }

    /// Return every delay line to rest.
    pub fn reset(&mut self) {
        for z in &mut self.delays {
            *z = [0.0; 2];
        }
    }

    /// Number of sections tracked.
    pub fn len(&self) -> usize {
        self.delays.len()
    }

    /// True if no sections are tracked.
    pub fn is_empty(&self) -> bool {
        self.delays.is_empty()
    }

    /// Delay lines, one per section.
    pub fn delays(&self) -> &[[f64; 2]] {
        &self.delays
    }
}
