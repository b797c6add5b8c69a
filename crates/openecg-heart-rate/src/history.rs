//! Accepted R peaks and the RR intervals between them

use std::collections::VecDeque;

/// Shortest RR interval admitted to the average (s). Faster than 240 BPM.
pub const MIN_RR_S: f64 = 0.25;

/// Longest RR interval admitted to the average (s). Slower than 30 BPM.
pub const MAX_RR_S: f64 = 2.0;

/// Minimum number of RR intervals before a rate is reported.
pub const MIN_RR_FOR_BPM: usize = 2;

/// Timestamps of accepted R peaks plus a bounded ring of recent RR intervals.
#[derive(Debug, Clone)]
pub struct RPeakHistory {
    peaks: VecDeque<f64>,
    rr: VecDeque<f64>,
    rr_capacity: usize,
    min_separation_s: f64,
}

impl RPeakHistory {
    /// Create an empty history.
    ///
    /// `rr_capacity` bounds the RR ring (raised to at least one).
    /// `min_separation_s` is the refractory window: a peak no later than this
    /// after the last accepted one is treated as a re-detection.
    pub fn new(rr_capacity: usize, min_separation_s: f64) -> Self {
        let rr_capacity = rr_capacity.max(1);
        Self {
            peaks: VecDeque::with_capacity(rr_capacity + 1),
            rr: VecDeque::with_capacity(rr_capacity),
            rr_capacity,
            min_separation_s,
        }
    }

    /// Offer a detected peak. Returns `true` if it was accepted.
    ///
    /// The RR interval to the previous peak is admitted only if it lies
    /// strictly between [`MIN_RR_S`] and [`MAX_RR_S`]; the peak itself is
    /// accepted either way.
    pub fn record_peak(&mut self, timestamp: f64) -> bool {
        if let Some(last) = self.last_peak() {
            if timestamp - last <= self.min_separation_s {
                return false;
            }
            let rr = timestamp - last;
            if rr > MIN_RR_S && rr < MAX_RR_S {
                if self.rr.len() == self.rr_capacity {
                    self.rr.pop_front();
                }
                self.rr.push_back(rr);
            }
        }

        if self.peaks.len() > self.rr_capacity {
            self.peaks.pop_front();
        }
        self.peaks.push_back(timestamp);
        true
    }

    /// Timestamp of the most recently accepted peak.
    pub fn last_peak(&self) -> Option<f64> {
        self.peaks.back().copied()
    }

    /// Recently accepted peaks, oldest first.
    pub fn peaks(&self) -> impl Iterator<Item = f64> + '_ {
        self.peaks.iter().copied()
    }

    /// Admitted RR intervals in arrival order.
    pub fn rr_intervals(&self) -> impl ExactSizeIterator<Item = f64> + '_ {
        self.rr.iter().copied()
    }

    /// `60 / mean(RR)` once at least [`MIN_RR_FOR_BPM`] intervals are held.
    pub fn bpm(&self) -> Option<f64> {
        if self.rr.len() < MIN_RR_FOR_BPM {
            return None;
        }
        let mean = self.rr.iter().sum::<f64>() / self.rr.len() as f64;
        Some(60.0 / mean)
    }

    /// Forget every peak and interval.
    pub fn clear(&mut self) {
        self.peaks.clear();
        self.rr.clear();
    }
}
