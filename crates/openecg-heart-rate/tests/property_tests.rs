//! Property-based tests for the sample ring and peak detector.

use openecg_heart_rate::prelude::*;
use proptest::prelude::*;

proptest! {
    #[test]
    fn buffer_keeps_newest_samples(capacity in 1usize..64, n in 0usize..200) {
        let mut buffer = CircularBuffer::new(capacity);
        for i in 0..n {
            buffer.push(i as f32, i as f64);
        }
        let held = n.min(capacity);
        prop_assert_eq!(buffer.len(), held);
        for offset in 0..held {
            let expected = (n - held + offset) as f64;
            let (value, ts) = buffer.get(offset).ok_or_else(|| TestCaseError::fail("missing sample"))?;
            prop_assert!((f64::from(value) - expected).abs() < 1e-3);
            prop_assert!((ts - expected).abs() < 1e-12);
        }
        prop_assert!(buffer.get(held).is_none());
    }

    #[test]
    fn latest_window_is_suffix(capacity in 1usize..64, n in 1usize..200, w in 1usize..64) {
        let mut buffer = CircularBuffer::new(capacity);
        for i in 0..n {
            buffer.push(i as f32, i as f64);
        }
        match buffer.latest_window(w) {
            Some((values, stamps)) => {
                prop_assert_eq!(values.len(), w);
                prop_assert_eq!(stamps.len(), w);
                prop_assert!((stamps[w - 1] - (n - 1) as f64).abs() < 1e-12);
            }
            None => prop_assert!(w > buffer.len()),
        }
    }

    #[test]
    fn peaks_are_separated_and_sorted(
        signal in prop::collection::vec(-2.0f32..2.0, 3..300),
        distance in 1usize..40,
    ) {
        let criteria = PeakCriteria { distance: Some(distance), ..PeakCriteria::default() };
        let peaks = find_peaks(&signal, &criteria);
        for pair in peaks.windows(2) {
            prop_assert!(pair[0] < pair[1]);
            prop_assert!(pair[1] - pair[0] >= distance);
        }
        for p in peaks {
            prop_assert!(p > 0 && p < signal.len() - 1);
        }
    }

    #[test]
    fn prominence_is_non_negative(signal in prop::collection::vec(-2.0f32..2.0, 3..100)) {
        for p in local_maxima(&signal) {
            prop_assert!(prominence(&signal, p) >= 0.0);
        }
    }
}
