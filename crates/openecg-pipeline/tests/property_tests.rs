//! Property-based tests for per-sample processing

use std::sync::Arc;

use openecg_ipc::{IpcResult, Topic};
use openecg_pipeline::prelude::*;
use proptest::prelude::*;

struct Discard;

impl FramePublisher for Discard {
    fn publish(&self, _topic: Topic, _payload: &[u8]) -> IpcResult<()> {
        Ok(())
    }
}

proptest! {
    #[test]
    fn prop_finite_samples_always_produce_a_frame(
        samples in prop::collection::vec(prop::array::uniform3(-5.0f32..5.0), 1..300),
    ) {
        let mut pipeline = Pipeline::new(PipelineConfig::default(), Arc::new(Discard))
            .map_err(|e| TestCaseError::fail(e.to_string()))?;
        for (i, signal) in samples.iter().enumerate() {
            let ts = 1000.0 + i as f64 * 0.01;
            let frame = pipeline
                .process_sample(RawSample::new(*signal, ts))
                .map_err(|e| TestCaseError::fail(e.to_string()))?;
            prop_assert_eq!(frame.raw.ra.to_bits(), f64::from(signal[0]).to_bits());
            prop_assert_eq!(frame.raw.timestamp.to_bits(), frame.filtered.timestamp.to_bits());
            let leads = frame.filtered.leads;
            prop_assert!((leads.i + leads.iii - leads.ii).abs() < 1e-9);
            prop_assert!((leads.avr + leads.avl + leads.avf).abs() < 1e-9);
        }
        prop_assert_eq!(pipeline.stats().processed, samples.len() as u64);
    }

    #[test]
    fn prop_non_finite_samples_never_reach_the_monitor(
        channel in 0usize..3,
        bad in prop::sample::select(vec![f32::NAN, f32::INFINITY, f32::NEG_INFINITY]),
    ) {
        let mut pipeline = Pipeline::new(PipelineConfig::default(), Arc::new(Discard))
            .map_err(|e| TestCaseError::fail(e.to_string()))?;
        let mut signal = [0.1f32, 0.2, 0.3];
        signal[channel] = bad;
        prop_assert!(pipeline.process_sample(RawSample::new(signal, 1.0)).is_err());
        prop_assert_eq!(pipeline.heart_rate().size(), 0);
        prop_assert_eq!(pipeline.stats().rejected, 1);
    }
}
