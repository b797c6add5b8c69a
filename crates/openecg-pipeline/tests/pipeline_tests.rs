//! End-to-end pipeline tests
//!
//! Feeds samples through filter, lead derivation and heart rate, and checks
//! what reaches the publisher.

use std::io::Cursor;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use openecg_errors::{AcquisitionError, OpenEcgError, SignalError};
use openecg_ipc::prelude::*;
use openecg_pipeline::prelude::*;
use openecg_test_helpers::prelude::*;
use tracing_test::traced_test;

/// Keeps every published frame in order.
#[derive(Default)]
struct Recorder {
    frames: Mutex<Vec<(Topic, Vec<u8>)>>,
}

impl Recorder {
    fn decoded(&self) -> Result<Vec<WireMessage>, Box<dyn std::error::Error>> {
        let frames = self.frames.lock().map_err(|e| e.to_string())?;
        frames
            .iter()
            .map(|(topic, payload)| decode(*topic, payload).map_err(Into::into))
            .collect()
    }
}

impl FramePublisher for Recorder {
    fn publish(&self, topic: Topic, payload: &[u8]) -> IpcResult<()> {
        self.frames
            .lock()
            .map_err(|e| IpcError::ConnectionFailed(e.to_string()))?
            .push((topic, payload.to_vec()));
        Ok(())
    }
}

struct Unreachable;

impl FramePublisher for Unreachable {
    fn publish(&self, _topic: Topic, _payload: &[u8]) -> IpcResult<()> {
        Err(IpcError::ConnectionFailed("no transport".to_string()))
    }
}

/// Endless feed, one sample per millisecond.
struct Endless {
    t: f64,
}

impl SampleSource for Endless {
    fn next_sample(&mut self) -> Result<Option<RawSample>, AcquisitionError> {
        thread::sleep(Duration::from_millis(1));
        self.t += 0.01;
        Ok(Some(RawSample::new([0.1, 0.2, 0.3], self.t)))
    }
}

fn fast_config() -> PipelineConfig {
    PipelineConfig {
        queue_poll_interval_ms: 10,
        ..PipelineConfig::default()
    }
}

#[test]
#[traced_test]
fn single_sample_publishes_raw_then_filtered() -> TestResult {
    let recorder = Arc::new(Recorder::default());
    let mut pipeline = Pipeline::new(PipelineConfig::default(), recorder.clone())?;

    let frame = pipeline.process_sample(RawSample::new([0.1, 0.2, 0.3], 1000.0))?;
    pipeline.publish_frame(&frame)?;

    let messages = recorder.decoded()?;
    assert_eq!(messages.len(), 2);
    let WireMessage::Raw(raw) = messages[0] else {
        return Err("first frame was not raw".into());
    };
    let WireMessage::Filtered(filtered) = messages[1] else {
        return Err("second frame was not filtered".into());
    };

    assert_eq!(raw.ra.to_bits(), f64::from(0.1f32).to_bits());
    assert_eq!(raw.la.to_bits(), f64::from(0.2f32).to_bits());
    assert_eq!(raw.ll.to_bits(), f64::from(0.3f32).to_bits());
    assert_eq!(raw.timestamp.to_bits(), 1000.0f64.to_bits());
    assert_eq!(filtered.timestamp.to_bits(), 1000.0f64.to_bits());
    assert!(filtered.bpm.is_none());
    assert_approx_eq!(filtered.leads.i + filtered.leads.iii, filtered.leads.ii, 1e-12);
    assert_eq!(pipeline.stats().processed, 1);
    Ok(())
}

#[test]
fn run_processes_feed_and_skips_garbage() -> TestResult {
    let ecg = SyntheticEcg::default();
    let mut feed = ecg.json_lines(2.0);
    let lines = feed.lines().count();
    feed.push_str("{\"RA\": oops}\n\n");

    let recorder = Arc::new(Recorder::default());
    let mut pipeline = Pipeline::new(fast_config(), recorder.clone())?;
    let stats = pipeline.run(LineSource::new(Cursor::new(feed)), &StopSignal::new())?;

    assert_eq!(stats.processed, lines as u64);
    assert_eq!(stats.rejected, 0);
    assert_eq!(stats.failed, 0);
    assert_eq!(pipeline.state(), PipelineState::Stopped);

    let messages = recorder.decoded()?;
    assert_eq!(messages.len(), 2 * lines);
    for pair in messages.chunks(2) {
        assert_eq!(pair[0].topic(), Topic::Raw);
        assert_eq!(pair[1].topic(), Topic::Filtered);
        assert_eq!(pair[0].timestamp().to_bits(), pair[1].timestamp().to_bits());
    }
    let stamps: Vec<f64> = messages.iter().step_by(2).map(WireMessage::timestamp).collect();
    assert!(stamps.windows(2).all(|w| w[0] <= w[1]));
    Ok(())
}

#[test]
fn heart_rate_survives_the_filter_chain() -> TestResult {
    let mut pipeline = Pipeline::new(PipelineConfig::default(), Arc::new(Recorder::default()))?;
    let ecg = SyntheticEcg {
        mains_amplitude: 0.1,
        wander_amplitude: 0.3,
        start_time: 1000.0,
        ..SyntheticEcg::at_bpm(75.0)
    };

    let mut bpm = None;
    for ([ra, la, ll], ts) in ecg.electrode_samples(12.0) {
        let frame = pipeline.process_sample(RawSample::new([ra as f32, la as f32, ll as f32], ts))?;
        bpm = frame.filtered.bpm;
    }
    assert_in_range!(must_some(bpm, "no estimate after 12 s"), 72.0, 78.0);
    Ok(())
}

#[test]
fn non_finite_sample_is_rejected_and_stream_continues() -> TestResult {
    let recorder = Arc::new(Recorder::default());
    let mut pipeline = Pipeline::new(PipelineConfig::default(), recorder.clone())?;

    pipeline.handle_sample(RawSample::new([0.1, f32::INFINITY, 0.3], 1.0));
    pipeline.handle_sample(RawSample::new([0.1, 0.2, 0.3], 1.01));

    let result = pipeline.process_sample(RawSample::new([0.1, 0.2, 0.3], f64::NAN));
    assert!(matches!(
        result,
        Err(OpenEcgError::Signal(SignalError::NonFiniteInput))
    ));

    let stats = pipeline.stats();
    assert_eq!(stats.rejected, 2);
    assert_eq!(stats.processed, 1);
    assert_eq!(recorder.decoded()?.len(), 2);
    Ok(())
}

#[test]
#[traced_test]
fn publish_failures_are_counted_not_fatal() -> TestResult {
    let mut pipeline = Pipeline::new(fast_config(), Arc::new(Unreachable))?;
    let feed = SyntheticEcg::default().json_lines(0.5);
    let stats = pipeline.run(LineSource::new(Cursor::new(feed)), &StopSignal::new())?;

    assert_eq!(stats.processed, 50);
    assert_eq!(stats.failed, 50);
    Ok(())
}

#[test]
fn stop_ends_run_on_endless_source() -> TestResult {
    let recorder = Arc::new(Recorder::default());
    let mut pipeline = Pipeline::new(fast_config(), recorder)?;
    let stop = StopSignal::new();

    let stopper = {
        let stop = stop.clone();
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(150));
            stop.stop();
        })
    };

    let stats = pipeline.run(Endless { t: 0.0 }, &stop)?;
    stopper.join().map_err(|_| "stopper panicked")?;

    assert!(stats.processed > 0);
    assert_eq!(pipeline.state(), PipelineState::Stopped);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
#[traced_test]
async fn filtered_frames_reach_a_real_subscriber() -> TestResult {
    use futures::StreamExt;

    let publisher = Arc::new(
        Publisher::bind(PublisherConfig::with_address("tcp://127.0.0.1:0")).await?,
    );
    let port = publisher.local_addr().port();

    let subscriber = Subscriber::new(SubscriberConfig::new(
        format!("tcp://127.0.0.1:{port}"),
        Topic::Filtered,
    ))?;
    let listen_stop = StopSignal::new();
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let stream = subscriber.stream(listen_stop.clone());
    let listener = tokio::spawn(async move {
        let mut stream = Box::pin(stream);
        while let Some(message) = stream.next().await {
            if tx.send(message).is_err() {
                break;
            }
        }
    });

    tokio::time::timeout(Duration::from_secs(10), async {
        while publisher.subscriber_count() < 1 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await?;

    let run_stop = StopSignal::new();
    let pipeline_task = {
        let publisher: Arc<dyn FramePublisher> = publisher.clone();
        let stop = run_stop.clone();
        tokio::task::spawn_blocking(move || -> Result<PipelineStats, OpenEcgError> {
            let mut pipeline = Pipeline::new(fast_config(), publisher)?;
            pipeline.run(Endless { t: 1000.0 }, &stop)
        })
    };

    let first = tokio::time::timeout(Duration::from_secs(10), rx.recv())
        .await?
        .ok_or("subscriber stream ended")?;
    assert_eq!(first.topic(), Topic::Filtered);
    assert!(first.timestamp() > 1000.0);

    run_stop.stop();
    let stats = pipeline_task.await??;
    assert!(stats.processed > 0);

    listen_stop.stop();
    tokio::time::timeout(Duration::from_secs(10), listener).await??;
    publisher.shutdown().await;
    Ok(())
}

/// Holds every publish until opened.
#[derive(Default)]
struct Gate {
    open: std::sync::atomic::AtomicBool,
}

impl FramePublisher for Gate {
    fn publish(&self, _topic: Topic, _payload: &[u8]) -> IpcResult<()> {
        while !self.open.load(std::sync::atomic::Ordering::SeqCst) {
            thread::sleep(Duration::from_millis(1));
        }
        Ok(())
    }
}

struct Counted {
    remaining: usize,
    produced: Arc<std::sync::atomic::AtomicUsize>,
}

impl SampleSource for Counted {
    fn next_sample(&mut self) -> Result<Option<RawSample>, AcquisitionError> {
        if self.remaining == 0 {
            return Ok(None);
        }
        self.remaining -= 1;
        let n = self.produced.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        Ok(Some(RawSample::new([0.1, 0.2, 0.3], n as f64 * 0.01)))
    }
}

// The queue has no bound and applies no backpressure: a stalled processing
// thread lets it grow instead of slowing capture. Known limitation.
#[test]
fn capture_never_waits_on_a_stalled_processor() -> TestResult {
    use std::sync::atomic::{AtomicUsize, Ordering};

    const SAMPLES: usize = 5_000;
    let gate = Arc::new(Gate::default());
    let produced = Arc::new(AtomicUsize::new(0));
    let source = Counted {
        remaining: SAMPLES,
        produced: produced.clone(),
    };

    let runner = {
        let gate: Arc<dyn FramePublisher> = gate.clone();
        thread::spawn(move || -> Result<PipelineStats, OpenEcgError> {
            let mut pipeline = Pipeline::new(fast_config(), gate)?;
            pipeline.run(source, &StopSignal::new())
        })
    };

    let deadline = std::time::Instant::now() + Duration::from_secs(10);
    while produced.load(Ordering::SeqCst) < SAMPLES {
        if std::time::Instant::now() > deadline {
            gate.open.store(true, Ordering::SeqCst);
            return Err("capture stalled behind the processing thread".into());
        }
        thread::sleep(Duration::from_millis(1));
    }

    gate.open.store(true, Ordering::SeqCst);
    let stats = runner.join().map_err(|_| "pipeline thread panicked")??;
    assert_eq!(stats.processed, SAMPLES as u64);
    Ok(())
}
