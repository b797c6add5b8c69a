//! The processing loop
//!
//! ```text
//! SampleSource ──(ecg-capture thread)──► unbounded queue ──► Pipeline::run
//!                                                             │
//!    filter ─► derive leads ─► heart rate (lead II) ─► encode ─► publish
//!                                                              ecg.raw, ecg.filtered
//! ```
//!
//! The queue is unbounded: a stalled processing thread makes it grow
//! rather than making the capture thread block or drop samples.

use std::sync::Arc;
use std::thread;

use crossbeam::channel::{self, Receiver, RecvTimeoutError, Sender};
use openecg_errors::{OpenEcgError, Result, SignalError, ValidationError};
use openecg_filters::{FilterConfig, FilterEngine, derive_leads};
use openecg_heart_rate::{HeartRateConfig, HeartRateMonitor};
use openecg_ipc::codec::{self, FilteredRecord, RawRecord, WireMessage};
use openecg_ipc::{IpcResult, Publisher, StopSignal, Topic};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::acquisition::SampleSource;
use crate::config::PipelineConfig;
use crate::sample::RawSample;

/// Name of the acquisition thread.
pub const CAPTURE_THREAD_NAME: &str = "ecg-capture";

/// Destination for encoded frames.
pub trait FramePublisher: Send + Sync {
    /// Publish `payload` on `topic`.
    ///
    /// # Errors
    ///
    /// Implementations return an error if the frame could not be handed to
    /// the transport.
    fn publish(&self, topic: Topic, payload: &[u8]) -> IpcResult<()>;
}

impl FramePublisher for Publisher {
    fn publish(&self, topic: Topic, payload: &[u8]) -> IpcResult<()> {
        Publisher::publish(self, topic, payload)
    }
}

/// Lifecycle of a [`Pipeline`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipelineState {
    /// Constructed, not yet run
    Idle,
    /// Starting the capture thread
    Listening,
    /// Processing samples
    Running,
    /// Source has ended; processing what is left in the queue
    Draining,
    /// Run has returned
    Stopped,
}

/// Per-run counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineStats {
    /// Samples filtered and turned into frames
    pub processed: u64,
    /// Samples refused before touching filter state
    pub rejected: u64,
    /// Frames that could not be encoded or published
    pub failed: u64,
}

/// The outputs of one sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProcessedFrame {
    /// The sample as received
    pub raw: RawRecord,
    /// Filtered leads and current heart-rate estimate
    pub filtered: FilteredRecord,
}

impl ProcessedFrame {
    /// Both messages in publication order.
    pub fn messages(&self) -> [WireMessage; 2] {
        [
            WireMessage::Raw(self.raw),
            WireMessage::Filtered(self.filtered),
        ]
    }
}

/// Filter, lead and heart-rate state for one session, plus the publisher.
pub struct Pipeline {
    config: PipelineConfig,
    filters: FilterEngine,
    heart_rate: HeartRateMonitor,
    publisher: Arc<dyn FramePublisher>,
    state: PipelineState,
    stats: PipelineStats,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("config", &self.config)
            .field("filters", &self.filters)
            .field("heart_rate", &self.heart_rate)
            .field("state", &self.state)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

impl Pipeline {
    /// Pipeline with default filter and heart-rate settings.
    ///
    /// # Errors
    ///
    /// Returns [`OpenEcgError::Validation`] if `config` is invalid.
    pub fn new(config: PipelineConfig, publisher: Arc<dyn FramePublisher>) -> Result<Self> {
        Self::with_stages(
            config,
            FilterConfig::default(),
            HeartRateConfig::default(),
            publisher,
        )
    }

    /// Pipeline with explicit filter and heart-rate settings.
    ///
    /// # Errors
    ///
    /// Returns [`OpenEcgError::Validation`] if any configuration is invalid
    /// or the heart-rate window does not fit in the heart-rate buffer.
    pub fn with_stages(
        config: PipelineConfig,
        filter: FilterConfig,
        heart_rate: HeartRateConfig,
        publisher: Arc<dyn FramePublisher>,
    ) -> Result<Self> {
        config.validate()?;
        let heart_rate = HeartRateMonitor::new(heart_rate)?;
        let capacity = heart_rate.config().capacity();
        if config.window_size > capacity {
            return Err(ValidationError::out_of_range(
                "window_size",
                config.window_size,
                1,
                capacity,
            )
            .into());
        }
        let filters = FilterEngine::new(filter)?;

        Ok(Self {
            config,
            filters,
            heart_rate,
            publisher,
            state: PipelineState::Idle,
            stats: PipelineStats::default(),
        })
    }

    /// Current lifecycle state.
    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Counters so far.
    pub fn stats(&self) -> PipelineStats {
        self.stats
    }

    /// Configuration in use.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Filter engine, for inspecting the active design.
    pub fn filters(&self) -> &FilterEngine {
        &self.filters
    }

    /// Heart-rate monitor.
    pub fn heart_rate(&self) -> &HeartRateMonitor {
        &self.heart_rate
    }

    fn set_state(&mut self, state: PipelineState) {
        if self.state != state {
            debug!(from = ?self.state, to = ?state, "Pipeline state change");
            self.state = state;
        }
    }

    /// Run one sample through filter, lead derivation and heart rate.
    ///
    /// # Errors
    ///
    /// Returns [`SignalError::NonFiniteInput`] for a sample with a NaN or
    /// infinite value; filter and heart-rate state are left untouched. Returns
    /// [`SignalError::FilterDiverged`] if the filters produce a non-finite
    /// output, after which the filter state is reset.
    pub fn process_sample(&mut self, sample: RawSample) -> Result<ProcessedFrame> {
        if !sample.is_finite() {
            self.stats.rejected += 1;
            return Err(SignalError::NonFiniteInput.into());
        }

        let filtered = self.filters.filter(sample.electrodes());
        if filtered.iter().any(|v| !v.is_finite()) {
            self.filters.reset();
            self.stats.rejected += 1;
            return Err(SignalError::FilterDiverged.into());
        }

        let leads = derive_leads(filtered);
        #[allow(clippy::cast_possible_truncation)]
        self.heart_rate.append(leads.ii as f32, sample.timestamp);
        let bpm = self.heart_rate.process_latest_window(self.config.window_size);

        let [ra, la, ll] = sample.electrodes();
        self.stats.processed += 1;
        Ok(ProcessedFrame {
            raw: RawRecord {
                timestamp: sample.timestamp,
                ra,
                la,
                ll,
            },
            filtered: FilteredRecord {
                timestamp: sample.timestamp,
                leads,
                bpm,
            },
        })
    }

    /// Encode both messages of `frame` and publish raw, then filtered.
    ///
    /// Nothing is published unless both encode.
    ///
    /// # Errors
    ///
    /// Returns the first encode or publish error.
    pub fn publish_frame(&self, frame: &ProcessedFrame) -> IpcResult<()> {
        let raw = codec::encode(&WireMessage::Raw(frame.raw))?;
        let filtered = codec::encode(&WireMessage::Filtered(frame.filtered))?;
        self.publisher.publish(Topic::Raw, &raw)?;
        self.publisher.publish(Topic::Filtered, &filtered)?;
        Ok(())
    }

    /// Process and publish one sample, counting rather than returning
    /// failures.
    pub fn handle_sample(&mut self, sample: RawSample) {
        match self.process_sample(sample) {
            Ok(frame) => {
                if let Err(e) = self.publish_frame(&frame) {
                    self.stats.failed += 1;
                    warn!(timestamp = sample.timestamp, error = %e, "Failed to publish frame");
                }
            }
            Err(OpenEcgError::Signal(e)) => {
                warn!(
                    timestamp = sample.timestamp,
                    code = e.code(),
                    severity = %e.severity(),
                    error = %e,
                    "Rejected sample"
                );
            }
            Err(e) if e.is_recoverable() => {
                warn!(timestamp = sample.timestamp, category = %e.category(), error = %e, "Rejected sample");
            }
            Err(e) => {
                error!(timestamp = sample.timestamp, category = %e.category(), error = %e, "Rejected sample");
            }
        }
    }

    /// Drain `source` on a capture thread and process every sample until
    /// `stop` is set or the source ends and the queue is empty.
    ///
    /// # Errors
    ///
    /// Returns [`OpenEcgError::Io`] if the capture thread cannot be spawned.
    pub fn run<S>(&mut self, source: S, stop: &StopSignal) -> Result<PipelineStats>
    where
        S: SampleSource + 'static,
    {
        self.set_state(PipelineState::Listening);
        let (tx, rx) = channel::unbounded();
        let capture_stop = stop.clone();
        let capture = thread::Builder::new()
            .name(CAPTURE_THREAD_NAME.to_string())
            .spawn(move || capture_loop(source, tx, capture_stop))
            .map_err(|e| {
                self.state = PipelineState::Stopped;
                OpenEcgError::Io(e)
            })?;

        self.set_state(PipelineState::Running);
        info!(window_size = self.config.window_size, "Pipeline running");

        self.process_queue(&rx, &capture, stop);

        if capture.is_finished() {
            if capture.join().is_err() {
                error!("Capture thread panicked");
            }
        } else {
            // Blocked in a device read; it exits on its next sample.
            debug!("Leaving capture thread to finish its current read");
        }

        self.set_state(PipelineState::Stopped);
        info!(
            processed = self.stats.processed,
            rejected = self.stats.rejected,
            failed = self.stats.failed,
            "Pipeline stopped"
        );
        Ok(self.stats)
    }

    fn process_queue(
        &mut self,
        rx: &Receiver<RawSample>,
        capture: &thread::JoinHandle<()>,
        stop: &StopSignal,
    ) {
        let poll = self.config.queue_poll_interval();
        loop {
            if stop.is_stopped() {
                info!(queued = rx.len(), "Stop requested");
                return;
            }
            if self.state == PipelineState::Running && capture.is_finished() {
                info!(queued = rx.len(), "Source ended, draining queue");
                self.set_state(PipelineState::Draining);
            }
            match rx.recv_timeout(poll) {
                Ok(sample) => self.handle_sample(sample),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    self.set_state(PipelineState::Draining);
                    return;
                }
            }
        }
    }
}

fn capture_loop<S: SampleSource>(mut source: S, tx: Sender<RawSample>, stop: StopSignal) {
    info!("Capture thread started");
    while !stop.is_stopped() {
        match source.next_sample() {
            Ok(Some(sample)) => {
                if tx.send(sample).is_err() {
                    break;
                }
            }
            Ok(None) => {
                info!("Sample source ended");
                break;
            }
            Err(e) if e.is_transient() => {
                warn!(error = %e, "Skipping sample");
            }
            Err(e) => {
                error!(severity = %e.severity(), error = %e, "Sample source failed");
                break;
            }
        }
    }
    debug!("Capture thread stopped");
}
