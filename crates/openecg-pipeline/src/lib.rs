//! Acquisition and processing loop for OpenECG
//!
//! Ties the other crates together: samples are read from the device on a
//! dedicated thread, filtered, expanded into six leads, fed to the heart-rate
//! monitor, and published as a raw and a filtered frame.
//!
//! # Architecture
//!
//! - [`sample`]: the raw electrode sample and its finiteness check
//! - [`acquisition`]: the [`SampleSource`] trait, line decoding and device opening
//! - [`config`]: [`PipelineConfig`]
//! - [`orchestrator`]: [`Pipeline`], its state machine and counters
//!
//! # Threading
//!
//! Only the capture thread touches the device and only the processing thread
//! touches filter and heart-rate state. They share nothing but the queue and a
//! [`StopSignal`](openecg_ipc::StopSignal).
//!
//! # Example
//!
//! ```
//! use std::io::Cursor;
//! use std::sync::Arc;
//! use openecg_ipc::{IpcResult, StopSignal, Topic};
//! use openecg_pipeline::prelude::*;
//!
//! struct Discard;
//!
//! impl FramePublisher for Discard {
//!     fn publish(&self, _topic: Topic, _payload: &[u8]) -> IpcResult<()> {
//!         Ok(())
//!     }
//! }
//!
//! let mut pipeline = Pipeline::new(PipelineConfig::default(), Arc::new(Discard))?;
//! let feed = LineSource::new(Cursor::new("{\"RA\":0.1,\"LA\":0.2,\"LL\":0.3}\n"));
//! let stats = pipeline.run(feed, &StopSignal::new())?;
//! assert_eq!(stats.processed, 1);
//! # Ok::<(), openecg_errors::OpenEcgError>(())
//! ```

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod acquisition;
pub mod config;
pub mod orchestrator;
pub mod prelude;
pub mod sample;

pub use acquisition::{LineSource, SampleSource, open_device_source, open_serial_device};
pub use config::PipelineConfig;
pub use orchestrator::{FramePublisher, Pipeline, PipelineState, PipelineStats, ProcessedFrame};
pub use sample::RawSample;
