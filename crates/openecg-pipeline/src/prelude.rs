//! Prelude module for convenient imports

pub use crate::acquisition::{
    LineSource, SampleSource, open_device_source, open_serial_device, parse_line,
    wall_clock_seconds,
};
pub use crate::config::{DEFAULT_DEVICE_PATH, DEVICE_ENV, PipelineConfig};
pub use crate::orchestrator::{
    CAPTURE_THREAD_NAME, FramePublisher, Pipeline, PipelineState, PipelineStats, ProcessedFrame,
};
pub use crate::sample::RawSample;
