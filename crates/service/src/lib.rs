//! OpenECG service binaries
//!
//! - `ecg-processor` reads the serial feed, runs the processing pipeline and
//!   publishes raw and filtered frames
//! - `ecg-listen` subscribes to one topic and prints each message as a JSON
//!   line
//!
//! The library half holds everything the binaries do beyond argument
//! parsing, so it can be driven from tests.

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod config;
pub mod design;
pub mod listen;
pub mod logging;
pub mod processor;

pub use config::ProcessorConfig;
pub use design::{DesignFormat, DesignReport};
pub use listen::listen;
pub use logging::init_tracing;
pub use processor::{Processor, stop_on_ctrl_c};
