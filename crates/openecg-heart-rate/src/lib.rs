//! Heart-rate estimation for OpenECG
//!
//! R-peak detection over a sliding window of one filtered lead, with the
//! resulting RR intervals averaged into a beats-per-minute estimate.
//!
//! # Components
//!
//! - [`CircularBuffer`]: fixed-capacity sample ring with logical indexing
//! - [`find_peaks`]: local maxima filtered by height, distance and prominence
//! - [`RPeakHistory`]: accepted peaks and the bounded RR ring
//! - [`HeartRateMonitor`]: ties the three together
//!
//! # Example
//!
//! ```
//! use openecg_heart_rate::prelude::*;
//!
//! let mut monitor = HeartRateMonitor::new(HeartRateConfig::default())?;
//! monitor.append(0.1, 1000.0);
//! assert_eq!(monitor.process_latest_window(100), None);
//! # Ok::<(), openecg_errors::ValidationError>(())
//! ```

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod buffer;
pub mod history;
pub mod monitor;
pub mod peaks;
pub mod prelude;

pub use buffer::CircularBuffer;
pub use history::RPeakHistory;
pub use monitor::{HeartRateConfig, HeartRateMonitor};
pub use peaks::{PeakCriteria, find_peaks};
