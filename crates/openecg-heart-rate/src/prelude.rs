//! Prelude module for convenient imports.

pub use crate::buffer::CircularBuffer;
pub use crate::history::{MAX_RR_S, MIN_RR_FOR_BPM, MIN_RR_S, RPeakHistory};
pub use crate::monitor::{HeartRateConfig, HeartRateMonitor, REFRACTORY_S};
pub use crate::peaks::{PeakCriteria, find_peaks, local_maxima, prominence};
