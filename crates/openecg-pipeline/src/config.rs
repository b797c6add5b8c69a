//! Pipeline configuration

use std::path::PathBuf;
use std::time::Duration;

use openecg_errors::ValidationError;
use serde::{Deserialize, Serialize};

/// Default device path, relative to the working directory.
pub const DEFAULT_DEVICE_PATH: &str = "dev/device";

/// Environment variable overriding [`PipelineConfig::device_path`].
pub const DEVICE_ENV: &str = "ECG_SERIAL_DEVICE";

/// Acquisition and processing-loop settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Serial device delivering the JSON line feed
    pub device_path: PathBuf,
    /// Samples of lead II examined per heart-rate update
    pub window_size: usize,
    /// How long the processing loop blocks on an empty queue before
    /// checking for a stop
    pub queue_poll_interval_ms: u64,
    /// Attempts to open the device before giving up
    pub open_retries: u32,
    /// Pause between open attempts
    pub open_retry_delay_ms: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            device_path: PathBuf::from(DEFAULT_DEVICE_PATH),
            window_size: 100,
            queue_poll_interval_ms: 100,
            open_retries: 3,
            open_retry_delay_ms: 1000,
        }
    }
}

impl PipelineConfig {
    /// Queue poll interval as a [`Duration`].
    pub fn queue_poll_interval(&self) -> Duration {
        Duration::from_millis(self.queue_poll_interval_ms)
    }

    /// Open retry delay as a [`Duration`].
    pub fn open_retry_delay(&self) -> Duration {
        Duration::from_millis(self.open_retry_delay_ms)
    }

    /// Check the settings.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] for an empty device path or a zero
    /// window, poll interval or retry count.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.device_path.as_os_str().is_empty() {
            return Err(ValidationError::required("device_path"));
        }
        if self.window_size == 0 {
            return Err(ValidationError::out_of_range(
                "window_size",
                self.window_size,
                1,
                usize::MAX,
            ));
        }
        if self.queue_poll_interval_ms == 0 {
            return Err(ValidationError::out_of_range(
                "queue_poll_interval_ms",
                self.queue_poll_interval_ms,
                1,
                u64::MAX,
            ));
        }
        if self.open_retries == 0 {
            return Err(ValidationError::out_of_range(
                "open_retries",
                self.open_retries,
                1,
                u32::MAX,
            ));
        }
        Ok(())
    }
}
