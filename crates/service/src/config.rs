//! Processor configuration
//!
//! One JSON document covering every stage. All sections and fields are
//! optional; anything omitted takes its default.
//!
//! ```json
//! {
//!   "filter": { "notch_hz": 50.0 },
//!   "publisher": { "address": "tcp://0.0.0.0:9999" },
//!   "pipeline": { "device_path": "/dev/ttyACM0", "window_size": 100 }
//! }
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use openecg_filters::FilterConfig;
use openecg_heart_rate::HeartRateConfig;
use openecg_ipc::PublisherConfig;
use openecg_pipeline::PipelineConfig;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Complete processor configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessorConfig {
    /// Bandpass and notch settings
    pub filter: FilterConfig,
    /// R-peak detection settings
    pub heart_rate: HeartRateConfig,
    /// Listen address and fan-out queue
    pub publisher: PublisherConfig,
    /// Device and processing loop
    pub pipeline: PipelineConfig,
}

impl ProcessorConfig {
    /// Parse a JSON document.
    pub fn from_json_str(content: &str) -> Result<Self> {
        serde_json::from_str(content).context("Failed to parse processor config")
    }

    /// Load configuration from a JSON file.
    pub async fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config = Self::from_json_str(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))?;
        debug!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    /// Validate every section and the constraints between them.
    pub fn validate(&self) -> Result<()> {
        self.filter.validate().context("Invalid filter config")?;
        self.heart_rate
            .validate()
            .context("Invalid heart-rate config")?;
        self.publisher
            .validate()
            .context("Invalid publisher config")?;
        self.pipeline.validate().context("Invalid pipeline config")?;

        let filter_fs = self.filter.sample_rate_hz;
        let monitor_fs = self.heart_rate.sample_rate_hz;
        if (filter_fs - monitor_fs).abs() > f64::EPSILON {
            anyhow::bail!(
                "Sample rate mismatch: filter runs at {filter_fs} Hz, heart-rate monitor at {monitor_fs} Hz"
            );
        }

        let capacity = self.heart_rate.capacity();
        if self.pipeline.window_size > capacity {
            anyhow::bail!(
                "Heart-rate window of {} samples exceeds the {capacity}-sample buffer",
                self.pipeline.window_size
            );
        }
        Ok(())
    }
}
