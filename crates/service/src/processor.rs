//! The processor service: publisher, device and pipeline wired together

use std::fs::File;
use std::io::BufReader;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use openecg_ipc::{Publisher, StopSignal};
use openecg_pipeline::{
    FramePublisher, LineSource, Pipeline, PipelineStats, SampleSource, open_device_source,
};
use tracing::{info, warn};

use crate::config::ProcessorConfig;

/// A processor with its publisher bound.
#[derive(Debug)]
pub struct Processor {
    config: ProcessorConfig,
    publisher: Arc<Publisher>,
}

impl Processor {
    /// Validate `config` and bind the publisher.
    ///
    /// Fails if the listen address is taken; there is no retry.
    pub async fn bind(config: ProcessorConfig) -> Result<Self> {
        config.validate()?;
        let publisher = Publisher::bind(config.publisher.clone())
            .await
            .with_context(|| format!("Failed to bind publisher on {}", config.publisher.address))?;
        info!(address = %publisher.local_addr(), "Publisher listening");
        Ok(Self {
            config,
            publisher: Arc::new(publisher),
        })
    }

    /// Address the publisher is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.publisher.local_addr()
    }

    /// Subscribers currently attached.
    pub fn subscriber_count(&self) -> usize {
        self.publisher.subscriber_count()
    }

    /// Active configuration.
    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    /// Open the configured serial device, retrying as configured.
    pub async fn open_device(&self) -> Result<LineSource<BufReader<File>>> {
        let pipeline = &self.config.pipeline;
        let path = pipeline.device_path.clone();
        let retries = pipeline.open_retries;
        let delay = pipeline.open_retry_delay();

        let source =
            tokio::task::spawn_blocking(move || open_device_source(&path, retries, delay))
                .await
                .context("Device open task failed")?
                .with_context(|| {
                    format!(
                        "Failed to open serial device {}",
                        self.config.pipeline.device_path.display()
                    )
                })?;
        Ok(source)
    }

    /// Run the pipeline over `source` on a blocking thread until `stop` is
    /// set or the source ends.
    pub async fn run<S>(&self, source: S, stop: StopSignal) -> Result<PipelineStats>
    where
        S: SampleSource + 'static,
    {
        let publisher: Arc<dyn FramePublisher> = self.publisher.clone();
        let mut pipeline = Pipeline::with_stages(
            self.config.pipeline.clone(),
            self.config.filter,
            self.config.heart_rate,
            publisher,
        )
        .context("Failed to build pipeline")?;

        let stats = tokio::task::spawn_blocking(move || pipeline.run(source, &stop))
            .await
            .context("Pipeline thread failed")??;
        Ok(stats)
    }

    /// Stop accepting subscribers and close their connections.
    pub async fn shutdown(&self) {
        self.publisher.shutdown().await;
    }
}

/// Set `stop` on Ctrl-C. Returns once either has happened.
pub async fn stop_on_ctrl_c(stop: StopSignal) {
    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            match result {
                Ok(()) => info!("Interrupt received, stopping"),
                Err(e) => warn!(error = %e, "Cannot listen for Ctrl-C, stopping"),
            }
            stop.stop();
        }
        () = stop.stopped() => {}
    }
}
