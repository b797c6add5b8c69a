//! ecg-processor - ECG acquisition, filtering and publishing

#![deny(clippy::unwrap_used)]

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use openecg_ipc::StopSignal;
use openecg_pipeline::config::DEVICE_ENV;
use openecg_service::{DesignFormat, DesignReport, Processor, ProcessorConfig, init_tracing, stop_on_ctrl_c};
use tracing::info;

#[derive(Parser)]
#[command(name = "ecg-processor")]
#[command(about = "Read an ECG serial feed, filter it and publish raw and filtered frames")]
#[command(version)]
struct Cli {
    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Serial device, overrides the config file
    #[arg(short, long, env = DEVICE_ENV)]
    device: Option<PathBuf>,

    /// Publish endpoint (tcp://host:port), overrides the config file
    #[arg(short, long)]
    bind: Option<String>,

    /// Print the filter coefficient tables and exit
    #[arg(long, value_enum, num_args = 0..=1, default_missing_value = "json")]
    print_design: Option<DesignFormat>,

    /// Verbose logging (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    let mut config = match &cli.config {
        Some(path) => ProcessorConfig::load_from_path(path).await?,
        None => ProcessorConfig::default(),
    };
    if let Some(device) = cli.device {
        config.pipeline.device_path = device;
    }
    if let Some(address) = cli.bind {
        config.publisher.address = address;
    }

    if let Some(format) = cli.print_design {
        config.validate()?;
        println!("{}", DesignReport::new(config.filter)?.render(format)?);
        return Ok(());
    }

    info!(version = env!("CARGO_PKG_VERSION"), "Starting ECG processor");
    let processor = Processor::bind(config).await?;
    let source = processor.open_device().await?;

    let stop = StopSignal::new();
    let interrupt = tokio::spawn(stop_on_ctrl_c(stop.clone()));
    let result = processor.run(source, stop.clone()).await;

    stop.stop();
    interrupt.await?;
    processor.shutdown().await;

    let stats = result?;
    info!(
        processed = stats.processed,
        rejected = stats.rejected,
        failed = stats.failed,
        "ECG processor stopped"
    );
    Ok(())
}
