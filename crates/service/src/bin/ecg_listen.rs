//! ecg-listen - print messages published by ecg-processor

#![deny(clippy::unwrap_used)]

use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use openecg_ipc::{ADDRESS_ENV, DEFAULT_SUBSCRIBE_ADDRESS, StopSignal, SubscriberConfig, Topic};
use openecg_service::{init_tracing, listen, stop_on_ctrl_c};

#[derive(Parser)]
#[command(name = "ecg-listen")]
#[command(about = "Subscribe to an ECG processor and print each message as a JSON line")]
#[command(version)]
struct Cli {
    /// Processor endpoint (tcp://host:port)
    #[arg(short, long, env = ADDRESS_ENV, default_value = DEFAULT_SUBSCRIBE_ADDRESS)]
    address: String,

    /// Topic to subscribe to: raw or filtered
    #[arg(short, long, default_value = "filtered")]
    topic: Topic,

    /// Pause between reconnect attempts
    #[arg(long, default_value_t = 2000)]
    reconnect_delay_ms: u64,

    /// Exit after this many messages
    #[arg(short = 'n', long)]
    count: Option<u64>,

    /// Verbose logging (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    let config = SubscriberConfig {
        reconnect_delay: Duration::from_millis(cli.reconnect_delay_ms),
        ..SubscriberConfig::new(cli.address, cli.topic)
    };

    let stop = StopSignal::new();
    let interrupt = tokio::spawn(stop_on_ctrl_c(stop.clone()));
    let result = listen(config, stop.clone(), cli.count, std::io::stdout().lock()).await;

    stop.stop();
    interrupt.await?;
    result.map(|_| ())
}
