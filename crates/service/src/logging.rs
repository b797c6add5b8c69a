//! Log subscriber setup shared by the binaries

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Log targets covered by the default directive: the library crates share the
/// `openecg` prefix, the binaries log under their own names.
const TARGETS: [&str; 3] = ["openecg", "ecg_processor", "ecg_listen"];

/// Filter directive for a `-v` count.
pub fn default_directive(verbose: u8) -> String {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    TARGETS
        .iter()
        .map(|target| format!("{target}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}

/// Install the global `fmt` subscriber. `RUST_LOG` takes precedence over
/// `verbose`.
///
/// Logs go to stderr so stdout stays free for data.
pub fn init_tracing(verbose: u8) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()?;
    Ok(())
}
