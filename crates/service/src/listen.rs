//! Subscriber side of `ecg-listen`

use std::io::{self, Write};

use anyhow::{Context, Result};
use futures::StreamExt;
use openecg_ipc::{StopSignal, Subscriber, SubscriberConfig, WireMessage};
use tracing::{debug, info};

/// Stream messages from `config` and write each one to `out` as a JSON line.
///
/// Returns the number of messages written, after `limit` messages if set,
/// when `stop` is set, or when the reader of `out` goes away.
pub async fn listen<W: Write>(
    config: SubscriberConfig,
    stop: StopSignal,
    limit: Option<u64>,
    mut out: W,
) -> Result<u64> {
    let subscriber = Subscriber::new(config).context("Invalid subscriber config")?;
    info!(
        address = %subscriber.config().address,
        topic = %subscriber.config().topic,
        "Listening"
    );

    let mut messages = Box::pin(subscriber.stream(stop.clone()));
    let mut written = 0u64;
    while let Some(message) = messages.next().await {
        match write_line(&mut out, &message) {
            Ok(()) => written += 1,
            Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
                debug!("Output closed");
                break;
            }
            Err(e) => return Err(e).context("Failed to write message"),
        }
        if limit.is_some_and(|n| written >= n) {
            break;
        }
    }
    stop.stop();

    let stats = subscriber.stats();
    info!(
        written,
        decode_failures = stats.decode_failures,
        reconnects = stats.reconnects,
        "Listener finished"
    );
    Ok(written)
}

fn write_line<W: Write>(out: &mut W, message: &WireMessage) -> io::Result<()> {
    serde_json::to_writer(&mut *out, message)?;
    out.write_all(b"\n")?;
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use openecg_ipc::RawRecord;

    #[test]
    fn test_message_is_one_json_line() -> Result<()> {
        let mut out = Vec::new();
        let message = WireMessage::Raw(RawRecord {
            timestamp: 1000.0,
            ra: 0.5,
            la: 0.25,
            ll: -0.5,
        });
        write_line(&mut out, &message)?;

        let text = String::from_utf8(out)?;
        assert!(text.ends_with('\n'));
        assert_eq!(text.lines().count(), 1);
        let value: serde_json::Value = serde_json::from_str(text.trim_end())?;
        assert_eq!(value["RA"], 0.5);
        assert_eq!(value["timestamp"], 1000.0);
        Ok(())
    }
}
