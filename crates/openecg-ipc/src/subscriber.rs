//! Subscribing side of the transport
//!
//! A [`Subscriber`] dials the publisher, filters frames by topic and decodes
//! them into [`WireMessage`]s. Connection loss is never fatal: the stream
//! waits `reconnect_delay` and dials again until the [`StopSignal`] is set.
//!
//! ```text
//! Disconnected -> Connecting -> Subscribed -> Receiving
//!       ^             |              |            |
//!       +-------------+--------------+------------+   (error, close)
//!
//! any state -- stop --> Terminated
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use futures::Stream;
use serde::{Deserialize, Serialize};
use tokio::net::TcpStream;
use tokio::sync::watch;
use tracing::{debug, info, trace, warn};

use crate::DEFAULT_SUBSCRIBE_ADDRESS;
use crate::codec::{self, WireMessage};
use crate::error::{IpcError, IpcResult};
use crate::sp::{self, DEFAULT_MAX_FRAME_LEN, Endpoint, FrameReader, PROTO_PUB, PROTO_SUB};
use crate::stop::StopSignal;
use crate::topic::Topic;

/// Subscriber configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubscriberConfig {
    /// Publisher endpoint, `tcp://host:port`
    pub address: String,
    /// Topic to receive
    pub topic: Topic,
    /// Pause between a disconnect and the next dial
    pub reconnect_delay: Duration,
    /// How often a blocked receive wakes up to check for a stop
    pub recv_timeout: Option<Duration>,
    /// Largest accepted frame
    pub max_frame_len: usize,
}

impl Default for SubscriberConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_SUBSCRIBE_ADDRESS.to_string(),
            topic: Topic::Filtered,
            reconnect_delay: Duration::from_secs(2),
            recv_timeout: None,
            max_frame_len: DEFAULT_MAX_FRAME_LEN,
        }
    }
}

impl SubscriberConfig {
    /// Subscribe to `topic` at `address` with default timings.
    pub fn new(address: impl Into<String>, topic: Topic) -> Self {
        Self {
            address: address.into(),
            topic,
            ..Self::default()
        }
    }
}

/// Connection state of a [`Subscriber`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubscriberState {
    /// Not connected; the initial state and the state between retries
    Disconnected,
    /// Dialing the publisher
    Connecting,
    /// Connected, nothing received yet on this connection
    Subscribed,
    /// At least one message delivered on this connection
    Receiving,
    /// Stop requested; the stream has ended
    Terminated,
}

/// Counters since the subscriber was created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SubscriberStats {
    /// Frames read off the wire, any topic
    pub frames: u64,
    /// Frames on our topic that failed to decode
    pub decode_failures: u64,
    /// Frames on other topics
    pub discarded: u64,
    /// Redials after a failure or disconnect
    pub reconnects: u64,
}

#[derive(Debug, Default)]
struct Counters {
    frames: AtomicU64,
    decode_failures: AtomicU64,
    discarded: AtomicU64,
    reconnects: AtomicU64,
}

impl Counters {
    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self) -> SubscriberStats {
        SubscriberStats {
            frames: self.frames.load(Ordering::Relaxed),
            decode_failures: self.decode_failures.load(Ordering::Relaxed),
            discarded: self.discarded.load(Ordering::Relaxed),
            reconnects: self.reconnects.load(Ordering::Relaxed),
        }
    }
}

enum Received {
    Frame(IpcResult<Option<Vec<u8>>>),
    Tick,
    Stop,
}

/// A reconnecting topic subscriber.
#[derive(Debug)]
pub struct Subscriber {
    config: SubscriberConfig,
    endpoint: Endpoint,
    state: Arc<watch::Sender<SubscriberState>>,
    counters: Arc<Counters>,
}

impl Subscriber {
    /// Create a subscriber. Nothing is dialed until the stream is polled.
    ///
    /// # Errors
    ///
    /// Returns [`IpcError::InvalidAddress`] for a malformed address and
    /// [`IpcError::InvalidConfig`] for a zero frame limit.
    pub fn new(config: SubscriberConfig) -> IpcResult<Self> {
        let endpoint = config.address.parse()?;
        if config.max_frame_len == 0 {
            return Err(IpcError::InvalidConfig(
                "max_frame_len must be positive".to_string(),
            ));
        }
        let (state, _) = watch::channel(SubscriberState::Disconnected);
        Ok(Self {
            config,
            endpoint,
            state: Arc::new(state),
            counters: Arc::new(Counters::default()),
        })
    }

    /// Current connection state.
    pub fn state(&self) -> SubscriberState {
        *self.state.borrow()
    }

    /// Receiver that observes every state change.
    pub fn watch_state(&self) -> watch::Receiver<SubscriberState> {
        self.state.subscribe()
    }

    /// Counters so far.
    pub fn stats(&self) -> SubscriberStats {
        self.counters.snapshot()
    }

    /// Configuration in use.
    pub fn config(&self) -> &SubscriberConfig {
        &self.config
    }

    /// Decoded messages on the configured topic, across reconnects.
    ///
    /// The stream ends only once `stop` is set. Stop is honoured before each
    /// dial, while waiting to reconnect, and whenever a receive returns or
    /// times out.
    pub fn stream(&self, stop: StopSignal) -> impl Stream<Item = WireMessage> + Send + 'static {
        let config = self.config.clone();
        let endpoint = self.endpoint.clone();
        let state = Arc::clone(&self.state);
        let counters = Arc::clone(&self.counters);

        async_stream::stream! {
            let topic = config.topic;
            'session: loop {
                if stop.is_stopped() {
                    break;
                }

                state.send_replace(SubscriberState::Connecting);
                let dialed = tokio::select! {
                    _ = stop.stopped() => None,
                    dialed = dial(&endpoint, config.max_frame_len) => Some(dialed),
                };
                let Some(dialed) = dialed else {
                    break;
                };

                match dialed {
                    Ok(mut frames) => {
                        state.send_replace(SubscriberState::Subscribed);
                        info!(address = %endpoint, %topic, "Subscribed");

                        loop {
                            let received = match config.recv_timeout {
                                Some(timeout) => tokio::select! {
                                    _ = stop.stopped() => Received::Stop,
                                    r = tokio::time::timeout(timeout, frames.next_frame()) => match r {
                                        Ok(frame) => Received::Frame(frame),
                                        Err(_) => Received::Tick,
                                    },
                                },
                                None => tokio::select! {
                                    _ = stop.stopped() => Received::Stop,
                                    frame = frames.next_frame() => Received::Frame(frame),
                                },
                            };
                            if stop.is_stopped() {
                                break 'session;
                            }

                            match received {
                                Received::Stop => break 'session,
                                Received::Tick => continue,
                                Received::Frame(Ok(Some(frame))) => {
                                    Counters::bump(&counters.frames);
                                    let Some(payload) = topic.strip(&frame) else {
                                        Counters::bump(&counters.discarded);
                                        trace!(len = frame.len(), "Discarding frame for another topic");
                                        continue;
                                    };
                                    match codec::decode(topic, payload) {
                                        Ok(message) => {
                                            state.send_replace(SubscriberState::Receiving);
                                            yield message;
                                        }
                                        Err(e) => {
                                            Counters::bump(&counters.decode_failures);
                                            warn!(%topic, error = %e, "Dropping undecodable message");
                                        }
                                    }
                                }
                                Received::Frame(Ok(None)) => {
                                    warn!(address = %endpoint, "Publisher closed the connection");
                                    break;
                                }
                                Received::Frame(Err(e)) => {
                                    warn!(address = %endpoint, error = %e, "Receive failed");
                                    break;
                                }
                            }
                        }
                    }
                    Err(e) => {
                        warn!(address = %endpoint, error = %e, "Connect failed");
                    }
                }

                state.send_replace(SubscriberState::Disconnected);
                debug!(delay = ?config.reconnect_delay, "Waiting to reconnect");
                let stopped = tokio::select! {
                    _ = stop.stopped() => true,
                    _ = tokio::time::sleep(config.reconnect_delay) => false,
                };
                if stopped {
                    break;
                }
                Counters::bump(&counters.reconnects);
            }

            state.send_replace(SubscriberState::Terminated);
            info!(address = %endpoint, %topic, "Subscriber stopped");
        }
    }
}

async fn dial(endpoint: &Endpoint, max_frame_len: usize) -> IpcResult<FrameReader<TcpStream>> {
    let mut stream = TcpStream::connect((endpoint.host(), endpoint.port()))
        .await
        .map_err(|e| IpcError::ConnectionFailed(format!("{endpoint}: {e}")))?;
    stream.set_nodelay(true)?;
    sp::handshake(&mut stream, PROTO_SUB, PROTO_PUB).await?;
    Ok(FrameReader::new(stream, max_frame_len))
}
