//! Publishing side of the transport
//!
//! The publisher listens on a TCP endpoint and fans every published frame
//! out to all attached subscribers. Each subscriber gets its own writer task
//! reading from a shared broadcast queue; a subscriber that falls more than
//! `queue_depth` frames behind loses the oldest ones.

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::io::AsyncReadExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

use crate::DEFAULT_PUBLISH_ADDRESS;
use crate::error::{IpcError, IpcResult};
use crate::sp::{self, Endpoint, PROTO_PUB, PROTO_SUB};
use crate::topic::Topic;

type Frame = Arc<Vec<u8>>;

/// Publisher configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PublisherConfig {
    /// Listen endpoint, `tcp://host:port` (`*` binds all interfaces)
    pub address: String,
    /// Frames buffered per subscriber before the oldest are dropped
    pub queue_depth: usize,
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_PUBLISH_ADDRESS.to_string(),
            queue_depth: 1024,
        }
    }
}

impl PublisherConfig {
    /// Publisher on `address` with the default queue depth.
    pub fn with_address(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            ..Self::default()
        }
    }

    /// Check the address and queue depth.
    ///
    /// # Errors
    ///
    /// Returns [`IpcError::InvalidAddress`] or [`IpcError::InvalidConfig`].
    pub fn validate(&self) -> IpcResult<Endpoint> {
        if self.queue_depth == 0 {
            return Err(IpcError::InvalidConfig(
                "queue_depth must be at least 1".to_string(),
            ));
        }
        self.address.parse()
    }
}

/// A bound publisher.
#[derive(Debug)]
pub struct Publisher {
    frames: broadcast::Sender<Frame>,
    local_addr: SocketAddr,
    subscribers: Arc<AtomicUsize>,
    shutdown: watch::Sender<bool>,
    accept_task: std::sync::Mutex<Option<JoinHandle<()>>>,
}

impl Publisher {
    /// Bind the listen endpoint and start accepting subscribers.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`IpcError::TransportInit`] if the address cannot be bound,
    /// or a configuration error for a malformed address.
    pub async fn bind(config: PublisherConfig) -> IpcResult<Self> {
        let endpoint = config.validate()?;
        let listener = TcpListener::bind((endpoint.host(), endpoint.port()))
            .await
            .map_err(|e| IpcError::TransportInit(format!("bind {endpoint}: {e}")))?;
        let local_addr = listener
            .local_addr()
            .map_err(|e| IpcError::TransportInit(format!("bind {endpoint}: {e}")))?;

        let (frames, _) = broadcast::channel(config.queue_depth);
        let (shutdown, shutdown_rx) = watch::channel(false);
        let subscribers = Arc::new(AtomicUsize::new(0));

        let accept_task = tokio::spawn(accept_loop(
            listener,
            frames.clone(),
            shutdown_rx,
            Arc::clone(&subscribers),
        ));

        info!(address = %endpoint, %local_addr, "Publisher listening");

        Ok(Self {
            frames,
            local_addr,
            subscribers,
            shutdown,
            accept_task: std::sync::Mutex::new(Some(accept_task)),
        })
    }

    /// Send `payload` on `topic` to every attached subscriber.
    ///
    /// Never blocks. Publishing with nobody attached is not an error; the
    /// frame is simply dropped.
    ///
    /// # Errors
    ///
    /// Returns [`IpcError::ShutdownRequested`] after [`Publisher::shutdown`].
    pub fn publish(&self, topic: Topic, payload: &[u8]) -> IpcResult<()> {
        if *self.shutdown.borrow() {
            return Err(IpcError::ShutdownRequested);
        }
        if self.frames.send(Arc::new(topic.frame(payload))).is_err() {
            trace!(%topic, "No subscribers attached, frame dropped");
        }
        Ok(())
    }

    /// Address actually bound (resolves port 0).
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Subscribers that completed the handshake and are still attached.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.load(Ordering::SeqCst)
    }

    /// Stop accepting, disconnect all subscribers and release the port.
    pub async fn shutdown(&self) {
        self.shutdown.send_replace(true);
        let task = match self.accept_task.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if let Some(task) = task
            && let Err(e) = task.await
        {
            warn!(error = %e, "Publisher accept task ended abnormally");
        }
        info!(local_addr = %self.local_addr, "Publisher shut down");
    }
}

impl Drop for Publisher {
    fn drop(&mut self) {
        self.shutdown.send_replace(true);
    }
}

async fn accept_loop(
    listener: TcpListener,
    frames: broadcast::Sender<Frame>,
    mut shutdown: watch::Receiver<bool>,
    subscribers: Arc<AtomicUsize>,
) {
    loop {
        tokio::select! {
            _ = shutdown.changed() => break,
            accepted = listener.accept() => match accepted {
                Ok((stream, peer)) => {
                    debug!(%peer, "Subscriber connecting");
                    tokio::spawn(serve_subscriber(
                        stream,
                        peer,
                        frames.subscribe(),
                        shutdown.clone(),
                        Arc::clone(&subscribers),
                    ));
                }
                Err(e) => {
                    warn!(error = %e, "Accept failed");
                    tokio::time::sleep(Duration::from_millis(100)).await;
                }
            },
        }
    }
    debug!("Publisher accept loop stopped");
}

async fn serve_subscriber(
    mut stream: TcpStream,
    peer: SocketAddr,
    mut frames: broadcast::Receiver<Frame>,
    mut shutdown: watch::Receiver<bool>,
    subscribers: Arc<AtomicUsize>,
) {
    if let Err(e) = stream.set_nodelay(true) {
        debug!(%peer, error = %e, "Could not disable Nagle");
    }
    if let Err(e) = sp::handshake(&mut stream, PROTO_PUB, PROTO_SUB).await {
        warn!(%peer, error = %e, "Subscriber handshake failed");
        return;
    }

    subscribers.fetch_add(1, Ordering::SeqCst);
    info!(%peer, "Subscriber attached");

    let (mut reader, mut writer) = stream.into_split();
    let mut probe = [0u8; 64];
    loop {
        tokio::select! {
            _ = shutdown.changed() => break,
            frame = frames.recv() => match frame {
                Ok(frame) => {
                    if let Err(e) = sp::write_frame(&mut writer, &frame).await {
                        debug!(%peer, error = %e, "Write to subscriber failed");
                        break;
                    }
                }
                Err(RecvError::Lagged(dropped)) => {
                    warn!(%peer, dropped, "Subscriber lagging, frames dropped");
                }
                Err(RecvError::Closed) => break,
            },
            // Subscribers send nothing after the handshake; EOF means gone.
            read = reader.read(&mut probe) => match read {
                Ok(0) | Err(_) => break,
                Ok(_) => {}
            },
        }
    }

    subscribers.fetch_sub(1, Ordering::SeqCst);
    info!(%peer, "Subscriber detached");
}
