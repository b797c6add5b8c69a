//! Scalability-protocol framing over TCP
//!
//! Each connection opens with an 8-byte header from both ends:
//!
//! ```text
//! 0x00 'S' 'P' 0x00 <protocol: u16 BE> 0x00 0x00
//! ```
//!
//! After the exchange every message travels as a 64-bit big-endian length
//! followed by that many bytes. A message is delivered whole or not at all.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::{IpcError, IpcResult};

/// Protocol number of a publishing peer.
pub const PROTO_PUB: u16 = 0x20;

/// Protocol number of a subscribing peer.
pub const PROTO_SUB: u16 = 0x21;

/// Time allowed for the header exchange.
pub const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(5);

/// Largest message accepted by default (1 MiB).
pub const DEFAULT_MAX_FRAME_LEN: usize = 1 << 20;

const LEN_PREFIX: usize = 8;

/// Connection header announcing `protocol`.
pub const fn header(protocol: u16) -> [u8; 8] {
    let [hi, lo] = protocol.to_be_bytes();
    [0, b'S', b'P', 0, hi, lo, 0, 0]
}

/// Exchange connection headers and check that the peer speaks `expected_peer`.
///
/// # Errors
///
/// Returns [`IpcError::Timeout`] if the peer does not answer within
/// [`HANDSHAKE_TIMEOUT`], [`IpcError::Handshake`] if its header is malformed
/// or announces another protocol, and [`IpcError::Io`] on socket errors.
pub async fn handshake<S>(stream: &mut S, local: u16, expected_peer: u16) -> IpcResult<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let exchange = async {
        stream.write_all(&header(local)).await?;
        stream.flush().await?;
        let mut peer = [0u8; 8];
        stream.read_exact(&mut peer).await?;
        Ok::<_, std::io::Error>(peer)
    };

    let peer = match tokio::time::timeout(HANDSHAKE_TIMEOUT, exchange).await {
        Ok(result) => result?,
        Err(_) => {
            return Err(IpcError::timeout(
                u64::try_from(HANDSHAKE_TIMEOUT.as_millis()).unwrap_or(u64::MAX),
            ));
        }
    };

    let [z0, s, p, z1, hi, lo, r0, r1] = peer;
    if [z0, s, p, z1, r0, r1] != [0, b'S', b'P', 0, 0, 0] {
        return Err(IpcError::Handshake(format!("bad header {peer:02x?}")));
    }
    let protocol = u16::from_be_bytes([hi, lo]);
    if protocol != expected_peer {
        return Err(IpcError::Handshake(format!(
            "peer protocol {protocol:#x}, expected {expected_peer:#x}"
        )));
    }
    Ok(())
}

/// Write one length-prefixed message.
///
/// # Errors
///
/// Returns [`IpcError::Io`] if the write fails.
pub async fn write_frame<W>(writer: &mut W, payload: &[u8]) -> IpcResult<()>
where
    W: AsyncWrite + Unpin,
{
    let len = payload.len() as u64;
    writer.write_all(&len.to_be_bytes()).await?;
    writer.write_all(payload).await?;
    writer.flush().await?;
    Ok(())
}

/// Reads length-prefixed messages from a byte stream.
///
/// Partial input is kept between calls, so [`FrameReader::next_frame`] can be
/// raced in `select!` without losing data.
#[derive(Debug)]
pub struct FrameReader<R> {
    inner: R,
    buf: Vec<u8>,
    max_frame_len: usize,
}

impl<R: AsyncRead + Unpin> FrameReader<R> {
    /// Wrap `inner`, rejecting messages longer than `max_frame_len`.
    pub fn new(inner: R, max_frame_len: usize) -> Self {
        Self {
            inner,
            buf: Vec::with_capacity(4096),
            max_frame_len,
        }
    }

    /// Next complete message, or `None` once the peer has closed cleanly.
    ///
    /// # Errors
    ///
    /// Returns [`IpcError::FrameTooLarge`] for an oversized length prefix,
    /// [`IpcError::ConnectionFailed`] if the peer closes mid-message, and
    /// [`IpcError::Io`] on socket errors.
    pub async fn next_frame(&mut self) -> IpcResult<Option<Vec<u8>>> {
        loop {
            if let Some(frame) = self.take_frame()? {
                return Ok(Some(frame));
            }
            if self.inner.read_buf(&mut self.buf).await? == 0 {
                if self.buf.is_empty() {
                    return Ok(None);
                }
                return Err(IpcError::ConnectionFailed(format!(
                    "peer closed with {} bytes of a partial message",
                    self.buf.len()
                )));
            }
        }
    }

    fn take_frame(&mut self) -> IpcResult<Option<Vec<u8>>> {
        let Some(prefix) = self.buf.first_chunk::<LEN_PREFIX>() else {
            return Ok(None);
        };
        let len = u64::from_be_bytes(*prefix);
        let max = self.max_frame_len;
        let len = usize::try_from(len)
            .ok()
            .filter(|l| *l <= max)
            .ok_or(IpcError::FrameTooLarge { len, max })?;
        if self.buf.len() < LEN_PREFIX + len {
            return Ok(None);
        }
        Ok(Some(
            self.buf.drain(..LEN_PREFIX + len).skip(LEN_PREFIX).collect(),
        ))
    }

    /// Unwrap the underlying stream. Buffered bytes are lost.
    pub fn into_inner(self) -> R {
        self.inner
    }
}

/// A `tcp://host:port` endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    host: String,
    port: u16,
}

impl Endpoint {
    /// Host name or address; `*` has already been mapped to `0.0.0.0`.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Port number.
    pub fn port(&self) -> u16 {
        self.port
    }
}

impl FromStr for Endpoint {
    type Err = IpcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || IpcError::InvalidAddress(s.to_string());
        let rest = s.strip_prefix("tcp://").ok_or_else(invalid)?;
        let (host, port) = rest.rsplit_once(':').ok_or_else(invalid)?;
        let port = port.parse::<u16>().map_err(|e| {
            IpcError::InvalidAddress(format!("{s} ({e})"))
        })?;
        let host = match host {
            "*" => "0.0.0.0",
            h => h
                .strip_prefix('[')
                .and_then(|h| h.strip_suffix(']'))
                .unwrap_or(h),
        };
        if host.is_empty() {
            return Err(invalid());
        }
        Ok(Self {
            host: host.to_string(),
            port,
        })
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "tcp://[{}]:{}", self.host, self.port)
        } else {
            write!(f, "tcp://{}:{}", self.host, self.port)
        }
    }
}
