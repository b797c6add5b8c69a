//! IPC-specific error types

use std::io;
use thiserror::Error;

use openecg_errors::OpenEcgError;

/// IPC error type
#[derive(Debug, Error)]
pub enum IpcError {
    /// Transport initialization failed (bind, listen)
    #[error("Transport initialization failed: {0}")]
    TransportInit(String),

    /// Connection failed or was lost
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Peer spoke a different protocol
    #[error("Handshake failed: {0}")]
    Handshake(String),

    /// Message encoding failed
    #[error("Message encoding failed: {0}")]
    EncodingFailed(String),

    /// Message decoding failed
    #[error("Message decoding failed: {0}")]
    DecodingFailed(String),

    /// Frame larger than the configured limit
    #[error("Frame of {len} bytes exceeds maximum {max}")]
    FrameTooLarge {
        /// Announced frame length
        len: u64,
        /// Configured maximum
        max: usize,
    },

    /// Endpoint string could not be parsed
    #[error("Invalid address '{0}': expected tcp://host:port")]
    InvalidAddress(String),

    /// Timeout exceeded
    #[error("Operation timed out after {timeout_ms}ms")]
    Timeout {
        /// Timeout in milliseconds
        timeout_ms: u64,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Shutdown requested
    #[error("Shutdown requested")]
    ShutdownRequested,
}

impl IpcError {
    /// Check if this error is recoverable by retrying or skipping
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            IpcError::ConnectionFailed(_)
                | IpcError::Handshake(_)
                | IpcError::DecodingFailed(_)
                | IpcError::FrameTooLarge { .. }
                | IpcError::Timeout { .. }
                | IpcError::Io(_)
        )
    }

    /// Check if this error should stop the component that raised it
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            IpcError::TransportInit(_)
                | IpcError::InvalidAddress(_)
                | IpcError::InvalidConfig(_)
                | IpcError::ShutdownRequested
        )
    }

    /// Create a timeout error
    pub fn timeout(timeout_ms: u64) -> Self {
        IpcError::Timeout { timeout_ms }
    }
}

impl From<IpcError> for OpenEcgError {
    fn from(err: IpcError) -> Self {
        match err {
            IpcError::Io(e) => OpenEcgError::Io(e),
            IpcError::InvalidAddress(_) | IpcError::InvalidConfig(_) => {
                OpenEcgError::Config(err.to_string())
            }
            other => OpenEcgError::Transport(other.to_string()),
        }
    }
}

/// Specialized Result type for IPC operations
pub type IpcResult<T> = std::result::Result<T, IpcError>;

#[cfg(test)]
mod tests {
    use super::*;
    use openecg_errors::ErrorCategory;

    #[test]
    fn test_error_is_recoverable() {
        let err = IpcError::ConnectionFailed("peer reset".to_string());
        assert!(err.is_recoverable());

        let err = IpcError::TransportInit("address in use".to_string());
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_error_is_fatal() {
        let err = IpcError::TransportInit("address in use".to_string());
        assert!(err.is_fatal());

        let err = IpcError::DecodingFailed("missing field".to_string());
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_timeout_helper() {
        let err = IpcError::timeout(1000);
        assert!(matches!(err, IpcError::Timeout { timeout_ms: 1000 }));
    }

    #[test]
    fn test_into_umbrella_error() {
        let err: OpenEcgError = IpcError::ConnectionFailed("closed".into()).into();
        assert_eq!(err.category(), ErrorCategory::Transport);

        let err: OpenEcgError = IpcError::InvalidAddress("udp://x".into()).into();
        assert_eq!(err.category(), ErrorCategory::Config);
    }
}
