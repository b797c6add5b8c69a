//! Common error types and utilities used across all OpenECG crates.
//!
//! This module provides the top-level error enum that can wrap all sub-errors,
//! along with error classification and severity levels.

use core::fmt;

use crate::{AcquisitionError, SignalError, ValidationError};

/// Top-level error type that can wrap all OpenECG sub-errors.
#[derive(Debug, thiserror::Error)]
pub enum OpenEcgError {
    /// Per-sample signal path errors
    #[error("Signal error: {0}")]
    Signal(#[from] SignalError),

    /// Raw-sample source errors
    #[error("Acquisition error: {0}")]
    Acquisition(#[from] AcquisitionError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Transport errors, carried as text to keep this crate transport-agnostic
    #[error("Transport error: {0}")]
    Transport(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[source] std::io::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl OpenEcgError {
    /// Get the error category for classification.
    pub fn category(&self) -> ErrorCategory {
        match self {
            OpenEcgError::Signal(_) => ErrorCategory::Signal,
            OpenEcgError::Acquisition(_) => ErrorCategory::Acquisition,
            OpenEcgError::Validation(_) => ErrorCategory::Validation,
            OpenEcgError::Transport(_) => ErrorCategory::Transport,
            OpenEcgError::Io(_) => ErrorCategory::IO,
            OpenEcgError::Config(_) => ErrorCategory::Config,
            OpenEcgError::Other(_) => ErrorCategory::Other,
        }
    }

    /// Get the error severity level.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            OpenEcgError::Signal(e) => e.severity(),
            OpenEcgError::Acquisition(e) => e.severity(),
            OpenEcgError::Validation(e) => e.severity(),
            OpenEcgError::Transport(_) => ErrorSeverity::Warning,
            OpenEcgError::Io(_) => ErrorSeverity::Error,
            OpenEcgError::Config(_) => ErrorSeverity::Critical,
            OpenEcgError::Other(_) => ErrorSeverity::Error,
        }
    }

    /// Check if this error is recoverable.
    pub fn is_recoverable(&self) -> bool {
        self.severity() < ErrorSeverity::Critical
    }

    /// Create a configuration error with a message.
    pub fn config(msg: impl Into<String>) -> Self {
        OpenEcgError::Config(msg.into())
    }

    /// Create a transport error with a message.
    pub fn transport(msg: impl Into<String>) -> Self {
        OpenEcgError::Transport(msg.into())
    }

    /// Create a generic error with a message.
    pub fn other(msg: impl Into<String>) -> Self {
        OpenEcgError::Other(msg.into())
    }
}

impl From<std::io::Error> for OpenEcgError {
    fn from(e: std::io::Error) -> Self {
        OpenEcgError::Io(e)
    }
}

/// Error category for classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ErrorCategory {
    /// Per-sample signal path errors
    Signal = 0,
    /// Raw-sample source errors
    Acquisition = 1,
    /// Publish/subscribe transport errors
    Transport = 2,
    /// Configuration errors
    Config = 3,
    /// I/O errors
    IO = 4,
    /// Validation errors
    Validation = 5,
    /// Other errors
    Other = 255,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCategory::Signal => write!(f, "Signal"),
            ErrorCategory::Acquisition => write!(f, "Acquisition"),
            ErrorCategory::Transport => write!(f, "Transport"),
            ErrorCategory::Config => write!(f, "Config"),
            ErrorCategory::IO => write!(f, "IO"),
            ErrorCategory::Validation => write!(f, "Validation"),
            ErrorCategory::Other => write!(f, "Other"),
        }
    }
}

/// Error severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum ErrorSeverity {
    /// Informational, no action required
    Info = 0,
    /// Warning, logged and skipped
    Warning = 1,
    /// Error, operation failed
    Error = 2,
    /// Critical, startup must abort
    Critical = 3,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "INFO"),
            ErrorSeverity::Warning => write!(f, "WARN"),
            ErrorSeverity::Error => write!(f, "ERROR"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_severity_ordering() {
        assert!(ErrorSeverity::Critical > ErrorSeverity::Error);
        assert!(ErrorSeverity::Error > ErrorSeverity::Warning);
        assert!(ErrorSeverity::Warning > ErrorSeverity::Info);
    }

    #[test]
    fn test_category_and_severity() {
        let err: OpenEcgError = SignalError::NonFiniteInput.into();
        assert_eq!(err.category(), ErrorCategory::Signal);
        assert!(err.is_recoverable());

        let err = OpenEcgError::config("bad notch");
        assert_eq!(err.category(), ErrorCategory::Config);
        assert!(!err.is_recoverable());
    }
}
