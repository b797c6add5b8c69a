//! Raw-sample source error types.
//!
//! Covers opening the serial device and decoding the line-oriented feed.

use crate::common::ErrorSeverity;

/// Acquisition errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AcquisitionError {
    /// The device could not be opened after all attempts
    #[error("Failed to open device {path} after {attempts} attempts: {reason}")]
    DeviceOpen {
        /// Device path as configured
        path: String,
        /// Number of attempts made
        attempts: u32,
        /// Last failure reason
        reason: String,
    },

    /// Reading from the device failed
    #[error("Read error on {path}: {reason}")]
    Read {
        /// Device path
        path: String,
        /// Failure reason
        reason: String,
    },

    /// A line could not be decoded as a sample
    #[error("Malformed sample line: {0}")]
    MalformedLine(String),
}

impl AcquisitionError {
    /// Get the error severity.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            AcquisitionError::DeviceOpen { .. } => ErrorSeverity::Critical,
            AcquisitionError::Read { .. } => ErrorSeverity::Error,
            AcquisitionError::MalformedLine(_) => ErrorSeverity::Warning,
        }
    }

    /// Check if the stream can continue past this error.
    pub fn is_transient(&self) -> bool {
        matches!(self, AcquisitionError::MalformedLine(_))
    }

    /// Create a malformed line error.
    pub fn malformed(reason: impl Into<String>) -> Self {
        AcquisitionError::MalformedLine(reason.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_line_is_transient() {
        let err = AcquisitionError::malformed("expected value at line 1 column 1");
        assert!(err.is_transient());
        assert_eq!(err.severity(), ErrorSeverity::Warning);
    }

    #[test]
    fn test_device_open_display() {
        let err = AcquisitionError::DeviceOpen {
            path: "dev/device".to_string(),
            attempts: 3,
            reason: "No such file or directory".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("dev/device"));
        assert!(msg.contains('3'));
        assert!(!err.is_transient());
    }
}
