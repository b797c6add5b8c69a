//! Signal-path error types.
//!
//! These errors are raised once per sample on the processing thread, so they
//! are `Copy`, allocation-free and carry a stable numeric code for logging.

use core::fmt;

use crate::common::ErrorSeverity;

/// Per-sample signal path error codes.
///
/// # Examples
///
/// ```
/// use openecg_errors::{SignalError, ErrorSeverity};
///
/// let err = SignalError::NonFiniteInput;
/// assert_eq!(err.code(), 1);
/// assert_eq!(err.severity(), ErrorSeverity::Warning);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum SignalError {
    /// An electrode potential was NaN or infinite
    NonFiniteInput = 1,
    /// The filter chain produced a non-finite output
    FilterDiverged = 2,
}

impl SignalError {
    /// Get the numeric error code.
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Get the error severity.
    pub fn severity(self) -> ErrorSeverity {
        match self {
            SignalError::NonFiniteInput => ErrorSeverity::Warning,
            SignalError::FilterDiverged => ErrorSeverity::Error,
        }
    }
}

impl fmt::Display for SignalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalError::NonFiniteInput => write!(f, "Non-finite electrode potential"),
            SignalError::FilterDiverged => write!(f, "Filter output diverged"),
        }
    }
}

impl std::error::Error for SignalError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_error_codes_are_stable() {
        assert_eq!(SignalError::NonFiniteInput.code(), 1);
        assert_eq!(SignalError::FilterDiverged.code(), 2);
    }

    #[test]
    fn test_divergence_outranks_bad_input() {
        assert!(SignalError::FilterDiverged.severity() > SignalError::NonFiniteInput.severity());
    }
}
