//! Centralized error types for OpenECG
//!
//! This crate provides the shared error taxonomy used by the signal chain,
//! the acquisition adapter and the processor binaries.
//!
//! # Architecture
//!
//! - [`common`]: Top-level error type, classification and severity levels
//! - [`signal`]: Per-sample signal-path errors (copyable, allocation-free)
//! - [`acquisition`]: Raw-sample source and device errors
//! - [`validation`]: Configuration and input validation errors
//!
//! Transport errors live next to the transport in `openecg-ipc`.
//!
//! # Example
//!
//! ```
//! use openecg_errors::prelude::*;
//!
//! fn check_rate(fs: f64) -> Result<f64> {
//!     if !(fs > 0.0) {
//!         return Err(ValidationError::out_of_range("sample_rate_hz", fs, 0.0, f64::MAX).into());
//!     }
//!     Ok(fs)
//! }
//!
//! assert!(check_rate(100.0).is_ok());
//! assert!(check_rate(-1.0).is_err());
//! ```

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![warn(missing_docs, rust_2018_idioms)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod acquisition;
pub mod common;
pub mod prelude;
pub mod signal;
pub mod validation;

pub use acquisition::AcquisitionError;
pub use common::{ErrorCategory, ErrorSeverity, OpenEcgError};
pub use signal::SignalError;
pub use validation::ValidationError;

/// A specialized `Result` type for OpenECG operations.
pub type Result<T> = std::result::Result<T, OpenEcgError>;
