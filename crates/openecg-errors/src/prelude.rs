//! Prelude module for convenient error handling imports.
//!
//! # Example
//!
//! ```
//! use openecg_errors::prelude::*;
//!
//! fn require_path(path: &str) -> Result<&str> {
//!     if path.is_empty() {
//!         return Err(ValidationError::required("device_path").into());
//!     }
//!     Ok(path)
//! }
//!
//! assert!(require_path("").is_err());
//! ```

pub use crate::{
    Result,
    acquisition::AcquisitionError,
    common::{ErrorCategory, ErrorSeverity, OpenEcgError},
    signal::SignalError,
    validation::ValidationError,
};
