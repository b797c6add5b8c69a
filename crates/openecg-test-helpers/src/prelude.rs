//! Convenience re-exports for common test utilities.
//!
//! ```rust,ignore
//! use openecg_test_helpers::prelude::*;
//! ```

pub use crate::must::must_some;

#[cfg(feature = "fixtures")]
pub use crate::fixtures::SyntheticEcg;

pub use crate::{assert_approx_eq, assert_in_range, assert_strictly_increasing};

/// Result type for tests that propagate errors with `?`.
pub type TestResult = Result<(), Box<dyn std::error::Error>>;
