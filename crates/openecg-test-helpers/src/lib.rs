//! Shared test utilities for OpenECG.
//!
//! This crate provides common test helpers, assertions, and fixtures
//! to reduce code duplication across the test suite.
//!
//! # Modules
//!
//! - [`mod@must`] - `must_some`, an unwrap helper with `#[track_caller]`
//! - [`assertions`] - Custom assertion macros for testing
//! - [`fixtures`] - Synthetic ECG signals and device feeds
//! - [`prelude`] - Convenience re-exports
//!
//! # Usage
//!
//! Add to your `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! openecg-test-helpers = { workspace = true }
//! ```
//!
//! Then import the prelude:
//!
//! ```rust,ignore
//! use openecg_test_helpers::prelude::*;
//! ```

#![deny(unsafe_op_in_unsafe_fn)]
#![allow(clippy::unwrap_used, clippy::panic)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod assertions;
pub mod must;
pub mod prelude;

#[cfg(feature = "fixtures")]
#[cfg_attr(docsrs, doc(cfg(feature = "fixtures")))]
pub mod fixtures;

pub use must::*;
