//! Streaming ECG Filters for OpenECG
//!
//! This crate provides the signal-conditioning stage of the processor: a
//! per-channel Butterworth bandpass followed by a mains notch, evaluated one
//! sample at a time with persistent state, and the derivation of the six
//! limb leads from three electrode potentials.
//!
//! # Overview
//!
//! - **SOS**: immutable second-order-section cascades with caller-owned state
//! - **Design**: Butterworth bandpass and IIR notch coefficient design
//! - **Engine**: the three-channel bandpass + notch chain
//! - **Leads**: Einthoven and Goldberger lead derivation
//!
//! # Streaming Guarantees
//!
//! - Each call to [`FilterEngine::filter`] advances every channel by exactly
//!   one step; output equals batch filtering of the concatenated input
//! - No allocation in the per-sample path
//! - Filter state is owned exclusively by one engine and never shared
//!
//! # Example
//!
//! ```
//! use openecg_filters::prelude::*;
//!
//! let mut engine = FilterEngine::new(FilterConfig::default())?;
//! let filtered = engine.filter([0.1, 0.2, 0.3]);
//! let leads = derive_leads(filtered);
//! assert!((leads.i + leads.iii - leads.ii).abs() < 1e-12);
//! # Ok::<(), openecg_errors::ValidationError>(())
//! ```

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![deny(unused_must_use)]
#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod design;
pub mod engine;
pub mod leads;
pub mod prelude;
pub mod sos;

pub use design::{alias_frequency, butterworth_bandpass, iir_notch};
pub use engine::{FilterConfig, FilterDesign, FilterEngine, FilterState};
pub use leads::{DerivedLeads, LeadName, derive_leads};
pub use sos::{Biquad, SosFilter, SosState};
