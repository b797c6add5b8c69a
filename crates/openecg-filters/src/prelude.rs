//! Prelude module for convenient imports.
//!
//! ```
//! use openecg_filters::prelude::*;
//! ```

pub use crate::design::{MAX_ORDER, alias_frequency, butterworth_bandpass, iir_notch};
pub use crate::engine::{
    BANDPASS_ORDER, CHANNELS, FilterConfig, FilterDesign, FilterEngine, FilterState,
};
pub use crate::leads::{DerivedLeads, LeadName, derive_leads};
pub use crate::sos::{Biquad, SosFilter, SosState};
