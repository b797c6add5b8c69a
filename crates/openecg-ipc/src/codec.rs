//! Message encoding and decoding
//!
//! Payloads are MessagePack maps keyed by field name, with every float
//! written as float64. The schema is closed: decoding rejects a payload with
//! a missing required field or with a field it does not know.

use openecg_filters::DerivedLeads;
use serde::{Deserialize, Serialize};

use crate::error::{IpcError, IpcResult};
use crate::topic::Topic;

pub mod ndarray;

/// One unfiltered sample, published on [`Topic::Raw`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawRecord {
    /// Acquisition time (s since the Unix epoch)
    pub timestamp: f64,
    /// Right-arm potential (mV)
    #[serde(rename = "RA")]
    pub ra: f64,
    /// Left-arm potential (mV)
    #[serde(rename = "LA")]
    pub la: f64,
    /// Left-leg potential (mV)
    #[serde(rename = "LL")]
    pub ll: f64,
}

/// One filtered sample, published on [`Topic::Filtered`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FilteredRecord {
    /// Acquisition time of the source sample (s since the Unix epoch)
    pub timestamp: f64,
    /// The six derived leads
    pub leads: DerivedLeads,
    /// Heart-rate estimate; omitted until one is available
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bpm: Option<f64>,
}

/// A decoded message of either kind.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum WireMessage {
    /// Raw sample
    Raw(RawRecord),
    /// Filtered sample
    Filtered(FilteredRecord),
}

impl WireMessage {
    /// Topic this message is published on.
    pub fn topic(&self) -> Topic {
        match self {
            WireMessage::Raw(_) => Topic::Raw,
            WireMessage::Filtered(_) => Topic::Filtered,
        }
    }

    /// Acquisition timestamp.
    pub fn timestamp(&self) -> f64 {
        match self {
            WireMessage::Raw(r) => r.timestamp,
            WireMessage::Filtered(f) => f.timestamp,
        }
    }
}

impl From<RawRecord> for WireMessage {
    fn from(record: RawRecord) -> Self {
        WireMessage::Raw(record)
    }
}

impl From<FilteredRecord> for WireMessage {
    fn from(record: FilteredRecord) -> Self {
        WireMessage::Filtered(record)
    }
}

/// Encode a message payload (without topic).
///
/// # Errors
///
/// Returns [`IpcError::EncodingFailed`] if serialization fails.
pub fn encode(message: &WireMessage) -> IpcResult<Vec<u8>> {
    let encoded = match message {
        WireMessage::Raw(r) => rmp_serde::to_vec_named(r),
        WireMessage::Filtered(f) => rmp_serde::to_vec_named(f),
    };
    encoded.map_err(|e| IpcError::EncodingFailed(e.to_string()))
}

/// Decode a payload received on `topic`.
///
/// # Errors
///
/// Returns [`IpcError::DecodingFailed`] for malformed MessagePack, a missing
/// required field, or an unknown field.
pub fn decode(topic: Topic, bytes: &[u8]) -> IpcResult<WireMessage> {
    let decoded = match topic {
        Topic::Raw => rmp_serde::from_slice::<RawRecord>(bytes).map(WireMessage::Raw),
        Topic::Filtered => {
            rmp_serde::from_slice::<FilteredRecord>(bytes).map(WireMessage::Filtered)
        }
    };
    decoded.map_err(|e| IpcError::DecodingFailed(format!("{topic}: {e}")))
}

/// Encode a message and prefix it with its topic, ready to publish.
///
/// # Errors
///
/// Returns [`IpcError::EncodingFailed`] if serialization fails.
pub fn encode_frame(message: &WireMessage) -> IpcResult<Vec<u8>> {
    let payload = encode(message)?;
    Ok(message.topic().frame(&payload))
}
