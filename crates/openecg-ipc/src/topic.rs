//! Publication topics

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::IpcError;

/// Stream a message is published on.
///
/// On the wire a frame is the topic bytes immediately followed by the
/// encoded payload, with no separator; subscribers match by prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Topic {
    /// Unfiltered electrode potentials
    Raw,
    /// Filtered leads with heart rate
    Filtered,
}

impl Topic {
    /// Every topic.
    pub const ALL: [Topic; 2] = [Topic::Raw, Topic::Filtered];

    /// Topic name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Topic::Raw => "ecg.raw",
            Topic::Filtered => "ecg.filtered",
        }
    }

    /// Topic prefix as sent on the wire.
    pub const fn as_bytes(self) -> &'static [u8] {
        self.as_str().as_bytes()
    }

    /// Payload of `frame` if it was published on this topic.
    pub fn strip<'a>(self, frame: &'a [u8]) -> Option<&'a [u8]> {
        frame.strip_prefix(self.as_bytes())
    }

    /// Prepend the topic to `payload`.
    pub fn frame(self, payload: &[u8]) -> Vec<u8> {
        let prefix = self.as_bytes();
        let mut frame = Vec::with_capacity(prefix.len() + payload.len());
        frame.extend_from_slice(prefix);
        frame.extend_from_slice(payload);
        frame
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Topic {
    type Err = IpcError;

    /// Accepts both the short form (`raw`) and the full name (`ecg.raw`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "raw" | "ecg.raw" => Ok(Topic::Raw),
            "filtered" | "ecg.filtered" => Ok(Topic::Filtered),
            other => Err(IpcError::InvalidConfig(format!(
                "unknown topic '{other}', expected one of: raw, filtered"
            ))),
        }
    }
}
