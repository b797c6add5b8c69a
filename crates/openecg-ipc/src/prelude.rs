//! Prelude module for convenient imports

pub use crate::codec::ndarray::PackedArray;
pub use crate::codec::{FilteredRecord, RawRecord, WireMessage, decode, encode, encode_frame};
pub use crate::error::{IpcError, IpcResult};
pub use crate::publisher::{Publisher, PublisherConfig};
pub use crate::sp::{DEFAULT_MAX_FRAME_LEN, Endpoint};
pub use crate::stop::StopSignal;
pub use crate::subscriber::{Subscriber, SubscriberConfig, SubscriberState, SubscriberStats};
pub use crate::topic::Topic;
pub use crate::{ADDRESS_ENV, DEFAULT_PUBLISH_ADDRESS, DEFAULT_SUBSCRIBE_ADDRESS};
