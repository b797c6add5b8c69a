//! Wire codec and publish/subscribe transport for OpenECG
//!
//! Samples leave the processor as topic-prefixed MessagePack frames and reach
//! any number of independent subscribers over TCP.
//!
//! # Architecture
//!
//! - [`codec`]: `RawRecord` / `FilteredRecord` encoding, plus packed numeric arrays
//! - [`topic`]: the closed set of topics and their wire prefixes
//! - [`sp`]: scalability-protocol handshake and length-prefixed framing
//! - [`publisher`]: listening side, fan-out to every attached subscriber
//! - [`subscriber`]: reconnecting, cancellable message stream
//! - [`stop`]: cooperative stop flag shared by threads and tasks
//! - [`error`]: IPC-specific error types
//!
//! # Delivery
//!
//! Best effort. A frame is delivered whole or not at all, a slow subscriber
//! drops frames rather than slowing the publisher, and frames published while
//! a subscriber is reconnecting are not replayed.
//!
//! # Example
//!
//! ```no_run
//! use futures::StreamExt;
//! use openecg_ipc::prelude::*;
//!
//! async fn listen() -> Result<(), IpcError> {
//!     let subscriber = Subscriber::new(SubscriberConfig::new("tcp://localhost:9999", Topic::Filtered))?;
//!     let mut messages = Box::pin(subscriber.stream(StopSignal::new()));
//!     while let Some(message) = messages.next().await {
//!         println!("{message:?}");
//!     }
//!     Ok(())
//! }
//! ```

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![warn(missing_docs, rust_2018_idioms)]
#![warn(missing_debug_implementations)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod codec;
pub mod error;
pub mod prelude;
pub mod publisher;
pub mod sp;
pub mod stop;
pub mod subscriber;
pub mod topic;

pub use codec::{FilteredRecord, RawRecord, WireMessage, decode, encode};
pub use error::{IpcError, IpcResult};
pub use publisher::{Publisher, PublisherConfig};
pub use stop::StopSignal;
pub use subscriber::{Subscriber, SubscriberConfig, SubscriberState, SubscriberStats};
pub use topic::Topic;

/// Default listen endpoint of the processor.
pub const DEFAULT_PUBLISH_ADDRESS: &str = "tcp://0.0.0.0:9999";

/// Default endpoint consumers dial.
pub const DEFAULT_SUBSCRIBE_ADDRESS: &str = "tcp://localhost:9999";

/// Environment variable overriding the address consumers dial.
pub const ADDRESS_ENV: &str = "SIGNAL_PROCESSOR_ADDRESS";
