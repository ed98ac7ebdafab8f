//! # Stream Registry
//!
//! Per-stream buffering in front of the batch dispatcher.
//!
//! Responsible for:
//! - Declaring a stream upstream the first time it is seen
//! - Buffering later values with their submission timestamp
//! - Flushing a stream once its buffer exceeds the cache threshold
//! - Keeping undelivered points until a flush fully succeeds
//!
//! `Registry` is a plain owned value for single-producer use.
//! `RelayHandle` moves it into a worker task for concurrent producers.

pub mod buffer;
pub mod error;
pub mod handle;
pub mod registry;

pub use buffer::StreamBuffer;
pub use dispatcher::{DispatcherError, FlushReport};
pub use error::RegistryError;
pub use handle::{RelayHandle, RelaySender};
pub use registry::{Registry, SubmitOutcome, parse_stream_defaults};
