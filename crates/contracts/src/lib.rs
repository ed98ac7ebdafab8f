//! # Contracts
//!
//! Shared interface contracts for the relay: identifiers, data points,
//! configuration, the transport trait and the common error type.
//! Every other crate in the workspace depends on this one, never the reverse.
//!
//! ## Time Model
//! - Data points carry a UTC wall-clock timestamp captured at submission
//! - Timestamps are rendered as ISO-8601 with second precision

mod clock;
mod config;
mod error;
mod point;
mod stream_id;
mod transport;

pub use clock::*;
pub use config::*;
pub use error::*;
pub use point::*;
pub use stream_id::StreamId;
pub use transport::*;
