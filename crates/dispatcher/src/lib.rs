//! # Dispatcher
//!
//! Batch delivery to the upstream feed API.
//!
//! Responsible for:
//! - Declaring new datastreams (upsert)
//! - Splitting a stream's pending points into size-limited chunks
//! - Sending chunks in order and reporting all-or-nothing success
//! - Reading existing datastreams for bootstrap

pub mod chunk;
pub mod dispatcher;
pub mod endpoints;
pub mod error;
pub mod metrics;
pub mod payload;
pub mod transports;

pub use contracts::{Transport, TransportRequest, TransportResponse};
pub use dispatcher::{BatchDispatcher, FlushReport, create_transport};
pub use endpoints::FeedEndpoints;
pub use error::DispatcherError;
pub use metrics::{DispatchMetrics, MetricsSnapshot};
pub use transports::{AnyTransport, HttpTransport, LogTransport, RecordingTransport};
