//! Dispatcher error types

use contracts::{ContractError, StreamId};
use thiserror::Error;

/// Delivery-side errors
///
/// Everything here is recoverable from the registry's point of view: the
/// points involved stay buffered and are retried on the next flush.
#[derive(Debug, Error)]
pub enum DispatcherError {
    /// An append chunk failed; remaining chunks were not sent
    #[error(
        "delivery for stream '{stream_id}' failed at chunk {}/{chunks} ({sent_points} points already sent): {source}",
        .chunk + 1
    )]
    Delivery {
        stream_id: StreamId,
        /// Zero-based index of the failed chunk
        chunk: usize,
        chunks: usize,
        sent_points: usize,
        #[source]
        source: ContractError,
    },

    /// Stream creation call failed
    #[error("upsert for stream '{stream_id}' failed: {source}")]
    Upsert {
        stream_id: StreamId,
        #[source]
        source: ContractError,
    },

    /// Startup read of existing datastreams failed
    #[error("bootstrap read failed: {source}")]
    Bootstrap {
        #[source]
        source: ContractError,
    },

    /// Payload could not be encoded
    #[error("failed to encode payload for stream '{stream_id}': {source}")]
    Payload {
        stream_id: StreamId,
        #[source]
        source: ContractError,
    },

    /// Transport creation error
    #[error("failed to create transport '{name}': {message}")]
    TransportCreation { name: String, message: String },
}

impl DispatcherError {
    /// Create a transport creation error
    pub fn transport_creation(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::TransportCreation {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Stream the error belongs to, if any
    pub fn stream_id(&self) -> Option<&StreamId> {
        match self {
            Self::Delivery { stream_id, .. }
            | Self::Upsert { stream_id, .. }
            | Self::Payload { stream_id, .. } => Some(stream_id),
            Self::Bootstrap { .. } | Self::TransportCreation { .. } => None,
        }
    }
}
