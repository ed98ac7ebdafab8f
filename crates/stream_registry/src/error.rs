//! Registry error types

use dispatcher::DispatcherError;
use thiserror::Error;

/// Errors surfaced by the registry and its handle
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Bad argument; nothing was buffered or sent
    #[error("validation error at '{field}': {message}")]
    Validation { field: String, message: String },

    /// Upstream delivery failed; buffered points were kept
    #[error(transparent)]
    Delivery(#[from] DispatcherError),

    /// The relay worker is no longer running
    #[error("relay worker stopped")]
    Closed,
}

impl RegistryError {
    /// Create a validation error
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    pub fn is_delivery(&self) -> bool {
        matches!(self, Self::Delivery(_))
    }
}
