//! Layered error definitions
//!
//! Categorized by source: config / transport / payload

use thiserror::Error;

use crate::HttpMethod;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Transport Errors =====
    /// Request could not be delivered (connect, timeout, body read)
    #[error("transport '{transport}' error: {message}")]
    Transport { transport: String, message: String },

    /// Upstream answered with a non-2xx status
    #[error("{method} {url} returned status {status}")]
    HttpStatus {
        method: HttpMethod,
        url: String,
        status: u16,
    },

    // ===== Payload Errors =====
    /// JSON encode/decode error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create transport error
    pub fn transport(transport: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transport {
            transport: transport.into(),
            message: message.into(),
        }
    }

    /// Create HTTP status error
    pub fn http_status(method: HttpMethod, url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            method,
            url: url.into(),
            status,
        }
    }

    /// Whether the error came from the configuration layer
    pub fn is_config(&self) -> bool {
        matches!(self, Self::ConfigParse { .. } | Self::ConfigValidation { .. })
    }
}
