//! Transport trait - the HTTP collaborator the dispatcher talks through
//!
//! "Send these bytes to this URL with this method and API key, succeed or
//! fail." Implementations live in the dispatcher crate.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ContractError;

/// Header carrying the feed API key.
pub const API_KEY_HEADER: &str = "X-ApiKey";

/// Request methods used against the feed API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    /// Create or update a feed's datastreams
    Put,
    /// Append datapoints
    Post,
    /// Read feed state
    Get,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Put => "PUT",
            Self::Post => "POST",
            Self::Get => "GET",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One outbound call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportRequest {
    pub method: HttpMethod,
    pub url: String,
    /// Sent as the `X-ApiKey` header
    pub api_key: String,
    /// JSON body (empty for GET)
    pub body: Bytes,
}

impl TransportRequest {
    /// Body as UTF-8 text, for logging and tests.
    pub fn body_text(&self) -> &str {
        std::str::from_utf8(&self.body).unwrap_or("<non-utf8 body>")
    }
}

/// Successful (2xx) response
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: Bytes,
}

/// Outbound transport trait
///
/// All transport implementations must implement this trait.
#[trait_variant::make(Transport: Send)]
pub trait LocalTransport {
    /// Transport name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Perform one request.
    ///
    /// # Errors
    /// Any network failure or non-2xx status.
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, ContractError>;
}
