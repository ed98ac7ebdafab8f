//! Wire payloads for the feed API

use bytes::Bytes;
use contracts::{ContractError, DataPoint, StreamDefaults, StreamId};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Version tag the feed API expects on stream creation.
pub const FEED_FORMAT_VERSION: &str = "1.0.0";

/// `{"version":"1.0.0","datastreams":[{...defaults,"id":..,"current_value":..}]}`
#[derive(Debug, Serialize)]
pub struct StreamCreation {
    pub version: &'static str,
    pub datastreams: Vec<Value>,
}

impl StreamCreation {
    /// Merge `defaults` with the stream id and its first value.
    ///
    /// `id` and `current_value` always win over same-named defaults.
    pub fn new(stream_id: &StreamId, defaults: &StreamDefaults, current_value: &str) -> Self {
        let mut datastream = defaults.clone();
        datastream.insert("id".to_string(), Value::from(stream_id.as_str()));
        datastream.insert("current_value".to_string(), Value::from(current_value));
        Self {
            version: FEED_FORMAT_VERSION,
            datastreams: vec![Value::Object(datastream)],
        }
    }
}

/// `{"datapoints":[{"at":..,"value":..},...]}`
#[derive(Debug, Serialize)]
pub struct DatapointBatch<'a> {
    pub datapoints: &'a [DataPoint],
}

/// Subset of `GET /feeds/{id}.json` needed for bootstrap
///
/// Only ids are read; other datastream fields may have any JSON type.
#[derive(Debug, Default, Deserialize)]
pub struct FeedSnapshot {
    #[serde(default)]
    pub datastreams: Vec<DatastreamSummary>,
}

#[derive(Debug, Deserialize)]
pub struct DatastreamSummary {
    pub id: String,
}

impl FeedSnapshot {
    /// Parse a feed document; an empty body is an empty feed.
    pub fn parse(body: &[u8]) -> Result<Self, ContractError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        Ok(serde_json::from_slice(body)?)
    }
}

/// Encode any payload as a request body.
pub fn encode<T: Serialize>(payload: &T) -> Result<Bytes, ContractError> {
    Ok(Bytes::from(serde_json::to_vec(payload)?))
}
