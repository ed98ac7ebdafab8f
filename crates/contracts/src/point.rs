//! DataPoint - one buffered measurement
//!
//! Serialized exactly as the upstream datapoints API expects:
//! `{"at": "2013-03-01T12:00:00Z", "value": "42"}`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Timestamp layout used on the wire (UTC, second precision).
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Default per-stream metadata merged into the stream creation payload.
pub type StreamDefaults = serde_json::Map<String, serde_json::Value>;

/// Render a UTC instant the way data points carry it.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// A (timestamp, value) pair waiting for delivery
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataPoint {
    /// ISO-8601 UTC timestamp captured at submission
    pub at: String,

    /// Opaque value text
    pub value: String,
}

impl DataPoint {
    /// Stamp `value` with `at`.
    pub fn stamped(at: DateTime<Utc>, value: impl Into<String>) -> Self {
        Self {
            at: format_timestamp(at),
            value: value.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_timestamp_truncates_subseconds() {
        let at = Utc
            .with_ymd_and_hms(2013, 3, 1, 9, 5, 7)
            .unwrap()
            .checked_add_signed(chrono::Duration::milliseconds(999))
            .unwrap();
        assert_eq!(format_timestamp(at), "2013-03-01T09:05:07Z");
    }

    #[test]
    fn test_wire_shape() {
        let at = Utc.with_ymd_and_hms(2013, 3, 1, 9, 5, 7).unwrap();
        let point = DataPoint::stamped(at, "1000");
        assert_eq!(
            serde_json::to_string(&point).unwrap(),
            r#"{"at":"2013-03-01T09:05:07Z","value":"1000"}"#
        );
    }
}
