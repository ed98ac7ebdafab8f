//! RelayConfig - Config Loader output
//!
//! Describes the upstream feed, caching policy, transport and the default
//! metadata applied to newly created datastreams.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use validator::Validate;

use crate::StreamDefaults;

/// Upstream hard limit on datapoints per append request.
pub const UPSTREAM_MAX_POINTS_PER_REQUEST: usize = 500;

/// Default chunk size, kept below the upstream hard limit.
pub const DEFAULT_MAX_POINTS_PER_REQUEST: usize = 450;

/// Default API root.
pub const DEFAULT_BASE_URL: &str = "http://api.cosm.com/v2";

/// Configuration version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Complete relay configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RelayConfig {
    /// Configuration version
    #[serde(default)]
    pub version: ConfigVersion,

    /// Upstream feed settings
    #[validate(nested)]
    pub feed: FeedConfig,

    /// Buffering policy
    #[serde(default)]
    #[validate(nested)]
    pub cache: CacheConfig,

    /// Outbound transport
    #[serde(default)]
    #[validate(nested)]
    pub transport: TransportConfig,

    /// Whether to read existing datastreams at startup
    #[serde(default)]
    pub bootstrap: BootstrapMode,

    /// Metadata sent once per stream on creation
    #[serde(default)]
    pub stream_defaults: StreamDefaults,
}

impl RelayConfig {
    /// Minimal configuration for a feed, everything else defaulted.
    pub fn new(feed_id: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            version: ConfigVersion::V1,
            feed: FeedConfig {
                feed_id: feed_id.into(),
                api_key: api_key.into(),
                base_url: default_base_url(),
            },
            cache: CacheConfig::default(),
            transport: TransportConfig::default(),
            bootstrap: BootstrapMode::Off,
            stream_defaults: StreamDefaults::new(),
        }
    }

    /// Builder-style threshold override.
    pub fn with_threshold(mut self, threshold: usize) -> Self {
        self.cache.threshold = threshold;
        self
    }

    /// Builder-style defaults override.
    pub fn with_stream_defaults(mut self, defaults: StreamDefaults) -> Self {
        self.stream_defaults = defaults;
        self
    }
}

/// Upstream feed
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct FeedConfig {
    /// Feed identifier
    #[validate(length(min = 1, message = "feed_id cannot be empty"))]
    pub feed_id: String,

    /// API key; usually supplied through the environment instead of the file
    #[serde(default)]
    pub api_key: String,

    /// API root, without trailing slash
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

/// Buffering policy
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CacheConfig {
    /// Flush a stream once its buffer holds more than this many points.
    /// `0` sends every point as soon as it is buffered.
    #[serde(default)]
    pub threshold: usize,

    /// Points per append request
    #[serde(default = "default_max_points")]
    #[validate(range(
        min = 1,
        max = UPSTREAM_MAX_POINTS_PER_REQUEST,
        message = "max_points_per_request must be between 1 and the upstream limit"
    ))]
    pub max_points_per_request: usize,
}

fn default_max_points() -> usize {
    DEFAULT_MAX_POINTS_PER_REQUEST
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            threshold: 0,
            max_points_per_request: DEFAULT_MAX_POINTS_PER_REQUEST,
        }
    }
}

/// Transport selection
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TransportConfig {
    /// Transport implementation
    #[serde(default)]
    pub kind: TransportKind,

    /// Per-request timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    #[validate(range(min = 1, message = "timeout_ms must be > 0"))]
    pub timeout_ms: u64,

    /// Transport-specific parameters
    #[serde(default)]
    pub params: HashMap<String, String>,
}

fn default_timeout_ms() -> u64 {
    10_000
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            kind: TransportKind::default(),
            timeout_ms: default_timeout_ms(),
            params: HashMap::new(),
        }
    }
}

/// Transport type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportKind {
    /// Real HTTP requests
    #[default]
    Http,
    /// Log requests and report success (dry run)
    Log,
}

/// Startup read of existing datastreams
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BootstrapMode {
    /// Start with an empty registry
    #[default]
    Off,
    /// Try the read; start empty if it fails
    BestEffort,
    /// Fail construction if the read fails
    Required,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_minimal_toml() {
        let config: RelayConfig = toml::from_str(
            r#"
[feed]
feed_id = "504"
"#,
        )
        .unwrap();
        assert_eq!(config.feed.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.cache.threshold, 0);
        assert_eq!(config.cache.max_points_per_request, 450);
        assert_eq!(config.transport.kind, TransportKind::Http);
        assert_eq!(config.bootstrap, BootstrapMode::Off);
        assert!(config.stream_defaults.is_empty());
    }

    #[test]
    fn test_nested_stream_defaults() {
        let config: RelayConfig = toml::from_str(
            r#"
[feed]
feed_id = "504"

[stream_defaults]
min_value = "0.0"
unit = { type = "derivedSI", label = "watt", symbol = "W" }
"#,
        )
        .unwrap();
        assert_eq!(config.stream_defaults["min_value"], "0.0");
        assert_eq!(config.stream_defaults["unit"]["symbol"], "W");
    }

    #[test]
    fn test_derive_validation_rejects_oversized_chunks() {
        let mut config = RelayConfig::new("504", "key");
        assert!(config.validate().is_ok());
        config.cache.max_points_per_request = UPSTREAM_MAX_POINTS_PER_REQUEST;
        assert!(config.validate().is_ok());
        config.cache.max_points_per_request = UPSTREAM_MAX_POINTS_PER_REQUEST + 1;
        assert!(config.validate().is_err());
        config.cache.max_points_per_request = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bootstrap_mode_names() {
        let mode: BootstrapMode = serde_json::from_str("\"best_effort\"").unwrap();
        assert_eq!(mode, BootstrapMode::BestEffort);
    }
}
