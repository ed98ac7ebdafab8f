//! # Integration Tests
//!
//! End-to-end scenarios across registry, dispatcher and transport.
//!
//! Covers:
//! - Configuration to registry wiring
//! - Threshold and chunking scenarios against a recording transport
//! - Retry after failed deliveries
//! - Concurrent producers through the relay handle

#[cfg(test)]
mod support {
    use std::sync::Arc;

    use chrono::{TimeZone, Utc};
    use contracts::{HttpMethod, ManualClock, RelayConfig, TransportRequest};
    use dispatcher::RecordingTransport;
    use serde_json::Value;
    use stream_registry::Registry;

    pub fn registry(config: RelayConfig) -> (Registry<RecordingTransport>, RecordingTransport) {
        let transport = RecordingTransport::new("rec");
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2013, 3, 1, 12, 0, 0).unwrap(),
        ));
        let registry = Registry::with_clock(config, transport.clone(), clock);
        (registry, transport)
    }

    pub fn body(request: &TransportRequest) -> Value {
        serde_json::from_slice(&request.body).unwrap()
    }

    /// Values of an append request, in order
    pub fn values(request: &TransportRequest) -> Vec<String> {
        body(request)["datapoints"]
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["value"].as_str().unwrap().to_string())
            .collect()
    }

    /// Sizes of delivered append requests, in order
    pub fn post_sizes(transport: &RecordingTransport) -> Vec<usize> {
        transport
            .delivered_with(HttpMethod::Post)
            .iter()
            .map(|r| values(r).len())
            .collect()
    }
}

#[cfg(test)]
mod config_tests {
    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::HttpMethod;
    use stream_registry::SubmitOutcome;

    use crate::support::{body, registry};

    const CONFIG: &str = r#"
[feed]
feed_id = "504"
api_key = "secret"
base_url = "https://api.example.com/v2/"

[cache]
threshold = 1
max_points_per_request = 2

[stream_defaults]
min_value = "0.0"
unit = { type = "derivedSI", label = "watt", symbol = "W" }
"#;

    #[tokio::test]
    async fn test_loaded_config_drives_requests() {
        let config = ConfigLoader::load_from_str(CONFIG, ConfigFormat::Toml).unwrap();
        let (mut registry, transport) = registry(config);

        assert_eq!(registry.submit("8", "1").await.unwrap(), SubmitOutcome::Created);
        registry.submit("8", "2").await.unwrap();
        registry.submit("8", "3").await.unwrap();

        let put = &transport.delivered_with(HttpMethod::Put)[0];
        assert_eq!(put.url, "https://api.example.com/v2/feeds/504");
        assert_eq!(put.api_key, "secret");
        let creation = body(put);
        assert_eq!(creation["version"], "1.0.0");
        assert_eq!(creation["datastreams"][0]["unit"]["label"], "watt");

        let post = &transport.delivered_with(HttpMethod::Post)[0];
        assert_eq!(
            post.url,
            "https://api.example.com/v2/feeds/504/datastreams/8/datapoints"
        );
        assert_eq!(body(post)["datapoints"][0]["at"], "2013-03-01T12:00:00Z");
    }
}

#[cfg(test)]
mod scenario_tests {
    use contracts::{HttpMethod, RelayConfig};
    use stream_registry::SubmitOutcome;

    use crate::support::{body, post_sizes, registry, values};

    /// Threshold 1: creation, one buffered value, then a two-point flush.
    #[tokio::test]
    async fn test_small_threshold_sequence() {
        let (mut registry, transport) = registry(RelayConfig::new("504", "key").with_threshold(1));

        for v in ["1", "2", "3"] {
            registry.submit("8", v).await.unwrap();
        }

        let puts = transport.delivered_with(HttpMethod::Put);
        assert_eq!(puts.len(), 1);
        assert_eq!(body(&puts[0])["datastreams"][0]["current_value"], "1");

        let posts = transport.delivered_with(HttpMethod::Post);
        assert_eq!(posts.len(), 1);
        assert_eq!(values(&posts[0]), vec!["2", "3"]);
        assert_eq!(registry.buffered_len("8"), 0);
    }

    /// 700 values, threshold 650, 450 per request.
    #[tokio::test]
    async fn test_large_batch_is_chunked() {
        let (mut registry, transport) = registry(RelayConfig::new("504", "key").with_threshold(650));

        let mut flushed = Vec::new();
        for i in 0..700 {
            let outcome = registry.submit("6", &i.to_string()).await.unwrap();
            if let SubmitOutcome::Flushed(report) = outcome {
                flushed.push((i, report.points, report.requests));
            }
        }

        assert_eq!(transport.delivered_with(HttpMethod::Put).len(), 1);
        // Triggered by the 652nd submission (651 buffered points)
        assert_eq!(flushed, vec![(651, 651, 2)]);
        assert_eq!(post_sizes(&transport), vec![450, 201]);
        assert_eq!(registry.buffered_len("6"), 48);

        let report = registry.flush_all().await.unwrap();
        assert_eq!(report.points, 48);
        assert_eq!(post_sizes(&transport), vec![450, 201, 48]);

        // Every value after the first went out exactly once, in order
        let sent: Vec<String> = transport
            .delivered_with(HttpMethod::Post)
            .iter()
            .flat_map(|r| values(r))
            .collect();
        let expected: Vec<String> = (1..700).map(|i| i.to_string()).collect();
        assert_eq!(sent, expected);
    }

    #[tokio::test]
    async fn test_streams_are_independent() {
        let (mut registry, transport) = registry(RelayConfig::new("504", "key").with_threshold(2));

        for (id, v) in [("a", "1"), ("b", "1"), ("a", "2"), ("a", "3"), ("b", "2")] {
            registry.submit(id, v).await.unwrap();
        }
        assert_eq!(registry.buffered_len("a"), 2);
        assert_eq!(registry.buffered_len("b"), 1);

        registry.submit("a", "4").await.unwrap();
        assert_eq!(registry.buffered_len("a"), 0);
        assert_eq!(registry.buffered_len("b"), 1);

        let posts = transport.delivered_with(HttpMethod::Post);
        assert_eq!(posts.len(), 1);
        assert!(posts[0].url.ends_with("/datastreams/a/datapoints"));
    }

    #[tokio::test]
    async fn test_buffer_never_exceeds_threshold_after_submit() {
        for threshold in [0, 1, 5, 17] {
            let (mut registry, _transport) =
                registry(RelayConfig::new("504", "key").with_threshold(threshold));
            for i in 0..60 {
                registry.submit("s", &i.to_string()).await.unwrap();
                assert!(registry.buffered_len("s") <= threshold);
            }
        }
    }
}

#[cfg(test)]
mod chunk_tests {
    use contracts::RelayConfig;

    use crate::support::{post_sizes, registry};

    #[tokio::test]
    async fn test_chunk_partitions() {
        let cases: [(usize, usize, &[usize]); 5] = [
            (1, 450, &[1]),
            (450, 450, &[450]),
            (451, 450, &[450, 1]),
            (1000, 450, &[450, 450, 100]),
            (7, 3, &[3, 3, 1]),
        ];

        for (n, max, expected) in cases {
            let mut config = RelayConfig::new("504", "key").with_threshold(usize::MAX);
            config.cache.max_points_per_request = max;
            let (mut registry, transport) = registry(config);

            registry.submit("s", "created").await.unwrap();
            for i in 0..n {
                registry.submit("s", &i.to_string()).await.unwrap();
            }
            let report = registry.flush("s").await.unwrap();

            assert_eq!(report.points, n, "n={n} max={max}");
            assert_eq!(report.requests, expected.len(), "n={n} max={max}");
            assert_eq!(post_sizes(&transport), expected, "n={n} max={max}");
        }
    }
}

#[cfg(test)]
mod retry_tests {
    use contracts::{HttpMethod, RelayConfig};
    use dispatcher::DispatcherError;
    use stream_registry::SubmitOutcome;

    use crate::support::{registry, values};

    #[tokio::test]
    async fn test_failed_flush_keeps_everything_for_next_attempt() {
        let (mut registry, transport) = registry(RelayConfig::new("504", "key").with_threshold(2));
        registry.submit("8", "0").await.unwrap();
        registry.submit("8", "1").await.unwrap();
        registry.submit("8", "2").await.unwrap();

        transport.set_failing(true);
        assert_eq!(
            registry.submit("8", "3").await.unwrap(),
            SubmitOutcome::Deferred { pending: 3 }
        );
        assert_eq!(
            registry.submit("8", "4").await.unwrap(),
            SubmitOutcome::Deferred { pending: 4 }
        );

        transport.set_failing(false);
        let outcome = registry.submit("8", "5").await.unwrap();
        assert!(matches!(outcome, SubmitOutcome::Flushed(r) if r.points == 5));

        let posts = transport.delivered_with(HttpMethod::Post);
        assert_eq!(posts.len(), 1);
        assert_eq!(values(&posts[0]), vec!["1", "2", "3", "4", "5"]);
    }

    /// A later chunk failing makes the whole buffer pending again, so the
    /// chunks accepted before it are sent a second time.
    #[tokio::test]
    async fn test_partial_chunk_failure_resends_from_start() {
        let mut config = RelayConfig::new("504", "key").with_threshold(100);
        config.cache.max_points_per_request = 2;
        let (mut registry, transport) = registry(config);

        registry.submit("8", "created").await.unwrap();
        for v in ["a", "b", "c", "d", "e"] {
            registry.submit("8", v).await.unwrap();
        }

        transport.succeed_next(1);
        transport.fail_next(1);
        let err = registry.flush("8").await.unwrap_err();
        match err {
            DispatcherError::Delivery {
                chunk,
                chunks,
                sent_points,
                ..
            } => {
                assert_eq!((chunk, chunks, sent_points), (1, 3, 2));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(registry.buffered_len("8"), 5);

        let report = registry.flush("8").await.unwrap();
        assert_eq!(report.requests, 3);

        let sent: Vec<Vec<String>> = transport
            .delivered_with(HttpMethod::Post)
            .iter()
            .map(values)
            .collect();
        assert_eq!(
            sent,
            vec![
                vec!["a", "b"],
                vec!["a", "b"],
                vec!["c", "d"],
                vec!["e"],
            ]
        );
    }

    #[tokio::test]
    async fn test_failed_creation_is_retried_as_creation() {
        let (mut registry, transport) = registry(RelayConfig::new("504", "key").with_threshold(1));
        transport.fail_next(1);

        let err = registry.submit("8", "first").await.unwrap_err();
        assert!(err.is_delivery());
        assert!(!registry.is_known("8"));

        assert_eq!(
            registry.submit("8", "second").await.unwrap(),
            SubmitOutcome::Created
        );
        assert_eq!(registry.buffered_len("8"), 0);
    }
}

#[cfg(test)]
mod handle_tests {
    use contracts::{HttpMethod, RelayConfig};
    use dispatcher::RecordingTransport;
    use stream_registry::{Registry, RelayHandle};

    use crate::support::values;

    /// Several producers share one registry; every value arrives exactly
    /// once and each producer's values keep their relative order.
    #[tokio::test]
    async fn test_multi_producer_order_and_completeness() {
        let transport = RecordingTransport::new("rec");
        let mut config = RelayConfig::new("504", "key").with_threshold(5);
        config.cache.max_points_per_request = 4;
        let handle = RelayHandle::spawn(Registry::new(config, transport.clone()), 8);

        let mut producers = Vec::new();
        for p in 0..3 {
            let sender = handle.sender();
            producers.push(tokio::spawn(async move {
                for i in 0..40 {
                    sender.submit("shared", format!("{p}:{i}")).await.unwrap();
                }
            }));
        }
        for producer in producers {
            producer.await.unwrap();
        }
        handle.shutdown().await.unwrap();

        let mut all: Vec<String> = Vec::new();
        for put in transport.delivered_with(HttpMethod::Put) {
            let body: serde_json::Value = serde_json::from_slice(&put.body).unwrap();
            all.push(body["datastreams"][0]["current_value"].as_str().unwrap().to_string());
        }
        for post in transport.delivered_with(HttpMethod::Post) {
            all.extend(values(&post));
        }
        assert_eq!(all.len(), 120);

        for p in 0..3 {
            let seq: Vec<usize> = all
                .iter()
                .filter_map(|v| v.strip_prefix(&format!("{p}:")).map(|i| i.parse().unwrap()))
                .collect();
            assert_eq!(seq, (0..40).collect::<Vec<_>>());
        }
    }
}
