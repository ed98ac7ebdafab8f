//! BatchDispatcher - sends stream creations and chunked datapoint batches

use std::sync::Arc;

use contracts::{
    ContractError, DataPoint, HttpMethod, RelayConfig, StreamDefaults, StreamId, Transport,
    TransportConfig, TransportKind, TransportRequest,
};
use tracing::{debug, info, instrument, warn};

use crate::chunk::{chunk_count, chunk_ranges};
use crate::endpoints::FeedEndpoints;
use crate::error::DispatcherError;
use crate::metrics::DispatchMetrics;
use crate::payload::{self, DatapointBatch, FeedSnapshot, StreamCreation};
use crate::transports::{AnyTransport, HttpTransport, HttpTransportConfig, LogTransport};

/// Outcome of one or more successful flushes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushReport {
    /// Streams whose buffers were delivered
    pub streams: usize,
    /// Points delivered
    pub points: usize,
    /// Append requests issued
    pub requests: usize,
}

impl FlushReport {
    /// Accumulate another report into this one
    pub fn merge(&mut self, other: FlushReport) {
        self.streams += other.streams;
        self.points += other.points;
        self.requests += other.requests;
    }

    /// Nothing was sent
    pub fn is_empty(&self) -> bool {
        self.requests == 0
    }
}

/// Create the transport named by configuration
#[instrument(
    name = "dispatcher_create_transport",
    skip(config),
    fields(transport = %name, kind = ?config.kind)
)]
pub fn create_transport(name: &str, config: &TransportConfig) -> Result<AnyTransport, DispatcherError> {
    match config.kind {
        TransportKind::Http => {
            let transport = HttpTransport::new(name, HttpTransportConfig::from_config(config))
                .map_err(|e| DispatcherError::transport_creation(name, e.to_string()))?;
            Ok(transport.into())
        }
        TransportKind::Log => Ok(LogTransport::new(name).into()),
    }
}

/// Delivers payloads for one feed through a transport
///
/// Stateless with respect to buffers: callers hand in the points to send and
/// decide what to do with them based on the result.
pub struct BatchDispatcher<T> {
    transport: T,
    endpoints: FeedEndpoints,
    api_key: String,
    max_points_per_request: usize,
    metrics: Arc<DispatchMetrics>,
}

impl<T: Transport> BatchDispatcher<T> {
    /// Create a dispatcher for `config.feed` with its chunk limit
    pub fn new(transport: T, config: &RelayConfig) -> Self {
        Self {
            transport,
            endpoints: FeedEndpoints::from_config(&config.feed),
            api_key: config.feed.api_key.clone(),
            max_points_per_request: config.cache.max_points_per_request.max(1),
            metrics: Arc::new(DispatchMetrics::new()),
        }
    }

    pub fn endpoints(&self) -> &FeedEndpoints {
        &self.endpoints
    }

    pub fn max_points_per_request(&self) -> usize {
        self.max_points_per_request
    }

    /// Get shared counters
    pub fn metrics(&self) -> &Arc<DispatchMetrics> {
        &self.metrics
    }

    fn request(&self, method: HttpMethod, url: String, body: bytes::Bytes) -> TransportRequest {
        TransportRequest {
            method,
            url,
            api_key: self.api_key.clone(),
            body,
        }
    }

    async fn send(&self, request: TransportRequest) -> Result<bytes::Bytes, ContractError> {
        match self.transport.send(request).await {
            Ok(resp) => {
                self.metrics.inc_request_count();
                Ok(resp.body)
            }
            Err(e) => {
                self.metrics.inc_failure_count();
                Err(e)
            }
        }
    }

    /// Declare a stream upstream with its first value
    #[instrument(
        name = "dispatcher_upsert_stream",
        skip(self, defaults, current_value),
        fields(stream = %stream_id)
    )]
    pub async fn upsert_stream(
        &self,
        stream_id: &StreamId,
        defaults: &StreamDefaults,
        current_value: &str,
    ) -> Result<(), DispatcherError> {
        let body = payload::encode(&StreamCreation::new(stream_id, defaults, current_value))
            .map_err(|source| DispatcherError::Payload {
                stream_id: stream_id.clone(),
                source,
            })?;

        let request = self.request(HttpMethod::Put, self.endpoints.feed(), body);
        self.send(request)
            .await
            .map_err(|source| DispatcherError::Upsert {
                stream_id: stream_id.clone(),
                source,
            })?;

        self.metrics.inc_streams_created();
        info!(stream = %stream_id, "Stream declared");
        Ok(())
    }

    /// Send `points` as consecutive append requests
    ///
    /// Stops at the first failing chunk. On error none of `points` should be
    /// considered delivered, even though earlier chunks may have been
    /// accepted upstream.
    #[instrument(
        name = "dispatcher_flush_points",
        skip(self, points),
        fields(stream = %stream_id, points = points.len())
    )]
    pub async fn flush_points(
        &self,
        stream_id: &StreamId,
        points: &[DataPoint],
    ) -> Result<FlushReport, DispatcherError> {
        if points.is_empty() {
            return Ok(FlushReport::default());
        }

        let chunks = chunk_count(points.len(), self.max_points_per_request);
        let url = self
            .endpoints
            .datapoints(stream_id)
            .map_err(|source| DispatcherError::Payload {
                stream_id: stream_id.clone(),
                source,
            })?;
        let mut sent_points = 0;

        for (chunk, range) in chunk_ranges(points.len(), self.max_points_per_request).enumerate() {
            let slice = &points[range];
            let body = payload::encode(&DatapointBatch { datapoints: slice }).map_err(|source| {
                DispatcherError::Payload {
                    stream_id: stream_id.clone(),
                    source,
                }
            })?;

            if let Err(source) = self.send(self.request(HttpMethod::Post, url.clone(), body)).await {
                warn!(
                    stream = %stream_id,
                    chunk = chunk + 1,
                    chunks,
                    error = %source,
                    "Chunk rejected, aborting flush"
                );
                return Err(DispatcherError::Delivery {
                    stream_id: stream_id.clone(),
                    chunk,
                    chunks,
                    sent_points,
                    source,
                });
            }

            sent_points += slice.len();
            self.metrics.add_points_delivered(slice.len());
            debug!(stream = %stream_id, chunk = chunk + 1, chunks, size = slice.len(), "Chunk sent");
        }

        Ok(FlushReport {
            streams: 1,
            points: sent_points,
            requests: chunks,
        })
    }

    /// Read the ids of streams that already exist upstream
    #[instrument(name = "dispatcher_fetch_stream_ids", skip(self), fields(feed = %self.endpoints.feed_id()))]
    pub async fn fetch_stream_ids(&self) -> Result<Vec<StreamId>, DispatcherError> {
        let request = self.request(HttpMethod::Get, self.endpoints.feed_json(), bytes::Bytes::new());
        let body = self
            .send(request)
            .await
            .map_err(|source| DispatcherError::Bootstrap { source })?;

        let snapshot =
            FeedSnapshot::parse(&body).map_err(|source| DispatcherError::Bootstrap { source })?;

        let mut ids = Vec::with_capacity(snapshot.datastreams.len());
        for datastream in snapshot.datastreams {
            match StreamId::check(&datastream.id) {
                Ok(()) => ids.push(StreamId::from(datastream.id)),
                Err(reason) => warn!(id = %datastream.id, %reason, "Skipping upstream datastream"),
            }
        }

        info!(streams = ids.len(), "Existing streams read");
        Ok(ids)
    }
}
