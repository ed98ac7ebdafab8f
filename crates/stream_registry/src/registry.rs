//! Registry - owns every stream buffer and decides when to flush

use std::collections::HashMap;
use std::sync::Arc;

use contracts::{
    BootstrapMode, Clock, DataPoint, RelayConfig, StreamDefaults, StreamId, SystemClock,
    Transport,
};
use dispatcher::{BatchDispatcher, DispatcherError, FlushReport};
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::buffer::StreamBuffer;
use crate::error::RegistryError;

/// What `submit` did with a value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// First value of a new stream, sent as its creation upsert
    Created,
    /// Appended; threshold not exceeded
    Buffered { pending: usize },
    /// Appended and the stream's buffer was delivered
    Flushed(FlushReport),
    /// Appended, the implicit flush failed, points kept for retry
    Deferred { pending: usize },
}

/// Validate stream defaults given as arbitrary JSON.
pub fn parse_stream_defaults(value: Value) -> Result<StreamDefaults, RegistryError> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(RegistryError::validation(
            "stream_defaults",
            format!("expected a JSON object, got {}", json_kind(&other)),
        )),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Stream registry for one feed
///
/// Every operation takes `&mut self`, so append, threshold check, flush and
/// clear of a stream never interleave with another producer.
pub struct Registry<T> {
    config: RelayConfig,
    dispatcher: BatchDispatcher<T>,
    streams: HashMap<StreamId, StreamBuffer>,
    clock: Arc<dyn Clock>,
}

impl<T: Transport> Registry<T> {
    /// Create an empty registry stamping points with the system clock
    pub fn new(config: RelayConfig, transport: T) -> Self {
        Self::with_clock(config, transport, Arc::new(SystemClock))
    }

    /// Create an empty registry with a custom clock
    pub fn with_clock(config: RelayConfig, transport: T, clock: Arc<dyn Clock>) -> Self {
        let dispatcher = BatchDispatcher::new(transport, &config);
        Self {
            config,
            dispatcher,
            streams: HashMap::new(),
            clock,
        }
    }

    /// Create a registry and apply `config.bootstrap`
    ///
    /// # Errors
    /// Only in `BootstrapMode::Required`, when the feed cannot be read.
    #[instrument(name = "registry_connect", skip_all, fields(mode = ?config.bootstrap))]
    pub async fn connect(
        config: RelayConfig,
        transport: T,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, DispatcherError> {
        let mode = config.bootstrap;
        let mut registry = Self::with_clock(config, transport, clock);

        match mode {
            BootstrapMode::Off => {}
            BootstrapMode::Required => {
                registry.bootstrap().await?;
            }
            BootstrapMode::BestEffort => {
                if let Err(e) = registry.bootstrap().await {
                    warn!(error = %e, "Bootstrap failed, starting with an empty registry");
                }
            }
        }

        Ok(registry)
    }

    /// Register streams that already exist upstream.
    ///
    /// Registered streams skip the creation upsert. Returns how many were
    /// newly added.
    pub async fn bootstrap(&mut self) -> Result<usize, DispatcherError> {
        let ids = self.dispatcher.fetch_stream_ids().await?;
        let mut added = 0;
        for id in ids {
            if let std::collections::hash_map::Entry::Vacant(entry) = self.streams.entry(id) {
                entry.insert(StreamBuffer::new());
                added += 1;
            }
        }
        info!(added, "Registry bootstrapped");
        Ok(added)
    }

    /// Submit one value for a stream.
    ///
    /// The first value of an unknown stream is sent immediately as the
    /// stream's creation upsert and is not buffered. Later values are
    /// buffered; once a stream holds more than `cache.threshold` points it is
    /// flushed. A failed implicit flush is logged and reported as
    /// `SubmitOutcome::Deferred`, never as an error.
    ///
    /// # Errors
    /// - `Validation` for an empty stream id or an empty value
    /// - `Delivery` when the creation upsert fails; the stream stays unknown
    ///   so the next submission retries it
    #[instrument(name = "registry_submit", skip(self, value), fields(stream = %stream_id))]
    pub async fn submit(
        &mut self,
        stream_id: &str,
        value: &str,
    ) -> Result<SubmitOutcome, RegistryError> {
        StreamId::check(stream_id).map_err(|m| RegistryError::validation("stream_id", m))?;
        if value.is_empty() {
            return Err(RegistryError::validation("value", "value cannot be empty"));
        }

        let Some(buffer) = self.streams.get_mut(stream_id) else {
            return self.create_stream(stream_id, value).await;
        };

        let pending = buffer.push(DataPoint::stamped(self.clock.now(), value));
        observability::record_point_buffered(stream_id);
        observability::record_buffer_depth(stream_id, pending);

        if pending <= self.config.cache.threshold {
            debug!(pending, "Buffered");
            return Ok(SubmitOutcome::Buffered { pending });
        }

        match self.flush_stream(stream_id).await {
            Ok(report) => Ok(SubmitOutcome::Flushed(report)),
            Err(e) => {
                let pending = self.buffered_len(stream_id);
                warn!(
                    stream = %stream_id,
                    pending,
                    error = %e,
                    "Implicit flush failed, points kept for retry"
                );
                Ok(SubmitOutcome::Deferred { pending })
            }
        }
    }

    async fn create_stream(
        &mut self,
        stream_id: &str,
        value: &str,
    ) -> Result<SubmitOutcome, RegistryError> {
        let id = StreamId::from(stream_id);
        self.dispatcher
            .upsert_stream(&id, &self.config.stream_defaults, value)
            .await?;

        self.streams.insert(id, StreamBuffer::new());
        observability::record_stream_created(stream_id);
        Ok(SubmitOutcome::Created)
    }

    /// Flush one stream now.
    ///
    /// Unknown or empty streams are a no-op.
    #[instrument(name = "registry_flush", skip(self), fields(stream = %stream_id))]
    pub async fn flush(&mut self, stream_id: &str) -> Result<FlushReport, DispatcherError> {
        self.flush_stream(stream_id).await
    }

    /// Flush every stream that has pending points.
    ///
    /// Streams are attempted in id order and a failing stream does not stop
    /// the others. The first error is returned once all were attempted.
    #[instrument(name = "registry_flush_all", skip(self))]
    pub async fn flush_all(&mut self) -> Result<FlushReport, DispatcherError> {
        let mut ids: Vec<StreamId> = self
            .streams
            .iter()
            .filter(|(_, buffer)| !buffer.is_empty())
            .map(|(id, _)| id.clone())
            .collect();
        ids.sort();

        let mut total = FlushReport::default();
        let mut first_error = None;
        for id in ids {
            match self.flush_stream(&id).await {
                Ok(report) => total.merge(report),
                Err(e) => {
                    first_error.get_or_insert(e);
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(total),
        }
    }

    async fn flush_stream(&mut self, stream_id: &str) -> Result<FlushReport, DispatcherError> {
        let Some((id, buffer)) = self.streams.get_key_value(stream_id) else {
            return Ok(FlushReport::default());
        };
        if buffer.is_empty() {
            return Ok(FlushReport::default());
        }

        let result = self.dispatcher.flush_points(id, buffer.points()).await;

        let Some(buffer) = self.streams.get_mut(stream_id) else {
            return result;
        };
        match &result {
            Ok(report) => {
                buffer.mark_delivered(report.points);
                observability::record_flush(stream_id, true, report.points);
                debug!(stream = %stream_id, points = report.points, "Flushed");
            }
            Err(_) => {
                buffer.mark_failed();
                observability::record_flush(stream_id, false, 0);
            }
        }
        observability::record_buffer_depth(stream_id, buffer.len());

        result
    }

    /// Configuration the registry was built with
    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    pub fn dispatcher(&self) -> &BatchDispatcher<T> {
        &self.dispatcher
    }

    /// Whether the stream has been declared (or bootstrapped)
    pub fn is_known(&self, stream_id: &str) -> bool {
        self.streams.contains_key(stream_id)
    }

    /// Pending points of a stream (0 for unknown streams)
    pub fn buffered_len(&self, stream_id: &str) -> usize {
        self.streams.get(stream_id).map_or(0, StreamBuffer::len)
    }

    /// Pending points of a stream in submission order
    pub fn pending(&self, stream_id: &str) -> Option<&[DataPoint]> {
        self.streams.get(stream_id).map(StreamBuffer::points)
    }

    pub fn buffer(&self, stream_id: &str) -> Option<&StreamBuffer> {
        self.streams.get(stream_id)
    }

    /// Known stream ids, sorted
    pub fn stream_ids(&self) -> Vec<StreamId> {
        let mut ids: Vec<_> = self.streams.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Pending points across all streams
    pub fn total_buffered(&self) -> usize {
        self.streams.values().map(StreamBuffer::len).sum()
    }
}
