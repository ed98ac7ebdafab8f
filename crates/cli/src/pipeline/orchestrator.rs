//! Pipeline orchestrator - wires input, registry worker and transport.

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use contracts::{RelayConfig, SystemClock};
use stream_registry::{Registry, RegistryError, RelayHandle};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};

use super::{PipelineStats, decode_line, parse_line};

/// Pipeline configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Validated relay configuration
    pub relay: RelayConfig,

    /// Input file (None = stdin)
    pub input: Option<PathBuf>,

    /// Queue size between reader and relay worker
    pub buffer_size: usize,

    /// Metrics server port (None = disabled)
    pub metrics_port: Option<u16>,
}

/// Main pipeline orchestrator
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Create a new pipeline with the given configuration
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Relay every input line, then flush what is left.
    ///
    /// Reading stops at end of input or when `shutdown` resolves; the
    /// remaining buffers are flushed in both cases.
    pub async fn run(self, shutdown: impl Future<Output = ()>) -> Result<PipelineStats> {
        let start_time = Instant::now();
        let PipelineConfig {
            relay,
            input,
            buffer_size,
            metrics_port,
        } = self.config;

        if let Some(port) = metrics_port {
            observability::init_metrics_only(port)?;
            info!("Metrics endpoint available on port {}", port);
        }

        let transport = dispatcher::create_transport("upstream", &relay.transport)
            .context("Failed to create transport")?;

        info!(
            feed = %relay.feed.feed_id,
            transport = ?relay.transport.kind,
            bootstrap = ?relay.bootstrap,
            "Connecting registry"
        );
        let registry = Registry::connect(relay, transport, Arc::new(SystemClock))
            .await
            .context("Failed to read existing datastreams")?;

        let handle = RelayHandle::spawn(registry, buffer_size);
        let dispatch_metrics = Arc::clone(handle.metrics());

        let mut reader: Box<dyn AsyncBufRead + Unpin + Send> = match &input {
            Some(path) => {
                let file = tokio::fs::File::open(path)
                    .await
                    .with_context(|| format!("Failed to open input {}", path.display()))?;
                info!(input = %path.display(), "Reading values from file");
                Box::new(BufReader::new(file))
            }
            None => {
                info!("Reading values from stdin");
                Box::new(BufReader::new(tokio::io::stdin()))
            }
        };

        let mut stats = PipelineStats::default();
        let mut raw = Vec::new();
        let mut line_no = 0usize;
        tokio::pin!(shutdown);

        loop {
            raw.clear();
            let read = tokio::select! {
                biased;
                _ = &mut shutdown => {
                    warn!("Received shutdown signal, flushing buffered points...");
                    stats.interrupted = true;
                    break;
                }
                read = reader.read_until(b'\n', &mut raw) => read,
            };
            match read {
                Ok(0) => break,
                Ok(_) => {}
                Err(e) => {
                    error!(error = %e, line = line_no + 1, "Failed to read input, flushing what was read");
                    stats.input_error = Some(e.to_string());
                    break;
                }
            }
            line_no += 1;

            let line = match decode_line(line_no, std::mem::take(&mut raw)) {
                Ok(line) => line,
                Err(e) => {
                    warn!(error = %e, "Skipping malformed line");
                    stats.skipped_lines += 1;
                    continue;
                }
            };

            let record = match parse_line(line_no, &line) {
                Ok(Some(record)) => record,
                Ok(None) => continue,
                Err(e) => {
                    warn!(error = %e, "Skipping malformed line");
                    stats.skipped_lines += 1;
                    continue;
                }
            };
            stats.lines_read += 1;

            match handle.submit(record.stream_id, record.value).await {
                Ok(outcome) => stats.record_outcome(record.stream_id, outcome),
                Err(e) if e.is_validation() => {
                    warn!(line = line_no, error = %e, "Skipping rejected value");
                    stats.skipped_lines += 1;
                }
                Err(RegistryError::Closed) => {
                    error!(line = line_no, "Relay worker stopped unexpectedly");
                    stats.input_error = Some("relay worker stopped".to_string());
                    break;
                }
                Err(e) => {
                    warn!(stream = %record.stream_id, error = %e, "Value dropped");
                    stats.failed_submissions += 1;
                }
            }
        }

        info!("Input finished, running final flush...");
        match handle.shutdown().await {
            Ok(report) => {
                stats
                    .relay
                    .record_shutdown_flush(report.streams, report.points, report.requests);
            }
            Err(e) => {
                error!(error = %e, "Final flush failed");
                stats.final_flush_error = Some(e.to_string());
            }
        }

        stats.dispatch = dispatch_metrics.snapshot();
        stats.duration = start_time.elapsed();

        info!(
            duration_secs = stats.duration.as_secs_f64(),
            values = stats.relay.submitted,
            "Relay shutdown complete"
        );

        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::TransportKind;
    use std::io::Write;

    fn dry_run_config(input: PathBuf, threshold: usize) -> PipelineConfig {
        let mut relay = RelayConfig::new("504", "secret").with_threshold(threshold);
        relay.transport.kind = TransportKind::Log;
        PipelineConfig {
            relay,
            input: Some(input),
            buffer_size: 8,
            metrics_port: None,
        }
    }

    #[tokio::test]
    async fn test_invalid_utf8_line_is_skipped_and_rest_flushed() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"8 1\n8 2\n8 3\n\xff\xfe bad\n8 4\n").unwrap();
        file.flush().unwrap();

        let stats = Pipeline::new(dry_run_config(file.path().to_path_buf(), 10))
            .run(std::future::pending())
            .await
            .unwrap();

        assert_eq!(stats.lines_read, 4);
        assert_eq!(stats.skipped_lines, 1);
        assert!(stats.input_error.is_none());
        assert!(stats.final_flush_error.is_none());
        assert_eq!(stats.dispatch.streams_created, 1);
        // "1" went out with the creation, the rest in the final flush
        assert_eq!(stats.dispatch.points_delivered, 3);
    }

    #[tokio::test]
    async fn test_last_line_without_newline() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"# header\na 1\r\nb 2\r\na 3").unwrap();
        file.flush().unwrap();

        let stats = Pipeline::new(dry_run_config(file.path().to_path_buf(), 10))
            .run(std::future::pending())
            .await
            .unwrap();

        assert_eq!(stats.lines_read, 3);
        assert_eq!(stats.skipped_lines, 0);
        assert_eq!(stats.dispatch.streams_created, 2);
        assert_eq!(stats.dispatch.points_delivered, 1);
    }

    #[tokio::test]
    async fn test_shutdown_signal_still_flushes() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"8 1\n8 2\n").unwrap();
        file.flush().unwrap();

        let stats = Pipeline::new(dry_run_config(file.path().to_path_buf(), 10))
            .run(std::future::ready(()))
            .await
            .unwrap();

        assert!(stats.interrupted);
        assert!(stats.final_flush_error.is_none());
    }
}
