//! Relay metrics
//!
//! Counters and gauges go through the `metrics` facade (exported by
//! Prometheus when installed); `RelayStatsAggregator` keeps an in-process
//! summary for the CLI.

use std::collections::BTreeMap;
use std::fmt;

use metrics::{counter, gauge, histogram};

/// A value was appended to a stream buffer
pub fn record_point_buffered(stream_id: &str) {
    counter!(
        "feed_relay_points_buffered_total",
        "stream_id" => stream_id.to_string()
    )
    .increment(1);
}

/// A stream was declared upstream
pub fn record_stream_created(stream_id: &str) {
    counter!(
        "feed_relay_streams_created_total",
        "stream_id" => stream_id.to_string()
    )
    .increment(1);
}

/// A flush finished
pub fn record_flush(stream_id: &str, success: bool, points: usize) {
    let status = if success { "success" } else { "failure" };
    counter!(
        "feed_relay_flushes_total",
        "stream_id" => stream_id.to_string(),
        "status" => status
    )
    .increment(1);

    if success {
        counter!(
            "feed_relay_points_delivered_total",
            "stream_id" => stream_id.to_string()
        )
        .increment(points as u64);
        histogram!("feed_relay_flush_size_points").record(points as f64);
    }
}

/// Current number of undelivered points for a stream
pub fn record_buffer_depth(stream_id: &str, depth: usize) {
    gauge!(
        "feed_relay_buffer_depth",
        "stream_id" => stream_id.to_string()
    )
    .set(depth as f64);
}

/// What happened to one flush attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushOutcome {
    Delivered { points: usize, requests: usize },
    Failed { pending: usize },
}

/// Run-level statistics
#[derive(Debug, Clone, Default)]
pub struct RelayStatsAggregator {
    pub submitted: u64,
    pub streams_created: u64,
    pub flushes: u64,
    pub failed_flushes: u64,
    pub points_delivered: u64,
    pub requests: u64,
    /// Points per successful flush
    pub flush_sizes: RunningStats,
    /// Per-stream count of failed flushes
    pub failures_by_stream: BTreeMap<String, u64>,
}

impl RelayStatsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_submit(&mut self, created: bool) {
        self.submitted += 1;
        if created {
            self.streams_created += 1;
        }
    }

    pub fn record_flush(&mut self, stream_id: &str, outcome: FlushOutcome) {
        match outcome {
            FlushOutcome::Delivered { points, requests } => {
                if requests == 0 {
                    return;
                }
                self.flushes += 1;
                self.points_delivered += points as u64;
                self.requests += requests as u64;
                self.flush_sizes.push(points as f64);
            }
            FlushOutcome::Failed { .. } => {
                self.failed_flushes += 1;
                *self
                    .failures_by_stream
                    .entry(stream_id.to_string())
                    .or_insert(0) += 1;
            }
        }
    }

    /// Final flush of every stream at shutdown
    pub fn record_shutdown_flush(&mut self, streams: usize, points: usize, requests: usize) {
        self.flushes += streams as u64;
        self.points_delivered += points as u64;
        self.requests += requests as u64;
    }

    pub fn summary(&self) -> StatsReport {
        StatsReport {
            submitted: self.submitted,
            streams_created: self.streams_created,
            flushes: self.flushes,
            failed_flushes: self.failed_flushes,
            points_delivered: self.points_delivered,
            requests: self.requests,
            flush_size: StatsSummary::from(&self.flush_sizes),
            failures_by_stream: self.failures_by_stream.clone(),
        }
    }
}

/// Printable run summary
#[derive(Debug, Clone, Default)]
pub struct StatsReport {
    pub submitted: u64,
    pub streams_created: u64,
    pub flushes: u64,
    pub failed_flushes: u64,
    pub points_delivered: u64,
    pub requests: u64,
    pub flush_size: StatsSummary,
    pub failures_by_stream: BTreeMap<String, u64>,
}

impl fmt::Display for StatsReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Relay Summary ===")?;
        writeln!(f, "Values submitted: {}", self.submitted)?;
        writeln!(f, "Streams created: {}", self.streams_created)?;
        writeln!(
            f,
            "Flushes: {} ok, {} failed",
            self.flushes, self.failed_flushes
        )?;
        writeln!(
            f,
            "Points delivered: {} in {} requests",
            self.points_delivered, self.requests
        )?;
        writeln!(f, "Flush size (points): {}", self.flush_size)?;

        if !self.failures_by_stream.is_empty() {
            writeln!(f, "Failed flushes by stream:")?;
            for (stream, count) in &self.failures_by_stream {
                writeln!(f, "  {}: {}", stream, count)?;
            }
        }

        Ok(())
    }
}

/// Summary of a `RunningStats`
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count,
            min: stats.min,
            max: stats.max,
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.0}, max={:.0}, mean={:.1}, std={:.1} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// Online mean/variance (Welford)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
            return;
        }

        self.min = self.min.min(value);
        self.max = self.max.max(value);
        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (value - self.mean);
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 { 0.0 } else { self.mean }
    }

    /// Sample variance
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }
}
