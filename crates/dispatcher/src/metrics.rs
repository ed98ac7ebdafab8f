//! Delivery counters for observability

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for one dispatcher
#[derive(Debug, Default)]
pub struct DispatchMetrics {
    /// Requests that returned 2xx
    request_count: AtomicU64,
    /// Requests that failed
    failure_count: AtomicU64,
    /// Points confirmed delivered (counted per successful chunk)
    points_delivered: AtomicU64,
    /// Streams declared upstream
    streams_created: AtomicU64,
}

impl DispatchMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_count(&self) -> u64 {
        self.request_count.load(Ordering::Relaxed)
    }

    pub fn inc_request_count(&self) {
        self.request_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn failure_count(&self) -> u64 {
        self.failure_count.load(Ordering::Relaxed)
    }

    pub fn inc_failure_count(&self) {
        self.failure_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn points_delivered(&self) -> u64 {
        self.points_delivered.load(Ordering::Relaxed)
    }

    pub fn add_points_delivered(&self, points: usize) {
        self.points_delivered
            .fetch_add(points as u64, Ordering::Relaxed);
    }

    pub fn streams_created(&self) -> u64 {
        self.streams_created.load(Ordering::Relaxed)
    }

    pub fn inc_streams_created(&self) {
        self.streams_created.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot of all counters
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            request_count: self.request_count(),
            failure_count: self.failure_count(),
            points_delivered: self.points_delivered(),
            streams_created: self.streams_created(),
        }
    }
}

/// Snapshot of dispatcher counters (for reporting)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub request_count: u64,
    pub failure_count: u64,
    pub points_delivered: u64,
    pub streams_created: u64,
}
