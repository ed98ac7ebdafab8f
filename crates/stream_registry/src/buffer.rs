//! Per-stream FIFO of undelivered points.

use std::fmt;

use contracts::DataPoint;

/// Pending points of one stream, oldest first
///
/// Points leave the buffer only through `mark_delivered`, after the
/// dispatcher confirmed every chunk.
#[derive(Default)]
pub struct StreamBuffer {
    points: Vec<DataPoint>,
    total_buffered: u64,
    total_delivered: u64,
    /// Failed flushes since the last successful one
    consecutive_failures: u32,
}

impl fmt::Debug for StreamBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamBuffer")
            .field("len", &self.points.len())
            .field("total_buffered", &self.total_buffered)
            .field("consecutive_failures", &self.consecutive_failures)
            .finish()
    }
}

impl StreamBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a point; returns the new length.
    #[inline]
    pub fn push(&mut self, point: DataPoint) -> usize {
        self.points.push(point);
        self.total_buffered += 1;
        self.points.len()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Pending points in submission order
    pub fn points(&self) -> &[DataPoint] {
        &self.points
    }

    /// Drop the oldest `count` points after confirmed delivery.
    pub fn mark_delivered(&mut self, count: usize) {
        let count = count.min(self.points.len());
        self.points.drain(..count);
        self.total_delivered += count as u64;
        self.consecutive_failures = 0;
    }

    /// Note a failed flush; the points stay in place.
    pub fn mark_failed(&mut self) {
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
    }

    pub fn total_buffered(&self) -> u64 {
        self.total_buffered
    }

    pub fn total_delivered(&self) -> u64 {
        self.total_delivered
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }
}
