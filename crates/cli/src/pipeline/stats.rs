//! Pipeline statistics.

use std::time::Duration;

use dispatcher::MetricsSnapshot;
use observability::{FlushOutcome, RelayStatsAggregator};
use stream_registry::SubmitOutcome;

/// Statistics from a relay run
#[derive(Debug, Clone, Default)]
pub struct PipelineStats {
    /// Non-blank input lines read
    pub lines_read: u64,

    /// Malformed or rejected lines
    pub skipped_lines: u64,

    /// Values lost because their stream could not be declared
    pub failed_submissions: u64,

    /// Run stopped by a signal before end of input
    pub interrupted: bool,

    /// Input read error that ended the run early
    pub input_error: Option<String>,

    /// Error of the final flush, if any points were left undelivered
    pub final_flush_error: Option<String>,

    /// Total duration of the run
    pub duration: Duration,

    /// Submission and flush aggregates
    pub relay: RelayStatsAggregator,

    /// Request counters from the dispatcher
    pub dispatch: MetricsSnapshot,
}

impl PipelineStats {
    /// Account for one accepted submission
    pub fn record_outcome(&mut self, stream_id: &str, outcome: SubmitOutcome) {
        match outcome {
            SubmitOutcome::Created => self.relay.record_submit(true),
            SubmitOutcome::Buffered { .. } => self.relay.record_submit(false),
            SubmitOutcome::Flushed(report) => {
                self.relay.record_submit(false);
                self.relay.record_flush(
                    stream_id,
                    FlushOutcome::Delivered {
                        points: report.points,
                        requests: report.requests,
                    },
                );
            }
            SubmitOutcome::Deferred { pending } => {
                self.relay.record_submit(false);
                self.relay
                    .record_flush(stream_id, FlushOutcome::Failed { pending });
            }
        }
    }

    /// Values per second
    pub fn throughput(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.relay.submitted as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                     Relay Statistics                         ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");

        println!("📊 Overview");
        println!("   ├─ Duration: {:.2}s", self.duration.as_secs_f64());
        println!("   ├─ Lines read: {}", self.lines_read);
        println!("   ├─ Lines skipped: {}", self.skipped_lines);
        println!("   ├─ Failed submissions: {}", self.failed_submissions);
        println!("   ├─ Values/s: {:.2}", self.throughput());
        println!("   └─ Interrupted: {}", self.interrupted);

        println!("\n📤 Requests");
        println!("   ├─ Sent: {}", self.dispatch.request_count);
        println!("   ├─ Failed: {}", self.dispatch.failure_count);
        println!("   ├─ Streams created: {}", self.dispatch.streams_created);
        println!("   └─ Points delivered: {}", self.dispatch.points_delivered);

        println!("\n{}", self.relay.summary());

        if let Some(ref error) = self.input_error {
            println!("⚠️  Input stopped early: {}", error);
        }

        if let Some(ref error) = self.final_flush_error {
            println!("⚠️  Final flush failed: {}", error);
        }

        println!();
    }
}
