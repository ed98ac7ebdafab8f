//! Relay pipeline: input lines in, batched uploads out.

mod input;
mod orchestrator;
mod stats;

pub use input::{decode_line, parse_line};
pub use orchestrator::{Pipeline, PipelineConfig};
pub use stats::PipelineStats;
