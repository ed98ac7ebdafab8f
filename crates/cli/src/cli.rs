//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Feed Relay - buffered datapoint upload to a feed API
#[derive(Parser, Debug)]
#[command(
    name = "feed-relay",
    author,
    version,
    about = "Buffer sensor readings and push them to a feed API in batches",
    long_about = "Reads `<stream_id> <value>` lines, declares each new datastream upstream \n\
                  with its first value, buffers later values with their timestamp and \n\
                  uploads them in chunked batches once a stream exceeds the cache threshold."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "FEED_RELAY_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "FEED_RELAY_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Relay values from stdin or a file
    Run(RunArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),

    /// Display configuration information
    Info(InfoArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to configuration file (TOML or JSON)
    #[arg(
        short,
        long,
        default_value = "relay.toml",
        env = "FEED_RELAY_CONFIG"
    )]
    pub config: PathBuf,

    /// Read values from this file instead of stdin
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Override the API key from configuration
    #[arg(long, env = "FEED_RELAY_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Override the feed id from configuration
    #[arg(long, env = "FEED_RELAY_FEED_ID")]
    pub feed_id: Option<String>,

    /// Override the cache threshold from configuration
    #[arg(long, env = "FEED_RELAY_THRESHOLD")]
    pub threshold: Option<usize>,

    /// Override stream defaults with a JSON object
    #[arg(long)]
    pub stream_defaults: Option<String>,

    /// Log requests instead of sending them
    #[arg(long)]
    pub dry_run: bool,

    /// Queue size between the input reader and the relay worker
    #[arg(long, default_value = "100", env = "FEED_RELAY_BUFFER_SIZE")]
    pub buffer_size: usize,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "0", env = "FEED_RELAY_METRICS_PORT")]
    pub metrics_port: u16,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "relay.toml")]
    pub config: PathBuf,

    /// API key used in place of the one in the file
    #[arg(long, env = "FEED_RELAY_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "relay.toml")]
    pub config: PathBuf,

    /// API key used in place of the one in the file
    #[arg(long, env = "FEED_RELAY_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}
