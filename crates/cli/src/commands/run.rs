//! `run` command implementation.

use anyhow::{Context, Result};
use config_loader::ConfigLoader;
use contracts::TransportKind;
use tracing::{info, warn};

use super::parse_config;
use crate::cli::RunArgs;
use crate::error::CliError;
use crate::pipeline::{Pipeline, PipelineConfig};

/// Execute the `run` command
pub async fn run_relay(args: &RunArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration");

    let mut config = parse_config(&args.config, args.api_key.as_deref())?;

    // Apply CLI overrides
    if let Some(ref feed_id) = args.feed_id {
        info!(feed_id = %feed_id, "Overriding feed id from CLI");
        config.feed.feed_id = feed_id.clone();
    }
    if let Some(threshold) = args.threshold {
        info!(threshold, "Overriding cache threshold from CLI");
        config.cache.threshold = threshold;
    }
    if let Some(ref raw) = args.stream_defaults {
        let value: serde_json::Value = serde_json::from_str(raw)
            .map_err(|e| CliError::invalid_stream_defaults(e.to_string()))?;
        config.stream_defaults = stream_registry::parse_stream_defaults(value)
            .map_err(|e| CliError::invalid_stream_defaults(e.to_string()))?;
    }
    if args.dry_run {
        info!("Dry run mode - requests are logged, not sent");
        config.transport.kind = TransportKind::Log;
    }

    ConfigLoader::validate(&config)
        .with_context(|| format!("Invalid configuration in {}", args.config.display()))?;

    info!(
        feed = %config.feed.feed_id,
        threshold = config.cache.threshold,
        max_points_per_request = config.cache.max_points_per_request,
        stream_defaults = config.stream_defaults.len(),
        "Configuration loaded"
    );

    let pipeline = Pipeline::new(PipelineConfig {
        relay: config,
        input: args.input.clone(),
        buffer_size: args.buffer_size,
        metrics_port: if args.metrics_port == 0 {
            None
        } else {
            Some(args.metrics_port)
        },
    });

    let stats = pipeline
        .run(shutdown_signal())
        .await
        .context("Relay failed")?;

    stats.print_summary();

    if let Some(error) = stats.final_flush_error {
        anyhow::bail!("Points left undelivered: {error}");
    }

    if let Some(error) = stats.input_error {
        anyhow::bail!("Input stopped early: {error}");
    }

    info!("Feed Relay finished");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
