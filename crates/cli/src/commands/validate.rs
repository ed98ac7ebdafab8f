//! `validate` command implementation.

use anyhow::{Context, Result};
use config_loader::{ConfigLoader, RelayConfig};
use contracts::TransportKind;
use serde::Serialize;
use tracing::info;

use super::parse_config;
use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    version: String,
    feed_id: String,
    transport: String,
    threshold: usize,
    max_points_per_request: usize,
    stream_default_keys: Vec<String>,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    let checked = parse_config(&args.config, args.api_key.as_deref()).and_then(|config| {
        ConfigLoader::validate(&config)?;
        Ok(config)
    });

    match checked {
        Ok(config) => {
            let warnings = collect_warnings(&config);
            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: if warnings.is_empty() {
                    None
                } else {
                    Some(warnings)
                },
                summary: Some(ConfigSummary {
                    version: format!("{:?}", config.version),
                    feed_id: config.feed.feed_id.clone(),
                    transport: format!("{:?}", config.transport.kind),
                    threshold: config.cache.threshold,
                    max_points_per_request: config.cache.max_points_per_request,
                    stream_default_keys: config.stream_defaults.keys().cloned().collect(),
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("{e:#}")),
            warnings: None,
            summary: None,
        },
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(config: &RelayConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    if config.cache.threshold == 0 {
        warnings.push("cache.threshold is 0 - every value is sent in its own request".to_string());
    }

    if config.transport.kind == TransportKind::Log {
        warnings.push("transport.kind is 'log' - nothing will be sent upstream".to_string());
    }

    if config.transport.kind == TransportKind::Http && config.feed.base_url.starts_with("http://")
    {
        warnings.push("feed.base_url uses plain http - the API key is sent unencrypted".to_string());
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Version: {}", summary.version);
            println!("  Feed: {}", summary.feed_id);
            println!("  Transport: {}", summary.transport);
            println!("  Threshold: {}", summary.threshold);
            println!("  Points per request: {}", summary.max_points_per_request);
            if !summary.stream_default_keys.is_empty() {
                println!("  Stream defaults: {}", summary.stream_default_keys.join(", "));
            }
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}
