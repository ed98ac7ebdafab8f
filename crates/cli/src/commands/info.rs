//! `info` command implementation.

use anyhow::{Context, Result};
use config_loader::RelayConfig;
use contracts::StreamDefaults;
use serde::Serialize;
use tracing::info;

use super::parse_config;
use crate::cli::InfoArgs;

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    version: String,
    feed: FeedInfo,
    cache: CacheInfo,
    transport: TransportInfo,
    bootstrap: String,
    #[serde(skip_serializing_if = "serde_json::Map::is_empty")]
    stream_defaults: StreamDefaults,
}

#[derive(Serialize)]
struct FeedInfo {
    feed_id: String,
    base_url: String,
    api_key: String,
}

#[derive(Serialize)]
struct CacheInfo {
    threshold: usize,
    max_points_per_request: usize,
}

#[derive(Serialize)]
struct TransportInfo {
    kind: String,
    timeout_ms: u64,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration info");

    let config = parse_config(&args.config, args.api_key.as_deref())?;

    if args.json {
        let info = build_config_info(&config);
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize config info")?;
        println!("{}", json);
    } else {
        print_config_info(&config);
    }

    Ok(())
}

/// Hide all but the last four characters of a key
fn mask_api_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    match chars.len() {
        0 => "(not set)".to_string(),
        n if n <= 8 => "****".to_string(),
        n => format!("****{}", chars[n - 4..].iter().collect::<String>()),
    }
}

fn build_config_info(config: &RelayConfig) -> ConfigInfo {
    ConfigInfo {
        version: format!("{:?}", config.version),
        feed: FeedInfo {
            feed_id: config.feed.feed_id.clone(),
            base_url: config.feed.base_url.clone(),
            api_key: mask_api_key(&config.feed.api_key),
        },
        cache: CacheInfo {
            threshold: config.cache.threshold,
            max_points_per_request: config.cache.max_points_per_request,
        },
        transport: TransportInfo {
            kind: format!("{:?}", config.transport.kind),
            timeout_ms: config.transport.timeout_ms,
        },
        bootstrap: format!("{:?}", config.bootstrap),
        stream_defaults: config.stream_defaults.clone(),
    }
}

fn print_config_info(config: &RelayConfig) {
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║                 Feed Relay Configuration                     ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    println!("📡 Feed");
    println!("   ├─ Version: {:?}", config.version);
    println!("   ├─ Feed ID: {}", config.feed.feed_id);
    println!("   ├─ Base URL: {}", config.feed.base_url);
    println!("   └─ API Key: {}", mask_api_key(&config.feed.api_key));

    println!("\n🗃  Cache");
    println!("   ├─ Threshold: {}", config.cache.threshold);
    println!(
        "   └─ Points per request: {}",
        config.cache.max_points_per_request
    );

    println!("\n⚙️  Transport");
    println!("   ├─ Kind: {:?}", config.transport.kind);
    println!("   ├─ Timeout: {} ms", config.transport.timeout_ms);
    println!("   └─ Bootstrap: {:?}", config.bootstrap);

    if !config.stream_defaults.is_empty() {
        println!("\n📐 Stream Defaults ({})", config.stream_defaults.len());
        let last = config.stream_defaults.len() - 1;
        for (i, (key, value)) in config.stream_defaults.iter().enumerate() {
            let prefix = if i == last { "└─" } else { "├─" };
            println!("   {} {}: {}", prefix, key, value);
        }
    }

    println!();
}
