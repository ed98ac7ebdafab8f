//! Command implementations.

mod info;
mod run;
mod validate;

pub use info::run_info;
pub use run::run_relay;
pub use validate::run_validate;

use std::path::Path;

use anyhow::{Context, Result};
use config_loader::{ConfigLoader, RelayConfig};

use crate::error::CliError;

/// Parse a config file and apply the API key override, without validating.
fn parse_config(path: &Path, api_key: Option<&str>) -> Result<RelayConfig> {
    if !path.exists() {
        return Err(CliError::config_not_found(path.display().to_string()).into());
    }

    let mut config = ConfigLoader::parse_from_path(path)
        .with_context(|| format!("Failed to load config from {}", path.display()))?;

    if let Some(key) = api_key.filter(|k| !k.is_empty()) {
        config.feed.api_key = key.to_string();
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn config_file(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_api_key_override_applied_before_validation() {
        let file = config_file("[feed]\nfeed_id = \"504\"\n");

        let config = parse_config(file.path(), None).unwrap();
        assert!(ConfigLoader::validate(&config).is_err());

        let config = parse_config(file.path(), Some("from-env")).unwrap();
        assert_eq!(config.feed.api_key, "from-env");
        assert!(ConfigLoader::validate(&config).is_ok());
    }

    #[test]
    fn test_empty_override_keeps_file_key() {
        let file = config_file("[feed]\nfeed_id = \"504\"\napi_key = \"file\"\n");
        let config = parse_config(file.path(), Some("")).unwrap();
        assert_eq!(config.feed.api_key, "file");
    }

    #[test]
    fn test_missing_file() {
        let err = parse_config(Path::new("/nonexistent/relay.toml"), None).unwrap_err();
        assert!(err.to_string().contains("not found"), "got: {err}");
    }
}
