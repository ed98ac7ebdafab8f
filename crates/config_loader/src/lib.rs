//! # Config Loader
//!
//! Configuration loading and parsing module.
//!
//! Responsibilities:
//! - Parse TOML/JSON configuration files
//! - Validate configuration legality
//! - Produce a `RelayConfig`
//!
//! # Example
//!
//! ```no_run
//! use config_loader::ConfigLoader;
//! use std::path::Path;
//!
//! let config = ConfigLoader::load_from_path(Path::new("relay.toml")).unwrap();
//! println!("Feed: {}", config.feed.feed_id);
//! ```

mod parser;
mod validator;

pub use contracts::RelayConfig;
pub use parser::ConfigFormat;

use contracts::ContractError;
use std::path::Path;

/// Configuration loader
///
/// Provides static methods to load configuration from files or strings.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load and validate configuration from a file path
    ///
    /// Format is detected from the file extension (.toml / .json).
    ///
    /// # Errors
    /// - File read failure
    /// - Unsupported format
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_path(path: &Path) -> Result<RelayConfig, ContractError> {
        let config = Self::parse_from_path(path)?;
        Self::validate(&config)?;
        Ok(config)
    }

    /// Parse a file without validating it
    ///
    /// Lets callers apply overrides (API key from the environment, CLI flags)
    /// before calling [`ConfigLoader::validate`].
    pub fn parse_from_path(path: &Path) -> Result<RelayConfig, ContractError> {
        let format = Self::detect_format(path)?;
        let content = Self::read_file(path)?;
        parser::parse(&content, format)
    }

    /// Load and validate configuration from a string
    pub fn load_from_str(content: &str, format: ConfigFormat) -> Result<RelayConfig, ContractError> {
        let config = parser::parse(content, format)?;
        Self::validate(&config)?;
        Ok(config)
    }

    /// Check a configuration against every rule
    pub fn validate(config: &RelayConfig) -> Result<(), ContractError> {
        validator::validate(config)
    }

    /// Serialize RelayConfig to TOML string
    pub fn to_toml(config: &RelayConfig) -> Result<String, ContractError> {
        toml::to_string_pretty(config)
            .map_err(|e| ContractError::config_parse(format!("TOML serialize error: {e}")))
    }

    /// Serialize RelayConfig to JSON string
    pub fn to_json(config: &RelayConfig) -> Result<String, ContractError> {
        serde_json::to_string_pretty(config)
            .map_err(|e| ContractError::config_parse(format!("JSON serialize error: {e}")))
    }
}

impl ConfigLoader {
    /// Infer configuration format from file extension
    fn detect_format(path: &Path) -> Result<ConfigFormat, ContractError> {
        let ext = path.extension().and_then(|e| e.to_str()).ok_or_else(|| {
            ContractError::config_parse("cannot determine file format from extension")
        })?;

        ConfigFormat::from_extension(ext).ok_or_else(|| {
            ContractError::config_parse(format!("unsupported config format: .{ext}"))
        })
    }

    /// Read configuration file content
    fn read_file(path: &Path) -> Result<String, ContractError> {
        Ok(std::fs::read_to_string(path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const MINIMAL_TOML: &str = r#"
[feed]
feed_id = "504"
api_key = "secret"

[cache]
threshold = 1

[stream_defaults]
min_value = "0.0"
unit = { type = "derivedSI", label = "watt", symbol = "W" }
"#;

    fn write_temp(suffix: &str, content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_from_str_toml() {
        let result = ConfigLoader::load_from_str(MINIMAL_TOML, ConfigFormat::Toml);
        assert!(result.is_ok(), "Failed: {:?}", result.err());
        let config = result.unwrap();
        assert_eq!(config.feed.feed_id, "504");
        assert_eq!(config.feed.base_url, contracts::DEFAULT_BASE_URL);
    }

    #[test]
    fn test_round_trip_toml() {
        let config = ConfigLoader::load_from_str(MINIMAL_TOML, ConfigFormat::Toml).unwrap();
        let serialized = ConfigLoader::to_toml(&config).unwrap();
        let config2 = ConfigLoader::load_from_str(&serialized, ConfigFormat::Toml).unwrap();
        assert_eq!(config.feed.feed_id, config2.feed.feed_id);
        assert_eq!(config.cache.threshold, config2.cache.threshold);
        assert_eq!(config.stream_defaults, config2.stream_defaults);
    }

    #[test]
    fn test_round_trip_json() {
        let config = ConfigLoader::load_from_str(MINIMAL_TOML, ConfigFormat::Toml).unwrap();
        let json = ConfigLoader::to_json(&config).unwrap();
        let config2 = ConfigLoader::load_from_str(&json, ConfigFormat::Json).unwrap();
        assert_eq!(config.stream_defaults, config2.stream_defaults);
    }

    #[test]
    fn test_validation_runs_after_parse() {
        let content = "[feed]\nfeed_id = \"504\"\n";
        let result = ConfigLoader::load_from_str(content, ConfigFormat::Toml);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("api_key"));
    }

    #[test]
    fn test_load_from_path_detects_format() {
        let file = write_temp(".toml", MINIMAL_TOML);
        let config = ConfigLoader::load_from_path(file.path()).unwrap();
        assert_eq!(config.cache.threshold, 1);

        let file = write_temp(".json", r#"{ "feed": { "feed_id": "7", "api_key": "k" } }"#);
        let config = ConfigLoader::load_from_path(file.path()).unwrap();
        assert_eq!(config.feed.feed_id, "7");
    }

    #[test]
    fn test_parse_from_path_skips_validation() {
        let file = write_temp(".toml", "[feed]\nfeed_id = \"504\"\n");
        let mut config = ConfigLoader::parse_from_path(file.path()).unwrap();
        assert!(ConfigLoader::validate(&config).is_err());

        config.feed.api_key = "from-env".into();
        assert!(ConfigLoader::validate(&config).is_ok());
    }

    #[test]
    fn test_unsupported_extension() {
        let file = write_temp(".yaml", MINIMAL_TOML);
        let err = ConfigLoader::load_from_path(file.path()).unwrap_err();
        assert!(err.to_string().contains("unsupported config format"), "got: {err}");
    }
}
