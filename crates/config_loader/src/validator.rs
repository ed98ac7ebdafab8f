//! Configuration validation
//!
//! Rules:
//! - field-level constraints declared on the config types (`validator`)
//! - feed_id must not contain '/'
//! - api_key required for the http transport
//! - base_url must be an http(s) URL

use contracts::{ContractError, RelayConfig, TransportKind};
use validator::{Validate, ValidationErrors, ValidationErrorsKind};

/// Validate a RelayConfig
///
/// Returns the first error found, or Ok(()).
pub fn validate(config: &RelayConfig) -> Result<(), ContractError> {
    validate_fields(config)?;
    validate_feed(config)?;
    Ok(())
}

/// Field constraints from the `Validate` derive
fn validate_fields(config: &RelayConfig) -> Result<(), ContractError> {
    config.validate().map_err(|errors| {
        let (field, message) = first_error("", &errors);
        ContractError::config_validation(field, message)
    })
}

/// Walk nested validation errors in field order and report the first one
fn first_error(prefix: &str, errors: &ValidationErrors) -> (String, String) {
    let mut fields: Vec<_> = errors.errors().iter().collect();
    fields.sort_by(|a, b| a.0.cmp(b.0));

    for (name, kind) in fields {
        let path = if prefix.is_empty() {
            name.to_string()
        } else {
            format!("{prefix}.{name}")
        };
        match kind {
            ValidationErrorsKind::Field(list) => {
                if let Some(err) = list.first() {
                    let message = err
                        .message
                        .as_ref()
                        .map_or_else(|| err.code.to_string(), |m| m.to_string());
                    return (path, message);
                }
            }
            ValidationErrorsKind::Struct(inner) => return first_error(&path, inner),
            ValidationErrorsKind::List(items) => {
                if let Some((idx, inner)) = items.iter().next() {
                    return first_error(&format!("{path}[{idx}]"), inner);
                }
            }
        }
    }

    (prefix.to_string(), "invalid value".to_string())
}

/// Rules that depend on more than one field
fn validate_feed(config: &RelayConfig) -> Result<(), ContractError> {
    let feed = &config.feed;

    if feed.feed_id.contains('/') {
        return Err(ContractError::config_validation(
            "feed.feed_id",
            format!("feed_id '{}' must not contain '/'", feed.feed_id),
        ));
    }

    if config.transport.kind == TransportKind::Http && feed.api_key.is_empty() {
        return Err(ContractError::config_validation(
            "feed.api_key",
            "api_key cannot be empty for the http transport",
        ));
    }

    if !(feed.base_url.starts_with("http://") || feed.base_url.starts_with("https://")) {
        return Err(ContractError::config_validation(
            "feed.base_url",
            format!("base_url '{}' must start with http:// or https://", feed.base_url),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_config() -> RelayConfig {
        RelayConfig::new("504", "secret").with_threshold(1)
    }

    #[test]
    fn test_valid_config() {
        let config = minimal_config();
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_empty_feed_id() {
        let mut config = minimal_config();
        config.feed.feed_id = String::new();
        let err = validate(&config).unwrap_err().to_string();
        assert!(err.contains("feed.feed_id"), "got: {err}");
        assert!(err.contains("cannot be empty"), "got: {err}");
    }

    #[test]
    fn test_feed_id_with_slash() {
        let mut config = minimal_config();
        config.feed.feed_id = "504/datastreams".into();
        let err = validate(&config).unwrap_err().to_string();
        assert!(err.contains("must not contain '/'"), "got: {err}");
    }

    #[test]
    fn test_max_points_out_of_range() {
        for bad in [0, 501] {
            let mut config = minimal_config();
            config.cache.max_points_per_request = bad;
            let err = validate(&config).unwrap_err().to_string();
            assert!(err.contains("cache.max_points_per_request"), "got: {err}");
        }

        let mut config = minimal_config();
        config.cache.max_points_per_request = 500;
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_zero_timeout() {
        let mut config = minimal_config();
        config.transport.timeout_ms = 0;
        let err = validate(&config).unwrap_err().to_string();
        assert!(err.contains("timeout_ms must be > 0"), "got: {err}");
    }

    #[test]
    fn test_api_key_required_for_http_only() {
        let mut config = minimal_config();
        config.feed.api_key = String::new();
        let err = validate(&config).unwrap_err().to_string();
        assert!(err.contains("api_key"), "got: {err}");

        config.transport.kind = TransportKind::Log;
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_base_url_scheme() {
        let mut config = minimal_config();
        config.feed.base_url = "ftp://api.example.com".into();
        let err = validate(&config).unwrap_err().to_string();
        assert!(err.contains("base_url"), "got: {err}");
    }
}
