//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::ServiceConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("validate config: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ServiceConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<ServiceConfig, ConfigError> {
    let config: ServiceConfig = toml::from_str(content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Environment;

    const VALID: &str = r#"
        [global]
        env = "stage"

        [log]
        level = "warn"

        [servers.debug]
        addr = "localhost:8079"

        [sentry]
        dsn = "http://key@sentry.local/1"
    "#;

    #[test]
    fn parses_valid_config() {
        let config = parse_config(VALID).unwrap();
        assert_eq!(config.global.env, Environment::Stage);
        assert_eq!(config.log.level, "warn");
        assert_eq!(config.servers.debug.addr, "localhost:8079");
        assert_eq!(config.servers.debug.shutdown_timeout_ms, 3_000);
    }

    #[test]
    fn unknown_env_is_parse_error() {
        let content = VALID.replace("\"stage\"", "\"qa\"");
        assert!(matches!(parse_config(&content), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn missing_sections_are_rejected() {
        let err = parse_config("[sentry]\ndsn = \"http://key@sentry.local/1\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)), "{err:?}");
    }

    #[test]
    fn misspelled_section_is_rejected() {
        let content = VALID.replace("[servers.debug]", "[server.debug]");
        let err = parse_config(&content).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)), "{err:?}");
    }

    #[test]
    fn missing_level_is_rejected() {
        let content = VALID.replace("level = \"warn\"", "");
        assert!(matches!(parse_config(&content), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn missing_dsn_is_validation_error() {
        let content = VALID.replace("http://key@sentry.local/1", "");
        match parse_config(&content) {
            Err(ConfigError::Validation(errors)) => assert_eq!(errors.len(), 1),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_config(Path::new("/nonexistent/config.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
