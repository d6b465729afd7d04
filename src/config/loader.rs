//! Configuration loading from disk.

use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::config::env::{apply_env_overrides, EnvSource};
use crate::config::schema::GatewayConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load configuration from an optional TOML file, apply environment
/// overrides, then validate.
///
/// Without a path the built-in defaults are the starting point.
pub fn load_config(
    path: Option<&Path>,
    env: &dyn EnvSource,
) -> Result<GatewayConfig, ConfigError> {
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            toml::from_str(&content)?
        }
        None => GatewayConfig::default(),
    };

    apply_env_overrides(&mut config, env);
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_load_file_then_env() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            [listener]
            bind_address = "127.0.0.1:9000"

            [timeouts]
            read_ms = 3000
            "#
        )
        .unwrap();

        let env: HashMap<String, String> =
            [("write_timeout".to_string(), "7".to_string())].into();
        let config = load_config(Some(file.path()), &env).unwrap();

        assert_eq!(config.listener.bind_address, "127.0.0.1:9000");
        assert_eq!(config.timeouts.read_ms, 3000);
        assert_eq!(config.timeouts.write_ms, 7000);
    }

    #[test]
    fn test_read_timeout_sets_dial_and_keep_alive() {
        let env: HashMap<String, String> =
            [("read_timeout".to_string(), "60".to_string())].into();
        let config = load_config(None, &env).unwrap();

        assert_eq!(config.timeouts.read_ms, 60_000);
        assert_eq!(
            config.upstream.dial_timeout(&config.timeouts),
            std::time::Duration::from_secs(60)
        );
        assert_eq!(
            config.upstream.keep_alive(&config.timeouts),
            std::time::Duration::from_secs(60)
        );
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let env = HashMap::new();
        let err = load_config(Some(Path::new("/nonexistent/gateway.toml")), &env).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_invalid_config_reports_validation() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[upstream]\nwatchdog_port = 0").unwrap();

        let err = load_config(Some(file.path()), &HashMap::new()).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("upstream.watchdog_port"));
    }
}
