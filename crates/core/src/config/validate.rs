use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - At least one worker
/// - Tool paths are not empty
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.batch.workers == 0 {
        return Err(ConfigError::ValidationError(
            "batch.workers cannot be 0".to_string(),
        ));
    }

    for (name, path) in [
        ("tools.flac", &config.tools.flac),
        ("tools.metaflac", &config.tools.metaflac),
        ("tools.lame", &config.tools.lame),
    ] {
        if path.as_os_str().is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "{} cannot be empty",
                name
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BatchConfig, ToolsConfig};
    use std::path::PathBuf;

    #[test]
    fn test_validate_valid_config() {
        let config = Config::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_zero_workers_fails() {
        let config = Config {
            tools: ToolsConfig::default(),
            batch: BatchConfig {
                workers: 0,
                ..Default::default()
            },
        };
        let result = validate_config(&config);
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_validate_empty_tool_path_fails() {
        let config = Config {
            tools: ToolsConfig {
                lame: PathBuf::new(),
                ..Default::default()
            },
            batch: BatchConfig::default(),
        };
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("tools.lame"));
    }
}
