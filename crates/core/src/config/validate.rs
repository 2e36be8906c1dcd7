use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - At least one worker
/// - Non-zero queue capacity
/// - Ledger path and work file prefix are not empty
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.pool.workers == 0 {
        return Err(ConfigError::ValidationError(
            "pool.workers cannot be 0".to_string(),
        ));
    }

    if config.pool.queue_capacity == 0 {
        return Err(ConfigError::ValidationError(
            "pool.queue_capacity cannot be 0".to_string(),
        ));
    }

    if config.ledger.path.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "ledger.path cannot be empty".to_string(),
        ));
    }

    if config.converter.work_file_prefix.is_empty() {
        return Err(ConfigError::ValidationError(
            "converter.work_file_prefix cannot be empty".to_string(),
        ));
    }

    Ok(())
}
