use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - API and web URLs are present
/// - Retry policies allow at least one attempt
/// - The idle interval is at least one second
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.api.base_url.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "api.base_url cannot be empty".to_string(),
        ));
    }

    if config.api.open_api_url.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "api.open_api_url cannot be empty".to_string(),
        ));
    }

    if config.api.web_url.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "api.web_url cannot be empty".to_string(),
        ));
    }

    if config.manager.file_wait.max_attempts == 0 || config.manager.lobby_copy.max_attempts == 0 {
        return Err(ConfigError::ValidationError(
            "manager retry policies need max_attempts >= 1".to_string(),
        ));
    }

    if config.manager.idle_interval_secs == 0 {
        return Err(ConfigError::ValidationError(
            "manager.idle_interval_secs cannot be 0".to_string(),
        ));
    }

    Ok(())
}
