use super::{types::Config, ConfigError, MAX_PAGE_SIZE};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Page size is within 1..=MAX_PAGE_SIZE
/// - At least one item type is requested
/// - Deny-list entries are not blank
/// - Media server timeout is not 0
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.sync.page_size == 0 || config.sync.page_size > MAX_PAGE_SIZE {
        return Err(ConfigError::ValidationError(format!(
            "sync.page_size must be between 1 and {}",
            MAX_PAGE_SIZE
        )));
    }

    if config.sync.item_types.is_empty() {
        return Err(ConfigError::ValidationError(
            "sync.item_types cannot be empty".to_string(),
        ));
    }

    if config
        .sync
        .excluded_titles
        .iter()
        .any(|entry| entry.trim().is_empty())
    {
        return Err(ConfigError::ValidationError(
            "sync.excluded_titles cannot contain blank entries".to_string(),
        ));
    }

    if config.media_server.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "media_server.timeout_secs cannot be 0".to_string(),
        ));
    }

    Ok(())
}
