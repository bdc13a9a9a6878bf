use super::{types::Config, ConfigError};

/// Length of an assrt API token.
pub const ASSRT_TOKEN_LEN: usize = 32;

/// Validate configuration
/// Currently validates:
/// - HTTP timeout is not 0
/// - Provider URLs are not empty
/// - Assrt token has the provider's token length
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.http.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "http.timeout_secs cannot be 0".to_string(),
        ));
    }

    if let Some(assrt) = &config.assrt {
        if assrt.token.chars().count() != ASSRT_TOKEN_LEN {
            return Err(ConfigError::ValidationError(format!(
                "assrt.token must be {} characters",
                ASSRT_TOKEN_LEN
            )));
        }
        if assrt.search_url.trim().is_empty() || assrt.detail_url.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "assrt URLs cannot be empty".to_string(),
            ));
        }
    }

    if let Some(shooter) = &config.shooter {
        if shooter.api_url.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "shooter.api_url cannot be empty".to_string(),
            ));
        }
    }

    Ok(())
}
