//! Configuration validation

use tracing::debug;

use crate::error::{ConfigError, Result};

use super::types::Config;

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    debug!("validating configuration");
    validate_poll(config)?;
    validate_profiles(config)?;
    debug!("configuration validation passed");
    Ok(())
}

fn validate_poll(config: &Config) -> Result<()> {
    if config.poll.max_backoff_secs == 0 {
        return Err(ConfigError::InvalidValue {
            field: "poll.max_backoff_secs".to_string(),
            message: "must be greater than zero".to_string(),
        }
        .into());
    }

    if config.poll.server.as_deref().is_some_and(str::is_empty) {
        return Err(ConfigError::InvalidValue {
            field: "poll.server".to_string(),
            message: "server cannot be empty".to_string(),
        }
        .into());
    }

    Ok(())
}

fn validate_profiles(config: &Config) -> Result<()> {
    if config.profiles.merge_tool.is_empty() {
        return Err(ConfigError::InvalidValue {
            field: "profiles.merge_tool".to_string(),
            message: "merge tool cannot be empty".to_string(),
        }
        .into());
    }

    if config.profiles.extension.is_empty() {
        return Err(ConfigError::InvalidValue {
            field: "profiles.extension".to_string(),
            message: "extension cannot be empty".to_string(),
        }
        .into());
    }

    if let Some(pattern) = &config.profiles.filename_pattern {
        if let Err(e) = regex::Regex::new(pattern) {
            return Err(ConfigError::InvalidValue {
                field: "profiles.filename_pattern".to_string(),
                message: e.to_string(),
            }
            .into());
        }
    }

    Ok(())
}
