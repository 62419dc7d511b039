//! Configuration validation.
//!
//! Validates configuration at startup to catch common errors early.

use super::Config;
use thiserror::Error;

/// Smallest line limit that still fits a login with reasonable ids.
const MIN_LINE_LENGTH: usize = 64;

/// Validation errors for configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("server.name is required")]
    MissingServerName,
    #[error("limits.message_rate_per_second must be zero or positive, got {0}")]
    InvalidMessageRate(f32),
    #[error("limits.message_burst must be at least 1, got {0}")]
    InvalidMessageBurst(f32),
    #[error("limits.max_line_length must be at least 64, got {0}")]
    LineLengthTooSmall(usize),
    #[error("limits.send_queue must be non-zero")]
    ZeroSendQueue,
    #[error("accounts.path parent directory does not exist: {0}")]
    AccountsPathInvalid(String),
}

/// Validate a configuration, returning all errors found.
pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.server.name.trim().is_empty() {
        errors.push(ValidationError::MissingServerName);
    }

    let limits = &config.limits;
    let rate = limits.message_rate_per_second;
    if rate.is_nan() || rate < 0.0 {
        errors.push(ValidationError::InvalidMessageRate(rate));
    }
    // Burst only matters once a rate is set
    if rate > 0.0 && (limits.message_burst.is_nan() || limits.message_burst < 1.0) {
        errors.push(ValidationError::InvalidMessageBurst(limits.message_burst));
    }
    if limits.max_line_length < MIN_LINE_LENGTH {
        errors.push(ValidationError::LineLengthTooSmall(limits.max_line_length));
    }
    if limits.send_queue == 0 {
        errors.push(ValidationError::ZeroSendQueue);
    }

    let path = &config.accounts.path;
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        errors.push(ValidationError::AccountsPathInvalid(
            path.display().to_string(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
