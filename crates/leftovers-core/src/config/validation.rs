//! Validation of merged configuration.

use crate::config::types::LeftoversConfig;
use crate::errors::ConfigError;

pub fn validate_config(config: &LeftoversConfig) -> Result<(), ConfigError> {
    if config.max_passes() == 0 {
        return Err(ConfigError::InvalidConfiguration {
            message: "sweep.max_passes must be at least 1".to_string(),
        });
    }

    if config.waiter.poll_interval_ms == Some(0) {
        return Err(ConfigError::InvalidConfiguration {
            message: "waiter.poll_interval_ms must be greater than 0".to_string(),
        });
    }

    let wait = config.wait_config();
    if wait.timeout < wait.poll_interval {
        return Err(ConfigError::InvalidConfiguration {
            message: format!(
                "waiter.operation_timeout_secs ({}s) must not be shorter than the poll interval ({}ms)",
                wait.timeout.as_secs(),
                wait.poll_interval.as_millis()
            ),
        });
    }

    if config.sweep.regex
        && let Some(pattern) = &config.sweep.filter
        && let Err(e) = regex::Regex::new(pattern)
    {
        return Err(ConfigError::InvalidConfiguration {
            message: format!("sweep.filter is not a valid regex: {}", e),
        });
    }

    Ok(())
}
