//! Default values for configuration types.

use crate::config::types::Config;

/// Default upper bound on deletion passes.
///
/// Dependency chains in test leftovers are shallow (instance -> disk,
/// subnetwork -> network), so three passes cover them.
pub const DEFAULT_MAX_PASSES: u32 = 3;

/// Default delay between operation status polls (2000ms).
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 2000;

/// Default ceiling for a single asynchronous operation (5 minutes).
pub const DEFAULT_OPERATION_TIMEOUT_SECS: u64 = 300;

impl Default for Config {
    fn default() -> Self {
        let leftovers_dir = match dirs::home_dir() {
            Some(home) => home.join(".leftovers"),
            None => {
                eprintln!(
                    "Warning: Could not find home directory. Set HOME environment variable. \
                    Using fallback directory."
                );
                std::env::temp_dir().join(".leftovers")
            }
        };

        Self {
            leftovers_dir,
            log_level: std::env::var("LEFTOVERS_LOG_LEVEL").unwrap_or("info".to_string()),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config_path(&self) -> std::path::PathBuf {
        self.leftovers_dir.join("config.toml")
    }

    /// `LEFTOVERS_LOG_LEVEL=debug` (or trace) turns on info-level logs
    /// without `--verbose`.
    pub fn verbose_logging(&self) -> bool {
        matches!(
            self.log_level.to_lowercase().as_str(),
            "debug" | "trace"
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::new();
        assert!(
            config
                .leftovers_dir
                .to_string_lossy()
                .contains(".leftovers")
        );
    }

    #[test]
    fn test_verbose_logging_levels() {
        let mut config = Config::new();
        config.log_level = "DEBUG".to_string();
        assert!(config.verbose_logging());
        config.log_level = "info".to_string();
        assert!(!config.verbose_logging());
    }

    #[test]
    fn test_config_path() {
        let config = Config::new();
        assert!(config.config_path().ends_with("config.toml"));
    }
}
