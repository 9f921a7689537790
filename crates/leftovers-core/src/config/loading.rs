//! Configuration loading and merging logic.
//!
//! # Configuration Hierarchy
//!
//! Configuration is loaded in the following order (later sources override earlier ones):
//! 1. **Hardcoded defaults** - Built-in fallback values
//! 2. **User config** - `~/.leftovers/config.toml` (global user preferences)
//! 3. **Project config** - `./.leftovers/config.toml` (project-specific overrides)
//! 4. **CLI arguments** - Command-line flags (highest priority, applied by the CLI)

use crate::config::types::{GcpConfig, LeftoversConfig, SweepConfig, WaiterConfig};
use crate::config::validation::validate_config;
use crate::errors::ConfigError;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Load configuration from the hierarchy of config files.
///
/// # Errors
///
/// Returns an error if a config file cannot be parsed or the merged
/// configuration is invalid. Missing config files are not errors.
pub fn load_hierarchy() -> Result<LeftoversConfig, ConfigError> {
    let user_path = dirs::home_dir().map(|home| home.join(".leftovers").join("config.toml"));
    let project_path = std::env::current_dir()
        .map_err(|e| ConfigError::IoError {
            path: ".".to_string(),
            source: e,
        })?
        .join(".leftovers")
        .join("config.toml");

    load_hierarchy_from(user_path.as_deref(), &project_path)
}

/// Load and merge the user and project config files at explicit paths.
pub fn load_hierarchy_from(
    user_path: Option<&Path>,
    project_path: &Path,
) -> Result<LeftoversConfig, ConfigError> {
    let mut config = LeftoversConfig::default();

    if let Some(user_path) = user_path {
        match load_config_file(user_path) {
            Ok(user_config) => config = merge_configs(config, user_config),
            Err(ConfigError::ConfigNotFound { .. }) => {}
            Err(e) => return Err(e),
        }
    }

    match load_config_file(project_path) {
        Ok(project_config) => config = merge_configs(config, project_config),
        Err(ConfigError::ConfigNotFound { .. }) => {}
        Err(e) => return Err(e),
    }

    validate_config(&config)?;

    Ok(config)
}

/// Load a configuration file from the given path.
pub fn load_config_file(path: &Path) -> Result<LeftoversConfig, ConfigError> {
    let display = path.display().to_string();
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ConfigError::ConfigNotFound {
                path: display.clone(),
            }
        } else {
            ConfigError::IoError {
                path: display.clone(),
                source: e,
            }
        }
    })?;

    let config = toml::from_str(&content).map_err(|e| ConfigError::ConfigParseError {
        path: display.clone(),
        message: e.to_string(),
    })?;

    debug!(event = "core.config.file_loaded", path = %path.display());
    Ok(config)
}

/// Merge two configurations, with override_config taking precedence.
///
/// Optional values replace base values only if present. Boolean switches
/// are sticky: once enabled by any layer they stay enabled.
pub fn merge_configs(base: LeftoversConfig, override_config: LeftoversConfig) -> LeftoversConfig {
    LeftoversConfig {
        sweep: SweepConfig {
            max_passes: override_config.sweep.max_passes.or(base.sweep.max_passes),
            concurrent_kinds: override_config.sweep.concurrent_kinds
                || base.sweep.concurrent_kinds,
            filter: override_config.sweep.filter.or(base.sweep.filter),
            regex: override_config.sweep.regex || base.sweep.regex,
        },
        waiter: WaiterConfig {
            poll_interval_ms: override_config
                .waiter
                .poll_interval_ms
                .or(base.waiter.poll_interval_ms),
            operation_timeout_secs: override_config
                .waiter
                .operation_timeout_secs
                .or(base.waiter.operation_timeout_secs),
        },
        gcp: GcpConfig {
            project: override_config.gcp.project.or(base.gcp.project),
        },
    }
}

/// Path of the project config relative to a working directory.
pub fn project_config_path(dir: &Path) -> PathBuf {
    dir.join(".leftovers").join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(dir: &Path, content: &str) -> PathBuf {
        let path = project_config_path(dir);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_missing_files_yield_defaults() {
        let temp = tempfile::tempdir().unwrap();
        let config = load_hierarchy_from(
            Some(&temp.path().join("nope.toml")),
            &project_config_path(temp.path()),
        )
        .unwrap();
        assert_eq!(config.sweep.max_passes, None);
        assert_eq!(config.gcp.project, None);
    }

    #[test]
    fn test_project_overrides_user() {
        let user_dir = tempfile::tempdir().unwrap();
        let project_dir = tempfile::tempdir().unwrap();

        let user_path = write_config(
            user_dir.path(),
            r#"
[sweep]
max_passes = 5
filter = "user-filter"

[gcp]
project = "user-project"
"#,
        );
        let project_path = write_config(
            project_dir.path(),
            r#"
[sweep]
filter = "project-filter"
"#,
        );

        let config = load_hierarchy_from(Some(&user_path), &project_path).unwrap();
        assert_eq!(config.sweep.max_passes, Some(5));
        assert_eq!(config.sweep.filter.as_deref(), Some("project-filter"));
        assert_eq!(config.gcp.project.as_deref(), Some("user-project"));
    }

    #[test]
    fn test_loaded_file_is_logged_with_its_path() {
        let temp = tempfile::tempdir().unwrap();
        let path = write_config(temp.path(), "[sweep]\nmax_passes = 2\n");

        let captured = std::sync::Arc::new(std::sync::Mutex::new(Vec::<u8>::new()));
        let sink = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .json()
            .with_max_level(tracing::Level::DEBUG)
            .with_writer(move || SharedBuffer(sink.clone()))
            .finish();

        let config = tracing::subscriber::with_default(subscriber, || load_config_file(&path))
            .unwrap();
        assert_eq!(config.sweep.max_passes, Some(2));

        let output = String::from_utf8(captured.lock().unwrap().clone()).unwrap();
        assert!(output.contains("core.config.file_loaded"));
        assert!(output.contains("config.toml"));
    }

    struct SharedBuffer(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_parse_error_is_reported() {
        let temp = tempfile::tempdir().unwrap();
        let path = write_config(temp.path(), "invalid toml [[[");
        let err = load_hierarchy_from(None, &path).unwrap_err();
        assert!(matches!(err, ConfigError::ConfigParseError { .. }));
    }

    #[test]
    fn test_invalid_merged_config_is_rejected() {
        let temp = tempfile::tempdir().unwrap();
        let path = write_config(
            temp.path(),
            r#"
[sweep]
max_passes = 0
"#,
        );
        let err = load_hierarchy_from(None, &path).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidConfiguration { .. }));
    }

    #[test]
    fn test_merge_keeps_sticky_switches() {
        let mut base = LeftoversConfig::default();
        base.sweep.concurrent_kinds = true;
        let merged = merge_configs(base, LeftoversConfig::default());
        assert!(merged.sweep.concurrent_kinds);
    }
}
