//! # Configuration System
//!
//! Hierarchical TOML configuration for leftovers.
//!
//! ## Configuration Hierarchy
//!
//! Configuration is loaded in the following order (later sources override earlier ones):
//! 1. **Hardcoded defaults** - Built-in fallback values
//! 2. **User config** - `~/.leftovers/config.toml`
//! 3. **Project config** - `./.leftovers/config.toml`
//! 4. **CLI arguments** - Command-line flags (highest priority)
//!
//! ## Loading Configuration
//!
//! ```rust,no_run
//! use leftovers_core::config::LeftoversConfig;
//!
//! fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = LeftoversConfig::load_hierarchy()?;
//!     let options = config.sweep_options();
//!     assert!(options.max_passes >= 1);
//!     Ok(())
//! }
//! ```

pub mod defaults;
pub mod loading;
pub mod types;
pub mod validation;

use std::time::Duration;

pub use defaults::{DEFAULT_MAX_PASSES, DEFAULT_OPERATION_TIMEOUT_SECS, DEFAULT_POLL_INTERVAL_MS};
pub use types::{Config, GcpConfig, LeftoversConfig, SweepConfig, WaiterConfig};
pub use validation::validate_config;

use crate::errors::ConfigError;
use crate::resources::{ListError, NameFilter};
use crate::sweep::SweepOptions;
use crate::waiter::WaitConfig;

impl LeftoversConfig {
    /// Load configuration from the hierarchy of config files.
    ///
    /// See [`loading::load_hierarchy`] for details.
    pub fn load_hierarchy() -> Result<Self, ConfigError> {
        loading::load_hierarchy()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validation::validate_config(self)
    }

    pub fn max_passes(&self) -> u32 {
        self.sweep.max_passes.unwrap_or(DEFAULT_MAX_PASSES)
    }

    pub fn sweep_options(&self) -> SweepOptions {
        SweepOptions {
            max_passes: self.max_passes(),
            concurrent_kinds: self.sweep.concurrent_kinds,
        }
    }

    pub fn wait_config(&self) -> WaitConfig {
        WaitConfig {
            poll_interval: Duration::from_millis(
                self.waiter
                    .poll_interval_ms
                    .unwrap_or(DEFAULT_POLL_INTERVAL_MS),
            ),
            timeout: Duration::from_secs(
                self.waiter
                    .operation_timeout_secs
                    .unwrap_or(DEFAULT_OPERATION_TIMEOUT_SECS),
            ),
        }
    }

    pub fn name_filter(&self) -> Result<NameFilter, ListError> {
        NameFilter::new(self.sweep.filter.as_deref().unwrap_or(""), self.sweep.regex)
    }
}
