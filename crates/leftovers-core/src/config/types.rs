//! Configuration type definitions for leftovers.
//!
//! These types are serialized/deserialized from TOML config files.
//!
//! # Example Configuration
//!
//! ```toml
//! [sweep]
//! max_passes = 3
//! concurrent_kinds = false
//! filter = "ci-run-"
//! regex = false
//!
//! [waiter]
//! poll_interval_ms = 2000
//! operation_timeout_secs = 300
//!
//! [gcp]
//! project = "my-test-project"
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Runtime configuration for the leftovers CLI.
///
/// Derived from environment variables and system defaults, not from config files.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base directory for leftovers data (default: ~/.leftovers)
    pub leftovers_dir: PathBuf,
    /// Log level for the application
    pub log_level: String,
}

/// Main configuration loaded from TOML config files.
///
/// Loaded from:
/// 1. User config: `~/.leftovers/config.toml`
/// 2. Project config: `./.leftovers/config.toml`
///
/// Project config values override user config values.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LeftoversConfig {
    /// Multi-pass sweep settings
    #[serde(default)]
    pub sweep: SweepConfig,

    /// Asynchronous operation polling settings
    #[serde(default)]
    pub waiter: WaiterConfig,

    /// Google Cloud settings
    #[serde(default)]
    pub gcp: GcpConfig,
}

/// Sweep configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SweepConfig {
    /// Upper bound on deletion passes.
    /// Default: 3.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_passes: Option<u32>,

    /// Run each resource kind on its own worker lane.
    /// Only honoured when prompts are disabled.
    #[serde(default)]
    pub concurrent_kinds: bool,

    /// Name filter applied to every listed resource.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,

    /// Treat `filter` as a regular expression instead of a substring.
    #[serde(default)]
    pub regex: bool,
}

/// Operation waiter configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct WaiterConfig {
    /// Delay between operation status polls.
    /// Default: 2000ms.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poll_interval_ms: Option<u64>,

    /// Ceiling on how long a single operation may be polled.
    /// Default: 300 seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GcpConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
}
