use clap::ArgMatches;
use tokio_util::sync::CancellationToken;
use tracing::{error, warn};

use leftovers_core::config::{Config, LeftoversConfig};
use leftovers_core::events;

mod sweep;
mod types;

pub async fn run_command(
    matches: &ArgMatches,
    cancel: CancellationToken,
) -> Result<(), Box<dyn std::error::Error>> {
    events::log_app_startup(matches.subcommand_name().unwrap_or("none"));

    let result = match matches.subcommand() {
        Some(("sweep", sub_matches)) => sweep::handle_sweep_command(sub_matches, cancel).await,
        Some(("types", sub_matches)) => types::handle_types_command(sub_matches),
        _ => {
            error!(event = "cli.command_unknown");
            Err("Unknown command".into())
        }
    };

    events::log_app_shutdown(result.is_ok());
    result
}

/// Load configuration with warning on errors.
///
/// Falls back to defaults if config loading fails, but notifies the user via:
/// - stderr message for immediate visibility
/// - structured log event `cli.config.load_failed` for debugging
fn load_config_with_warning() -> LeftoversConfig {
    match LeftoversConfig::load_hierarchy() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Could not load config: {}. Using defaults.\n\
                 Tip: Check {} and ./.leftovers/config.toml for syntax errors.",
                e,
                Config::new().config_path().display()
            );
            warn!(
                event = "cli.config.load_failed",
                error = %e,
                "Config load failed, using defaults"
            );
            LeftoversConfig::default()
        }
    }
}
