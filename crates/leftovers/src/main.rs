use leftovers_core::config::Config;
use leftovers_core::init_logging;
use tokio_util::sync::CancellationToken;
use tracing::warn;

mod app;
mod commands;
mod table;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let app = app::build_cli();
    let matches = app.get_matches();

    // Logging is quiet unless asked for, so stdout stays clean for reports
    let verbose = matches.get_flag("verbose") || Config::new().verbose_logging();
    init_logging(!verbose);

    let cancel = CancellationToken::new();
    spawn_interrupt_handler(cancel.clone());

    commands::run_command(&matches, cancel).await?;

    Ok(())
}

/// First Ctrl-C cancels the sweep; a second one exits immediately.
fn spawn_interrupt_handler(cancel: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_err() {
            return;
        }
        warn!(event = "cli.interrupt_received");
        eprintln!("Cancelling... remaining resources will be skipped. Press Ctrl-C again to abort.");
        cancel.cancel();

        if tokio::signal::ctrl_c().await.is_ok() {
            std::process::exit(130);
        }
    });
}
