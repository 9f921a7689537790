//! Lifecycle events for a leftovers run: the command boundary, rejected
//! input and the sweep summary.

use tracing::{error, info, warn};

use crate::errors::LeftoversError;
use crate::resources::NameFilter;
use crate::sweep::SweepReport;

pub fn log_app_startup(command: &str) {
    info!(
        event = "core.app.startup_completed",
        version = env!("CARGO_PKG_VERSION"),
        command = command
    );
}

pub fn log_app_shutdown(succeeded: bool) {
    info!(event = "core.app.shutdown_started", succeeded = succeeded);
}

/// A command stopped before sweeping anything. User mistakes are warnings.
pub fn log_command_rejected(error: &dyn LeftoversError) {
    if error.is_user_error() {
        warn!(
            event = "core.app.command_rejected",
            error_code = error.error_code(),
            error = %error
        );
    } else {
        error!(
            event = "core.app.command_rejected",
            error_code = error.error_code(),
            error = %error
        );
    }
}

pub fn log_sweep_started(kinds: usize, scope: &str, filter: &NameFilter) {
    info!(
        event = "core.sweep.run_started",
        kinds = kinds,
        scope = scope,
        filter = filter.as_str(),
        regex = filter.is_regex()
    );
}

pub fn log_sweep_completed(report: &SweepReport) {
    let failed = report.failed_count();
    if failed == 0 {
        info!(
            event = "core.sweep.run_completed",
            passes = report.passes,
            deleted = report.deleted_count(),
            skipped = report.skipped_count(),
            list_errors = report.list_errors().len()
        );
    } else {
        warn!(
            event = "core.sweep.run_completed",
            passes = report.passes,
            deleted = report.deleted_count(),
            skipped = report.skipped_count(),
            failed = failed,
            list_errors = report.list_errors().len()
        );
    }
}
