use clap::ArgMatches;
use tracing::info;

use leftovers_core::providers::gcp::{KINDS, KindScope, Service};

pub(crate) fn handle_types_command(_matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    info!(event = "cli.types_started");

    let label_width = KINDS
        .iter()
        .map(|kind| kind.label.len())
        .max()
        .unwrap_or(4);

    println!("GCP resource kinds, in sweep order:");
    for kind in KINDS {
        let scope = match (kind.service, kind.scope) {
            (Service::Sql, _) => "cloud sql",
            (Service::Compute, KindScope::Global) => "global",
            (Service::Compute, KindScope::Regional) => "regional",
            (Service::Compute, KindScope::Zonal) => "zonal",
        };
        let protected = kind
            .protected_prefix
            .map(|prefix| format!("  (keeps '{}*')", prefix))
            .unwrap_or_default();
        println!(
            "  {:<width$}  --type {:<24} {}{}",
            kind.label,
            kind.slug(),
            scope,
            protected,
            width = label_width
        );
    }

    info!(event = "cli.types_completed", count = KINDS.len());
    Ok(())
}
